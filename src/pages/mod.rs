//! Page extraction for the forum's rendered markup
//!
//! Each page type the archiver visits has one extractor here that turns a
//! fetched HTML document into a small typed record. All knowledge of the
//! platform's CSS classes and element structure stays in this module; the
//! crawler only sees the records.
//!
//! | Page | Extractor | Record |
//! |------|-----------|--------|
//! | Board | [`parse_board_page`] | [`BoardPage`] |
//! | Thread | [`parse_message_page`] | [`MessagePage`] |
//! | Members list | [`parse_member_list_page`] | [`MemberListPage`] |
//! | Profile | [`parse_profile_page`] | [`ProfilePage`] |
//! | Guestbook | [`parse_message_page`] | [`MessagePage`] |
//!
//! Extractors never fail: a missing element yields an empty list or `None`,
//! and the caller decides whether that matters.

mod board;
mod member;
mod thread;

pub use board::{parse_board_page, BoardPage, SubBoardLink, TopicRow};
pub use member::{
    avatar_file_name, parse_member_list_page, parse_profile_page, MemberLink, MemberListPage,
    ProfilePage,
};
pub use thread::{parse_message_page, AttachmentLink, Message, MessagePage};

use scraper::{ElementRef, Selector};

/// Returns all elements below `scope` matching `css`
///
/// An unparsable selector matches nothing.
pub(crate) fn select_all<'a>(scope: ElementRef<'a>, css: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(css) {
        Ok(selector) => scope.select(&selector).collect(),
        Err(e) => {
            tracing::warn!("Invalid selector '{}': {:?}", css, e);
            Vec::new()
        }
    }
}

/// Returns the first element below `scope` matching `css`
pub(crate) fn select_first<'a>(scope: ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    select_all(scope, css).into_iter().next()
}

/// Collects an element's text with whitespace collapsed
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Returns true if the element or one of its ancestors has any of `classes`
pub(crate) fn within_any_class(element: ElementRef<'_>, classes: &[&str]) -> bool {
    std::iter::once(element)
        .chain(element.ancestors().filter_map(ElementRef::wrap))
        .any(|e| e.value().classes().any(|c| classes.contains(&c)))
}

/// Reads the page count from the first page-navigation block in `scope`
///
/// The navigation lists page numbers (the current page unlinked); the
/// highest number is the last page. No navigation, or navigation without
/// any number, means a single page.
pub(crate) fn navigation_page_count(scope: ElementRef<'_>, css: &str) -> u32 {
    select_first(scope, css)
        .map(|nav| {
            select_all(nav, "li")
                .into_iter()
                .filter_map(|li| element_text(li).parse::<u32>().ok())
                .max()
                .unwrap_or(1)
        })
        .unwrap_or(1)
        .max(1)
}
