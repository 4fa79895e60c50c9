use scraper::Html;
use url::Url;

use super::{element_text, navigation_page_count, select_all, select_first};
use crate::url::{query_id, resolve_link};

const MEMBER_LINKS: &str = r#"td.columnUsername a[href*="userID="]"#;
const PROFILE_NAME: &str = "div.userHeadline h2, div.mainHeadline h2";
const PROFILE_AVATAR: &str = "div.userAvatar img";
const PROFILE_CONTENT: &str = "div.contentBox";
const PROFILE_SIDEBAR: &str = "div.userProfileSidebar";
const GUESTBOOK_LINK: &str = r#"a[href*="page=UserGuestbook"]"#;
const PAGE_NAVIGATION: &str = "div.pageNavigation";

/// Prefix of uploaded avatar file names
const AVATAR_PREFIX: &str = "avatar-";

/// A member listed in the members directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberLink {
    pub url: Url,
    pub name: String,
}

/// One page of the members directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberListPage {
    pub members: Vec<MemberLink>,
    pub page_count: u32,
}

/// A member profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfilePage {
    /// Platform user id taken from the profile URL
    pub user_id: Option<i64>,
    pub name: Option<String>,
    /// Absolute avatar image URL
    pub avatar_url: Option<Url>,
    /// Content boxes followed by the sidebar, as raw HTML
    pub info_html: String,
    pub guestbook_url: Option<Url>,
}

pub fn parse_member_list_page(html: &str, page_url: &Url) -> MemberListPage {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let members = select_all(root, MEMBER_LINKS)
        .into_iter()
        .filter_map(|anchor| {
            let url = resolve_link(anchor.value().attr("href")?, page_url)?;
            Some(MemberLink {
                url,
                name: element_text(anchor),
            })
        })
        .collect();

    MemberListPage {
        members,
        page_count: navigation_page_count(root, PAGE_NAVIGATION),
    }
}

/// Extracts a member's identity, avatar, info boxes and guestbook link
///
/// Only a guestbook link carrying the profile's own `userID` is taken.
pub fn parse_profile_page(html: &str, page_url: &Url) -> ProfilePage {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let name = select_first(root, PROFILE_NAME)
        .map(element_text)
        .filter(|n| !n.is_empty());

    let avatar_url = select_first(root, PROFILE_AVATAR)
        .and_then(|img| img.value().attr("src"))
        .and_then(|src| resolve_link(src, page_url));

    let mut info_html: String = select_all(root, PROFILE_CONTENT)
        .into_iter()
        .map(|content_box| content_box.html())
        .collect::<Vec<_>>()
        .join("\n");
    if let Some(sidebar) = select_first(root, PROFILE_SIDEBAR) {
        info_html.push('\n');
        info_html.push_str(&sidebar.html());
    }

    // Header and user panel link the viewer's own guestbook too
    let user_id = query_id(page_url.as_str(), "userID");
    let guestbook_url = user_id.and_then(|id| {
        select_all(root, GUESTBOOK_LINK)
            .into_iter()
            .filter_map(|a| a.value().attr("href"))
            .find(|href| query_id(href, "userID") == Some(id))
            .and_then(|href| resolve_link(href, page_url))
    });

    ProfilePage {
        user_id,
        name,
        avatar_url,
        info_html,
        guestbook_url,
    }
}

/// Local file name for an uploaded avatar
///
/// Uploaded avatars are served as `avatar-<suffix>`; the suffix is kept.
/// Names without the prefix are used unchanged.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use forum_archive::pages::avatar_file_name;
///
/// let src = Url::parse("http://forum.test/wcf/images/avatars/avatar-318.jpg").unwrap();
/// assert_eq!(avatar_file_name(&src), Some("318.jpg".to_string()));
/// ```
pub fn avatar_file_name(src: &Url) -> Option<String> {
    let file_name = src.path_segments()?.last()?.trim();
    if file_name.is_empty() {
        return None;
    }
    let suffix = file_name.strip_prefix(AVATAR_PREFIX).unwrap_or(file_name);
    if suffix.is_empty() {
        return None;
    }
    Some(suffix.to_string())
}
