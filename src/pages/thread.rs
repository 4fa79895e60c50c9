use scraper::Html;
use url::Url;

use super::{element_text, navigation_page_count, select_all, select_first};
use crate::url::{query_id, resolve_link};

const MESSAGES: &str = "div.message";
const MESSAGE_DATE: &str = "div.messageHeader p.light, div.messageHeader p.smallFont";
const MESSAGE_AUTHOR: &str = "p.userName";
const MESSAGE_BODY: &str = "div.messageBody";
const ATTACHMENT_LINKS: &str = r#"a[href*="attachmentID="]"#;
const PAGE_NAVIGATION: &str = "div.pageNavigation";

/// A file attached to a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentLink {
    pub id: i64,
    pub url: Url,
}

/// One post of a thread or one entry of a guestbook
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Raw date text as rendered, empty if absent
    pub timestamp: String,
    /// Author display name, empty for removed accounts
    pub author: String,
    pub author_id: Option<i64>,
    /// Inner HTML of the message body
    pub body_html: String,
    pub attachments: Vec<AttachmentLink>,
}

/// The messages of one thread or guestbook page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessagePage {
    pub messages: Vec<Message>,
    pub page_count: u32,
}

/// Extracts all messages from a thread or guestbook page
///
/// Threads and guestbooks share the message markup. Containers without a
/// body (quick-reply forms, ads rendered as messages) are skipped.
pub fn parse_message_page(html: &str, page_url: &Url) -> MessagePage {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let messages = select_all(root, MESSAGES)
        .into_iter()
        .filter_map(|container| {
            let body = select_first(container, MESSAGE_BODY)?;

            let timestamp = select_first(container, MESSAGE_DATE)
                .map(element_text)
                .unwrap_or_default();

            let author_elem = select_first(container, MESSAGE_AUTHOR);
            let author = author_elem.map(element_text).unwrap_or_default();
            let author_id = author_elem.and_then(|elem| {
                select_all(elem, "a[href]")
                    .into_iter()
                    .find_map(|a| a.value().attr("href").and_then(|h| query_id(h, "userID")))
            });

            let mut attachments: Vec<AttachmentLink> = Vec::new();
            for anchor in select_all(container, ATTACHMENT_LINKS) {
                let Some(href) = anchor.value().attr("href") else {
                    continue;
                };
                let (Some(id), Some(url)) =
                    (query_id(href, "attachmentID"), resolve_link(href, page_url))
                else {
                    continue;
                };
                // Image attachments are linked from both thumbnail and caption
                if attachments.iter().all(|a| a.id != id) {
                    attachments.push(AttachmentLink { id, url });
                }
            }

            Some(Message {
                timestamp,
                author,
                author_id,
                body_html: body.inner_html(),
                attachments,
            })
        })
        .collect();

    MessagePage {
        messages,
        page_count: navigation_page_count(root, PAGE_NAVIGATION),
    }
}
