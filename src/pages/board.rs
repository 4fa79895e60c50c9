use scraper::Html;
use url::Url;

use super::{element_text, navigation_page_count, select_all, select_first, within_any_class};
use crate::url::resolve_link;

/// Sub-board title links, ungrouped and grouped under a category header
const SUB_BOARD_LINKS: &str = "ul#boardlist > li.board div.boardlistInner h3.boardTitle > a, \
     ul#boardlist > li.category > ul > li.board div.boardlistInner h3.boardTitle > a";

const PAGE_NAVIGATION: &str = "div.pageNavigation";
const TOPIC_ROWS: &str = "table.tableList tr";
const TOPIC_LINK: &str = "td.columnTopic div.topic > p > a";
const TOPIC_PAGES: &str = "td.columnTopic div.smallPages";

/// Thread-list sections whose rows are not the board's own topics
const EXCLUDED_SECTIONS: &[&str] = &["topThreads", "tabMenu"];

/// A child board listed on a board page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubBoardLink {
    pub url: Url,
    pub title: String,
}

/// A thread listed on a board page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicRow {
    pub url: Url,
    pub title: String,
    /// Page count hint from the row's small-pages links
    pub page_count: u32,
}

/// Everything the traversal needs from one board page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardPage {
    pub sub_boards: Vec<SubBoardLink>,
    /// Number of pages of the board's own thread list
    pub page_count: u32,
    pub topics: Vec<TopicRow>,
}

/// Extracts sub-boards, page count and topic rows from a board page
///
/// Sub-boards are returned in document order whichever rendering the page
/// uses. The page count is only meaningful on a board's first page.
pub fn parse_board_page(html: &str, page_url: &Url) -> BoardPage {
    let document = Html::parse_document(html);
    let root = document.root_element();

    // A selector group matches in document order
    let sub_boards = select_all(root, SUB_BOARD_LINKS)
        .into_iter()
        .filter_map(|anchor| {
            let url = resolve_link(anchor.value().attr("href")?, page_url)?;
            Some(SubBoardLink {
                url,
                title: element_text(anchor),
            })
        })
        .collect();

    let mut topics = Vec::new();
    for row in select_all(root, TOPIC_ROWS) {
        if within_any_class(row, EXCLUDED_SECTIONS) {
            continue;
        }
        let Some(anchor) = select_first(row, TOPIC_LINK) else {
            continue;
        };
        let Some(url) = anchor
            .value()
            .attr("href")
            .and_then(|href| resolve_link(href, page_url))
        else {
            continue;
        };
        topics.push(TopicRow {
            url,
            title: element_text(anchor),
            page_count: navigation_page_count(row, TOPIC_PAGES),
        });
    }

    BoardPage {
        sub_boards,
        page_count: navigation_page_count(root, PAGE_NAVIGATION),
        topics,
    }
}
