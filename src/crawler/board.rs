//! Board tree traversal
//!
//! Boards are walked depth-first: a board's sub-boards (and their whole
//! subtrees) come before the board's own threads, siblings in listed order.
//! The walk keeps its own frame stack, so tree depth never grows the call
//! stack.

use url::Url;

use crate::crawler::context::{child_path, CrawlContext};
use crate::crawler::thread::ThreadDownloader;
use crate::pages::{parse_board_page, TopicRow};
use crate::state::{Progress, VisitKind};
use crate::url::{canonical_url, page_urls};
use crate::ArchiveError;

/// What a board traversal produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoardOutcome {
    pub boards: u64,
    pub threads: u64,
    pub posts_saved: u64,
    pub posts_failed: u64,
}

enum Frame {
    /// Fetch a board and schedule its children
    Enter {
        url: Url,
        path: String,
        progress: Progress,
    },
    /// Download the threads of an already fetched board
    Threads {
        entry: Url,
        path: String,
        progress: Progress,
        page_count: u32,
        first_page: Vec<TopicRow>,
    },
}

/// Walks a board tree and downloads every thread in it
pub struct BoardTraverser<'c, 'a> {
    ctx: &'c mut CrawlContext<'a>,
    outcome: BoardOutcome,
}

impl<'c, 'a> BoardTraverser<'c, 'a> {
    pub fn new(ctx: &'c mut CrawlContext<'a>) -> Self {
        Self {
            ctx,
            outcome: BoardOutcome::default(),
        }
    }

    /// Traverses the tree below `board_url`
    ///
    /// `path` is the board's display path; the root board has the empty
    /// path. Boards already visited in this run are skipped.
    pub async fn traverse(
        mut self,
        board_url: &Url,
        path: &str,
        progress: Progress,
    ) -> Result<BoardOutcome, ArchiveError> {
        let mut stack = vec![Frame::Enter {
            url: board_url.clone(),
            path: path.to_string(),
            progress,
        }];

        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Enter {
                    url,
                    path,
                    progress,
                } => {
                    let entry = canonical_url(&url);
                    if !self.ctx.visited.mark(VisitKind::Board, entry.as_str()) {
                        tracing::debug!("Board already visited: {}", entry);
                        continue;
                    }

                    tracing::info!("{}: board {}", progress, display_path(&path));
                    let html = self.ctx.session.fetch_page(entry.as_str()).await?;
                    let page = parse_board_page(&html, &entry);
                    self.outcome.boards += 1;

                    let total = page.sub_boards.len();
                    tracing::debug!(
                        "{} sub-boards, {} pages of threads",
                        total,
                        page.page_count
                    );

                    stack.push(Frame::Threads {
                        entry,
                        path: path.clone(),
                        progress: progress.clone(),
                        page_count: page.page_count,
                        first_page: page.topics,
                    });

                    // Reversed so the first listed sub-board is popped first
                    for (index, sub_board) in page.sub_boards.into_iter().enumerate().rev() {
                        stack.push(Frame::Enter {
                            url: sub_board.url,
                            path: child_path(&path, index + 1, &sub_board.title),
                            progress: progress.board(index + 1, total),
                        });
                    }
                }
                Frame::Threads {
                    entry,
                    path,
                    progress,
                    page_count,
                    first_page,
                } => {
                    self.download_threads(&entry, &path, &progress, page_count, first_page)
                        .await?;
                }
            }
        }

        Ok(self.outcome)
    }

    async fn download_threads(
        &mut self,
        entry: &Url,
        path: &str,
        progress: &Progress,
        page_count: u32,
        first_page: Vec<TopicRow>,
    ) -> Result<(), ArchiveError> {
        let pages = page_urls(entry.as_str(), page_count);
        let total_pages = pages.len();
        let mut thread_index = 0;
        let mut topics = first_page;

        for (page_index, page_url) in pages.iter().enumerate() {
            if page_index > 0 {
                let html = self.ctx.session.fetch_page(page_url).await?;
                topics = parse_board_page(&html, &Url::parse(page_url)?).topics;
            }

            let page_progress = progress.page(page_index + 1, total_pages);
            let total_topics = topics.len();

            for (topic_index, topic) in topics.iter().enumerate() {
                thread_index += 1;
                let thread_path = child_path(path, thread_index, &topic.title);
                let thread_progress = page_progress.thread(topic_index + 1, total_topics);

                let downloaded = ThreadDownloader::new(&mut *self.ctx)
                    .download(&topic.url, &thread_path, topic.page_count, &thread_progress)
                    .await?;

                if let Some(thread) = downloaded {
                    self.outcome.threads += 1;
                    self.outcome.posts_saved += thread.posts_saved;
                    self.outcome.posts_failed += thread.posts_failed;
                }
            }
        }

        Ok(())
    }
}

fn display_path(path: &str) -> &str {
    if path.is_empty() {
        "/"
    } else {
        path
    }
}
