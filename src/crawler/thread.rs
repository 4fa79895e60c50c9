//! Thread download
//!
//! A thread is fetched page by page. Each post is normalized, its
//! attachments are queued for background download and referenced in the
//! body, and the result is written as one row.

use url::Url;

use crate::crawler::context::CrawlContext;
use crate::crawler::normalize::attachment_reference;
use crate::crawler::timestamp::parse_timestamp;
use crate::pages::{parse_message_page, Message};
use crate::state::{Progress, VisitKind};
use crate::storage::NewPost;
use crate::url::{canonical_url, page_urls};
use crate::ArchiveError;

/// What one thread download produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThreadOutcome {
    pub pages: u32,
    pub posts_saved: u64,
    pub posts_failed: u64,
}

/// Downloads threads into the archive
pub struct ThreadDownloader<'c, 'a> {
    ctx: &'c mut CrawlContext<'a>,
}

impl<'c, 'a> ThreadDownloader<'c, 'a> {
    pub fn new(ctx: &'c mut CrawlContext<'a>) -> Self {
        Self { ctx }
    }

    /// Downloads every page of a thread
    ///
    /// # Arguments
    ///
    /// * `thread_url` - Entry URL of the thread
    /// * `path` - Display path stored on the thread row
    /// * `page_count` - Page count hint from the board's topic row
    /// * `progress` - Breadcrumb for log lines
    ///
    /// # Returns
    ///
    /// * `Ok(Some(outcome))` - The thread was archived
    /// * `Ok(None)` - Already visited, or the thread row could not be written
    /// * `Err(ArchiveError)` - A fetch failed fatally
    pub async fn download(
        &mut self,
        thread_url: &Url,
        path: &str,
        page_count: u32,
        progress: &Progress,
    ) -> Result<Option<ThreadOutcome>, ArchiveError> {
        let entry = canonical_url(thread_url);
        if !self.ctx.visited.mark(VisitKind::Thread, entry.as_str()) {
            tracing::debug!("Thread already visited: {}", entry);
            return Ok(None);
        }

        let thread_id = match self.ctx.storage.insert_thread(path) {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!("Skipping thread {} ({}): {}", path, entry, e);
                return Ok(None);
            }
        };

        tracing::info!("{}: {}", progress, path);

        let mut outcome = ThreadOutcome::default();
        let pages = page_urls(entry.as_str(), page_count);
        let total = pages.len();

        for (index, page_url) in pages.iter().enumerate() {
            tracing::debug!("{}, page {}/{}", progress, index + 1, total);

            let html = self.ctx.session.fetch_page(page_url).await?;
            let page_url = Url::parse(page_url)?;
            let page = parse_message_page(&html, &page_url);
            outcome.pages += 1;

            for message in &page.messages {
                let post = self.build_post(thread_id, message);
                match self.ctx.storage.insert_post(&post) {
                    Ok(_) => outcome.posts_saved += 1,
                    Err(e) => {
                        tracing::warn!("Failed to save post by {} in {}: {}", post.username, path, e);
                        outcome.posts_failed += 1;
                    }
                }
            }
        }

        Ok(Some(outcome))
    }

    fn build_post(&mut self, thread_id: i64, message: &Message) -> NewPost {
        let mut body = self.ctx.normalizer.normalize(&message.body_html);

        for attachment in &message.attachments {
            let reference = self.ctx.layout.attachment_reference(attachment.id);
            self.ctx
                .downloads
                .spawn(attachment.url.as_str(), self.ctx.layout.local_path(&reference));
            body.push_str(&attachment_reference(&reference));
        }

        let timestamp = match parse_timestamp(&message.timestamp) {
            Ok(ts) => Some(ts),
            Err(e) => {
                tracing::warn!("{}; storing post by {} without date", e, message.author);
                None
            }
        };

        NewPost {
            thread_id,
            user_id: message.author_id,
            username: message.author.clone(),
            timestamp,
            message: body,
        }
    }
}
