//! Member directory crawl
//!
//! Walks the members list sorted by post count, archives every profile
//! with its avatar, and the profile's guestbook when it has one.

use url::Url;

use crate::config::Config;
use crate::crawler::context::CrawlContext;
use crate::crawler::timestamp::parse_timestamp;
use crate::pages::{
    avatar_file_name, parse_member_list_page, parse_message_page, parse_profile_page, MemberLink,
    ProfilePage,
};
use crate::state::{Progress, VisitKind};
use crate::storage::{NewGuestbookEntry, NewUser};
use crate::url::{canonical_url, page_urls, script_url};
use crate::ArchiveError;

/// Query selecting the members list, most active members first
pub const MEMBERS_LIST_QUERY: &str = "page=MembersList&sortField=posts&sortOrder=DESC";

/// What a member crawl produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemberOutcome {
    pub members: u64,
    pub guestbook_entries: u64,
}

/// Archives member profiles and guestbooks
pub struct MemberDirectoryCrawler<'c, 'a> {
    ctx: &'c mut CrawlContext<'a>,
    default_avatar_pattern: String,
    outcome: MemberOutcome,
}

impl<'c, 'a> MemberDirectoryCrawler<'c, 'a> {
    pub fn new(ctx: &'c mut CrawlContext<'a>, config: &Config) -> Self {
        Self {
            ctx,
            default_avatar_pattern: config.site.default_avatar_pattern.clone(),
            outcome: MemberOutcome::default(),
        }
    }

    /// Crawls every page of the members list
    ///
    /// # Arguments
    ///
    /// * `root_url` - Directory-style forum root
    /// * `script_name` - Script the forum is served through
    pub async fn crawl_all(
        mut self,
        root_url: &Url,
        script_name: &str,
    ) -> Result<MemberOutcome, ArchiveError> {
        let list_url = script_url(root_url, script_name, MEMBERS_LIST_QUERY)?;
        let progress = Progress::new("members");

        let html = self.ctx.session.fetch_page(list_url.as_str()).await?;
        let first_page = parse_member_list_page(&html, &list_url);
        let pages = page_urls(list_url.as_str(), first_page.page_count);
        let total_pages = pages.len();
        tracing::info!("{}: {} pages of members", progress, total_pages);

        let mut members = first_page.members;
        for (page_index, page_url) in pages.iter().enumerate() {
            if page_index > 0 {
                let html = self.ctx.session.fetch_page(page_url).await?;
                members = parse_member_list_page(&html, &Url::parse(page_url)?).members;
            }

            let page_progress = progress.page(page_index + 1, total_pages);
            let total_members = members.len();
            for (member_index, member) in members.iter().enumerate() {
                let member_progress = page_progress.member(member_index + 1, total_members);
                self.crawl_member(member, &member_progress).await?;
            }
        }

        Ok(self.outcome)
    }

    async fn crawl_member(
        &mut self,
        member: &MemberLink,
        progress: &Progress,
    ) -> Result<(), ArchiveError> {
        let profile_url = canonical_url(&member.url);
        if !self.ctx.visited.mark(VisitKind::Member, profile_url.as_str()) {
            tracing::debug!("Member already visited: {}", profile_url);
            return Ok(());
        }

        tracing::info!("{}: {}", progress, member.name);
        let html = self.ctx.session.fetch_page(profile_url.as_str()).await?;
        let profile = parse_profile_page(&html, &profile_url);

        let name = profile
            .name
            .clone()
            .unwrap_or_else(|| member.name.clone());
        let user = NewUser {
            id: profile.user_id,
            name: name.clone(),
            profile_pic_path: self.save_avatar(&profile),
            info: self.ctx.normalizer.normalize(&profile.info_html),
        };

        let user_id = match self.ctx.storage.insert_user(&user) {
            Ok(id) => {
                self.outcome.members += 1;
                Some(id)
            }
            Err(e) => {
                tracing::warn!("Failed to save member {}: {}", name, e);
                profile.user_id
            }
        };

        if let Some(guestbook_url) = &profile.guestbook_url {
            self.crawl_guestbook(guestbook_url, user_id, &name, progress)
                .await?;
        }

        Ok(())
    }

    /// Queues the avatar download and returns the stored reference
    ///
    /// The default avatar is not downloaded and stored as an empty path.
    fn save_avatar(&mut self, profile: &ProfilePage) -> String {
        let Some(avatar_url) = &profile.avatar_url else {
            return String::new();
        };
        if avatar_url.as_str().contains(self.default_avatar_pattern.as_str()) {
            return String::new();
        }
        let Some(file_name) = avatar_file_name(avatar_url) else {
            tracing::debug!("Avatar URL without file name: {}", avatar_url);
            return String::new();
        };

        let reference = self.ctx.layout.avatar_reference(&file_name);
        self.ctx
            .downloads
            .spawn(avatar_url.as_str(), self.ctx.layout.local_path(&reference));
        reference
    }

    async fn crawl_guestbook(
        &mut self,
        guestbook_url: &Url,
        user_id: Option<i64>,
        username: &str,
        progress: &Progress,
    ) -> Result<(), ArchiveError> {
        let entry = canonical_url(guestbook_url);
        if !self.ctx.visited.mark(VisitKind::Guestbook, entry.as_str()) {
            tracing::debug!("Guestbook already visited: {}", entry);
            return Ok(());
        }

        let html = self.ctx.session.fetch_page(entry.as_str()).await?;
        let mut page = parse_message_page(&html, &entry);
        let pages = page_urls(entry.as_str(), page.page_count);
        tracing::debug!("{}: guestbook with {} pages", progress, pages.len());

        for (page_index, page_url) in pages.iter().enumerate() {
            if page_index > 0 {
                let html = self.ctx.session.fetch_page(page_url).await?;
                page = parse_message_page(&html, &Url::parse(page_url)?);
            }

            for message in &page.messages {
                let timestamp = match parse_timestamp(&message.timestamp) {
                    Ok(ts) => Some(ts),
                    Err(e) => {
                        tracing::warn!("{}; storing guestbook entry without date", e);
                        None
                    }
                };

                let guestbook_entry = NewGuestbookEntry {
                    user: user_id,
                    username: username.to_string(),
                    author: message.author_id,
                    authorname: message.author.clone(),
                    timestamp,
                    message: self.ctx.normalizer.normalize(&message.body_html),
                };

                match self.ctx.storage.insert_guestbook_entry(&guestbook_entry) {
                    Ok(()) => self.outcome.guestbook_entries += 1,
                    Err(e) => tracing::warn!(
                        "Failed to save guestbook entry by {} for {}: {}",
                        message.author,
                        username,
                        e
                    ),
                }
            }
        }

        Ok(())
    }
}
