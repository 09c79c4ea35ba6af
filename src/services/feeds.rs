//! Per-source latest-item readers.

use crate::error::Result;
use crate::models::{Item, Source};
use crate::services::MirrorClient;
use crate::services::extract::{extract_post, extract_tweet, find_latest_post_link};

/// Reads the newest item of an account through its mirrors.
pub struct FeedReader {
    client: MirrorClient,
}

impl FeedReader {
    pub fn new(client: MirrorClient) -> Self {
        Self { client }
    }

    /// Fetch and extract the newest item of `handle`.
    ///
    /// `Ok(None)` means the page was fetched but held nothing extractable.
    pub async fn latest(
        &self,
        source: Source,
        handle: &str,
        mirrors: &[String],
    ) -> Result<Option<Item>> {
        match source {
            Source::Twitter => self.latest_tweet(handle, mirrors).await,
            Source::Instagram => self.latest_post(handle, mirrors).await,
        }
    }

    /// Newest non-pinned tweet from a Nitter profile.
    pub async fn latest_tweet(&self, handle: &str, mirrors: &[String]) -> Result<Option<Item>> {
        let source = Source::Twitter;
        let page = self
            .client
            .fetch(source, handle, mirrors, &source.profile_path(handle))
            .await?;
        extract_tweet(&page)
    }

    /// Newest post from a Bibliogram profile, read from its detail page.
    pub async fn latest_post(&self, handle: &str, mirrors: &[String]) -> Result<Option<Item>> {
        let source = Source::Instagram;
        let page = self
            .client
            .fetch(source, handle, mirrors, &source.profile_path(handle))
            .await?;

        let Some(link) = find_latest_post_link(&page)? else {
            return Ok(None);
        };

        // The detail page must come from the mirror that served the grid.
        let detail = self
            .client
            .fetch(source, handle, &[page.domain.clone()], &link)
            .await?;
        extract_post(&detail, &link)
    }
}
