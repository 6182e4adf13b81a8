// Bluesky post source — an account's own posts from the public AppView.
//
// Read endpoints need no credentials. The author feed is walked page by
// page until `limit` posts are collected or the cursor runs out. Reposts
// and text-less posts are dropped, and every post gets a bsky.app link.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use atrium_api::app::bsky::feed::defs::FeedViewPost;
use atrium_api::app::bsky::feed::get_author_feed;
use atrium_api::types::TryFromUnknown;
use tracing::{debug, info};

use super::traits::PostSource;
use crate::models::Post;

/// Default public API endpoint for AT Protocol read operations.
pub const DEFAULT_PUBLIC_API_URL: &str = "https://public.api.bsky.app";

const AUTHOR_FEED_NSID: &str = "app.bsky.feed.getAuthorFeed";

/// Largest page getAuthorFeed will return.
const MAX_PAGE_SIZE: usize = 100;

/// Post source backed by the public author feed.
pub struct BlueskySource {
    client: reqwest::Client,
    base_url: String,
}

impl BlueskySource {
    /// Source for the AppView at `base_url`. `timeout` bounds each page request.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("aggression-analyzer/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(10).min(timeout))
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// One page of `handle`'s feed, starting after `cursor`.
    async fn feed_page(
        &self,
        handle: &str,
        page_size: usize,
        cursor: Option<&str>,
    ) -> Result<get_author_feed::Output> {
        let url = format!("{}/xrpc/{AUTHOR_FEED_NSID}", self.base_url);
        let page_size = page_size.to_string();

        let mut query = vec![
            ("actor", handle),
            ("filter", "posts_with_replies"),
            ("limit", page_size.as_str()),
        ];
        if let Some(cursor) = cursor {
            query.push(("cursor", cursor));
        }

        let response = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await
            .with_context(|| format!("Feed request for @{handle} failed"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("{AUTHOR_FEED_NSID} for @{handle} returned {status}: {body}");
        }

        response
            .json()
            .await
            .with_context(|| format!("Malformed {AUTHOR_FEED_NSID} response for @{handle}"))
    }
}

#[async_trait]
impl PostSource for BlueskySource {
    async fn fetch_posts(&self, account: &str, limit: usize) -> Result<Vec<Post>> {
        let handle = account.trim_start_matches('@');
        let mut posts: Vec<Post> = Vec::new();
        let mut cursor: Option<String> = None;

        while posts.len() < limit {
            let page = self
                .feed_page(handle, limit.min(MAX_PAGE_SIZE), cursor.as_deref())
                .await?;

            let before = posts.len();
            for item in &page.feed {
                if posts.len() >= limit {
                    break;
                }
                if let Some(post) = authored_post(item, posts.len()) {
                    posts.push(post);
                }
            }

            debug!(
                handle = handle,
                feed_items = page.feed.len(),
                kept = posts.len() - before,
                "Author feed page"
            );

            match page.data.cursor.clone() {
                Some(next) if !page.feed.is_empty() => cursor = Some(next),
                _ => break,
            }
        }

        info!(count = posts.len(), handle = handle, "Collected posts for analysis");

        Ok(posts)
    }
}

/// The account's own post with text, or `None` for reposts and empty posts.
fn authored_post(item: &FeedViewPost, index: usize) -> Option<Post> {
    if item.reason.is_some() {
        return None;
    }

    let view = &item.post;
    let text = atrium_api::app::bsky::feed::post::Record::try_from_unknown(view.record.clone())
        .ok()
        .map(|record| record.data.text)?;
    if text.trim().is_empty() {
        return None;
    }

    Some(Post {
        index,
        content: text,
        timestamp: Some(view.indexed_at.as_ref().to_string()),
        url: Some(web_url(&view.uri)),
        author: Some(view.author.handle.as_str().to_string()),
    })
}

/// Convert `at://{did}/app.bsky.feed.post/{rkey}` into a bsky.app URL.
/// Anything else is returned unchanged.
pub fn web_url(at_uri: &str) -> String {
    let parts: Vec<&str> = at_uri
        .strip_prefix("at://")
        .map(|rest| rest.split('/').collect())
        .unwrap_or_default();

    match parts.as_slice() {
        [did, "app.bsky.feed.post", rkey] if !did.is_empty() && !rkey.is_empty() => {
            format!("https://bsky.app/profile/{did}/post/{rkey}")
        }
        _ => at_uri.to_string(),
    }
}
