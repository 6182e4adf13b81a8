// Post source trait — where rows come from.

use anyhow::Result;
use async_trait::async_trait;
use tracing::warn;

use crate::models::Post;

/// Default number of posts fetched per account.
pub const DEFAULT_POST_LIMIT: usize = 20;

/// A source of posts for one account. Sources assign `index` in the order
/// they return posts, starting at 0. An empty result is not an error.
#[async_trait]
pub trait PostSource: Send + Sync {
    async fn fetch_posts(&self, account: &str, limit: usize) -> Result<Vec<Post>>;
}

/// Fetch posts, logging and swallowing any error as an empty batch.
pub async fn fetch_posts_or_empty(source: &dyn PostSource, account: &str, limit: usize) -> Vec<Post> {
    match source.fetch_posts(account, limit).await {
        Ok(posts) => posts,
        Err(e) => {
            warn!(account = account, error = %format!("{e:#}"), "Failed to fetch posts");
            Vec::new()
        }
    }
}
