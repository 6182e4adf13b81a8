// Post sources — Bluesky author feeds and local JSON files.
//
// The pipeline only sees `Vec<Post>`; these modules are the ways to get one.

pub mod bluesky;
pub mod file;
pub mod traits;

pub use traits::{fetch_posts_or_empty, PostSource, DEFAULT_POST_LIMIT};
