//! Twitter/X posting.
//!
//! Provides the [`MicroblogPoster`] seam and the simulated API client.

mod client;

pub use client::TwitterClient;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::PostError;

/// A posted tweet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostResult {
    pub id: String,
    pub url: String,
}

/// Something that can post short text.
#[async_trait]
pub trait MicroblogPoster: Send + Sync {
    /// Poster name for logs.
    fn name(&self) -> &'static str;

    /// Post `text`, optionally as a reply to the post with id `in_reply_to`.
    async fn post(&self, text: &str, in_reply_to: Option<&str>) -> Result<PostResult, PostError>;
}
