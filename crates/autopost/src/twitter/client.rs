//! Twitter/X API client.
//!
//! Posting is simulated: the text is logged and a stable id is derived from
//! its hash. Replace `post` with real API calls when deploying.

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use super::{MicroblogPoster, PostResult};
use crate::config::TwitterCredentials;
use crate::error::PostError;

/// Simulated ids are kept below this bound.
const ID_MODULUS: u64 = 1_000_000_000_000;

/// Posts to Twitter/X.
pub struct TwitterClient {
    credentials: TwitterCredentials,
}

impl TwitterClient {
    #[must_use]
    pub fn new(credentials: TwitterCredentials) -> Self {
        Self { credentials }
    }

    /// OAuth 1.0a needs all four values.
    fn authorize(&self) -> Result<(), PostError> {
        let c = &self.credentials;
        if [&c.api_key, &c.api_secret, &c.access_token, &c.access_token_secret]
            .iter()
            .any(|v| v.is_empty())
        {
            return Err(PostError::Rejected("incomplete API credentials".to_string()));
        }
        Ok(())
    }

    /// Status URL for a tweet id.
    #[must_use]
    pub fn status_url(id: &str) -> String {
        format!("https://twitter.com/user/status/{id}")
    }
}

/// Hex id derived from the text, stable across runs.
fn simulated_id(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    format!("{:x}", u64::from_be_bytes(head) % ID_MODULUS)
}

#[async_trait]
impl MicroblogPoster for TwitterClient {
    fn name(&self) -> &'static str {
        "twitter"
    }

    async fn post(&self, text: &str, in_reply_to: Option<&str>) -> Result<PostResult, PostError> {
        if text.trim().is_empty() {
            return Err(PostError::EmptyText);
        }

        self.authorize()?;

        tracing::info!(chars = text.chars().count(), "Posting tweet: {text}");
        if let Some(parent) = in_reply_to {
            tracing::debug!(in_reply_to = parent, "Tweet is a reply");
        }

        let id = simulated_id(text);
        Ok(PostResult {
            url: Self::status_url(&id),
            id,
        })
    }
}
