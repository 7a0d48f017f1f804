//! Article publishing.
//!
//! The article platform has no public API, so publishing sits behind the
//! [`ArticlePublisher`] trait and concrete adapters do the browser work.
//!
//! Adapter contract:
//! - `publish` makes a single attempt; the caller bounds it with a timeout.
//! - Publishing the same [`Article::idempotency_key`] twice must not create
//!   a second article; the adapter returns the first URL instead.

mod note;

pub use note::NoteClient;

use async_trait::async_trait;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::content::ContentPlan;
use crate::error::PublishError;

/// An article ready to publish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Article {
    pub title: String,
    pub free_section: String,
    pub paid_section: String,
    /// Price of the paid part in yen.
    pub price: u32,
    /// Hex SHA-256 of the content; stable across retries of the same plan.
    pub idempotency_key: String,
}

impl Article {
    #[must_use]
    pub fn new(title: String, free_section: String, paid_section: String, price: u32) -> Self {
        let idempotency_key = content_hash(&title, &free_section, &paid_section, price);
        Self {
            title,
            free_section,
            paid_section,
            price,
            idempotency_key,
        }
    }

    /// The article part of a plan.
    #[must_use]
    pub fn from_plan(plan: &ContentPlan) -> Self {
        Self::new(
            plan.note_title.clone(),
            plan.note_free_section.clone(),
            plan.note_paid_section.clone(),
            plan.price,
        )
    }
}

fn content_hash(title: &str, free_section: &str, paid_section: &str, price: u32) -> String {
    let mut hasher = Sha256::new();
    for part in [title, free_section, paid_section] {
        hasher.update(part.as_bytes());
        // Separator so ("ab", "c") and ("a", "bc") hash differently.
        hasher.update([0u8]);
    }
    hasher.update(price.to_be_bytes());
    hex::encode(hasher.finalize())
}

/// Where a published article ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishResult {
    pub url: String,
}

/// Something that can publish an [`Article`].
#[async_trait]
pub trait ArticlePublisher: Send + Sync {
    /// Adapter name for logs.
    fn name(&self) -> &'static str;

    /// Publish the article and return its canonical URL.
    async fn publish(&self, article: &Article) -> Result<PublishResult, PublishError>;
}
