//! Daily note article + Twitter/X amplification pipeline.
//!
//! This crate provides:
//! - A theme catalog and a seeded daily content plan generator
//! - Share-time jitter and posting-window scheduling
//! - Publisher and poster seams with simulated note.com and Twitter/X clients
//! - A pipeline that publishes the article, announces it, and sends the
//!   routine posts, collecting per-post outcomes

pub mod config;
pub mod content;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod publish;
pub mod schedule;
pub mod summary;
pub mod twitter;

use rand::rngs::StdRng;
use rand::SeedableRng;

// Re-export main types
pub use config::{AppConfig, ContentSettings, PriceRange};
pub use content::{ContentPlan, PlanGenerator, Theme, ThemeRegistry};
pub use error::{ConfigError, CycleError, PlanError, PostError, PublishError};
pub use pipeline::{Pipeline, PipelineConfig};
pub use publish::{Article, ArticlePublisher, NoteClient, PublishResult};
pub use summary::{CycleOutcome, CycleSummary, RoutineOutcome};
pub use twitter::{MicroblogPoster, PostResult, TwitterClient};

/// The run's random source: fixed when `seed` is given, OS entropy otherwise.
#[must_use]
pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}
