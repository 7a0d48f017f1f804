//! Error types for the autopost pipeline.

use thiserror::Error;

/// Startup configuration errors. All of these are fatal before any
/// publishing is attempted.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Required environment variable missing or empty
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    /// Numeric variable could not be parsed
    #[error("{var} must be an integer, got '{value}'")]
    InvalidNumber { var: String, value: String },

    /// Boolean variable could not be parsed
    #[error("{var} must be true/false, got '{value}'")]
    InvalidBool { var: String, value: String },

    /// Numeric variable parsed but exceeds its ceiling
    #[error("{var} must be at most {max}, got {value}")]
    OutOfRange {
        var: String,
        value: String,
        max: String,
    },

    /// Price bounds inverted or not representable
    #[error("NOTE_PRICE_MIN ({min}) must be less than or equal to NOTE_PRICE_MAX ({max})")]
    InvalidPriceRange { min: u32, max: u32 },

    /// Posting window entry not in HH:MM form
    #[error("Invalid posting time '{0}', expected HH:MM")]
    InvalidPostTime(String),

    /// Unknown IANA timezone name
    #[error("Unknown timezone: {0}")]
    InvalidTimezone(String),
}

/// Errors raised while assembling a content plan.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanError {
    /// The theme catalog has no entries
    #[error("Theme catalog is empty")]
    EmptyCatalog,

    /// A selected theme has nothing to talk about
    #[error("Theme '{0}' has no talking points")]
    EmptyTalkingPoints(String),

    /// Lookup by key failed
    #[error("Unknown theme: {0}")]
    UnknownTheme(String),
}

/// Errors from an article publisher adapter.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The platform refused the article
    #[error("Article rejected: {0}")]
    Rejected(String),

    /// The adapter did not answer in time
    #[error("Article publish timed out after {0}s")]
    Timeout(u64),
}

/// Errors from a microblog poster adapter.
#[derive(Debug, Error)]
pub enum PostError {
    /// Nothing to post
    #[error("Post text is empty")]
    EmptyText,

    /// The service refused the post
    #[error("Post rejected: {0}")]
    Rejected(String),
}

/// Fatal errors for a daily cycle. Routine post failures are not here;
/// they are collected into the cycle summary instead.
#[derive(Debug, Error)]
pub enum CycleError {
    /// Plan generation failed
    #[error("Plan generation failed: {0}")]
    Plan(#[from] PlanError),

    /// Article could not be published, nothing to announce
    #[error("Article publish failed: {0}")]
    Publish(#[from] PublishError),

    /// The share announcement could not be posted
    #[error("Share post failed: {0}")]
    SharePost(#[source] PostError),
}
