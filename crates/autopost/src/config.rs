//! Configuration for the autopost pipeline.
//!
//! Everything is read once at startup and validated before any plan is
//! generated or any network call is made. Loading goes through a lookup
//! function so the same code path serves the process environment and tests.

use chrono::NaiveTime;
use chrono_tz::Tz;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

/// Default lower price bound (yen).
pub const DEFAULT_PRICE_MIN: u32 = 300;

/// Default upper price bound (yen).
pub const DEFAULT_PRICE_MAX: u32 = 500;

/// Prices are offered in steps of this size, starting from the lower bound.
pub const PRICE_STEP: u32 = 50;

/// Default posting window for routine posts.
pub const DEFAULT_POST_TIMES: &str = "08:30,12:30,18:30,22:30";

/// Default IANA timezone.
pub const DEFAULT_TIMEZONE: &str = "Asia/Tokyo";

/// Default number of routine posts per plan.
pub const DEFAULT_ROUTINE_POSTS: usize = 4;

/// Upper bound for `ROUTINE_POST_COUNT`.
pub const MAX_ROUTINE_POSTS: usize = 48;

/// Default jitter window for the share announcement (5 minutes).
pub const DEFAULT_SHARE_JITTER_SECS: u64 = 300;

/// Upper bound for `SHARE_JITTER_SECS` (24 hours).
pub const MAX_SHARE_JITTER_SECS: u64 = 86_400;

/// Default article publish timeout.
pub const DEFAULT_PUBLISH_TIMEOUT_SECS: u64 = 60;

/// Default account slug used when building article URLs.
pub const DEFAULT_NOTE_ACCOUNT: &str = "your_account";

/// Credentials for the Twitter/X posting API.
#[derive(Clone, PartialEq, Eq)]
pub struct TwitterCredentials {
    pub api_key: String,
    pub api_secret: String,
    pub access_token: String,
    pub access_token_secret: String,
}

impl TwitterCredentials {
    /// Read credentials through `lookup`.
    ///
    /// # Required Variables
    /// - `TWITTER_API_KEY`
    /// - `TWITTER_API_SECRET`
    /// - `TWITTER_ACCESS_TOKEN`
    /// - `TWITTER_ACCESS_TOKEN_SECRET`
    pub fn from_lookup<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            api_key: required(lookup, "TWITTER_API_KEY")?,
            api_secret: required(lookup, "TWITTER_API_SECRET")?,
            access_token: required(lookup, "TWITTER_ACCESS_TOKEN")?,
            access_token_secret: required(lookup, "TWITTER_ACCESS_TOKEN_SECRET")?,
        })
    }
}

impl fmt::Debug for TwitterCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TwitterCredentials")
            .field("api_key", &redact(&self.api_key))
            .field("api_secret", &"***")
            .field("access_token", &redact(&self.access_token))
            .field("access_token_secret", &"***")
            .finish()
    }
}

/// Credentials and account details for note.com.
#[derive(Clone, PartialEq, Eq)]
pub struct NoteCredentials {
    pub email: String,
    pub password: String,
    /// Account slug that appears in published article URLs.
    pub account: String,
}

impl NoteCredentials {
    /// Read credentials through `lookup`.
    ///
    /// # Required Variables
    /// - `NOTE_EMAIL`
    /// - `NOTE_PASSWORD`
    ///
    /// # Optional Variables
    /// - `NOTE_ACCOUNT`: account slug (default: your_account)
    pub fn from_lookup<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            email: required(lookup, "NOTE_EMAIL")?,
            password: required(lookup, "NOTE_PASSWORD")?,
            account: optional(lookup, "NOTE_ACCOUNT")
                .unwrap_or_else(|| DEFAULT_NOTE_ACCOUNT.to_string()),
        })
    }
}

impl fmt::Debug for NoteCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NoteCredentials")
            .field("email", &self.email)
            .field("password", &"***")
            .field("account", &self.account)
            .finish()
    }
}

/// Inclusive article price bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceRange {
    min: u32,
    max: u32,
}

impl PriceRange {
    /// Create a range, rejecting `min > max`.
    pub fn new(min: u32, max: u32) -> Result<Self, ConfigError> {
        if min > max {
            return Err(ConfigError::InvalidPriceRange { min, max });
        }
        Ok(Self { min, max })
    }

    #[must_use]
    pub fn min(&self) -> u32 {
        self.min
    }

    #[must_use]
    pub fn max(&self) -> u32 {
        self.max
    }

    /// Every offerable price: `min, min + 50, ...` up to and including `max`.
    #[must_use]
    pub fn choices(&self) -> Vec<u32> {
        (self.min..=self.max).step_by(PRICE_STEP as usize).collect()
    }

    /// Whether `price` is one of the offerable prices.
    #[must_use]
    pub fn contains(&self, price: u32) -> bool {
        (self.min..=self.max).contains(&price) && (price - self.min) % PRICE_STEP == 0
    }
}

impl Default for PriceRange {
    fn default() -> Self {
        Self {
            min: DEFAULT_PRICE_MIN,
            max: DEFAULT_PRICE_MAX,
        }
    }
}

/// Times of day at which routine posts are meant to go out.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PostingWindow {
    pub times: Vec<NaiveTime>,
}

impl PostingWindow {
    /// Parse `HH:MM` entries. Blank entries are ignored.
    pub fn from_strings<I, S>(values: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut times = Vec::new();
        for raw in values {
            let raw = raw.as_ref().trim();
            if raw.is_empty() {
                continue;
            }
            times.push(parse_hhmm(raw)?);
        }
        Ok(Self { times })
    }
}

fn parse_hhmm(raw: &str) -> Result<NaiveTime, ConfigError> {
    let invalid = || ConfigError::InvalidPostTime(raw.to_string());

    let (hours, minutes) = raw.split_once(':').ok_or_else(invalid)?;
    let hours: u32 = hours.trim().parse().map_err(|_| invalid())?;
    let minutes: u32 = minutes.trim().parse().map_err(|_| invalid())?;
    NaiveTime::from_hms_opt(hours, minutes, 0).ok_or_else(invalid)
}

/// Settings that shape the generated plan. This is all the `plan` dry run
/// needs, so it loads without credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentSettings {
    pub price_range: PriceRange,
    /// Routine posts per plan, independent of the number of themes.
    pub routine_posts: usize,
}

impl Default for ContentSettings {
    fn default() -> Self {
        Self {
            price_range: PriceRange::default(),
            routine_posts: DEFAULT_ROUTINE_POSTS,
        }
    }
}

impl ContentSettings {
    /// # Optional Variables
    /// - `NOTE_PRICE_MIN`: lower price bound (default: 300)
    /// - `NOTE_PRICE_MAX`: upper price bound (default: 500)
    /// - `ROUTINE_POST_COUNT`: routine posts per plan (default: 4, max: 48)
    pub fn from_lookup<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let min = number(lookup, "NOTE_PRICE_MIN", DEFAULT_PRICE_MIN)?;
        let max = number(lookup, "NOTE_PRICE_MAX", DEFAULT_PRICE_MAX)?;
        Ok(Self {
            price_range: PriceRange::new(min, max)?,
            routine_posts: bounded(
                lookup,
                "ROUTINE_POST_COUNT",
                DEFAULT_ROUTINE_POSTS,
                MAX_ROUTINE_POSTS,
            )?,
        })
    }

    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(&env_lookup)
    }
}

/// Share announcement timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShareSettings {
    /// Upper bound of the random offset added to "now".
    pub jitter: Duration,
    /// Wait until the computed time before posting. Off by default, in
    /// which case the time is only a recommendation that gets logged.
    pub defer: bool,
}

impl Default for ShareSettings {
    fn default() -> Self {
        Self {
            jitter: Duration::from_secs(DEFAULT_SHARE_JITTER_SECS),
            defer: false,
        }
    }
}

/// Complete application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub twitter: TwitterCredentials,
    pub note: NoteCredentials,
    pub content: ContentSettings,
    pub posting_window: PostingWindow,
    pub timezone: Tz,
    pub share: ShareSettings,
    pub publish_timeout: Duration,
    /// Fixed seed for the run's random source.
    pub seed: Option<u64>,
}

impl AppConfig {
    /// Load and validate configuration through `lookup`.
    ///
    /// Twitter credentials are checked first, then note credentials; the
    /// first missing variable is the one reported.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let twitter = TwitterCredentials::from_lookup(&lookup)?;
        let note = NoteCredentials::from_lookup(&lookup)?;
        let content = ContentSettings::from_lookup(&lookup)?;

        let windows =
            optional(&lookup, "TWITTER_POST_TIMES").unwrap_or_else(|| DEFAULT_POST_TIMES.into());
        let posting_window = PostingWindow::from_strings(windows.split(','))?;

        let timezone = parse_timezone(
            &optional(&lookup, "APP_TIMEZONE").unwrap_or_else(|| DEFAULT_TIMEZONE.into()),
        )?;

        let share = ShareSettings {
            jitter: Duration::from_secs(bounded(
                &lookup,
                "SHARE_JITTER_SECS",
                DEFAULT_SHARE_JITTER_SECS,
                MAX_SHARE_JITTER_SECS,
            )?),
            defer: boolean(&lookup, "SHARE_DEFER", false)?,
        };

        let publish_timeout = Duration::from_secs(number(
            &lookup,
            "PUBLISH_TIMEOUT_SECS",
            DEFAULT_PUBLISH_TIMEOUT_SECS,
        )?);

        let seed = match optional(&lookup, "PLAN_SEED") {
            Some(raw) => Some(raw.trim().parse::<u64>().map_err(|_| ConfigError::InvalidNumber {
                var: "PLAN_SEED".to_string(),
                value: raw.clone(),
            })?),
            None => None,
        };

        Ok(Self {
            twitter,
            note,
            content,
            posting_window,
            timezone,
            share,
            publish_timeout,
            seed,
        })
    }

    /// Load and validate configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }
}

/// Parse an IANA timezone name.
pub fn parse_timezone(name: &str) -> Result<Tz, ConfigError> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| ConfigError::InvalidTimezone(name.to_string()))
}

fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Present and non-blank, else `None`.
fn optional<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name).filter(|v| !v.trim().is_empty())
}

fn required<F>(lookup: &F, name: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    optional(lookup, name).ok_or_else(|| ConfigError::MissingVar(name.to_string()))
}

fn number<F, T>(lookup: &F, name: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match optional(lookup, name) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidNumber {
            var: name.to_string(),
            value: raw,
        }),
        None => Ok(default),
    }
}

fn bounded<F, T>(lookup: &F, name: &str, default: T, max: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + PartialOrd + fmt::Display,
{
    let value = number(lookup, name, default)?;
    if value > max {
        return Err(ConfigError::OutOfRange {
            var: name.to_string(),
            value: value.to_string(),
            max: max.to_string(),
        });
    }
    Ok(value)
}

fn boolean<F>(lookup: &F, name: &str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = optional(lookup, name) else {
        return Ok(default);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            var: name.to_string(),
            value: raw,
        }),
    }
}

fn redact(value: &str) -> String {
    let visible: String = value.chars().take(4).collect();
    format!("{visible}***")
}
