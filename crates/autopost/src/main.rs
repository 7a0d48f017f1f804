//! Autopost CLI - daily note article and Twitter/X amplification.

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::sync::Arc;

use autopost::config::{AppConfig, ContentSettings};
use autopost::logging::{self, LogConfig, LogFormat};
use autopost::{
    seeded_rng, NoteClient, Pipeline, PipelineConfig, PlanGenerator, ThemeRegistry, TwitterClient,
};

/// Autopost CLI - plan, publish, and announce the daily note article.
#[derive(Parser)]
#[command(name = "autopost")]
#[command(about = "Daily note article + Twitter/X amplification pipeline")]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log line format
    #[arg(long, global = true, value_enum, env = "LOG_FORMAT", default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full daily cycle (for CronJob use)
    Run {
        /// Fixed seed for plan choices and share jitter
        #[arg(long)]
        seed: Option<u64>,

        /// Wait until the computed share time before announcing
        #[arg(long)]
        defer_share: bool,
    },

    /// Print a plan as JSON without publishing anything
    Plan {
        /// Fixed seed for plan choices
        #[arg(long)]
        seed: Option<u64>,

        /// Plan date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(&LogConfig {
        level: if cli.verbose { "debug" } else { "info" }.to_string(),
        format: cli.log_format,
    })?;

    match cli.command {
        Commands::Run { seed, defer_share } => run_cycle(seed, defer_share).await,
        Commands::Plan { seed, date } => run_plan(seed, date),
    }
}

async fn run_cycle(seed: Option<u64>, defer_share: bool) -> Result<()> {
    let mut config = AppConfig::from_env().context("Invalid configuration")?;
    if defer_share {
        config.share.defer = true;
    }
    let seed = seed.or(config.seed);

    tracing::info!(
        timezone = %config.timezone,
        price_min = config.content.price_range.min(),
        price_max = config.content.price_range.max(),
        routine_posts = config.content.routine_posts,
        defer_share = config.share.defer,
        seeded = seed.is_some(),
        "Configuration loaded"
    );

    let generator = PlanGenerator::new(ThemeRegistry::builtin(), config.content.clone());
    let publisher = Arc::new(NoteClient::new(config.note.clone()));
    let poster = Arc::new(TwitterClient::new(config.twitter.clone()));

    let mut pipeline = Pipeline::new(
        PipelineConfig::from(&config),
        generator,
        publisher,
        poster,
        seeded_rng(seed),
    );

    let summary = pipeline
        .run_daily_cycle()
        .await
        .context("Daily cycle failed")?;

    tracing::info!(summary = ?summary.to_map(), "Automation completed");
    tracing::info!("自動化サマリー（日本語）:\n{}", summary.summary_ja());

    Ok(())
}

fn run_plan(seed: Option<u64>, date: Option<NaiveDate>) -> Result<()> {
    let settings = ContentSettings::from_env().context("Invalid configuration")?;
    let generator = PlanGenerator::new(ThemeRegistry::builtin(), settings);
    let date = date.unwrap_or_else(|| Local::now().date_naive());

    let mut rng = seeded_rng(seed);
    let plan = generator.generate(date, &mut rng)?;

    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}
