//! Daily cycle pipeline - orchestrates the plan-publish-announce-post flow.

use chrono::{Local, NaiveDate, Utc};
use chrono_tz::Tz;
use rand::rngs::StdRng;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{AppConfig, PostingWindow, ShareSettings};
use crate::content::PlanGenerator;
use crate::error::{CycleError, PublishError};
use crate::publish::{Article, ArticlePublisher};
use crate::schedule::{schedule_routine_posts, schedule_share, wait_until};
use crate::summary::{CycleOutcome, CycleSummary, RoutineOutcome};
use crate::twitter::MicroblogPoster;

/// Configuration for the daily pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Timezone for share and posting-window times.
    pub timezone: Tz,
    /// Share announcement timing.
    pub share: ShareSettings,
    /// Upper bound for a single publish attempt.
    pub publish_timeout: Duration,
    /// Recommended send times for routine posts.
    pub posting_window: PostingWindow,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            timezone: chrono_tz::Asia::Tokyo,
            share: ShareSettings::default(),
            publish_timeout: Duration::from_secs(crate::config::DEFAULT_PUBLISH_TIMEOUT_SECS),
            posting_window: PostingWindow::default(),
        }
    }
}

impl From<&AppConfig> for PipelineConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            timezone: config.timezone,
            share: config.share,
            publish_timeout: config.publish_timeout,
            posting_window: config.posting_window.clone(),
        }
    }
}

/// Daily cycle orchestrator.
pub struct Pipeline {
    config: PipelineConfig,
    generator: PlanGenerator,
    publisher: Arc<dyn ArticlePublisher>,
    poster: Arc<dyn MicroblogPoster>,
    /// The single random source for plan choices and share jitter.
    rng: StdRng,
}

impl Pipeline {
    /// Create a new pipeline.
    #[must_use]
    pub fn new(
        config: PipelineConfig,
        generator: PlanGenerator,
        publisher: Arc<dyn ArticlePublisher>,
        poster: Arc<dyn MicroblogPoster>,
        rng: StdRng,
    ) -> Self {
        Self {
            config,
            generator,
            publisher,
            poster,
            rng,
        }
    }

    /// Run the cycle for the local calendar date.
    pub async fn run_daily_cycle(&mut self) -> Result<CycleSummary, CycleError> {
        self.run_on(Local::now().date_naive()).await
    }

    /// Run the cycle for `date`.
    ///
    /// Plan, publish and share failures abort the run. Routine post
    /// failures are recorded in the summary and the remaining posts still go
    /// out.
    pub async fn run_on(&mut self, date: NaiveDate) -> Result<CycleSummary, CycleError> {
        tracing::info!(%date, "Starting daily cycle");

        let plan = self.generator.generate(date, &mut self.rng)?;
        tracing::info!(
            title = %plan.note_title,
            price = plan.price,
            routine_posts = plan.scheduled_tweets.len(),
            "Daily plan generated"
        );
        tracing::debug!(plan = ?plan, "Plan contents");

        let article = Article::from_plan(&plan);
        let timeout = self.config.publish_timeout;
        let published = match tokio::time::timeout(timeout, self.publisher.publish(&article)).await
        {
            Ok(result) => result?,
            Err(_) => return Err(PublishError::Timeout(timeout.as_secs()).into()),
        };
        tracing::info!(
            publisher = self.publisher.name(),
            url = %published.url,
            key = %article.idempotency_key,
            "Article published"
        );

        let share_time = schedule_share(
            &self.config.timezone,
            self.config.share.jitter,
            &mut self.rng,
        );
        let share_utc = share_time.with_timezone(&Utc);
        if self.config.share.defer {
            wait_until(&share_time).await;
        } else {
            tracing::info!(
                recommended = %share_time,
                "Share time is advisory, posting now"
            );
        }

        let share_post = self
            .poster
            .post(&plan.share_text(&published.url), None)
            .await
            .map_err(CycleError::SharePost)?;
        tracing::info!(url = %share_post.url, scheduled = %share_time, "Note share tweeted");

        let scheduled = schedule_routine_posts(
            &plan.scheduled_tweets,
            &self.config.posting_window.times,
            &self.config.timezone,
            date,
        );

        let mut routine = Vec::with_capacity(scheduled.len());
        for (index, post) in scheduled.into_iter().enumerate() {
            if let Some(slot) = &post.scheduled_time {
                tracing::debug!(index, slot = %slot, "Routine post window slot");
            }
            match self.poster.post(&post.text, None).await {
                Ok(result) => {
                    tracing::info!(index, url = %result.url, "Routine post sent");
                    routine.push(RoutineOutcome::Posted(result));
                }
                Err(e) => {
                    tracing::warn!(index, error = %e, "Routine post failed");
                    routine.push(RoutineOutcome::Failed {
                        text: post.text,
                        error: e.to_string(),
                    });
                }
            }
        }

        let summary = CycleSummary {
            note_url: published.url,
            share_post,
            share_scheduled_utc: share_utc,
            routine,
        };

        match summary.outcome() {
            CycleOutcome::Completed => tracing::info!(
                routine_posts = summary.routine.len(),
                "Daily cycle complete"
            ),
            CycleOutcome::Partial { succeeded, total } => tracing::warn!(
                succeeded,
                total,
                "Daily cycle completed with failed routine posts"
            ),
        }

        Ok(summary)
    }
}
