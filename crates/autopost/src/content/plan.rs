//! Daily content plan generation.
//!
//! A plan is one note article (title, free part, paid part, price) plus the
//! posts that go with it: a teaser for the share announcement and a fixed
//! number of routine posts. Every random choice goes through the caller's
//! RNG, so a fixed seed and date reproduce the plan exactly.

use chrono::{Local, NaiveDate};
use rand::Rng;
use serde::Serialize;
use std::collections::HashMap;

use super::themes::{Theme, ThemeRegistry};
use crate::config::ContentSettings;
use crate::error::PlanError;

/// Hashtag attached to every routine post.
pub const DAILY_TAG: &str = "日常の気づき";

/// Closing lines for the free part of the article.
pub const TEASER_PATTERNS: &[&str] = &[
    "無料部分で語り切れなかった本音は有料パートで。",
    "続きを読んだ人だけが、今日から一歩抜け出せるはず。",
    "有料パートでは、僕が実際にやった手順と失敗談も包み隠さず共有。",
];

/// What the paid part promises.
pub const PAID_VALUE_PROMISES: &[&str] = &[
    "有料パートでは具体的な行動チェックリストと、感情が折れたときのリカバリープランをセットで。",
    "経験則とAI活用の手順を組み合わせて、明日から試せるロードマップにまとめました。",
    "失敗をどうリフレーミングしたか、リアルなやりとりのスクショ例も載せています。",
];

/// Closing line of the teaser post.
const TEASER_CLOSING: &str = "続きを読むと、AIと習慣を絡めた解決策まで辿り着けます。";

/// One day's content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentPlan {
    pub note_title: String,
    pub note_free_section: String,
    pub note_paid_section: String,
    /// Article price in yen.
    pub price: u32,
    pub teaser_tweet: String,
    /// Routine posts, in posting order.
    pub scheduled_tweets: Vec<String>,
}

impl ContentPlan {
    /// Text of the post announcing the published article.
    #[must_use]
    pub fn share_text(&self, article_url: &str) -> String {
        format!(
            "{}\n\n▼有料（{}円）はこちら\n{}",
            self.teaser_tweet, self.price, article_url
        )
    }
}

/// Assembles [`ContentPlan`]s from a theme catalog.
#[derive(Debug, Clone)]
pub struct PlanGenerator {
    registry: ThemeRegistry,
    settings: ContentSettings,
}

impl PlanGenerator {
    #[must_use]
    pub fn new(registry: ThemeRegistry, settings: ContentSettings) -> Self {
        Self { registry, settings }
    }

    #[must_use]
    pub fn registry(&self) -> &ThemeRegistry {
        &self.registry
    }

    #[must_use]
    pub fn settings(&self) -> &ContentSettings {
        &self.settings
    }

    /// Generate the plan for `date` using `rng` for every choice.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        date: NaiveDate,
        rng: &mut R,
    ) -> Result<ContentPlan, PlanError> {
        let headline = self
            .registry
            .themes()
            .first()
            .ok_or(PlanError::EmptyCatalog)?;
        let cycle = self.registry.cycle(self.settings.routine_posts)?;

        headline.ensure_talking_points()?;
        for theme in &cycle {
            theme.ensure_talking_points()?;
        }

        let today = date.format("%Y/%m/%d").to_string();

        let mut deck = TalkingPointDeck::default();
        let scheduled_tweets = cycle
            .iter()
            .map(|theme| {
                let point = deck.draw(theme, rng);
                format!(
                    "{point} #{DAILY_TAG} #{} #{today}",
                    theme.short_name()
                )
            })
            .collect();

        let note_title = format!("{}｜{}", headline.name, pick(&headline.talking_points, rng));
        let note_free_section = format!(
            "今日の無料パートでは、{}\n\n{}",
            headline.description,
            pick(TEASER_PATTERNS, rng)
        );
        let note_paid_section = pick(PAID_VALUE_PROMISES, rng).to_string();

        let prices = self.settings.price_range.choices();
        let price = *pick(&prices, rng);
        debug_assert!(self.settings.price_range.contains(price));

        let teaser_tweet = format!(
            "{note_title}\n無料パート→{}のリアルな葛藤\n{TEASER_CLOSING}",
            headline.talking_points[0]
        );

        tracing::debug!(
            date = %date,
            headline = %headline.key,
            price,
            routine_posts = self.settings.routine_posts,
            "Content plan assembled"
        );

        Ok(ContentPlan {
            note_title,
            note_free_section,
            note_paid_section,
            price,
            teaser_tweet,
            scheduled_tweets,
        })
    }

    /// Generate the plan for the local calendar date.
    pub fn generate_today<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<ContentPlan, PlanError> {
        self.generate(Local::now().date_naive(), rng)
    }
}

impl Default for PlanGenerator {
    fn default() -> Self {
        Self::new(ThemeRegistry::builtin(), ContentSettings::default())
    }
}

/// Per-plan talking point draws. A theme that appears in several slots does
/// not repeat a point until its pool is used up.
#[derive(Default)]
struct TalkingPointDeck {
    remaining: HashMap<String, Vec<usize>>,
}

impl TalkingPointDeck {
    fn draw<'t, R: Rng + ?Sized>(&mut self, theme: &'t Theme, rng: &mut R) -> &'t str {
        let pool = self.remaining.entry(theme.key.clone()).or_default();
        if pool.is_empty() {
            pool.extend(0..theme.talking_points.len());
        }
        let slot = rng.gen_range(0..pool.len());
        &theme.talking_points[pool.swap_remove(slot)]
    }
}

/// Uniform pick from a non-empty slice.
fn pick<'a, T, R: Rng + ?Sized>(items: &'a [T], rng: &mut R) -> &'a T {
    &items[rng.gen_range(0..items.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PriceRange;
    use crate::content::themes::Theme;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    fn generate(seed: u64) -> ContentPlan {
        let mut rng = StdRng::seed_from_u64(seed);
        PlanGenerator::default().generate(date(), &mut rng).unwrap()
    }

    #[test]
    fn test_same_seed_same_plan() {
        assert_eq!(generate(42), generate(42));
        assert_eq!(generate(7), generate(7));
    }

    #[test]
    fn test_reference_scenario() {
        let registry = ThemeRegistry::builtin();
        let plan = generate(42);

        let relationships = registry.get("relationships").unwrap();
        assert!(plan.note_title.starts_with(&relationships.name));
        assert!([300, 350, 400, 450, 500].contains(&plan.price));
        assert_eq!(plan.scheduled_tweets.len(), 4);

        let expected_tags = ["#恋愛・人間関係", "#日常", "#AI活用", "#恋愛・人間関係"];
        for (tweet, tag) in plan.scheduled_tweets.iter().zip(expected_tags) {
            assert!(tweet.contains(&format!(" {tag} ")), "{tweet} lacks {tag}");
            assert!(tweet.contains("#日常の気づき"));
            assert!(tweet.ends_with("#2024/01/15"));
        }
    }

    #[test]
    fn test_routine_posts_use_their_theme() {
        let registry = ThemeRegistry::builtin();
        let plan = generate(3);
        let cycle = registry.cycle(4).unwrap();

        for (tweet, theme) in plan.scheduled_tweets.iter().zip(cycle) {
            assert!(theme
                .talking_points
                .iter()
                .any(|p| tweet.starts_with(&format!("{p} "))));
        }
    }

    #[test]
    fn test_repeated_theme_does_not_repeat_point() {
        for seed in 0..20 {
            let plan = generate(seed);
            let first = plan.scheduled_tweets[0].split(' ').next().unwrap();
            let fourth = plan.scheduled_tweets[3].split(' ').next().unwrap();
            assert_ne!(first, fourth, "seed {seed}");
        }
    }

    #[test]
    fn test_article_sections() {
        let registry = ThemeRegistry::builtin();
        let relationships = registry.get("relationships").unwrap();
        let plan = generate(11);

        assert!(plan
            .note_free_section
            .starts_with(&format!("今日の無料パートでは、{}", relationships.description)));
        assert!(TEASER_PATTERNS
            .iter()
            .any(|t| plan.note_free_section.ends_with(t)));
        assert!(PAID_VALUE_PROMISES.contains(&plan.note_paid_section.as_str()));
        assert!(plan.teaser_tweet.starts_with(&plan.note_title));
        assert!(plan
            .teaser_tweet
            .contains(&format!("無料パート→{}のリアルな葛藤", relationships.talking_points[0])));
    }

    #[test]
    fn test_price_follows_configured_range() {
        let settings = ContentSettings {
            price_range: PriceRange::new(1000, 1200).unwrap(),
            routine_posts: 4,
        };
        let generator = PlanGenerator::new(ThemeRegistry::builtin(), settings);

        for seed in 0..30 {
            let mut rng = StdRng::seed_from_u64(seed);
            let plan = generator.generate(date(), &mut rng).unwrap();
            assert!([1000, 1050, 1100, 1150, 1200].contains(&plan.price));
            assert!(generator.settings().price_range.contains(plan.price));
        }
    }

    #[test]
    fn test_routine_count_independent_of_themes() {
        for count in [0, 1, 2, 7] {
            let settings = ContentSettings {
                routine_posts: count,
                ..ContentSettings::default()
            };
            let generator = PlanGenerator::new(ThemeRegistry::builtin(), settings);
            let mut rng = StdRng::seed_from_u64(1);
            let plan = generator.generate(date(), &mut rng).unwrap();
            assert_eq!(plan.scheduled_tweets.len(), count);
        }
    }

    #[test]
    fn test_empty_talking_points_fail_fast() {
        let registry = ThemeRegistry::new(vec![
            Theme::new("full", "Full", "has points", &["one"]),
            Theme::new("silent", "Silent", "no points", &[]),
        ]);
        let generator = PlanGenerator::new(registry, ContentSettings::default());
        let mut rng = StdRng::seed_from_u64(42);

        assert_eq!(
            generator.generate(date(), &mut rng).unwrap_err(),
            PlanError::EmptyTalkingPoints("silent".to_string())
        );
    }

    #[test]
    fn test_empty_catalog() {
        let generator = PlanGenerator::new(ThemeRegistry::new(vec![]), ContentSettings::default());
        let mut rng = StdRng::seed_from_u64(42);
        assert_eq!(
            generator.generate(date(), &mut rng).unwrap_err(),
            PlanError::EmptyCatalog
        );
    }

    #[test]
    fn test_share_text() {
        let plan = generate(42);
        let text = plan.share_text("https://note.com/x/n/abc");
        assert!(text.starts_with(&plan.teaser_tweet));
        assert!(text.ends_with(&format!(
            "\n\n▼有料（{}円）はこちら\nhttps://note.com/x/n/abc",
            plan.price
        )));
    }
}
