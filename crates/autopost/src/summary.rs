//! Result of a daily cycle and its human-readable digest.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::twitter::PostResult;

/// Marker used in the digest when no routine post went out.
pub const NONE_MARKER: &str = "なし";

/// What happened to one routine post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum RoutineOutcome {
    Posted(PostResult),
    Failed { text: String, error: String },
}

impl RoutineOutcome {
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match self {
            RoutineOutcome::Posted(result) => Some(&result.url),
            RoutineOutcome::Failed { .. } => None,
        }
    }
}

/// Run-level outcome once the article and share post are out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CycleOutcome {
    /// Every routine post went out.
    Completed,
    /// Some routine posts failed.
    Partial { succeeded: usize, total: usize },
}

/// Everything a finished cycle produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleSummary {
    pub note_url: String,
    pub share_post: PostResult,
    /// Recommended (or, when deferral is on, actual) share time.
    pub share_scheduled_utc: DateTime<Utc>,
    /// One entry per routine post, in plan order.
    pub routine: Vec<RoutineOutcome>,
}

impl CycleSummary {
    #[must_use]
    pub fn routine_urls(&self) -> Vec<&str> {
        self.routine.iter().filter_map(RoutineOutcome::url).collect()
    }

    #[must_use]
    pub fn routine_failures(&self) -> usize {
        self.routine
            .iter()
            .filter(|o| matches!(o, RoutineOutcome::Failed { .. }))
            .count()
    }

    #[must_use]
    pub fn outcome(&self) -> CycleOutcome {
        let total = self.routine.len();
        let failed = self.routine_failures();
        if failed == 0 {
            CycleOutcome::Completed
        } else {
            CycleOutcome::Partial {
                succeeded: total - failed,
                total,
            }
        }
    }

    /// Share time as ISO 8601 with an explicit `+00:00` offset.
    #[must_use]
    pub fn share_timestamp(&self) -> String {
        self.share_scheduled_utc
            .to_rfc3339_opts(SecondsFormat::Micros, false)
    }

    /// Japanese digest with one labelled line per result.
    #[must_use]
    pub fn summary_ja(&self) -> String {
        let urls = self.routine_urls();
        let mut lines = vec![
            format!("Note記事URL: {}", self.note_url),
            format!(
                "NoteシェアツイートURL: {}（UTC {}）",
                self.share_post.url,
                self.share_timestamp()
            ),
        ];
        if urls.is_empty() {
            lines.push(format!("定常ツイートURL: {NONE_MARKER}"));
        } else {
            lines.push(format!("定常ツイートURL: {}", urls.join("、")));
        }
        if let CycleOutcome::Partial { succeeded, total } = self.outcome() {
            lines.push(format!(
                "定常ツイート失敗: {}件（成功 {succeeded}/{total}件）",
                total - succeeded
            ));
        }
        lines.join("\n")
    }

    /// Flat key/value view for the final log entry.
    #[must_use]
    pub fn to_map(&self) -> BTreeMap<&'static str, String> {
        BTreeMap::from([
            ("note_url", self.note_url.clone()),
            ("note_share_tweet", self.share_post.url.clone()),
            ("share_scheduled_utc", self.share_timestamp()),
            ("routine_tweets", self.routine_urls().join(",")),
            ("routine_failures", self.routine_failures().to_string()),
            ("summary_ja", self.summary_ja()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn posted(id: &str) -> RoutineOutcome {
        RoutineOutcome::Posted(PostResult {
            id: id.to_string(),
            url: format!("https://twitter.com/user/status/{id}"),
        })
    }

    fn summary(routine: Vec<RoutineOutcome>) -> CycleSummary {
        CycleSummary {
            note_url: "https://note.com/writer/n/nabc".to_string(),
            share_post: PostResult {
                id: "s1".to_string(),
                url: "https://twitter.com/user/status/s1".to_string(),
            },
            share_scheduled_utc: Utc.with_ymd_and_hms(2024, 1, 15, 0, 3, 0).unwrap(),
            routine,
        }
    }

    #[test]
    fn test_digest_lines() {
        let s = summary(vec![posted("a"), posted("b")]);
        let digest = s.summary_ja();
        let lines: Vec<_> = digest.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Note記事URL: https://note.com/writer/n/nabc");
        assert_eq!(
            lines[1],
            "NoteシェアツイートURL: https://twitter.com/user/status/s1（UTC 2024-01-15T00:03:00.000000+00:00）"
        );
        assert_eq!(
            lines[2],
            "定常ツイートURL: https://twitter.com/user/status/a、https://twitter.com/user/status/b"
        );
        assert_eq!(s.outcome(), CycleOutcome::Completed);
    }

    #[test]
    fn test_empty_routine_uses_marker() {
        let s = summary(Vec::new());
        assert!(s.summary_ja().ends_with("定常ツイートURL: なし"));
        assert_eq!(s.to_map()["routine_tweets"], "");
        assert_eq!(s.outcome(), CycleOutcome::Completed);
    }

    #[test]
    fn test_partial_failure_reported() {
        let s = summary(vec![
            posted("a"),
            RoutineOutcome::Failed {
                text: "post".to_string(),
                error: "Post rejected: rate limited".to_string(),
            },
            posted("c"),
        ]);

        assert_eq!(
            s.outcome(),
            CycleOutcome::Partial {
                succeeded: 2,
                total: 3
            }
        );
        let map = s.to_map();
        assert_eq!(map["routine_failures"], "1");
        assert_eq!(
            map["routine_tweets"],
            "https://twitter.com/user/status/a,https://twitter.com/user/status/c"
        );
        assert!(s.summary_ja().ends_with("定常ツイート失敗: 1件（成功 2/3件）"));
    }

    #[test]
    fn test_map_keys() {
        let map = summary(vec![posted("a")]).to_map();
        let keys: Vec<_> = map.keys().copied().collect();
        assert_eq!(
            keys,
            [
                "note_share_tweet",
                "note_url",
                "routine_failures",
                "routine_tweets",
                "share_scheduled_utc",
                "summary_ja"
            ]
        );
    }
}
