//! Send-time helpers for the share announcement and routine posts.
//!
//! The share time is "now" plus a small random jitter so announcements do
//! not land on a bot-like exact minute. Routine posts are paired with the
//! configured posting window for the day.

use chrono::{DateTime, NaiveDate, TimeDelta, TimeZone, Utc};
use rand::Rng;
use std::time::Duration;

/// A post together with its intended send time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledPost<Z: TimeZone> {
    pub text: String,
    /// `None` when there are more posts than posting-window slots.
    pub scheduled_time: Option<DateTime<Z>>,
    pub is_share: bool,
}

/// Share time for `tz`: the current instant plus a uniform offset in
/// `[0, jitter]`.
pub fn schedule_share<Z, R>(tz: &Z, jitter: Duration, rng: &mut R) -> DateTime<Z>
where
    Z: TimeZone,
    R: Rng + ?Sized,
{
    schedule_share_from(Utc::now().with_timezone(tz), jitter, rng)
}

/// Same as [`schedule_share`] with an explicit "now".
pub fn schedule_share_from<Z, R>(now: DateTime<Z>, jitter: Duration, rng: &mut R) -> DateTime<Z>
where
    Z: TimeZone,
    R: Rng + ?Sized,
{
    let max_micros = i64::try_from(jitter.as_micros()).unwrap_or(i64::MAX);
    let offset = rng.gen_range(0..=max_micros);
    match now.clone().checked_add_signed(TimeDelta::microseconds(offset)) {
        Some(scheduled) => {
            tracing::debug!(offset_micros = offset, "Share post scheduled");
            scheduled
        }
        None => {
            tracing::warn!(offset_micros = offset, "Share offset out of range, using now");
            now
        }
    }
}

/// Today's posting-window slots in `tz`.
///
/// Local times that do not exist on `date` (DST gaps) are skipped.
pub fn window_slots<Z: TimeZone>(
    times: &[chrono::NaiveTime],
    tz: &Z,
    date: NaiveDate,
) -> Vec<DateTime<Z>> {
    times
        .iter()
        .filter_map(|time| {
            let slot = tz.from_local_datetime(&date.and_time(*time)).earliest();
            if slot.is_none() {
                tracing::warn!(%time, %date, "Posting time does not exist in timezone, skipping");
            }
            slot
        })
        .collect()
}

/// Pair routine posts with the day's posting-window slots, in order.
pub fn schedule_routine_posts<Z: TimeZone>(
    texts: &[String],
    times: &[chrono::NaiveTime],
    tz: &Z,
    date: NaiveDate,
) -> Vec<ScheduledPost<Z>> {
    let mut slots = window_slots(times, tz, date).into_iter();
    texts
        .iter()
        .map(|text| ScheduledPost {
            text: text.clone(),
            scheduled_time: slots.next(),
            is_share: false,
        })
        .collect()
}

/// Sleep until `target`. Returns immediately when it is already past.
pub async fn wait_until<Z: TimeZone>(target: &DateTime<Z>) {
    let remaining = target.clone().with_timezone(&Utc) - Utc::now();
    if let Ok(delay) = remaining.to_std() {
        tracing::info!(delay_ms = delay.as_millis() as u64, "Waiting for scheduled share time");
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use chrono_tz::Asia::Tokyo;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn times(raw: &[(u32, u32)]) -> Vec<NaiveTime> {
        raw.iter()
            .map(|(h, m)| NaiveTime::from_hms_opt(*h, *m, 0).unwrap())
            .collect()
    }

    #[test]
    fn test_share_within_window() {
        let now = Utc::now().with_timezone(&Tokyo);
        let window = Duration::from_secs(300);
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..200 {
            let at = schedule_share_from(now, window, &mut rng);
            assert!(at >= now);
            assert!(at <= now + chrono::Duration::seconds(300));
        }
    }

    #[test]
    fn test_huge_window_never_before_now() {
        let now = Utc::now().with_timezone(&Tokyo);

        for window in [Duration::from_secs(18_446_744_073_709), Duration::MAX] {
            for seed in 0..64 {
                let at = schedule_share_from(now, window, &mut StdRng::seed_from_u64(seed));
                assert!(at >= now, "seed {seed}");
            }
        }
    }

    #[test]
    fn test_zero_jitter_is_now() {
        let now = Utc::now();
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(schedule_share_from(now, Duration::ZERO, &mut rng), now);
    }

    #[test]
    fn test_schedule_share_uses_timezone() {
        let mut rng = StdRng::seed_from_u64(9);
        let before = Utc::now();
        let at = schedule_share(&Tokyo, Duration::from_secs(60), &mut rng);
        let after = Utc::now();

        assert_eq!(at.timezone(), Tokyo);
        assert!(at >= before);
        assert!(at <= after + chrono::Duration::seconds(60));
    }

    #[test]
    fn test_same_seed_same_offset() {
        let now = Utc::now();
        let window = Duration::from_secs(300);
        let a = schedule_share_from(now, window, &mut StdRng::seed_from_u64(5));
        let b = schedule_share_from(now, window, &mut StdRng::seed_from_u64(5));
        assert_eq!(a, b);
    }

    #[test]
    fn test_routine_posts_pair_with_window() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let texts: Vec<String> = ["a", "b", "c"].iter().map(|s| (*s).to_string()).collect();
        let window = times(&[(8, 30), (12, 30)]);

        let scheduled = schedule_routine_posts(&texts, &window, &Tokyo, date);

        assert_eq!(scheduled.len(), 3);
        let first = scheduled[0].scheduled_time.unwrap();
        assert_eq!(first.naive_local(), date.and_hms_opt(8, 30, 0).unwrap());
        assert_eq!(
            first.with_timezone(&Utc).naive_utc(),
            NaiveDate::from_ymd_opt(2024, 1, 14)
                .unwrap()
                .and_hms_opt(23, 30, 0)
                .unwrap()
        );
        assert!(scheduled[1].scheduled_time.is_some());
        assert!(scheduled[2].scheduled_time.is_none());
        assert!(scheduled.iter().all(|p| !p.is_share));
    }

    #[test]
    fn test_dst_gap_skipped() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let slots = window_slots(
            &times(&[(2, 30), (9, 0)]),
            &chrono_tz::America::New_York,
            date,
        );
        assert_eq!(slots.len(), 1);
    }

    #[tokio::test]
    async fn test_wait_until_past_returns() {
        let past = Utc::now() - chrono::Duration::seconds(10);
        tokio::time::timeout(Duration::from_secs(1), wait_until(&past))
            .await
            .unwrap();
    }
}
