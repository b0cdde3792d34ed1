//! Size-history merge: a rate-limited, append-only time series.

use chrono::Duration;

use radar_core::SizeSample;

/// Merge a freshly observed sample into the stored history.
///
/// An empty history becomes `[new]`. Otherwise the history is sorted by
/// timestamp (stable, so equal timestamps keep their stored order) and `new`
/// is appended only when it is strictly more than `min_interval` after the
/// latest sample. Samples are never removed or rewritten.
pub fn merge_size_history(
    mut stored: Vec<SizeSample>,
    new: SizeSample,
    min_interval: Duration,
) -> Vec<SizeSample> {
    stored.sort_by_key(|sample| sample.timestamp);
    let Some(last) = stored.last() else {
        return vec![new];
    };
    if new.timestamp - last.timestamp > min_interval {
        stored.push(new);
    }
    stored
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use rstest::rstest;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn sample(size: u64, days: i64) -> SizeSample {
        SizeSample {
            size,
            timestamp: t0() + Duration::days(days),
        }
    }

    #[test]
    fn empty_history_takes_the_first_sample() {
        let merged = merge_size_history(vec![], sample(100, 0), Duration::days(7));
        assert_eq!(merged, vec![sample(100, 0)]);
    }

    #[rstest]
    #[case::within_interval(3, vec![sample(100, 0)])]
    #[case::exactly_at_interval(7, vec![sample(100, 0)])]
    #[case::past_interval(8, vec![sample(100, 0), sample(150, 8)])]
    fn sample_is_rate_limited(#[case] days: i64, #[case] expected: Vec<SizeSample>) {
        let merged = merge_size_history(vec![sample(100, 0)], sample(150, days), Duration::days(7));
        assert_eq!(merged, expected);
    }

    #[test]
    fn unsorted_history_is_sorted_and_compared_to_its_latest_entry() {
        let stored = vec![sample(300, 20), sample(100, 0), sample(200, 10)];
        let merged = merge_size_history(stored.clone(), sample(400, 25), Duration::days(7));
        assert_eq!(merged, vec![sample(100, 0), sample(200, 10), sample(300, 20)]);

        let merged = merge_size_history(stored, sample(400, 28), Duration::days(7));
        assert_eq!(
            merged,
            vec![sample(100, 0), sample(200, 10), sample(300, 20), sample(400, 28)]
        );
    }

    #[test]
    fn resubmitting_within_the_interval_is_idempotent() {
        let stored = vec![sample(100, 0), sample(150, 8)];
        let once = merge_size_history(stored.clone(), sample(160, 10), Duration::days(7));
        let twice = merge_size_history(once.clone(), sample(170, 12), Duration::days(7));
        assert_eq!(once, stored);
        assert_eq!(twice, stored);
    }

    #[test]
    fn merge_never_shrinks_or_reorders_a_sorted_history() {
        let stored: Vec<_> = (0..6).map(|i| sample(i * 10, i as i64 * 8)).collect();
        for days in [0, 30, 40, 41, 100] {
            let merged = merge_size_history(stored.clone(), sample(999, days), Duration::days(7));
            assert!(merged.len() >= stored.len());
            assert_eq!(&merged[..stored.len()], &stored[..]);
            assert!(merged.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
        }
    }

    #[test]
    fn sample_older_than_history_is_discarded() {
        let merged = merge_size_history(vec![sample(100, 10)], sample(50, 0), Duration::days(7));
        assert_eq!(merged, vec![sample(100, 10)]);
    }
}
