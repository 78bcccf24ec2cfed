//! Spaced-repetition review intervals.
//!
//! Reviews advance along a fixed Fibonacci-like sequence of day intervals,
//! saturating at 30 days. User-supplied custom intervals are snapped to the
//! nearest member of the sequence.

use chrono::{Duration, NaiveDate};

/// Review interval sequence in days.
pub const REVIEW_SEQUENCE: [i64; 9] = [1, 1, 2, 3, 5, 8, 13, 21, 30];

/// Snap a custom day count to the nearest sequence member.
///
/// Ties resolve to the earlier member. Returns `None` for non-positive
/// inputs.
pub fn closest_interval(days: i64) -> Option<i64> {
    if days <= 0 {
        return None;
    }
    let mut closest = REVIEW_SEQUENCE[0];
    let mut min_diff = (days - closest).abs();
    for &interval in &REVIEW_SEQUENCE {
        let diff = (days - interval).abs();
        if diff < min_diff {
            min_diff = diff;
            closest = interval;
        }
    }
    Some(closest)
}

/// The interval following `current` in the sequence.
///
/// Unknown intervals and the final member both yield the 30-day cap. The
/// sequence starts with two 1-day steps, so the first advancement from 1 is
/// 1 again.
pub fn next_interval(current: i64) -> i64 {
    match REVIEW_SEQUENCE.iter().position(|&i| i == current) {
        Some(index) if index + 1 < REVIEW_SEQUENCE.len() => REVIEW_SEQUENCE[index + 1],
        _ => REVIEW_SEQUENCE[REVIEW_SEQUENCE.len() - 1],
    }
}

/// Date of the next review, `interval_days` after `from`.
pub fn next_review_date(from: NaiveDate, interval_days: i64) -> NaiveDate {
    from + Duration::days(interval_days)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closest_interval_snaps_to_sequence() {
        assert_eq!(closest_interval(1), Some(1));
        assert_eq!(closest_interval(4), Some(3));
        assert_eq!(closest_interval(6), Some(5));
        assert_eq!(closest_interval(10), Some(8));
        assert_eq!(closest_interval(17), Some(13));
        assert_eq!(closest_interval(26), Some(30));
        assert_eq!(closest_interval(365), Some(30));
    }

    #[test]
    fn closest_interval_rejects_non_positive() {
        assert_eq!(closest_interval(0), None);
        assert_eq!(closest_interval(-3), None);
    }

    #[test]
    fn next_interval_walks_the_sequence() {
        // The duplicated leading 1 means the first advancement repeats it
        assert_eq!(next_interval(1), 1);
        assert_eq!(next_interval(2), 3);
        assert_eq!(next_interval(5), 8);
        assert_eq!(next_interval(21), 30);
    }

    #[test]
    fn next_interval_saturates_at_thirty() {
        assert_eq!(next_interval(30), 30);
        // Unknown intervals also land on the cap
        assert_eq!(next_interval(14), 30);
    }

    #[test]
    fn next_review_date_adds_interval() {
        let from = NaiveDate::from_ymd_opt(2026, 8, 23).unwrap();
        assert_eq!(
            next_review_date(from, 8),
            NaiveDate::from_ymd_opt(2026, 8, 31).unwrap()
        );
    }
}
