//! Completion progress against the daily per-subject study goal.
//!
//! Logged sessions decorate a generated schedule with completion state;
//! they never feed back into allocation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::storage::SessionRecord;

/// Daily goal per subject: one hour.
pub const DAILY_GOAL_SECONDS: i64 = 3600;

/// Completion state for one subject on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyProgress {
    /// Goal reached.
    pub completed: bool,
    /// Minutes left to the goal, rounded up. Zero once completed.
    pub remaining_minutes: i64,
    /// Minutes studied so far, rounded down.
    pub total_minutes: i64,
}

/// Progress for `subject_id` on `date` against the default one-hour goal.
pub fn study_progress(sessions: &[SessionRecord], subject_id: &str, date: NaiveDate) -> StudyProgress {
    progress_with_goal(sessions, subject_id, date, DAILY_GOAL_SECONDS)
}

/// Progress against an explicit goal in seconds.
pub fn progress_with_goal(
    sessions: &[SessionRecord],
    subject_id: &str,
    date: NaiveDate,
    goal_seconds: i64,
) -> StudyProgress {
    let total_seconds: i64 = sessions
        .iter()
        .filter(|s| s.subject_id == subject_id && s.date == date)
        .map(|s| s.duration_seconds)
        .sum();
    let remaining_seconds = (goal_seconds - total_seconds).max(0);

    StudyProgress {
        completed: total_seconds >= goal_seconds,
        remaining_minutes: (remaining_seconds + 59) / 60,
        total_minutes: total_seconds / 60,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(subject_id: &str, date: NaiveDate, seconds: i64) -> SessionRecord {
        SessionRecord {
            id: uuid::Uuid::new_v4().to_string(),
            subject_id: subject_id.to_string(),
            topic_id: None,
            date,
            duration_seconds: seconds,
            created_at: Utc::now(),
        }
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 23).unwrap()
    }

    #[test]
    fn no_sessions_means_full_hour_remaining() {
        let progress = study_progress(&[], "math", day());
        assert!(!progress.completed);
        assert_eq!(progress.remaining_minutes, 60);
        assert_eq!(progress.total_minutes, 0);
    }

    #[test]
    fn partial_progress_rounds_remaining_up() {
        let sessions = vec![record("math", day(), 1510)]; // 25m10s
        let progress = study_progress(&sessions, "math", day());
        assert!(!progress.completed);
        assert_eq!(progress.total_minutes, 25);
        // 2090 seconds left rounds up to 35 minutes
        assert_eq!(progress.remaining_minutes, 35);
    }

    #[test]
    fn sessions_accumulate_within_the_day() {
        let sessions = vec![
            record("math", day(), 1800),
            record("math", day(), 1800),
            record("law", day(), 3600),
            record("math", day() + chrono::Duration::days(1), 3600),
        ];
        let progress = study_progress(&sessions, "math", day());
        assert!(progress.completed);
        assert_eq!(progress.remaining_minutes, 0);
        assert_eq!(progress.total_minutes, 60);
    }

    #[test]
    fn overtime_counts_toward_total() {
        let sessions = vec![record("math", day(), 5400)];
        let progress = study_progress(&sessions, "math", day());
        assert!(progress.completed);
        assert_eq!(progress.total_minutes, 90);
        assert_eq!(progress.remaining_minutes, 0);
    }

    #[test]
    fn custom_goal_is_respected() {
        let sessions = vec![record("math", day(), 1500)];
        let progress = progress_with_goal(&sessions, "math", day(), 1500);
        assert!(progress.completed);
    }
}
