//! Week schedule output types and calendar helpers.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// A single scheduled study session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledSession {
    pub subject_id: String,
    pub minutes: i64,
}

/// Sessions scheduled for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySchedule {
    /// Calendar date (serialized as ISO 8601).
    pub date: NaiveDate,
    /// Weekday label, e.g. "Sunday".
    pub weekday: String,
    /// Whether `date` was the local date when the schedule was generated.
    pub is_today: bool,
    pub sessions: Vec<ScheduledSession>,
}

impl DaySchedule {
    /// Create an empty day for `date`, flagged against `today`.
    pub fn new(date: NaiveDate, today: NaiveDate) -> Self {
        Self {
            date,
            weekday: date.format("%A").to_string(),
            is_today: date == today,
            sessions: Vec::new(),
        }
    }

    /// Total scheduled minutes on this day.
    pub fn total_minutes(&self) -> i64 {
        self.sessions.iter().map(|s| s.minutes).sum()
    }
}

/// A full Sunday-first week of day schedules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekSchedule {
    pub week_start: NaiveDate,
    pub days: Vec<DaySchedule>,
}

impl WeekSchedule {
    /// Total minutes scheduled for a subject across the whole week.
    pub fn subject_minutes(&self, subject_id: &str) -> i64 {
        self.days
            .iter()
            .flat_map(|d| &d.sessions)
            .filter(|s| s.subject_id == subject_id)
            .map(|s| s.minutes)
            .sum()
    }

    /// Total minutes scheduled across the whole week.
    pub fn total_minutes(&self) -> i64 {
        self.days.iter().map(|d| d.total_minutes()).sum()
    }

    /// Number of sessions across the whole week.
    pub fn session_count(&self) -> usize {
        self.days.iter().map(|d| d.sessions.len()).sum()
    }
}

/// Sunday-aligned start of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_sunday() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn week_start_aligns_to_sunday() {
        // 2026-08-24 is a Monday
        assert_eq!(week_start(date(2026, 8, 24)), date(2026, 8, 23));
        // A Saturday maps to the Sunday six days earlier
        assert_eq!(week_start(date(2026, 8, 29)), date(2026, 8, 23));
    }

    #[test]
    fn week_start_is_idempotent_on_sundays() {
        let sunday = date(2026, 8, 23);
        assert_eq!(week_start(sunday), sunday);
    }

    #[test]
    fn day_schedule_carries_weekday_label_and_today_flag() {
        let today = date(2026, 8, 23);
        let day = DaySchedule::new(today, today);
        assert_eq!(day.weekday, "Sunday");
        assert!(day.is_today);
        assert!(day.sessions.is_empty());

        let other = DaySchedule::new(date(2026, 8, 24), today);
        assert_eq!(other.weekday, "Monday");
        assert!(!other.is_today);
    }

    #[test]
    fn week_schedule_serialization_round_trip() {
        let today = date(2026, 8, 23);
        let mut day = DaySchedule::new(today, today);
        day.sessions.push(ScheduledSession {
            subject_id: "math".to_string(),
            minutes: 60,
        });
        let week = WeekSchedule {
            week_start: today,
            days: vec![day],
        };

        let json = serde_json::to_string(&week).unwrap();
        let decoded: WeekSchedule = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, week);
        assert_eq!(decoded.subject_minutes("math"), 60);
    }
}
