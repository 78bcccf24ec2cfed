//! Core library for studyplan: weekly study-time allocation.
//!
//! Turns a set of weighted subjects and a weekly minute budget into a
//! Sunday-first week of study sessions drawn from standard period lengths.
//! Around that engine sit the persistent pieces: subjects, plans, and topics
//! in SQLite, a per-week schedule cache, a session log with daily-goal
//! progress, and spaced-repetition reviews.
//!
//! # Example
//!
//! ```
//! use studyplan_core::{Subject, WeekAllocator, week_start};
//! use chrono::NaiveDate;
//!
//! let subjects = vec![Subject::new("Math", 3.0), Subject::new("Law", 1.0)];
//! let start = week_start(NaiveDate::from_ymd_opt(2026, 8, 26).unwrap());
//! let schedule = WeekAllocator::new().allocate(&subjects, start);
//! assert_eq!(schedule.days.len(), 7);
//! ```

pub mod allocator;
pub mod error;
pub mod planner;
pub mod progress;
pub mod review;
pub mod storage;
pub mod subject;

pub use allocator::{
    daily_targets, week_start, AllocatorConfig, DaySchedule, ScheduledSession, WeekAllocator,
    WeekSchedule, DEFAULT_WEEKLY_MINUTES, MIN_SESSION_MINUTES, STANDARD_PERIODS,
};
pub use error::{ConfigError, CoreError, DatabaseError, Result, ValidationError};
pub use planner::WeekPlanner;
pub use progress::{progress_with_goal, study_progress, StudyProgress, DAILY_GOAL_SECONDS};
pub use review::{closest_interval, next_interval, next_review_date, REVIEW_SEQUENCE};
pub use storage::{Config, PlanDb, ReviewRecord, ScheduleConfig, SessionRecord};
pub use subject::{StudyPlan, Subject, Topic};
