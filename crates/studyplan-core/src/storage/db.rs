//! SQLite-based storage for subjects, plans, topics, sessions, reviews,
//! and cached week schedules.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::data_dir;
use crate::allocator::WeekSchedule;
use crate::progress::DAILY_GOAL_SECONDS;
use crate::review::next_review_date;
use crate::subject::{StudyPlan, Subject, Topic};

/// A logged study session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: String,
    pub subject_id: String,
    pub topic_id: Option<String>,
    pub date: NaiveDate,
    pub duration_seconds: i64,
    pub created_at: DateTime<Utc>,
}

impl SessionRecord {
    /// Create a new session record with a fresh id.
    pub fn new(subject_id: impl Into<String>, date: NaiveDate, duration_seconds: i64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            subject_id: subject_id.into(),
            topic_id: None,
            date,
            duration_seconds,
            created_at: Utc::now(),
        }
    }
}

/// A pending or completed spaced-repetition review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub id: String,
    pub subject_id: String,
    pub topic_id: Option<String>,
    pub days_interval: i64,
    pub next_review_date: NaiveDate,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub review_type: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ReviewRecord {
    /// Create a pending review for `subject_id`, due `interval` days after `from`.
    pub fn new(subject_id: impl Into<String>, from: NaiveDate, interval: i64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            subject_id: subject_id.into(),
            topic_id: None,
            days_interval: interval,
            next_review_date: next_review_date(from, interval),
            completed: false,
            completed_at: None,
            review_type: None,
            notes: None,
            created_at: Utc::now(),
        }
    }
}

// === Helper functions ===

/// Parse datetime from RFC3339 string with fallback to current time
fn parse_datetime_fallback(dt_str: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(dt_str)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

/// Parse an ISO date column with fallback to the current local date
fn parse_date_fallback(date_str: &str) -> NaiveDate {
    date_str
        .parse::<NaiveDate>()
        .unwrap_or_else(|_| Utc::now().date_naive())
}

/// Build a Subject from a database row
fn row_to_subject(row: &rusqlite::Row) -> Result<Subject, rusqlite::Error> {
    let created_at_str: String = row.get(4)?;
    Ok(Subject {
        id: row.get(0)?,
        name: row.get(1)?,
        color: row.get(2)?,
        weight: row.get(3)?,
        created_at: parse_datetime_fallback(&created_at_str),
    })
}

/// Build a SessionRecord from a database row
fn row_to_session(row: &rusqlite::Row) -> Result<SessionRecord, rusqlite::Error> {
    let date_str: String = row.get(3)?;
    let created_at_str: String = row.get(5)?;
    Ok(SessionRecord {
        id: row.get(0)?,
        subject_id: row.get(1)?,
        topic_id: row.get(2)?,
        date: parse_date_fallback(&date_str),
        duration_seconds: row.get(4)?,
        created_at: parse_datetime_fallback(&created_at_str),
    })
}

/// Build a ReviewRecord from a database row
fn row_to_review(row: &rusqlite::Row) -> Result<ReviewRecord, rusqlite::Error> {
    let next_str: String = row.get(4)?;
    let completed_at_str: Option<String> = row.get(6)?;
    let created_at_str: String = row.get(9)?;
    Ok(ReviewRecord {
        id: row.get(0)?,
        subject_id: row.get(1)?,
        topic_id: row.get(2)?,
        days_interval: row.get(3)?,
        next_review_date: parse_date_fallback(&next_str),
        completed: row.get(5)?,
        completed_at: completed_at_str
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|dt| dt.with_timezone(&Utc)),
        review_type: row.get(7)?,
        notes: row.get(8)?,
        created_at: parse_datetime_fallback(&created_at_str),
    })
}

/// SQLite database for studyplan storage.
///
/// Stores subjects, plans, topics, sessions, reviews, and the cached
/// week schedules keyed by plan and week start.
pub struct PlanDb {
    conn: Connection,
}

impl PlanDb {
    /// Open the database at `~/.config/studyplan/studyplan.db`.
    ///
    /// Creates tables if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, Box<dyn std::error::Error>> {
        let path = data_dir()?.join("studyplan.db");
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    #[cfg(test)]
    pub fn open_memory() -> Result<Self, Box<dyn std::error::Error>> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS subjects (
                id         TEXT PRIMARY KEY,
                name       TEXT NOT NULL,
                color      TEXT,
                weight     REAL NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS plans (
                id          TEXT PRIMARY KEY,
                name        TEXT NOT NULL,
                description TEXT,
                created_at  TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS plan_subjects (
                plan_id    TEXT NOT NULL,
                subject_id TEXT NOT NULL,
                PRIMARY KEY (plan_id, subject_id)
            );

            CREATE TABLE IF NOT EXISTS topics (
                id         TEXT PRIMARY KEY,
                subject_id TEXT NOT NULL,
                title      TEXT NOT NULL,
                completed  INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS study_sessions (
                id               TEXT PRIMARY KEY,
                subject_id       TEXT NOT NULL,
                topic_id         TEXT,
                date             TEXT NOT NULL,
                duration_seconds INTEGER NOT NULL,
                created_at       TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS reviews (
                id               TEXT PRIMARY KEY,
                subject_id       TEXT NOT NULL,
                topic_id         TEXT,
                days_interval    INTEGER NOT NULL,
                next_review_date TEXT NOT NULL,
                completed        INTEGER NOT NULL DEFAULT 0,
                completed_at     TEXT,
                review_type      TEXT,
                notes            TEXT,
                created_at       TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS week_schedules (
                plan_id       TEXT NOT NULL,
                week_start    TEXT NOT NULL,
                schedule_json TEXT NOT NULL,
                generated_at  TEXT NOT NULL,
                PRIMARY KEY (plan_id, week_start)
            );

            CREATE INDEX IF NOT EXISTS idx_sessions_subject_date
                ON study_sessions(subject_id, date);
            CREATE INDEX IF NOT EXISTS idx_reviews_due
                ON reviews(completed, next_review_date);",
        )?;
        Ok(())
    }

    // === Subject CRUD ===

    /// Create a new subject.
    pub fn create_subject(&self, subject: &Subject) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT INTO subjects (id, name, color, weight, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                subject.id,
                subject.name,
                subject.color,
                subject.weight,
                subject.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Get a subject by ID.
    pub fn get_subject(&self, id: &str) -> Result<Option<Subject>, rusqlite::Error> {
        self.conn
            .query_row(
                "SELECT id, name, color, weight, created_at FROM subjects WHERE id = ?1",
                params![id],
                row_to_subject,
            )
            .optional()
    }

    /// List all subjects in creation order.
    ///
    /// Creation order is the allocator's input order, so it is part of the
    /// schedule's determinism.
    pub fn list_subjects(&self) -> Result<Vec<Subject>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, color, weight, created_at
             FROM subjects
             ORDER BY created_at ASC, id ASC",
        )?;
        let subjects = stmt.query_map([], row_to_subject)?;
        subjects.collect()
    }

    /// Update an existing subject.
    pub fn update_subject(&self, subject: &Subject) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "UPDATE subjects SET name = ?1, color = ?2, weight = ?3 WHERE id = ?4",
            params![subject.name, subject.color, subject.weight, subject.id],
        )?;
        Ok(())
    }

    /// Delete a subject and its plan links and topics.
    pub fn delete_subject(&self, id: &str) -> Result<(), rusqlite::Error> {
        self.conn
            .execute("DELETE FROM plan_subjects WHERE subject_id = ?1", params![id])?;
        self.conn
            .execute("DELETE FROM topics WHERE subject_id = ?1", params![id])?;
        self.conn
            .execute("DELETE FROM subjects WHERE id = ?1", params![id])?;
        Ok(())
    }

    // === Plan CRUD ===

    /// Create a new plan with its subject links.
    pub fn create_plan(&self, plan: &StudyPlan) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT INTO plans (id, name, description, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                plan.id,
                plan.name,
                plan.description,
                plan.created_at.to_rfc3339(),
            ],
        )?;
        self.set_plan_subjects(&plan.id, &plan.subject_ids)?;
        Ok(())
    }

    /// Get a plan by ID.
    pub fn get_plan(&self, id: &str) -> Result<Option<StudyPlan>, rusqlite::Error> {
        let result = self
            .conn
            .query_row(
                "SELECT id, name, description, created_at FROM plans WHERE id = ?1",
                params![id],
                |row| {
                    let created_at_str: String = row.get(3)?;
                    Ok(StudyPlan {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        description: row.get(2)?,
                        subject_ids: Vec::new(),
                        created_at: parse_datetime_fallback(&created_at_str),
                    })
                },
            )
            .optional()?;

        match result {
            Some(mut plan) => {
                plan.subject_ids = self.load_plan_subject_ids(&plan.id)?;
                Ok(Some(plan))
            }
            None => Ok(None),
        }
    }

    /// List all plans.
    pub fn list_plans(&self) -> Result<Vec<StudyPlan>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, description, created_at
             FROM plans
             ORDER BY created_at ASC, id ASC",
        )?;
        let plans = stmt.query_map([], |row| {
            let created_at_str: String = row.get(3)?;
            Ok(StudyPlan {
                id: row.get(0)?,
                name: row.get(1)?,
                description: row.get(2)?,
                subject_ids: Vec::new(),
                created_at: parse_datetime_fallback(&created_at_str),
            })
        })?;
        let mut items = plans.collect::<Result<Vec<StudyPlan>, _>>()?;
        for plan in &mut items {
            plan.subject_ids = self.load_plan_subject_ids(&plan.id)?;
        }
        Ok(items)
    }

    /// Replace the subject links of a plan.
    pub fn set_plan_subjects(
        &self,
        plan_id: &str,
        subject_ids: &[String],
    ) -> Result<(), rusqlite::Error> {
        self.conn
            .execute("DELETE FROM plan_subjects WHERE plan_id = ?1", params![plan_id])?;
        for subject_id in subject_ids {
            self.conn.execute(
                "INSERT OR IGNORE INTO plan_subjects (plan_id, subject_id) VALUES (?1, ?2)",
                params![plan_id, subject_id],
            )?;
        }
        Ok(())
    }

    fn load_plan_subject_ids(&self, plan_id: &str) -> Result<Vec<String>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT ps.subject_id
             FROM plan_subjects ps
             JOIN subjects s ON s.id = ps.subject_id
             WHERE ps.plan_id = ?1
             ORDER BY s.created_at ASC, s.id ASC",
        )?;
        let ids = stmt.query_map(params![plan_id], |row| row.get(0))?;
        ids.collect()
    }

    /// Subjects linked to a plan, in creation order.
    pub fn plan_subjects(&self, plan_id: &str) -> Result<Vec<Subject>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT s.id, s.name, s.color, s.weight, s.created_at
             FROM plan_subjects ps
             JOIN subjects s ON s.id = ps.subject_id
             WHERE ps.plan_id = ?1
             ORDER BY s.created_at ASC, s.id ASC",
        )?;
        let subjects = stmt.query_map(params![plan_id], row_to_subject)?;
        subjects.collect()
    }

    /// Delete a plan, its subject links, and its cached schedules.
    pub fn delete_plan(&self, id: &str) -> Result<(), rusqlite::Error> {
        self.conn
            .execute("DELETE FROM plan_subjects WHERE plan_id = ?1", params![id])?;
        self.conn
            .execute("DELETE FROM week_schedules WHERE plan_id = ?1", params![id])?;
        self.conn
            .execute("DELETE FROM plans WHERE id = ?1", params![id])?;
        Ok(())
    }

    // === Topic CRUD ===

    /// Create a new topic.
    pub fn create_topic(&self, topic: &Topic) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT INTO topics (id, subject_id, title, completed, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                topic.id,
                topic.subject_id,
                topic.title,
                topic.completed,
                topic.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// List topics for a subject.
    pub fn list_topics(&self, subject_id: &str) -> Result<Vec<Topic>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT id, subject_id, title, completed, created_at
             FROM topics
             WHERE subject_id = ?1
             ORDER BY created_at ASC, id ASC",
        )?;
        let topics = stmt.query_map(params![subject_id], |row| {
            let created_at_str: String = row.get(4)?;
            Ok(Topic {
                id: row.get(0)?,
                subject_id: row.get(1)?,
                title: row.get(2)?,
                completed: row.get(3)?,
                created_at: parse_datetime_fallback(&created_at_str),
            })
        })?;
        topics.collect()
    }

    /// Mark a topic completed or not.
    pub fn set_topic_completed(&self, id: &str, completed: bool) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "UPDATE topics SET completed = ?1 WHERE id = ?2",
            params![completed, id],
        )?;
        Ok(())
    }

    /// Delete a topic.
    pub fn delete_topic(&self, id: &str) -> Result<(), rusqlite::Error> {
        self.conn
            .execute("DELETE FROM topics WHERE id = ?1", params![id])?;
        Ok(())
    }

    // === Session log ===

    /// Record a study session.
    pub fn log_session(&self, session: &SessionRecord) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT INTO study_sessions (id, subject_id, topic_id, date, duration_seconds, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                session.id,
                session.subject_id,
                session.topic_id,
                session.date.to_string(),
                session.duration_seconds,
                session.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Record a full daily-goal session, the "mark as completed" shortcut.
    pub fn log_completion(&self, subject_id: &str, date: NaiveDate) -> Result<(), rusqlite::Error> {
        self.log_session(&SessionRecord::new(subject_id, date, DAILY_GOAL_SECONDS))
    }

    /// List sessions, newest first, optionally filtered by subject.
    pub fn list_sessions(
        &self,
        subject_id: Option<&str>,
    ) -> Result<Vec<SessionRecord>, rusqlite::Error> {
        let base = "SELECT id, subject_id, topic_id, date, duration_seconds, created_at
             FROM study_sessions";
        let order = " ORDER BY date DESC, created_at DESC";

        match subject_id {
            Some(subject_id) => {
                let mut stmt = self
                    .conn
                    .prepare(&format!("{base} WHERE subject_id = ?1{order}"))?;
                let sessions = stmt.query_map(params![subject_id], row_to_session)?;
                sessions.collect()
            }
            None => {
                let mut stmt = self.conn.prepare(&format!("{base}{order}"))?;
                let sessions = stmt.query_map([], row_to_session)?;
                sessions.collect()
            }
        }
    }

    /// Sessions falling inside a date range, inclusive.
    pub fn sessions_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<SessionRecord>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT id, subject_id, topic_id, date, duration_seconds, created_at
             FROM study_sessions
             WHERE date >= ?1 AND date <= ?2
             ORDER BY date ASC, created_at ASC",
        )?;
        let sessions = stmt.query_map(params![from.to_string(), to.to_string()], row_to_session)?;
        sessions.collect()
    }

    // === Reviews ===

    /// Create a pending review.
    pub fn create_review(&self, review: &ReviewRecord) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT INTO reviews (id, subject_id, topic_id, days_interval, next_review_date,
                                  completed, completed_at, review_type, notes, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                review.id,
                review.subject_id,
                review.topic_id,
                review.days_interval,
                review.next_review_date.to_string(),
                review.completed,
                review.completed_at.map(|dt| dt.to_rfc3339()),
                review.review_type,
                review.notes,
                review.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Get a review by ID.
    pub fn get_review(&self, id: &str) -> Result<Option<ReviewRecord>, rusqlite::Error> {
        self.conn
            .query_row(
                "SELECT id, subject_id, topic_id, days_interval, next_review_date,
                        completed, completed_at, review_type, notes, created_at
                 FROM reviews WHERE id = ?1",
                params![id],
                row_to_review,
            )
            .optional()
    }

    /// Pending reviews due on or before `date`, earliest first.
    pub fn due_reviews(&self, date: NaiveDate) -> Result<Vec<ReviewRecord>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT id, subject_id, topic_id, days_interval, next_review_date,
                    completed, completed_at, review_type, notes, created_at
             FROM reviews
             WHERE completed = 0 AND next_review_date <= ?1
             ORDER BY next_review_date ASC, created_at ASC",
        )?;
        let reviews = stmt.query_map(params![date.to_string()], row_to_review)?;
        reviews.collect()
    }

    /// Complete a review and schedule the follow-up in one transaction.
    ///
    /// `interval` is the (already snapped) day count to the next review,
    /// counted from `today`. Returns the newly created pending review.
    pub fn complete_review(
        &self,
        id: &str,
        interval: i64,
        today: NaiveDate,
        review_type: Option<&str>,
        notes: Option<&str>,
    ) -> Result<ReviewRecord, rusqlite::Error> {
        let current = self
            .get_review(id)?
            .ok_or(rusqlite::Error::QueryReturnedNoRows)?;

        let mut next = ReviewRecord::new(current.subject_id.clone(), today, interval);
        next.topic_id = current.topic_id.clone();

        self.conn.execute_batch("BEGIN IMMEDIATE TRANSACTION;")?;
        let result: Result<(), rusqlite::Error> = (|| {
            self.conn.execute(
                "UPDATE reviews
                 SET completed = 1, completed_at = ?1, review_type = ?2, notes = ?3
                 WHERE id = ?4",
                params![Utc::now().to_rfc3339(), review_type, notes, id],
            )?;
            self.create_review(&next)?;
            Ok(())
        })();

        match result {
            Ok(()) => {
                self.conn.execute_batch("COMMIT;")?;
                Ok(next)
            }
            Err(err) => {
                let _ = self.conn.execute_batch("ROLLBACK;");
                Err(err)
            }
        }
    }

    // === Week schedule cache ===

    /// Cached schedule for `(plan_id, week_start)`, if any.
    ///
    /// Rows that no longer deserialize are treated as absent so the caller
    /// regenerates them.
    pub fn get_week_schedule(
        &self,
        plan_id: &str,
        week_start: NaiveDate,
    ) -> Result<Option<WeekSchedule>, rusqlite::Error> {
        let json: Option<String> = self
            .conn
            .query_row(
                "SELECT schedule_json FROM week_schedules
                 WHERE plan_id = ?1 AND week_start = ?2",
                params![plan_id, week_start.to_string()],
                |row| row.get(0),
            )
            .optional()?;

        Ok(json.and_then(|j| serde_json::from_str(&j).ok()))
    }

    /// Store a schedule verbatim for `(plan_id, week_start)`.
    pub fn put_week_schedule(
        &self,
        plan_id: &str,
        week_start: NaiveDate,
        schedule: &WeekSchedule,
    ) -> Result<(), rusqlite::Error> {
        let json = serde_json::to_string(schedule)
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
        self.conn.execute(
            "INSERT OR REPLACE INTO week_schedules (plan_id, week_start, schedule_json, generated_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                plan_id,
                week_start.to_string(),
                json,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Drop the cached schedule for `(plan_id, week_start)`.
    pub fn delete_week_schedule(
        &self,
        plan_id: &str,
        week_start: NaiveDate,
    ) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "DELETE FROM week_schedules WHERE plan_id = ?1 AND week_start = ?2",
            params![plan_id, week_start.to_string()],
        )?;
        Ok(())
    }
}
