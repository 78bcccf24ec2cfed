//! Study session log commands.

use chrono::{Local, NaiveDate};
use clap::Subcommand;
use studyplan_core::storage::{PlanDb, SessionRecord};
use studyplan_core::study_progress;

#[derive(Subcommand)]
pub enum SessionAction {
    /// Log a study session
    Log {
        /// Subject ID
        subject_id: String,
        /// Duration in minutes
        #[arg(long)]
        minutes: i64,
        /// Session date (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Topic ID
        #[arg(long)]
        topic: Option<String>,
    },
    /// Mark a subject's daily goal as completed
    Complete {
        /// Subject ID
        subject_id: String,
        /// Date to complete (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// List logged sessions, newest first
    List {
        /// Filter by subject ID
        #[arg(long)]
        subject: Option<String>,
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: SessionAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = PlanDb::open()?;

    match action {
        SessionAction::Log { subject_id, minutes, date, topic } => {
            if minutes <= 0 {
                return Err(format!("minutes must be positive, got {minutes}").into());
            }
            let date = date.unwrap_or_else(|| Local::now().date_naive());
            let mut session = SessionRecord::new(subject_id.clone(), date, minutes * 60);
            session.topic_id = topic;
            db.log_session(&session)?;

            let sessions = db.list_sessions(Some(&subject_id))?;
            let progress = study_progress(&sessions, &subject_id, date);
            if progress.completed {
                println!("Logged {minutes}m, daily goal reached ({}m total)", progress.total_minutes);
            } else {
                println!("Logged {minutes}m, {}m to the daily goal", progress.remaining_minutes);
            }
        }
        SessionAction::Complete { subject_id, date } => {
            let date = date.unwrap_or_else(|| Local::now().date_naive());
            db.log_completion(&subject_id, date)?;
            println!("Marked completed: {subject_id} on {date}");
        }
        SessionAction::List { subject, json } => {
            let sessions = db.list_sessions(subject.as_deref())?;
            if json {
                println!("{}", serde_json::to_string_pretty(&sessions)?);
            } else {
                for session in &sessions {
                    println!(
                        "{}  {}  {}m  {}",
                        session.date,
                        session.subject_id,
                        session.duration_seconds / 60,
                        session.id,
                    );
                }
            }
        }
    }
    Ok(())
}
