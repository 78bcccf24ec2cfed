//! Spaced-repetition review commands.

use chrono::{Local, NaiveDate};
use clap::Subcommand;
use studyplan_core::storage::{PlanDb, ReviewRecord};
use studyplan_core::{closest_interval, next_interval};

#[derive(Subcommand)]
pub enum ReviewAction {
    /// Schedule a review for a subject
    Schedule {
        /// Subject ID
        subject_id: String,
        /// Days until the review; snapped to the interval sequence (default: 1)
        #[arg(long, default_value = "1")]
        days: i64,
        /// Topic ID
        #[arg(long)]
        topic: Option<String>,
    },
    /// List reviews due on or before a date
    Due {
        /// Due date cutoff (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Complete a review and schedule the follow-up
    Complete {
        /// Review ID
        id: String,
        /// Days until the next review; snapped to the interval sequence.
        /// Defaults to advancing along the sequence.
        #[arg(long)]
        days: Option<i64>,
        /// Review type label, e.g. "Q&A" or "summary"
        #[arg(long)]
        review_type: Option<String>,
        /// Free-form notes
        #[arg(long)]
        notes: Option<String>,
    },
}

pub fn run(action: ReviewAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = PlanDb::open()?;

    match action {
        ReviewAction::Schedule { subject_id, days, topic } => {
            let interval =
                closest_interval(days).ok_or(format!("days must be positive, got {days}"))?;
            let today = Local::now().date_naive();
            let mut review = ReviewRecord::new(subject_id, today, interval);
            review.topic_id = topic;
            db.create_review(&review)?;
            println!("Review scheduled for {} ({}d)", review.next_review_date, interval);
            println!("{}", serde_json::to_string_pretty(&review)?);
        }
        ReviewAction::Due { date, json } => {
            let date = date.unwrap_or_else(|| Local::now().date_naive());
            let reviews = db.due_reviews(date)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&reviews)?);
            } else {
                for review in &reviews {
                    println!(
                        "{}  {}  due {}  ({}d interval)",
                        review.id, review.subject_id, review.next_review_date, review.days_interval,
                    );
                }
                if reviews.is_empty() {
                    println!("Nothing due on or before {date}");
                }
            }
        }
        ReviewAction::Complete { id, days, review_type, notes } => {
            let current = db.get_review(&id)?.ok_or(format!("Review not found: {id}"))?;
            let interval = match days {
                Some(d) => closest_interval(d).ok_or(format!("days must be positive, got {d}"))?,
                None => next_interval(current.days_interval),
            };
            let today = Local::now().date_naive();
            let next =
                db.complete_review(&id, interval, today, review_type.as_deref(), notes.as_deref())?;
            println!("Review completed; next on {} ({}d)", next.next_review_date, interval);
        }
    }
    Ok(())
}
