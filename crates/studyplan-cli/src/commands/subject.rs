//! Subject management commands.

use clap::Subcommand;
use studyplan_core::storage::PlanDb;
use studyplan_core::Subject;

#[derive(Subcommand)]
pub enum SubjectAction {
    /// Add a new subject
    Add {
        /// Subject name
        name: String,
        /// Relative priority weight (default: 1)
        #[arg(long, default_value = "1.0")]
        weight: f64,
        /// Display color, e.g. "#4f46e5"
        #[arg(long)]
        color: Option<String>,
    },
    /// List subjects
    List {
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Update a subject
    Update {
        /// Subject ID
        id: String,
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// New weight
        #[arg(long)]
        weight: Option<f64>,
        /// New display color
        #[arg(long)]
        color: Option<String>,
    },
    /// Remove a subject and its topics
    Remove {
        /// Subject ID
        id: String,
    },
}

pub fn run(action: SubjectAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = PlanDb::open()?;

    match action {
        SubjectAction::Add { name, weight, color } => {
            if !(weight.is_finite() && weight > 0.0) {
                return Err(format!("weight must be positive, got {weight}").into());
            }
            let mut subject = Subject::new(name, weight);
            subject.color = color;
            db.create_subject(&subject)?;
            println!("Subject created: {}", subject.id);
            println!("{}", serde_json::to_string_pretty(&subject)?);
        }
        SubjectAction::List { json } => {
            let subjects = db.list_subjects()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&subjects)?);
            } else {
                for subject in &subjects {
                    println!("{}  {}  weight {}", subject.id, subject.name, subject.weight);
                }
            }
        }
        SubjectAction::Update { id, name, weight, color } => {
            let mut subject = db
                .get_subject(&id)?
                .ok_or(format!("Subject not found: {id}"))?;
            if let Some(n) = name {
                subject.name = n;
            }
            if let Some(w) = weight {
                if !(w.is_finite() && w > 0.0) {
                    return Err(format!("weight must be positive, got {w}").into());
                }
                subject.weight = w;
            }
            if let Some(c) = color {
                subject.color = Some(c);
            }
            db.update_subject(&subject)?;
            println!("Subject updated:");
            println!("{}", serde_json::to_string_pretty(&subject)?);
        }
        SubjectAction::Remove { id } => {
            db.delete_subject(&id)?;
            println!("Subject removed: {id}");
        }
    }
    Ok(())
}
