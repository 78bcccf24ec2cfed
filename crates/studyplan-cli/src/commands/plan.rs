//! Study plan management commands.

use clap::Subcommand;
use studyplan_core::storage::PlanDb;
use studyplan_core::StudyPlan;

#[derive(Subcommand)]
pub enum PlanAction {
    /// Create a new plan
    Create {
        /// Plan name
        name: String,
        /// Plan description
        #[arg(long)]
        description: Option<String>,
        /// Comma-separated subject IDs
        #[arg(long)]
        subjects: Option<String>,
    },
    /// List plans
    List {
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Replace the subject list of a plan
    SetSubjects {
        /// Plan ID
        id: String,
        /// Comma-separated subject IDs
        subjects: String,
    },
    /// Delete a plan and its cached schedules
    Delete {
        /// Plan ID
        id: String,
    },
}

fn split_ids(csv: &str) -> Vec<String> {
    csv.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

pub fn run(action: PlanAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = PlanDb::open()?;

    match action {
        PlanAction::Create { name, description, subjects } => {
            let mut plan = StudyPlan::new(name);
            plan.description = description;
            if let Some(csv) = subjects {
                plan.subject_ids = split_ids(&csv);
            }
            db.create_plan(&plan)?;
            println!("Plan created: {}", plan.id);
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
        PlanAction::List { json } => {
            let plans = db.list_plans()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&plans)?);
            } else {
                for plan in &plans {
                    println!("{}  {}  {} subjects", plan.id, plan.name, plan.subject_ids.len());
                }
            }
        }
        PlanAction::SetSubjects { id, subjects } => {
            let plan = db.get_plan(&id)?.ok_or(format!("Plan not found: {id}"))?;
            db.set_plan_subjects(&plan.id, &split_ids(&subjects))?;
            println!("Plan subjects updated: {id}");
        }
        PlanAction::Delete { id } => {
            db.delete_plan(&id)?;
            println!("Plan deleted: {id}");
        }
    }
    Ok(())
}
