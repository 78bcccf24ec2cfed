//! Week schedule commands.

use std::collections::HashMap;

use chrono::{Local, NaiveDate};
use clap::Subcommand;
use studyplan_core::storage::PlanDb;
use studyplan_core::{AllocatorConfig, Config, WeekAllocator, WeekPlanner, WeekSchedule};

#[derive(Subcommand)]
pub enum ScheduleAction {
    /// Show (generating and caching if needed) the schedule for a plan's week
    Week {
        /// Plan ID; falls back to the configured default plan
        plan_id: Option<String>,
        /// Any date inside the wanted week (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Discard the cached schedule and allocate afresh
        #[arg(long)]
        regenerate: bool,
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Allocate a week over all stored subjects without caching
    Preview {
        /// Weekly hour budget (default: from config)
        #[arg(long)]
        hours: Option<i64>,
        /// Any date inside the wanted week (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

fn allocator_from_config(config: &Config) -> WeekAllocator {
    WeekAllocator::with_config(AllocatorConfig {
        weekly_minutes: config.weekly_minutes(),
        ..AllocatorConfig::default()
    })
}

fn print_schedule(
    schedule: &WeekSchedule,
    names: &HashMap<String, String>,
) {
    println!("Week of {}", schedule.week_start);
    for day in &schedule.days {
        let marker = if day.is_today { " <- today" } else { "" };
        println!("{} {}{}", day.weekday, day.date, marker);
        for session in &day.sessions {
            let name = names
                .get(&session.subject_id)
                .map(String::as_str)
                .unwrap_or(session.subject_id.as_str());
            println!("  {:>3}m  {}", session.minutes, name);
        }
        if day.sessions.is_empty() {
            println!("  (free)");
        }
    }
    println!("Total: {}m in {} sessions", schedule.total_minutes(), schedule.session_count());
}

pub fn run(action: ScheduleAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = PlanDb::open()?;
    let config = Config::load_or_default();

    match action {
        ScheduleAction::Week { plan_id, date, regenerate, json } => {
            let plan_id = plan_id
                .or_else(|| config.default_plan.clone())
                .ok_or("no plan id given and no default plan configured")?;
            let reference = date.unwrap_or_else(|| Local::now().date_naive());

            let planner = WeekPlanner::new(&db, allocator_from_config(&config));
            let schedule = if regenerate {
                planner.regenerate(&plan_id, reference)?
            } else {
                planner.week_schedule(&plan_id, reference)?
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&schedule)?);
            } else {
                let names: HashMap<String, String> = db
                    .plan_subjects(&plan_id)?
                    .into_iter()
                    .map(|s| (s.id, s.name))
                    .collect();
                print_schedule(&schedule, &names);
            }
        }
        ScheduleAction::Preview { hours, date, json } => {
            let reference = date.unwrap_or_else(|| Local::now().date_naive());
            let start = studyplan_core::week_start(reference);
            let allocator = match hours {
                Some(h) => WeekAllocator::with_weekly_hours(h),
                None => allocator_from_config(&config),
            };

            let subjects = db.list_subjects()?;
            let schedule = allocator.allocate(&subjects, start);

            if json {
                println!("{}", serde_json::to_string_pretty(&schedule)?);
            } else {
                let names: HashMap<String, String> =
                    subjects.into_iter().map(|s| (s.id, s.name)).collect();
                print_schedule(&schedule, &names);
            }
        }
    }
    Ok(())
}
