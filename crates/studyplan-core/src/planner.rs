//! Plan-level schedule generation with a persistent week cache.
//!
//! Schedules are generated once per `(plan, week)` pair and stored. A week
//! that was already generated is returned verbatim even if subjects or
//! weights changed since; regeneration is an explicit action.

use chrono::NaiveDate;

use crate::allocator::{week_start, WeekAllocator, WeekSchedule};
use crate::error::{CoreError, DatabaseError};
use crate::storage::PlanDb;

/// Generates and caches weekly schedules for stored plans.
pub struct WeekPlanner<'a> {
    db: &'a PlanDb,
    allocator: WeekAllocator,
}

impl<'a> WeekPlanner<'a> {
    pub fn new(db: &'a PlanDb, allocator: WeekAllocator) -> Self {
        Self { db, allocator }
    }

    /// Schedule for the week containing `reference`, from cache when present.
    ///
    /// A corrupt or unreadable cache entry falls back to regeneration. The
    /// freshly generated schedule is saved best-effort: a cache write failure
    /// is logged, not returned.
    ///
    /// # Errors
    /// Returns an error if the plan does not exist or its subjects cannot be
    /// loaded.
    pub fn week_schedule(
        &self,
        plan_id: &str,
        reference: NaiveDate,
    ) -> Result<WeekSchedule, CoreError> {
        let start = week_start(reference);

        match self.db.get_week_schedule(plan_id, start) {
            Ok(Some(cached)) => return Ok(cached),
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(plan_id, %start, error = %err, "schedule cache read failed, regenerating");
            }
        }

        self.generate(plan_id, start)
    }

    /// Regenerate the week containing `reference`, discarding any cache entry.
    pub fn regenerate(
        &self,
        plan_id: &str,
        reference: NaiveDate,
    ) -> Result<WeekSchedule, CoreError> {
        let start = week_start(reference);
        self.db
            .delete_week_schedule(plan_id, start)
            .map_err(DatabaseError::from)?;
        self.generate(plan_id, start)
    }

    fn generate(&self, plan_id: &str, start: NaiveDate) -> Result<WeekSchedule, CoreError> {
        let plan = self
            .db
            .get_plan(plan_id)
            .map_err(DatabaseError::from)?
            .ok_or_else(|| DatabaseError::NotFound {
                entity: "plan",
                id: plan_id.to_string(),
            })?;

        let subjects = self.db.plan_subjects(&plan.id).map_err(DatabaseError::from)?;
        let schedule = self.allocator.allocate(&subjects, start);

        if let Err(err) = self.db.put_week_schedule(plan_id, start, &schedule) {
            tracing::warn!(plan_id, %start, error = %err, "failed to cache week schedule");
        }

        Ok(schedule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subject::{StudyPlan, Subject};

    fn sunday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 23).unwrap()
    }

    fn seeded_plan(db: &PlanDb, weights: &[f64]) -> StudyPlan {
        let mut plan = StudyPlan::new("plan");
        for (i, &w) in weights.iter().enumerate() {
            let subject = Subject::new(format!("subject-{i}"), w);
            db.create_subject(&subject).unwrap();
            plan.subject_ids.push(subject.id.clone());
        }
        db.create_plan(&plan).unwrap();
        plan
    }

    #[test]
    fn generates_and_caches_schedule() {
        let db = PlanDb::open_memory().unwrap();
        let plan = seeded_plan(&db, &[1.0]);
        let planner = WeekPlanner::new(&db, WeekAllocator::new());

        let schedule = planner.week_schedule(&plan.id, sunday()).unwrap();
        assert_eq!(schedule.week_start, sunday());
        assert_eq!(schedule.days.len(), 7);

        let cached = db.get_week_schedule(&plan.id, sunday()).unwrap();
        assert_eq!(cached, Some(schedule));
    }

    #[test]
    fn any_day_of_the_week_maps_to_the_same_schedule() {
        let db = PlanDb::open_memory().unwrap();
        let plan = seeded_plan(&db, &[2.0, 1.0]);
        let planner = WeekPlanner::new(&db, WeekAllocator::new());

        let from_sunday = planner.week_schedule(&plan.id, sunday()).unwrap();
        let from_thursday = planner
            .week_schedule(&plan.id, sunday() + chrono::Duration::days(4))
            .unwrap();
        assert_eq!(from_sunday, from_thursday);
    }

    #[test]
    fn cached_schedule_survives_subject_changes() {
        let db = PlanDb::open_memory().unwrap();
        let plan = seeded_plan(&db, &[1.0]);
        let planner = WeekPlanner::new(&db, WeekAllocator::new());

        let original = planner.week_schedule(&plan.id, sunday()).unwrap();

        let mut subject = db.plan_subjects(&plan.id).unwrap().remove(0);
        subject.weight = 9.0;
        db.update_subject(&subject).unwrap();

        let reloaded = planner.week_schedule(&plan.id, sunday()).unwrap();
        assert_eq!(reloaded, original);
    }

    #[test]
    fn regenerate_discards_cache() {
        let db = PlanDb::open_memory().unwrap();
        let plan = seeded_plan(&db, &[1.0, 1.0]);
        let planner = WeekPlanner::new(&db, WeekAllocator::new());

        let original = planner.week_schedule(&plan.id, sunday()).unwrap();

        let late = Subject::new("added later", 5.0);
        db.create_subject(&late).unwrap();
        let mut ids = db
            .plan_subjects(&plan.id)
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect::<Vec<_>>();
        ids.push(late.id.clone());
        db.set_plan_subjects(&plan.id, &ids).unwrap();

        let regenerated = planner.regenerate(&plan.id, sunday()).unwrap();
        assert_ne!(regenerated, original);
        assert!(regenerated.subject_minutes(&late.id) > 0);
    }

    #[test]
    fn missing_plan_is_an_error() {
        let db = PlanDb::open_memory().unwrap();
        let planner = WeekPlanner::new(&db, WeekAllocator::new());
        let result = planner.week_schedule("nope", sunday());
        assert!(result.is_err());
    }

    #[test]
    fn plan_without_subjects_yields_empty_week() {
        let db = PlanDb::open_memory().unwrap();
        let plan = seeded_plan(&db, &[]);
        let planner = WeekPlanner::new(&db, WeekAllocator::new());

        let schedule = planner.week_schedule(&plan.id, sunday()).unwrap();
        assert_eq!(schedule.session_count(), 0);
        assert_eq!(schedule.days.len(), 7);
    }
}
