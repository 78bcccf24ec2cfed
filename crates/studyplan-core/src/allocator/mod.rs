//! Weekly study-time allocation engine.
//!
//! Turns a set of weighted subjects and a weekly minute budget into a
//! Sunday-first 7-day schedule of study sessions:
//! - Splits the budget across subjects proportionally to weight
//! - Derives per-day minute targets, with the weekend absorbing rounding
//! - Greedily hands each day to the subjects with the most remaining time
//! - Cuts every grant into standard session lengths (60/50/30/25)
//! - Pools sub-session leftovers and redistributes them once at the end
//!
//! The allocator is a pure computation: no I/O, no shared state, and no
//! wall-clock dependence beyond the `is_today` day flag.

mod schedule;

pub use schedule::{week_start, DaySchedule, ScheduledSession, WeekSchedule};

use chrono::{Duration, Local, NaiveDate};

use crate::subject::Subject;

/// Standard session lengths in minutes, largest first.
pub const STANDARD_PERIODS: [i64; 4] = [60, 50, 30, 25];

/// Smallest emittable session length.
pub const MIN_SESSION_MINUTES: i64 = 25;

/// Default weekly budget: 28 hours.
pub const DEFAULT_WEEKLY_MINUTES: i64 = 28 * 60;

/// Allocator configuration.
#[derive(Debug, Clone)]
pub struct AllocatorConfig {
    /// Total minutes to distribute over the week.
    pub weekly_minutes: i64,
    /// Largest single grant to one subject within one day pass.
    pub max_block_minutes: i64,
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self {
            weekly_minutes: DEFAULT_WEEKLY_MINUTES,
            max_block_minutes: 120,
        }
    }
}

/// Per-subject working state for a single allocation run.
struct SubjectAllocation {
    subject_id: String,
    total_minutes: i64,
    remaining_minutes: i64,
}

/// Weekly schedule allocator.
pub struct WeekAllocator {
    config: AllocatorConfig,
}

impl WeekAllocator {
    /// Create an allocator with the default 28-hour budget.
    pub fn new() -> Self {
        Self::with_config(AllocatorConfig::default())
    }

    /// Create with custom config.
    ///
    /// A non-positive weekly budget falls back to the 28-hour default, so
    /// every constructed allocator has a usable budget.
    pub fn with_config(mut config: AllocatorConfig) -> Self {
        if config.weekly_minutes <= 0 {
            config.weekly_minutes = DEFAULT_WEEKLY_MINUTES;
        }
        if config.max_block_minutes < MIN_SESSION_MINUTES {
            config.max_block_minutes = MIN_SESSION_MINUTES;
        }
        Self { config }
    }

    /// Create an allocator for a weekly hour budget.
    pub fn with_weekly_hours(hours: i64) -> Self {
        Self::with_config(AllocatorConfig {
            weekly_minutes: hours * 60,
            ..AllocatorConfig::default()
        })
    }

    pub fn config(&self) -> &AllocatorConfig {
        &self.config
    }

    /// Generate the schedule for the week starting at `week_start`.
    ///
    /// `week_start` is expected to be Sunday-aligned (see [`week_start`]).
    /// Subjects with zero, negative, or non-finite weight are skipped. An
    /// empty subject list yields seven empty days. Never fails.
    pub fn allocate(&self, subjects: &[Subject], week_start: NaiveDate) -> WeekSchedule {
        let today = Local::now().date_naive();
        let mut days: Vec<DaySchedule> = (0..7)
            .map(|i| DaySchedule::new(week_start + Duration::days(i), today))
            .collect();

        let weekly_minutes = self.config.weekly_minutes;
        let mut allocations = proportional_split(subjects, weekly_minutes);
        if allocations.is_empty() {
            return WeekSchedule { week_start, days };
        }

        // Day-level coarse distribution: largest remaining subject first.
        let targets = daily_targets(weekly_minutes);
        let mut coarse: Vec<Vec<(usize, i64)>> = vec![Vec::new(); 7];
        for day in 0..7 {
            let mut day_remaining = targets[day];
            while day_remaining >= MIN_SESSION_MINUTES {
                let Some(pick) = largest_remaining(&allocations) else {
                    break;
                };
                let grant = allocations[pick]
                    .remaining_minutes
                    .min(day_remaining)
                    .min(self.config.max_block_minutes);
                allocations[pick].remaining_minutes -= grant;
                day_remaining -= grant;
                match coarse[day].iter_mut().find(|(idx, _)| *idx == pick) {
                    Some(entry) => entry.1 += grant,
                    None => coarse[day].push((pick, grant)),
                }
            }
        }

        // Fit each grant to standard periods; pool sub-session leftovers.
        let mut excess = vec![0i64; allocations.len()];
        for day in 0..7 {
            for &(idx, minutes) in &coarse[day] {
                let (periods, leftover) = fit_periods(minutes);
                for period in periods {
                    days[day].sessions.push(ScheduledSession {
                        subject_id: allocations[idx].subject_id.clone(),
                        minutes: period,
                    });
                }
                excess[idx] += leftover;
            }
        }

        // Redistribute pooled excess onto the emptiest day. Anything left
        // below the session floor after the fit is dropped.
        for (idx, &pool) in excess.iter().enumerate() {
            if pool < MIN_SESSION_MINUTES {
                continue;
            }
            let mut target_day = 0;
            for day in 1..7 {
                if days[day].sessions.len() < days[target_day].sessions.len() {
                    target_day = day;
                }
            }
            let (periods, _dropped) = fit_periods(pool);
            for period in periods {
                days[target_day].sessions.push(ScheduledSession {
                    subject_id: allocations[idx].subject_id.clone(),
                    minutes: period,
                });
            }
        }

        WeekSchedule { week_start, days }
    }
}

impl Default for WeekAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-day minute targets for a weekly budget, Sunday first.
///
/// Monday through Friday get `weekly / 7`; the division remainder goes to
/// the weekend, Sunday rounding up. The targets always sum to
/// `weekly_minutes` exactly.
pub fn daily_targets(weekly_minutes: i64) -> [i64; 7] {
    let base = weekly_minutes / 7;
    let excess = weekly_minutes - base * 7;
    let mut targets = [base; 7];
    targets[0] += (excess + 1) / 2;
    targets[6] += excess / 2;
    targets
}

/// Split the weekly budget across subjects proportionally to weight.
///
/// Only positive finite weights take part. Rounding drift lands on the
/// first valid subject, clamped at zero for degenerate budgets.
fn proportional_split(subjects: &[Subject], weekly_minutes: i64) -> Vec<SubjectAllocation> {
    let valid: Vec<&Subject> = subjects
        .iter()
        .filter(|s| s.weight.is_finite() && s.weight > 0.0)
        .collect();
    let total_weight: f64 = valid.iter().map(|s| s.weight).sum();
    if valid.is_empty() || total_weight <= 0.0 {
        return Vec::new();
    }

    let mut allocations: Vec<SubjectAllocation> = valid
        .iter()
        .map(|s| {
            let minutes = (s.weight / total_weight * weekly_minutes as f64).round() as i64;
            SubjectAllocation {
                subject_id: s.id.clone(),
                total_minutes: minutes,
                remaining_minutes: minutes,
            }
        })
        .collect();

    let assigned: i64 = allocations.iter().map(|a| a.total_minutes).sum();
    let drift = weekly_minutes - assigned;
    if let Some(first) = allocations.first_mut() {
        first.total_minutes = (first.total_minutes + drift).max(0);
        first.remaining_minutes = first.total_minutes;
    }
    allocations
}

/// Index of the allocation with the most remaining minutes, earliest on
/// ties. `None` when every subject is drained.
fn largest_remaining(allocations: &[SubjectAllocation]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, alloc) in allocations.iter().enumerate() {
        if alloc.remaining_minutes <= 0 {
            continue;
        }
        match best {
            Some(b) if allocations[b].remaining_minutes >= alloc.remaining_minutes => {}
            _ => best = Some(i),
        }
    }
    best
}

/// Cut `minutes` into standard periods, largest fitting period first.
///
/// Returns the emitted periods and the sub-session leftover (< 25).
fn fit_periods(minutes: i64) -> (Vec<i64>, i64) {
    let mut periods = Vec::new();
    let mut rest = minutes;
    while rest >= MIN_SESSION_MINUTES {
        match STANDARD_PERIODS.iter().copied().find(|&p| p <= rest) {
            Some(period) => {
                periods.push(period);
                rest -= period;
            }
            None => break,
        }
    }
    (periods, rest)
}
