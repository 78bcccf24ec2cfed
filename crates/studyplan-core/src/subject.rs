//! Subject, study-plan, and topic record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A study subject with a relative priority weight.
///
/// The allocator reads only `id` and `weight`; everything else is display
/// metadata carried along for callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    pub id: String,
    pub name: String,
    pub color: Option<String>,
    /// Relative priority. Only positive finite weights take part in
    /// allocation; there is no upper bound.
    pub weight: f64,
    pub created_at: DateTime<Utc>,
}

impl Subject {
    /// Create a new subject with a fresh id.
    pub fn new(name: impl Into<String>, weight: f64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            color: None,
            weight,
            created_at: Utc::now(),
        }
    }
}

/// A study plan grouping a set of subjects.
///
/// Schedules are generated per plan; the plan's subject list is the input
/// to the allocator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyPlan {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub subject_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl StudyPlan {
    /// Create a new plan with a fresh id.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            description: None,
            subject_ids: Vec::new(),
            created_at: Utc::now(),
        }
    }
}

/// A topic within a subject.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topic {
    pub id: String,
    pub subject_id: String,
    pub title: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl Topic {
    /// Create a new topic under a subject.
    pub fn new(subject_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            subject_id: subject_id.into(),
            title: title.into(),
            completed: false,
            created_at: Utc::now(),
        }
    }
}
