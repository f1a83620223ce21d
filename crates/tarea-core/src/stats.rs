//! Aggregation: per-user statistics over derived tasks.
//!
//! Statistics are always recomputed from the full task set; nothing here is
//! updated incrementally.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::derive::{DerivedTask, TaskStatus};

/// Estimated study hours credited per completed task.
pub const STUDY_HOURS_PER_COMPLETED_TASK: usize = 2;

/// Dashboard summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
  /// Share of tasks completed, 0–100.
  pub completion_pct: u32,
  pub completed:      usize,
  pub pending:        usize,
  pub late:           usize,
}

/// Profile summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileStats {
  pub active_subjects: usize,
  pub completed:       usize,
  /// Share of tasks completed, 0–100.
  pub completion_pct:  u32,
  pub study_hours:     usize,
}

/// `round(100 * completed / total)`, rounding halves up. Zero when `total`
/// is zero.
pub fn completion_percentage(completed: usize, total: usize) -> u32 {
  if total == 0 {
    return 0;
  }
  let pct = (200 * completed + total) / (2 * total);
  u32::try_from(pct).unwrap_or(u32::MAX)
}

fn count(tasks: &[DerivedTask], status: TaskStatus) -> usize {
  tasks.iter().filter(|t| t.status == status).count()
}

/// Dashboard statistics.
pub fn aggregate(tasks: &[DerivedTask]) -> DashboardStats {
  let completed = count(tasks, TaskStatus::Completed);
  DashboardStats {
    completion_pct: completion_percentage(completed, tasks.len()),
    completed,
    pending: count(tasks, TaskStatus::Pending),
    late: count(tasks, TaskStatus::Late),
  }
}

/// Profile statistics.
pub fn profile_stats(tasks: &[DerivedTask]) -> ProfileStats {
  let completed = count(tasks, TaskStatus::Completed);
  let subjects: HashSet<_> = tasks.iter().filter_map(|t| t.subject_key.as_ref()).collect();

  ProfileStats {
    active_subjects: subjects.len(),
    completed,
    completion_pct: completion_percentage(completed, tasks.len()),
    study_hours: completed * STUDY_HOURS_PER_COMPLETED_TASK,
  }
}
