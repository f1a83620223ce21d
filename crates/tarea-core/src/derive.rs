//! Task derivation: raw task plus "now" to the dashboard view model.
//!
//! The derived model is never stored. It is a pure function of the raw task,
//! the subject collection and the supplied instant, and is recomputed on every
//! read so that a change to the completion flag shows up immediately.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::record::{Priority, RawTask, SubjectKey, SubjectRecord};

/// Label shown for tasks whose subject cannot be resolved.
pub const DEFAULT_SUBJECT: &str = "General";

// ─── Status ──────────────────────────────────────────────────────────────────

/// Computed task status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
  #[serde(rename = "completada")]
  Completed,
  #[serde(rename = "pendiente")]
  Pending,
  #[serde(rename = "atrasada")]
  Late,
}

impl TaskStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Completed => "completada",
      Self::Pending => "pendiente",
      Self::Late => "atrasada",
    }
  }
}

/// Status at time-of-day precision.
///
/// Completion wins over lateness; a task is late only when its due date and
/// time lie strictly before `now`. A task without a readable due date is
/// never late.
pub fn status_at(task: &RawTask, now: NaiveDateTime) -> TaskStatus {
  if task.completed {
    TaskStatus::Completed
  } else if task.due_at().is_some_and(|due| due < now) {
    TaskStatus::Late
  } else {
    TaskStatus::Pending
  }
}

/// High-priority work that is still open, or anything late.
pub fn needs_help(priority: &Priority, completed: bool, status: TaskStatus) -> bool {
  (priority.is_high() && !completed) || status == TaskStatus::Late
}

/// Look up the task's subject in the collection by numeric id.
pub fn resolve_subject<'a>(
  subjects: &'a [SubjectRecord],
  task: &RawTask,
) -> Option<&'a SubjectRecord> {
  let id = task.subject_number()?;
  subjects.iter().find(|s| s.id == id)
}

// ─── Derived task ────────────────────────────────────────────────────────────

/// The dashboard's view of a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedTask {
  pub id:          i64,
  pub name:        String,
  pub description: String,
  /// Resolved subject name, or [`DEFAULT_SUBJECT`].
  pub subject:     String,
  pub subject_key: Option<SubjectKey>,
  pub due_date:    String,
  /// There is no grading; always zero.
  pub grade:       u8,
  pub status:      TaskStatus,
  pub priority:    Priority,
  pub needs_help:  bool,
}

/// Derive a single task.
pub fn derive(task: &RawTask, subjects: &[SubjectRecord], now: NaiveDateTime) -> DerivedTask {
  let status = status_at(task, now);
  let subject = resolve_subject(subjects, task)
    .map(|s| s.name.clone())
    .unwrap_or_else(|| DEFAULT_SUBJECT.to_owned());

  DerivedTask {
    id: task.id,
    name: task.title.clone(),
    description: task.description.clone(),
    subject,
    subject_key: task.subject_key(),
    due_date: task.due_date.clone(),
    grade: 0,
    status,
    priority: task.priority.clone(),
    needs_help: needs_help(&task.priority, task.completed, status),
  }
}

/// Derive every task and order the result by priority.
pub fn derive_all(
  tasks: &[RawTask],
  subjects: &[SubjectRecord],
  now: NaiveDateTime,
) -> Vec<DerivedTask> {
  let mut derived: Vec<_> = tasks.iter().map(|t| derive(t, subjects, now)).collect();
  sort_by_priority(&mut derived);
  derived
}

/// Order by priority rank (`alta`, `media`, `baja`, then anything else).
/// Equal priorities keep their input order.
pub fn sort_by_priority(tasks: &mut [DerivedTask]) {
  // `sort_by_key` is stable.
  tasks.sort_by_key(|t| t.priority.rank());
}
