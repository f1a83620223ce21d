//! Search-screen filtering.
//!
//! Lateness here is judged at date granularity: a task is late when its due
//! date is strictly before today, whatever its due time. The dashboard
//! ([`crate::derive`]) compares at time-of-day precision instead; the two are
//! kept apart on purpose because each screen has always behaved that way.

use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
  derive::{DEFAULT_SUBJECT, DerivedTask, TaskStatus, resolve_subject},
  record::{RawTask, SubjectRecord},
};

// ─── Filter ──────────────────────────────────────────────────────────────────

/// Status filter offered by the search screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusFilter {
  #[default]
  #[serde(rename = "todas")]
  All,
  #[serde(rename = "pendiente")]
  Pending,
  #[serde(rename = "completada")]
  Completed,
  #[serde(rename = "atrasada")]
  Late,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown status filter: {0:?}")]
pub struct UnknownFilter(pub String);

impl FromStr for StatusFilter {
  type Err = UnknownFilter;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "todas" => Ok(Self::All),
      "pendiente" => Ok(Self::Pending),
      "completada" => Ok(Self::Completed),
      "atrasada" => Ok(Self::Late),
      other => Err(UnknownFilter(other.to_owned())),
    }
  }
}

impl fmt::Display for StatusFilter {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::All => "todas",
      Self::Pending => "pendiente",
      Self::Completed => "completada",
      Self::Late => "atrasada",
    })
  }
}

// ─── Searchable ──────────────────────────────────────────────────────────────

/// What the query engine needs to know about a task.
pub trait Searchable {
  fn is_completed(&self) -> bool;
  fn due_date(&self) -> Option<NaiveDate>;
  fn title(&self) -> &str;
  fn subject_name(&self) -> Option<&str>;
  fn description(&self) -> &str;
}

/// Not completed and due strictly before `today`.
pub fn is_late_on<T: Searchable + ?Sized>(task: &T, today: NaiveDate) -> bool {
  !task.is_completed() && task.due_date().is_some_and(|due| due < today)
}

/// Status at date granularity.
pub fn date_status<T: Searchable + ?Sized>(task: &T, today: NaiveDate) -> TaskStatus {
  if task.is_completed() {
    TaskStatus::Completed
  } else if is_late_on(task, today) {
    TaskStatus::Late
  } else {
    TaskStatus::Pending
  }
}

pub fn matches_filter<T: Searchable + ?Sized>(
  task: &T,
  filter: StatusFilter,
  today: NaiveDate,
) -> bool {
  match filter {
    StatusFilter::All => true,
    StatusFilter::Completed => task.is_completed(),
    StatusFilter::Pending => date_status(task, today) == TaskStatus::Pending,
    StatusFilter::Late => is_late_on(task, today),
  }
}

/// Case-insensitive substring match over title, subject name and
/// description. `needle` must already be lowercase.
pub fn matches_term<T: Searchable + ?Sized>(task: &T, needle: &str) -> bool {
  task.title().to_lowercase().contains(needle)
    || task
      .subject_name()
      .is_some_and(|s| s.to_lowercase().contains(needle))
    || task.description().to_lowercase().contains(needle)
}

/// Apply the status filter, then the free-text term. A blank term matches
/// everything. Input order is preserved; the input is not modified.
pub fn search<T: Searchable + Clone>(
  tasks: &[T],
  filter: StatusFilter,
  term: &str,
  today: NaiveDate,
) -> Vec<T> {
  let needle = term.trim().to_lowercase();
  tasks
    .iter()
    .filter(|t| matches_filter(*t, filter, today))
    .filter(|t| needle.is_empty() || matches_term(*t, &needle))
    .cloned()
    .collect()
}

// ─── Enriched task ───────────────────────────────────────────────────────────

/// A raw task joined with its subject, as listed by the search screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedTask {
  pub task:          RawTask,
  /// Name from the subject collection; `None` when no subject matches.
  pub subject_name:  Option<String>,
  pub subject_color: Option<String>,
  /// Status at date granularity.
  pub status:        TaskStatus,
}

/// Join each task with the subject collection.
pub fn enrich(
  tasks: &[RawTask],
  subjects: &[SubjectRecord],
  today: NaiveDate,
) -> Vec<EnrichedTask> {
  tasks
    .iter()
    .map(|task| {
      let subject = resolve_subject(subjects, task);
      let mut enriched = EnrichedTask {
        task:          task.clone(),
        subject_name:  subject.map(|s| s.name.clone()),
        subject_color: subject.map(|s| s.color.clone()),
        status:        TaskStatus::Pending,
      };
      enriched.status = date_status(&enriched, today);
      enriched
    })
    .collect()
}

impl Searchable for EnrichedTask {
  fn is_completed(&self) -> bool { self.task.completed }

  fn due_date(&self) -> Option<NaiveDate> { self.task.due_date() }

  fn title(&self) -> &str { &self.task.title }

  fn subject_name(&self) -> Option<&str> { self.subject_name.as_deref() }

  fn description(&self) -> &str { &self.task.description }
}

impl Searchable for DerivedTask {
  fn is_completed(&self) -> bool { self.status == TaskStatus::Completed }

  fn due_date(&self) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(self.due_date.trim(), "%Y-%m-%d").ok()
  }

  fn title(&self) -> &str { &self.name }

  /// The placeholder label of an unresolved subject is not searchable.
  fn subject_name(&self) -> Option<&str> {
    Some(self.subject.as_str()).filter(|s| *s != DEFAULT_SUBJECT)
  }

  fn description(&self) -> &str { &self.description }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn today() -> NaiveDate { NaiveDate::from_ymd_opt(2025, 6, 10).unwrap() }

  fn raw(id: i64, title: &str, due: &str, time: Option<&str>, completed: bool) -> RawTask {
    serde_json::from_value(json!({
      "id": id,
      "titulo": title,
      "materiaId": 1,
      "descripcion": format!("notes for {title}"),
      "fechaEntrega": due,
      "horaEntrega": time,
      "prioridad": "media",
      "completada": completed,
    }))
    .unwrap()
  }

  fn subjects() -> Vec<SubjectRecord> {
    vec![SubjectRecord { id: 1, name: "Matemáticas".into(), color: "#00f".into(), ..Default::default() }]
  }

  fn fixture() -> Vec<EnrichedTask> {
    let tasks = vec![
      raw(1, "Ejercicios de algebra", "2025-06-09", Some("23:59"), false),
      raw(2, "Ensayo", "2025-06-10", Some("00:01"), false),
      raw(3, "Lectura", "2025-06-01", None, true),
      raw(4, "Proyecto", "2025-06-20", None, false),
      raw(5, "ALGEBRA lineal", "2025-05-01", None, true),
    ];
    enrich(&tasks, &subjects(), today())
  }

  fn ids(tasks: &[EnrichedTask]) -> Vec<i64> { tasks.iter().map(|t| t.task.id).collect() }

  #[test]
  fn parse_filter() {
    assert_eq!("atrasada".parse::<StatusFilter>(), Ok(StatusFilter::Late));
    assert_eq!("todas".parse::<StatusFilter>(), Ok(StatusFilter::All));
    assert!("overdue".parse::<StatusFilter>().is_err());
    assert_eq!(StatusFilter::Pending.to_string(), "pendiente");
  }

  #[test]
  fn all_with_blank_term_is_identity() {
    let tasks = fixture();
    assert_eq!(search(&tasks, StatusFilter::All, "   ", today()), tasks);
  }

  #[test]
  fn late_uses_date_only_cutoff() {
    // Task 2 is due today at 00:01, which has passed at any time of day
    // after midnight, but the date-only cutoff does not count it as late.
    let late = search(&fixture(), StatusFilter::Late, "", today());
    assert_eq!(ids(&late), [1]);
  }

  #[test]
  fn pending_excludes_late_and_completed() {
    let pending = search(&fixture(), StatusFilter::Pending, "", today());
    assert_eq!(ids(&pending), [2, 4]);
  }

  #[test]
  fn completed_filter() {
    let done = search(&fixture(), StatusFilter::Completed, "", today());
    assert_eq!(ids(&done), [3, 5]);
  }

  #[test]
  fn term_matches_case_insensitively_within_filter() {
    assert_eq!(ids(&search(&fixture(), StatusFilter::All, "algebra", today())), [1, 5]);
    assert_eq!(ids(&search(&fixture(), StatusFilter::Completed, "Algebra", today())), [5]);
  }

  #[test]
  fn term_matches_subject_and_description() {
    assert_eq!(search(&fixture(), StatusFilter::All, "matemát", today()).len(), 5);
    assert_eq!(ids(&search(&fixture(), StatusFilter::All, "notes for ensayo", today())), [2]);
  }

  #[test]
  fn unresolved_subject_is_not_searched() {
    let mut task = raw(9, "Tarea", "2025-07-01", None, false);
    task.subject_id = json!(42);
    task.subject_name = Some("Matemáticas".into());
    let tasks = enrich(&[task], &subjects(), today());

    assert_eq!(tasks[0].subject_name, None);
    assert!(search(&tasks, StatusFilter::All, "matem", today()).is_empty());
  }

  #[test]
  fn enrich_resolves_subject_and_date_status() {
    let tasks = fixture();
    assert_eq!(tasks[0].subject_name.as_deref(), Some("Matemáticas"));
    assert_eq!(tasks[0].subject_color.as_deref(), Some("#00f"));
    assert_eq!(tasks[0].status, TaskStatus::Late);
    assert_eq!(tasks[1].status, TaskStatus::Pending);
    assert_eq!(tasks[2].status, TaskStatus::Completed);
  }

  #[test]
  fn search_works_over_derived_tasks() {
    let now = today().and_hms_opt(12, 0, 0).unwrap();
    let raws: Vec<_> = fixture().into_iter().map(|e| e.task).collect();
    let derived = crate::derive::derive_all(&raws, &subjects(), now);

    let late: Vec<_> = search(&derived, StatusFilter::Late, "", today())
      .iter()
      .map(|d| d.id)
      .collect();
    assert_eq!(late, [1]);

    let by_term = |term: &str| -> Vec<i64> {
      search(&derived, StatusFilter::All, term, today()).iter().map(|d| d.id).collect()
    };
    assert_eq!(by_term("notes for ensayo"), [2]);
    assert_eq!(by_term("matemát").len(), 5);
  }

  #[test]
  fn derived_and_enriched_searches_agree() {
    let mut orphan = raw(9, "Tarea suelta", "2025-07-01", None, false);
    orphan.subject_id = json!(42);
    orphan.description = "repasar algebra".into();
    let now = today().and_hms_opt(12, 0, 0).unwrap();

    let derived = crate::derive::derive_all(&[orphan.clone()], &subjects(), now);
    let enriched = enrich(&[orphan], &subjects(), today());

    for term in ["algebra", "general", "suelta"] {
      assert_eq!(
        search(&derived, StatusFilter::All, term, today()).len(),
        search(&enriched, StatusFilter::All, term, today()).len(),
        "term {term:?}"
      );
    }
    assert_eq!(search(&derived, StatusFilter::All, "algebra", today()).len(), 1);
    assert!(search(&derived, StatusFilter::All, "general", today()).is_empty());
  }
}
