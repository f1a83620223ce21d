//! Help requests raised from the dashboard on a task that needs help.
//!
//! A request names a task and a kind of help; the answer is a fixed guidance
//! message built around the task and its subject, addressed to the signed-in
//! user.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::{
  Error, Rejection, Result,
  derive::{DerivedTask, derive_all},
  identity::MatchMode,
  store::Snapshot,
};

/// Addressee used when the session carries no identifier.
pub const FALLBACK_RECIPIENT: &str = "correo@ejemplo.com";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HelpKind {
  #[default]
  #[serde(rename = "explicacion")]
  Explanation,
  #[serde(rename = "revision")]
  Review,
  #[serde(rename = "organizacion")]
  Organization,
  #[serde(rename = "recursos")]
  Resources,
}

impl HelpKind {
  pub const ALL: [Self; 4] = [Self::Explanation, Self::Review, Self::Organization, Self::Resources];

  pub fn label(self) -> &'static str {
    match self {
      Self::Explanation => "Explicación del tema",
      Self::Review => "Revisión de mi trabajo",
      Self::Organization => "Ayuda con organización",
      Self::Resources => "Recursos adicionales",
    }
  }
}

impl fmt::Display for HelpKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.label()) }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HelpRequest {
  pub task_id: i64,
  #[serde(default)]
  pub kind:    HelpKind,
  pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HelpResource {
  pub title:     String,
  /// A URL or a bibliographic pointer.
  pub reference: String,
}

/// The guidance sent back for a help request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HelpGuidance {
  pub recipient: String,
  pub subject:   String,
  pub task_id:   i64,
  pub kind:      HelpKind,
  pub steps:     Vec<String>,
  pub resources: Vec<HelpResource>,
  /// The full message as it would be mailed.
  pub body:      String,
}

fn guidance_for(task: &DerivedTask, kind: HelpKind, message: &str, recipient: &str) -> HelpGuidance {
  let steps = vec![
    format!("Revisa los conceptos fundamentales de {}.", task.subject),
    "Divide el problema en pasos más pequeños.".to_owned(),
    "Intenta resolver un ejercicio similar (Ejemplo #4 del libro).".to_owned(),
  ];
  let resources = vec![
    HelpResource {
      title:     "Video Complementario".to_owned(),
      reference: "https://youtube.com/watch?v=ejemplo".to_owned(),
    },
    HelpResource {
      title:     "Lectura".to_owned(),
      reference: "Capítulo 4, Sección 2.".to_owned(),
    },
  ];

  let mut body = format!(
    "Hola,\n\nHemos analizado tu dificultad con: \"{message}\"\nTipo de ayuda: {kind}\n\nGUÍA \
     SUGERIDA:\n"
  );
  for (n, step) in steps.iter().enumerate() {
    body.push_str(&format!("{}. {step}\n", n + 1));
  }
  body.push_str("\nRECURSOS RECOMENDADOS:\n");
  for resource in &resources {
    body.push_str(&format!("- {}: {}\n", resource.title, resource.reference));
  }
  body.push_str("\nAtte,\nTu Asistente Virtual\n");

  HelpGuidance {
    recipient: recipient.to_owned(),
    subject: format!("Ayuda IA para la tarea: {}", task.name),
    task_id: task.id,
    kind,
    steps,
    resources,
    body,
  }
}

/// Build the guidance for a help request on one of the signed-in user's
/// tasks.
pub fn request_help(
  snapshot: &Snapshot,
  request: &HelpRequest,
  now: NaiveDateTime,
) -> Result<HelpGuidance> {
  let message = request.message.trim();
  if message.is_empty() {
    return Err(Rejection::MissingMessage.into());
  }

  let user = snapshot.active_user(MatchMode::Exact)?;
  let tasks = derive_all(&user.tasks(), &snapshot.subjects, now);
  let task = tasks
    .iter()
    .find(|t| t.id == request.task_id)
    .ok_or(Error::TaskNotFound(request.task_id))?;

  let recipient = snapshot.active_identifier().unwrap_or(FALLBACK_RECIPIENT);
  let guidance = guidance_for(task, request.kind, message, recipient);
  tracing::info!(
    task = task.id,
    kind = request.kind.label(),
    needs_help = task.needs_help,
    recipient,
    "help request processed"
  );
  Ok(guidance)
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;
  use serde_json::json;

  use super::*;
  use crate::record::{Session, SubjectRecord, UserRecord};

  fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 6, 1).unwrap().and_hms_opt(9, 0, 0).unwrap()
  }

  fn snapshot() -> Snapshot {
    let users: Vec<UserRecord> = serde_json::from_value(json!([{
      "usuario": "ana",
      "email": "ana@example.com",
      "tareas": [
        { "id": 1, "titulo": "Ensayo", "materiaId": 3, "prioridad": "alta" },
        { "id": 2, "titulo": "Suelta", "materiaId": 99 }
      ]
    }]))
    .unwrap();
    Snapshot {
      users,
      session: Some(Session {
        login: Some("ana".into()),
        email: Some("ana@example.com".into()),
        ..Default::default()
      }),
      subjects: vec![SubjectRecord { id: 3, name: "Historia".into(), ..Default::default() }],
    }
  }

  fn request(task_id: i64, message: &str) -> HelpRequest {
    HelpRequest { task_id, kind: HelpKind::Review, message: message.into() }
  }

  #[test]
  fn guidance_names_task_and_subject() {
    let guidance = request_help(&snapshot(), &request(1, "no entiendo el tema"), now()).unwrap();
    assert_eq!(guidance.recipient, "ana");
    assert_eq!(guidance.subject, "Ayuda IA para la tarea: Ensayo");
    assert_eq!(guidance.steps[0], "Revisa los conceptos fundamentales de Historia.");
    assert_eq!(guidance.resources.len(), 2);
    assert!(guidance.body.contains("\"no entiendo el tema\""));
    assert!(guidance.body.contains("Revisión de mi trabajo"));
  }

  #[test]
  fn unresolved_subject_uses_default_label() {
    let guidance = request_help(&snapshot(), &request(2, "ayuda"), now()).unwrap();
    assert_eq!(guidance.steps[0], "Revisa los conceptos fundamentales de General.");
  }

  #[test]
  fn blank_message_is_rejected_first() {
    let err = request_help(&snapshot(), &request(404, "   "), now()).unwrap_err();
    assert!(matches!(err, Error::Rejected(Rejection::MissingMessage)));
  }

  #[test]
  fn unknown_task() {
    let err = request_help(&snapshot(), &request(404, "hola"), now()).unwrap_err();
    assert!(matches!(err, Error::TaskNotFound(404)));
  }

  #[test]
  fn kind_defaults_to_explanation() {
    let req: HelpRequest = serde_json::from_value(json!({ "task_id": 1, "message": "x" })).unwrap();
    assert_eq!(req.kind, HelpKind::Explanation);
    let req: HelpRequest =
      serde_json::from_value(json!({ "task_id": 1, "kind": "organizacion", "message": "x" })).unwrap();
    assert_eq!(req.kind, HelpKind::Organization);
    assert_eq!(HelpKind::ALL.len(), 4);
  }
}
