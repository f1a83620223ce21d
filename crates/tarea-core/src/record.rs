//! Stored records: users, subjects, tasks and the active session.
//!
//! Records are written by flows outside this crate and arrive loosely typed:
//! numbers where strings are expected, missing fields, truthy strings in
//! place of booleans. Every field here tolerates that. Fields we do not model
//! are kept in `extra` so that rewriting a record never drops data.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

// ─── Priority ────────────────────────────────────────────────────────────────

/// Task priority as stored (`alta` | `media` | `baja`).
///
/// Anything else is carried through untouched as [`Priority::Other`] and
/// ranks after `baja`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "Value")]
pub enum Priority {
  High,
  Medium,
  Low,
  Other(String),
}

impl Priority {
  /// Sort rank: `alta=1, media=2, baja=3`, unrecognised values 4.
  pub fn rank(&self) -> u8 {
    match self {
      Self::High => 1,
      Self::Medium => 2,
      Self::Low => 3,
      Self::Other(_) => 4,
    }
  }

  pub fn is_high(&self) -> bool { matches!(self, Self::High) }

  pub fn as_str(&self) -> &str {
    match self {
      Self::High => "alta",
      Self::Medium => "media",
      Self::Low => "baja",
      Self::Other(s) => s,
    }
  }

  /// True when the record carried no priority at all.
  pub fn is_unset(&self) -> bool { matches!(self, Self::Other(s) if s.is_empty()) }
}

impl Default for Priority {
  fn default() -> Self { Self::Other(String::new()) }
}

impl From<Value> for Priority {
  fn from(value: Value) -> Self {
    match value {
      Value::String(s) => match s.as_str() {
        "alta" => Self::High,
        "media" => Self::Medium,
        "baja" => Self::Low,
        _ => Self::Other(s),
      },
      Value::Null => Self::default(),
      other => Self::Other(other.to_string()),
    }
  }
}

impl Serialize for Priority {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(self.as_str())
  }
}

// ─── Subject key ─────────────────────────────────────────────────────────────

/// What identifies "the same subject" across a user's tasks: the numeric
/// subject id, or the cached subject name when the task has no usable id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubjectKey {
  Id(i64),
  Name(String),
}

// ─── Task ────────────────────────────────────────────────────────────────────

/// A task exactly as stored inside its owning user's `tareas` list.
///
/// This is the single source of truth; status and urgency are derived from it
/// on every read (see [`crate::derive`]).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTask {
  #[serde(default, deserialize_with = "lenient::integer")]
  pub id:              i64,
  #[serde(rename = "titulo", default, deserialize_with = "lenient::text")]
  pub title:           String,
  /// Weak reference into the subject collection. Usually a number, sometimes
  /// a numeric string; see [`RawTask::subject_number`].
  #[serde(rename = "materiaId", default, skip_serializing_if = "Value::is_null")]
  pub subject_id:      Value,
  /// Subject name cached on the task when it was created.
  #[serde(
    rename = "materiaNombre",
    default,
    deserialize_with = "lenient::opt_text",
    skip_serializing_if = "Option::is_none"
  )]
  pub subject_name:    Option<String>,
  #[serde(
    rename = "materiaColor",
    default,
    deserialize_with = "lenient::opt_text",
    skip_serializing_if = "Option::is_none"
  )]
  pub subject_color:   Option<String>,
  #[serde(rename = "descripcion", default, deserialize_with = "lenient::text")]
  pub description:     String,
  /// Calendar date, `YYYY-MM-DD`.
  #[serde(rename = "fechaEntrega", default, deserialize_with = "lenient::text")]
  pub due_date:        String,
  /// `HH:MM` or `HH:MM:SS`; end of day when absent.
  #[serde(
    rename = "horaEntrega",
    default,
    deserialize_with = "lenient::opt_text",
    skip_serializing_if = "Option::is_none"
  )]
  pub due_time:        Option<String>,
  #[serde(rename = "prioridad", default, skip_serializing_if = "Priority::is_unset")]
  pub priority:        Priority,
  #[serde(rename = "completada", default, deserialize_with = "lenient::truthy")]
  pub completed:       bool,
  /// Attachment payload (usually a data URL). Never echoed back out.
  #[serde(
    rename = "archivoAdjunto",
    default,
    deserialize_with = "lenient::opt_text",
    skip_serializing
  )]
  pub attachment_data: Option<String>,
  #[serde(
    rename = "nombreArchivo",
    default,
    deserialize_with = "lenient::opt_text",
    skip_serializing_if = "Option::is_none"
  )]
  pub attachment_name: Option<String>,
  #[serde(
    rename = "tipoArchivo",
    default,
    deserialize_with = "lenient::opt_text",
    skip_serializing_if = "Option::is_none"
  )]
  pub attachment_type: Option<String>,
  #[serde(
    rename = "fechaCreacion",
    default,
    deserialize_with = "lenient::opt_timestamp",
    skip_serializing_if = "Option::is_none"
  )]
  pub created_at:      Option<DateTime<Utc>>,
}

/// Due time assumed when a task has none.
pub fn default_due_time() -> NaiveTime {
  NaiveTime::from_hms_opt(23, 59, 0).unwrap_or(NaiveTime::MIN)
}

impl RawTask {
  /// The due date, or `None` when the stored text is not a valid date.
  pub fn due_date(&self) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(self.due_date.trim(), "%Y-%m-%d").ok()
  }

  /// The due time of day. Blank or unparseable times fall back to
  /// [`default_due_time`].
  pub fn due_time(&self) -> NaiveTime {
    let Some(raw) = self.due_time.as_deref().map(str::trim).filter(|t| !t.is_empty())
    else {
      return default_due_time();
    };
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
      .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
      .unwrap_or_else(|_| default_due_time())
  }

  /// Due date combined with due time.
  pub fn due_at(&self) -> Option<NaiveDateTime> {
    self.due_date().map(|d| d.and_time(self.due_time()))
  }

  /// The subject reference coerced to a numeric key.
  pub fn subject_number(&self) -> Option<i64> { lenient::as_integer(&self.subject_id) }

  /// Key used to count distinct subjects: a non-zero id, else the cached
  /// subject name. `None` when the task references no subject.
  pub fn subject_key(&self) -> Option<SubjectKey> {
    if let Some(id) = self.subject_number().filter(|id| *id != 0) {
      return Some(SubjectKey::Id(id));
    }
    self
      .subject_name
      .as_deref()
      .filter(|n| !n.is_empty())
      .map(|n| SubjectKey::Name(n.to_owned()))
  }

  pub fn has_attachment(&self) -> bool {
    self.attachment_data.as_deref().is_some_and(|d| !d.is_empty())
  }
}

// ─── Subject ─────────────────────────────────────────────────────────────────

/// An entry of the independent `subjects` collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubjectRecord {
  #[serde(default, deserialize_with = "lenient::integer")]
  pub id:    i64,
  #[serde(rename = "nombre", default, deserialize_with = "lenient::text")]
  pub name:  String,
  #[serde(default, deserialize_with = "lenient::text")]
  pub color: String,
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

// ─── User ────────────────────────────────────────────────────────────────────

/// A registered user with their embedded task list.
///
/// The identifier lives under either `email` or `correo` (historical aliases
/// of the same value); `usuario` is the login identifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
  #[serde(default, deserialize_with = "lenient::opt_text", skip_serializing_if = "Option::is_none")]
  pub email:      Option<String>,
  #[serde(default, deserialize_with = "lenient::opt_text", skip_serializing_if = "Option::is_none")]
  pub correo:     Option<String>,
  #[serde(
    rename = "usuario",
    default,
    deserialize_with = "lenient::opt_text",
    skip_serializing_if = "Option::is_none"
  )]
  pub login:      Option<String>,
  #[serde(
    rename = "nombre",
    default,
    deserialize_with = "lenient::opt_text",
    skip_serializing_if = "Option::is_none"
  )]
  pub name:       Option<String>,
  #[serde(
    rename = "apellido",
    default,
    deserialize_with = "lenient::opt_text",
    skip_serializing_if = "Option::is_none"
  )]
  pub surname:    Option<String>,
  #[serde(
    rename = "telefono",
    default,
    deserialize_with = "lenient::opt_text",
    skip_serializing_if = "Option::is_none"
  )]
  pub phone:      Option<String>,
  #[serde(
    rename = "direccion",
    default,
    deserialize_with = "lenient::opt_text",
    skip_serializing_if = "Option::is_none"
  )]
  pub address:    Option<String>,
  #[serde(
    rename = "fechaNacimiento",
    default,
    deserialize_with = "lenient::opt_text",
    skip_serializing_if = "Option::is_none"
  )]
  pub birth_date: Option<String>,
  #[serde(
    rename = "carrera",
    default,
    deserialize_with = "lenient::opt_text",
    skip_serializing_if = "Option::is_none"
  )]
  pub career:     Option<String>,
  #[serde(
    rename = "semestre",
    default,
    deserialize_with = "lenient::opt_small",
    skip_serializing_if = "Option::is_none"
  )]
  pub semester:   Option<u32>,
  #[serde(default, deserialize_with = "lenient::opt_text", skip_serializing_if = "Option::is_none")]
  pub avatar:     Option<String>,
  #[serde(default, deserialize_with = "lenient::opt_text", skip_serializing_if = "Option::is_none")]
  pub bio:        Option<String>,
  /// Either a legacy plaintext password or an argon2 PHC string.
  #[serde(
    rename = "contrasena",
    default,
    deserialize_with = "lenient::opt_text",
    skip_serializing_if = "Option::is_none"
  )]
  pub password:   Option<String>,
  /// Tasks are kept verbatim so rewriting the user never reshapes them.
  #[serde(
    rename = "tareas",
    default,
    deserialize_with = "lenient::list",
    skip_serializing_if = "Vec::is_empty"
  )]
  pub tasks:      Vec<Value>,
  #[serde(flatten)]
  pub extra:      Map<String, Value>,
}

impl UserRecord {
  /// Parse the embedded task list. Entries that are not task objects are
  /// logged and skipped.
  pub fn tasks(&self) -> Vec<RawTask> {
    self
      .tasks
      .iter()
      .enumerate()
      .filter_map(|(index, value)| match RawTask::deserialize(value) {
        Ok(task) => Some(task),
        Err(error) => {
          tracing::warn!(index, %error, "skipping unreadable task record");
          None
        }
      })
      .collect()
  }

  /// Value of a named identifier field, if present and non-empty.
  pub fn field(&self, name: &str) -> Option<&str> {
    let value = match name {
      "email" => self.email.as_deref(),
      "correo" => self.correo.as_deref(),
      "usuario" => self.login.as_deref(),
      _ => None,
    };
    value.filter(|v| !v.is_empty())
  }

  /// The user's identifier: `email`, falling back to `correo`.
  pub fn identifier(&self) -> Option<&str> {
    self.field("email").or_else(|| self.field("correo"))
  }
}

// ─── Session ─────────────────────────────────────────────────────────────────

/// The active-session blob.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
  #[serde(
    rename = "usuario",
    default,
    deserialize_with = "lenient::opt_text",
    skip_serializing_if = "Option::is_none"
  )]
  pub login:    Option<String>,
  #[serde(default, deserialize_with = "lenient::opt_text", skip_serializing_if = "Option::is_none")]
  pub email:    Option<String>,
  #[serde(default, deserialize_with = "lenient::opt_text", skip_serializing_if = "Option::is_none")]
  pub correo:   Option<String>,
  #[serde(
    rename = "nombre",
    default,
    deserialize_with = "lenient::opt_text",
    skip_serializing_if = "Option::is_none"
  )]
  pub name:     Option<String>,
  #[serde(
    rename = "carrera",
    default,
    deserialize_with = "lenient::opt_text",
    skip_serializing_if = "Option::is_none"
  )]
  pub career:   Option<String>,
  #[serde(
    rename = "semestre",
    default,
    deserialize_with = "lenient::opt_small",
    skip_serializing_if = "Option::is_none"
  )]
  pub semester: Option<u32>,
  #[serde(default, deserialize_with = "lenient::opt_text", skip_serializing_if = "Option::is_none")]
  pub bio:      Option<String>,
  #[serde(flatten)]
  pub extra:    Map<String, Value>,
}

impl Session {
  /// The identifier of the signed-in user: the first non-empty of
  /// `usuario`, `email`, `correo`.
  pub fn identifier(&self) -> Option<&str> {
    [&self.login, &self.email, &self.correo]
      .into_iter()
      .filter_map(|v| v.as_deref())
      .find(|v| !v.is_empty())
  }

  /// The session's non-empty `email` and `correo` values, in that order.
  /// Task screens resolve the user from these only.
  pub fn contact_identifiers(&self) -> Vec<&str> {
    [&self.email, &self.correo]
      .into_iter()
      .filter_map(|v| v.as_deref())
      .filter(|v| !v.is_empty())
      .collect()
  }
}

// ─── Lenient field decoding ──────────────────────────────────────────────────

mod lenient {
  use chrono::{DateTime, Utc};
  use serde::{Deserialize, Deserializer};
  use serde_json::Value;

  pub fn as_integer(value: &Value) -> Option<i64> {
    match value {
      Value::Number(n) => n.as_i64().or_else(|| {
        n.as_f64()
          .filter(|f| f.is_finite() && f.fract() == 0.0)
          .map(|f| f as i64)
      }),
      Value::String(s) => s.trim().parse().ok(),
      _ => None,
    }
  }

  pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(opt_text(d)?.unwrap_or_default())
  }

  pub fn opt_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
      Value::Null => None,
      Value::String(s) => Some(s),
      other => Some(other.to_string()),
    })
  }

  /// Truthiness as the writing side understands it: `0`, `""`, `null` and
  /// `false` are false, everything else is true.
  pub fn truthy<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    Ok(match Value::deserialize(d)? {
      Value::Null => false,
      Value::Bool(b) => b,
      Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
      Value::String(s) => !s.is_empty(),
      Value::Array(_) | Value::Object(_) => true,
    })
  }

  pub fn integer<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
    Ok(as_integer(&Value::deserialize(d)?).unwrap_or_default())
  }

  pub fn opt_small<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
    Ok(as_integer(&Value::deserialize(d)?).and_then(|n| u32::try_from(n).ok()))
  }

  pub fn list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Value>, D::Error> {
    Ok(match Value::deserialize(d)? {
      Value::Array(items) => items,
      _ => Vec::new(),
    })
  }

  pub fn opt_timestamp<'de, D: Deserializer<'de>>(
    d: D,
  ) -> Result<Option<DateTime<Utc>>, D::Error> {
    Ok(match Value::deserialize(d)? {
      Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc)),
      _ => None,
    })
  }
}
