//! Reply types and the local keyword responder used when no backend answers.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
  Video,
  Article,
  Document,
}

/// A study resource suggested alongside a reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resource {
  pub title: String,
  pub url:   String,
  #[serde(rename = "type")]
  pub kind:  ResourceKind,
}

impl Resource {
  fn new(title: &str, url: &str, kind: ResourceKind) -> Self {
    Self { title: title.to_owned(), url: url.to_owned(), kind }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatReply {
  pub text:      String,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub resources: Vec<Resource>,
}

impl ChatReply {
  pub fn text(text: impl Into<String>) -> Self {
    Self { text: text.into(), resources: Vec::new() }
  }
}

const QUIZ_REPLY: &str = "Claro, puedo ayudarte a generar un cuestionario. ¿Para qué materia \
                          necesitas practicar? Puedo crear preguntas de opción múltiple o \
                          desarrollo.";

const STUDY_PLAN_REPLY: &str = "Entendido. Para crear un plan de estudio efectivo, necesito \
                                saber: \n1. La materia.\n2. Cuánto tiempo tienes disponible.\n3. \
                                Tus temas más difíciles.";

const HELP_REPLY: &str = "Soy el asistente virtual del sistema. Puedo ayudarte a navegar por las \
                          opciones, encontrar materiales o generar ayudas de estudio.";

const DEFAULT_REPLY: &str = "Interesante. Cuéntame más sobre eso o especifica si necesitas ayuda \
                             con alguna materia en particular.";

/// Deterministic reply chosen by keyword. Rules are checked in order and the
/// first match wins.
pub fn fallback_reply(message: &str) -> ChatReply {
  let lower = message.to_lowercase();
  let mentions = |words: &[&str]| words.iter().any(|w| lower.contains(w));

  if mentions(&["cuestionario", "examen"]) {
    ChatReply::text(QUIZ_REPLY)
  } else if mentions(&["plan de estudio", "estudiar"]) {
    ChatReply {
      text:      STUDY_PLAN_REPLY.to_owned(),
      resources: vec![
        Resource::new(
          "Técnica Pomodoro para estudiar",
          "https://www.youtube.com/watch?v=12345",
          ResourceKind::Video,
        ),
        Resource::new("Guía de organización", "https://ejemplo.com/guia", ResourceKind::Document),
      ],
    }
  } else if mentions(&["ayuda", "sistema"]) {
    ChatReply::text(HELP_REPLY)
  } else {
    ChatReply::text(DEFAULT_REPLY)
  }
}
