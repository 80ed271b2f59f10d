use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use uuid::Uuid;

/// A submitted answer value. The shape a question expects depends on its
/// type; a shape the question cannot use grades as incorrect, never as an
/// error, so timed attempts always finish grading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Text(String),
    Sequence(Vec<String>),
    Mapping(HashMap<String, String>),
}

impl AnswerValue {
    /// Lossy conversion for callers holding dynamic JSON. Anything that
    /// is not a string, a string array, or a string map yields `None`.
    pub fn from_json(value: &JsonValue) -> Option<Self> {
        match value {
            JsonValue::String(s) => Some(AnswerValue::Text(s.clone())),
            JsonValue::Array(items) => items
                .iter()
                .map(|v| v.as_str().map(str::to_owned))
                .collect::<Option<Vec<_>>>()
                .map(AnswerValue::Sequence),
            JsonValue::Object(map) => map
                .iter()
                .map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_owned())))
                .collect::<Option<HashMap<_, _>>>()
                .map(AnswerValue::Mapping),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AnswerValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[String]> {
        match self {
            AnswerValue::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&HashMap<String, String>> {
        match self {
            AnswerValue::Mapping(map) => Some(map),
            _ => None,
        }
    }
}

/// One student's answer to one question within an attempt. Unique by
/// question_id; a later submission replaces the earlier one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizAnswer {
    pub question_id: Uuid,
    pub answer: AnswerValue,
    pub time_spent_seconds: i64,
    /// None until evaluated; stays None for essay questions pending
    /// manual grading.
    pub is_correct: Option<bool>,
    pub points_earned: f64,
    pub submitted_at: DateTime<Utc>,
}
