use crate::models::question::Question;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizStatus {
    Draft,
    Published,
    Archived,
}

impl std::fmt::Display for QuizStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            QuizStatus::Draft => "draft",
            QuizStatus::Published => "published",
            QuizStatus::Archived => "archived",
        };
        f.write_str(s)
    }
}

/// Per-quiz policy. Treated as an immutable value: updates replace the
/// whole object rather than mutating fields in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizConfiguration {
    #[serde(default)]
    pub shuffle_questions: bool,
    #[serde(default)]
    pub shuffle_answers: bool,
    #[serde(default = "default_true")]
    pub show_results_immediately: bool,
    #[serde(default)]
    pub show_correct_answers: bool,
    #[serde(default = "default_true")]
    pub allow_review: bool,
    #[serde(default = "default_true")]
    pub allow_retakes: bool,
    pub max_attempts: Option<u32>,
    #[serde(default = "default_passing_score")]
    pub passing_score: f64,
    pub time_limit_minutes: Option<i64>,
    pub available_from: Option<DateTime<Utc>>,
    pub available_until: Option<DateTime<Utc>>,
    #[serde(default)]
    pub require_proctor: bool,
    #[serde(default)]
    pub randomize_from_pool: bool,
    pub questions_per_attempt: Option<usize>,
}

fn default_true() -> bool {
    true
}

fn default_passing_score() -> f64 {
    70.0
}

impl Default for QuizConfiguration {
    fn default() -> Self {
        Self {
            shuffle_questions: false,
            shuffle_answers: false,
            show_results_immediately: true,
            show_correct_answers: false,
            allow_review: true,
            allow_retakes: true,
            max_attempts: None,
            passing_score: default_passing_score(),
            time_limit_minutes: None,
            available_from: None,
            available_until: None,
            require_proctor: false,
            randomize_from_pool: false,
            questions_per_attempt: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quiz {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub instructions: Option<String>,
    /// Opaque catalog linkage, not interpreted here.
    pub course_id: Option<Uuid>,
    pub module_id: Option<Uuid>,
    pub lesson_id: Option<Uuid>,
    pub questions: Vec<Question>,
    /// Question ids eligible for a randomized draw.
    #[serde(default)]
    pub question_pool: Vec<Uuid>,
    pub config: QuizConfiguration,
    pub status: QuizStatus,
    /// Derived: always Σ question points.
    pub total_points: f64,
    pub estimated_duration_minutes: Option<i64>,
    pub created_by: Uuid,
    pub published_at: Option<DateTime<Utc>>,
    /// Rolling statistics refreshed after each completed attempt.
    #[serde(default)]
    pub total_attempts: u64,
    #[serde(default)]
    pub average_score: f64,
    #[serde(default)]
    pub completion_rate: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Quiz {
    pub fn recompute_total_points(&mut self) {
        self.total_points = self.questions.iter().map(|q| q.points).sum();
    }

    pub fn has_essay_questions(&self) -> bool {
        self.questions.iter().any(|q| !q.is_auto_gradable())
    }

    pub fn question(&self, question_id: Uuid) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == question_id)
    }

    /// Availability is a pure function of the supplied timestamp so it
    /// can be tested without touching the ambient clock.
    pub fn is_available_at(&self, now: DateTime<Utc>) -> bool {
        if self.status != QuizStatus::Published {
            return false;
        }
        if let Some(from) = self.config.available_from {
            if now < from {
                return false;
            }
        }
        if let Some(until) = self.config.available_until {
            if now > until {
                return false;
            }
        }
        true
    }
}
