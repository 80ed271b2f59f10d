use crate::models::answer::AnswerValue;
use crate::models::attempt::AttemptStatus;
use crate::models::question::{Question, QuestionType};
use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A question as delivered to a student: correctness data stripped,
/// option/item order possibly shuffled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptQuestion {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub title: String,
    pub content: String,
    pub points: f64,
    pub time_limit_seconds: Option<i64>,
    #[serde(default)]
    pub options: Vec<AttemptOption>,
    /// Items to arrange, for ordering questions. Always shuffled so the
    /// delivered order never reveals the answer.
    #[serde(default)]
    pub items: Vec<String>,
    /// Left column for matching questions.
    #[serde(default)]
    pub keys: Vec<String>,
    /// Right column for matching questions, shuffled.
    #[serde(default)]
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptOption {
    pub id: String,
    pub text: String,
}

impl AttemptQuestion {
    pub fn from_question(question: &Question, shuffle_options: bool) -> Self {
        let mut rng = rand::thread_rng();

        let mut options: Vec<AttemptOption> = question
            .options
            .iter()
            .map(|o| AttemptOption {
                id: o.id.clone(),
                text: o.text.clone(),
            })
            .collect();
        if shuffle_options && question.question_type == QuestionType::MultipleChoice {
            options.shuffle(&mut rng);
        }

        let mut items = Vec::new();
        if question.question_type == QuestionType::Ordering {
            items = question.correct_answers.clone();
            items.shuffle(&mut rng);
        }

        let (mut keys, mut values) = (Vec::new(), Vec::new());
        if question.question_type == QuestionType::Matching {
            keys = question.pairs.iter().map(|p| p.key.clone()).collect();
            values = question.pairs.iter().map(|p| p.value.clone()).collect();
            values.shuffle(&mut rng);
        }

        Self {
            id: question.id,
            question_type: question.question_type,
            title: question.title.clone(),
            content: question.content.clone(),
            points: question.points,
            time_limit_seconds: question.time_limit_seconds,
            options,
            items,
            keys,
            values,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartAttemptResponse {
    pub attempt_id: Uuid,
    pub quiz_id: Uuid,
    pub attempt_number: u32,
    pub status: AttemptStatus,
    pub started_at: DateTime<Utc>,
    pub time_remaining_seconds: Option<i64>,
    pub total_points: f64,
    pub questions: Vec<AttemptQuestion>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmitAnswerRequest {
    pub question_id: Uuid,
    pub answer: AnswerValue,
    #[validate(range(min = 0))]
    pub time_spent_seconds: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitAnswerResponse {
    pub saved: bool,
    pub question_id: Uuid,
    pub answered_at: DateTime<Utc>,
    pub time_remaining_seconds: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitAttemptResponse {
    pub attempt_id: Uuid,
    pub status: AttemptStatus,
    pub points_earned: f64,
    pub total_points: f64,
    pub score_percentage: f64,
    pub is_passing: bool,
    pub show_results: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptStatusResponse {
    pub attempt_id: Uuid,
    pub status: AttemptStatus,
    pub attempt_number: u32,
    pub started_at: DateTime<Utc>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub questions_answered: usize,
    pub time_remaining_seconds: Option<i64>,
}
