use crate::models::question::{Difficulty, MatchPair, QuestionOption, QuestionType};
use crate::models::quiz::{Quiz, QuizConfiguration, QuizStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateQuizRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub description: Option<String>,
    pub instructions: Option<String>,
    pub course_id: Option<Uuid>,
    pub module_id: Option<Uuid>,
    pub lesson_id: Option<Uuid>,
    #[serde(default)]
    pub questions: Vec<CreateQuestion>,
    #[serde(default)]
    pub config: QuizConfiguration,
    pub estimated_duration_minutes: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateQuestion {
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    #[validate(length(min = 1, max = 300))]
    pub title: String,
    #[validate(length(min = 1))]
    pub content: String,
    pub explanation: Option<String>,
    #[serde(default = "default_points")]
    pub points: f64,
    pub time_limit_seconds: Option<i64>,
    #[serde(default)]
    pub options: Vec<QuestionOption>,
    #[serde(default)]
    pub correct_answers: Vec<String>,
    #[serde(default)]
    pub case_sensitive: bool,
    #[serde(default)]
    pub pairs: Vec<MatchPair>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub difficulty: Difficulty,
}

fn default_points() -> f64 {
    1.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizSummary {
    pub id: Uuid,
    pub title: String,
    pub status: QuizStatus,
    pub total_points: f64,
    pub question_count: usize,
    pub estimated_duration_minutes: Option<i64>,
    pub published_at: Option<DateTime<Utc>>,
    pub total_attempts: u64,
    pub average_score: f64,
    pub completion_rate: f64,
}

impl From<&Quiz> for QuizSummary {
    fn from(quiz: &Quiz) -> Self {
        Self {
            id: quiz.id,
            title: quiz.title.clone(),
            status: quiz.status,
            total_points: quiz.total_points,
            question_count: quiz.questions.len(),
            estimated_duration_minutes: quiz.estimated_duration_minutes,
            published_at: quiz.published_at,
            total_attempts: quiz.total_attempts,
            average_score: quiz.average_score,
            completion_rate: quiz.completion_rate,
        }
    }
}
