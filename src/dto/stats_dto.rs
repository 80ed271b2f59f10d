use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizStatistics {
    pub quiz_id: Uuid,
    pub total_attempts: u64,
    pub completed_attempts: u64,
    pub unique_students: u64,
    /// Mean score percentage over completed attempts.
    pub average_score: f64,
    pub median_score: f64,
    /// Passing completed attempts / completed attempts * 100.
    pub pass_rate: f64,
    /// Completed attempts / all attempts * 100.
    pub completion_rate: f64,
    pub average_time_seconds: f64,
    pub questions: Vec<QuestionStatistics>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionStatistics {
    pub question_id: Uuid,
    pub title: String,
    /// Correct answers / submitted answers * 100.
    pub correct_percentage: f64,
    pub average_time_spent_seconds: f64,
    /// Selection histogram keyed by option text; option-based
    /// questions only.
    #[serde(default)]
    pub answers_distribution: HashMap<String, u64>,
}
