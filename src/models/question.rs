use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub title: String,
    /// Prompt text shown to the student.
    pub content: String,
    pub explanation: Option<String>,
    #[serde(default = "default_points")]
    pub points: f64,
    pub time_limit_seconds: Option<i64>,
    /// Choices for multiple_choice / true_false.
    #[serde(default)]
    pub options: Vec<QuestionOption>,
    /// Accepted answers for fill_in_blank, expected sequence for ordering.
    #[serde(default)]
    pub correct_answers: Vec<String>,
    /// fill_in_blank only.
    #[serde(default)]
    pub case_sensitive: bool,
    /// matching only.
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

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    MultipleChoice,
    TrueFalse,
    FillInBlank,
    Essay,
    Ordering,
    Matching,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionOption {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
    pub explanation: Option<String>,
    #[serde(default)]
    pub order: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchPair {
    pub key: String,
    pub value: String,
}

impl Question {
    /// The single correct option, for option-based types.
    pub fn correct_option(&self) -> Option<&QuestionOption> {
        self.options.iter().find(|o| o.is_correct)
    }

    pub fn is_auto_gradable(&self) -> bool {
        self.question_type != QuestionType::Essay
    }
}
