use crate::models::answer::AnswerValue;
use crate::models::attempt::QuizAttempt;
use crate::models::question::{Question, QuestionType};
use std::collections::HashMap;

/// Outcome of evaluating one submitted answer. `is_correct` is `None`
/// only for essay questions, which wait on manual grading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub is_correct: Option<bool>,
    pub points_earned: f64,
}

impl Evaluation {
    fn incorrect() -> Self {
        Self {
            is_correct: Some(false),
            points_earned: 0.0,
        }
    }

    fn correct(points: f64) -> Self {
        Self {
            is_correct: Some(true),
            points_earned: points,
        }
    }

    fn pending() -> Self {
        Self {
            is_correct: None,
            points_earned: 0.0,
        }
    }
}

pub struct GradingService;

impl GradingService {
    /// Deterministic, side-effect-free evaluation. A submitted value
    /// whose shape does not fit the question type grades as incorrect
    /// rather than erroring, so grading always completes for a timed
    /// attempt.
    pub fn evaluate(question: &Question, submitted: &AnswerValue) -> Evaluation {
        match question.question_type {
            QuestionType::MultipleChoice | QuestionType::TrueFalse => {
                Self::evaluate_option_choice(question, submitted)
            }
            QuestionType::FillInBlank => Self::evaluate_fill_in_blank(question, submitted),
            QuestionType::Ordering => Self::evaluate_ordering(question, submitted),
            QuestionType::Matching => Self::evaluate_matching(question, submitted),
            QuestionType::Essay => Evaluation::pending(),
        }
    }

    fn evaluate_option_choice(question: &Question, submitted: &AnswerValue) -> Evaluation {
        let Some(selected) = submitted.as_text() else {
            return Evaluation::incorrect();
        };
        match question.correct_option() {
            Some(option) if option.id == selected => Evaluation::correct(question.points),
            _ => Evaluation::incorrect(),
        }
    }

    fn evaluate_fill_in_blank(question: &Question, submitted: &AnswerValue) -> Evaluation {
        let Some(text) = submitted.as_text() else {
            return Evaluation::incorrect();
        };
        let matches = if question.case_sensitive {
            question.correct_answers.iter().any(|a| a == text)
        } else {
            let lowered = text.to_lowercase();
            question
                .correct_answers
                .iter()
                .any(|a| a.to_lowercase() == lowered)
        };
        if matches {
            Evaluation::correct(question.points)
        } else {
            Evaluation::incorrect()
        }
    }

    fn evaluate_ordering(question: &Question, submitted: &AnswerValue) -> Evaluation {
        match submitted.as_sequence() {
            // Exact sequence match, no partial credit.
            Some(seq) if seq == question.correct_answers.as_slice() => {
                Evaluation::correct(question.points)
            }
            _ => Evaluation::incorrect(),
        }
    }

    fn evaluate_matching(question: &Question, submitted: &AnswerValue) -> Evaluation {
        let Some(mapping) = submitted.as_mapping() else {
            return Evaluation::incorrect();
        };
        let expected: HashMap<&str, &str> = question
            .pairs
            .iter()
            .map(|p| (p.key.as_str(), p.value.as_str()))
            .collect();
        let submitted_ref: HashMap<&str, &str> = mapping
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        if expected == submitted_ref {
            Evaluation::correct(question.points)
        } else {
            Evaluation::incorrect()
        }
    }

    /// Folds the per-answer results into the attempt's final score.
    /// Percentage is clamped only by construction: earned points never
    /// exceed the snapshotted total.
    pub fn apply_final_score(attempt: &mut QuizAttempt, passing_score: f64) {
        attempt.points_earned = attempt.answers.iter().map(|a| a.points_earned).sum();
        attempt.score_percentage = if attempt.total_points > 0.0 {
            attempt.points_earned / attempt.total_points * 100.0
        } else {
            0.0
        };
        attempt.is_passing = attempt.score_percentage >= passing_score;
    }
}
