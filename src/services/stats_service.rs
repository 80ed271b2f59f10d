use crate::dto::stats_dto::{QuestionStatistics, QuizStatistics};
use crate::error::{Error, Result};
use crate::models::attempt::QuizAttempt;
use crate::models::question::{Question, QuestionType};
use crate::models::quiz::Quiz;
use crate::store::{AttemptStore, QuizStore};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct StatsService {
    quizzes: Arc<dyn QuizStore>,
    attempts: Arc<dyn AttemptStore>,
}

impl StatsService {
    pub fn new(quizzes: Arc<dyn QuizStore>, attempts: Arc<dyn AttemptStore>) -> Self {
        Self { quizzes, attempts }
    }

    pub async fn quiz_statistics(&self, quiz_id: Uuid) -> Result<QuizStatistics> {
        let quiz = self
            .quizzes
            .get(quiz_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("quiz {}", quiz_id)))?;
        let attempts = self.attempts.by_quiz(quiz_id).await?;
        Ok(compute_statistics(&quiz, &attempts))
    }
}

/// Aggregates a population of attempts into quiz- and question-level
/// statistics. Only submitted/graded attempts count as completed.
pub fn compute_statistics(quiz: &Quiz, attempts: &[QuizAttempt]) -> QuizStatistics {
    let completed: Vec<&QuizAttempt> = attempts
        .iter()
        .filter(|a| a.status.is_completed())
        .collect();

    let unique_students: HashSet<Uuid> = attempts.iter().map(|a| a.student_id).collect();
    let scores: Vec<f64> = completed.iter().map(|a| a.score_percentage).collect();
    let passing = completed.iter().filter(|a| a.is_passing).count();

    let completion_rate = if attempts.is_empty() {
        0.0
    } else {
        completed.len() as f64 / attempts.len() as f64 * 100.0
    };
    let pass_rate = if completed.is_empty() {
        0.0
    } else {
        passing as f64 / completed.len() as f64 * 100.0
    };
    let average_time_seconds = mean(completed.iter().map(|a| a.time_spent_seconds as f64));

    QuizStatistics {
        quiz_id: quiz.id,
        total_attempts: attempts.len() as u64,
        completed_attempts: completed.len() as u64,
        unique_students: unique_students.len() as u64,
        average_score: mean(scores.iter().copied()),
        median_score: median(scores.clone()),
        pass_rate,
        completion_rate,
        average_time_seconds,
        questions: quiz
            .questions
            .iter()
            .map(|q| question_statistics(q, &completed))
            .collect(),
    }
}

fn question_statistics(question: &Question, completed: &[&QuizAttempt]) -> QuestionStatistics {
    let answered: Vec<_> = completed
        .iter()
        .filter_map(|a| a.answer_for(question.id))
        .collect();

    let correct = answered
        .iter()
        .filter(|ans| ans.is_correct == Some(true))
        .count();
    let correct_percentage = if answered.is_empty() {
        0.0
    } else {
        correct as f64 / answered.len() as f64 * 100.0
    };
    let average_time_spent_seconds = mean(answered.iter().map(|ans| ans.time_spent_seconds as f64));

    let mut answers_distribution = HashMap::new();
    if question.question_type == QuestionType::MultipleChoice {
        let texts: HashMap<&str, &str> = question
            .options
            .iter()
            .map(|o| (o.id.as_str(), o.text.as_str()))
            .collect();
        for ans in &answered {
            if let Some(text) = ans.answer.as_text().and_then(|id| texts.get(id)) {
                *answers_distribution.entry(text.to_string()).or_insert(0) += 1;
            }
        }
    }

    QuestionStatistics {
        question_id: question.id,
        title: question.title.clone(),
        correct_percentage,
        average_time_spent_seconds,
        answers_distribution,
    }
}

/// Refreshes the rolling counters stored on the quiz itself after an
/// attempt completes.
pub fn refresh_quiz_rollups(quiz: &mut Quiz, attempts: &[QuizAttempt]) {
    let completed: Vec<&QuizAttempt> = attempts
        .iter()
        .filter(|a| a.status.is_completed())
        .collect();
    quiz.total_attempts = attempts.len() as u64;
    quiz.average_score = mean(completed.iter().map(|a| a.score_percentage));
    quiz.completion_rate = if attempts.is_empty() {
        0.0
    } else {
        completed.len() as f64 / attempts.len() as f64 * 100.0
    };
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (mut sum, mut count) = (0.0, 0u64);
    for v in values {
        sum += v;
        count += 1;
    }
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

fn median(mut values: Vec<f64>) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::answer::{AnswerValue, QuizAnswer};
    use crate::models::attempt::AttemptStatus;
    use crate::models::question::QuestionOption;
    use crate::models::quiz::{QuizConfiguration, QuizStatus};
    use chrono::Utc;

    fn quiz_with_mc() -> Quiz {
        let now = Utc::now();
        let question = Question {
            id: Uuid::new_v4(),
            question_type: QuestionType::MultipleChoice,
            title: "Pick one".into(),
            content: "Pick the right one".into(),
            explanation: None,
            points: 10.0,
            time_limit_seconds: None,
            options: vec![
                QuestionOption {
                    id: "a".into(),
                    text: "Alpha".into(),
                    is_correct: true,
                    explanation: None,
                    order: 0,
                },
                QuestionOption {
                    id: "b".into(),
                    text: "Beta".into(),
                    is_correct: false,
                    explanation: None,
                    order: 1,
                },
            ],
            correct_answers: vec![],
            case_sensitive: false,
            pairs: vec![],
            tags: vec![],
            difficulty: Default::default(),
        };
        Quiz {
            id: Uuid::new_v4(),
            title: "Quiz".into(),
            description: None,
            instructions: None,
            course_id: None,
            module_id: None,
            lesson_id: None,
            question_pool: vec![question.id],
            questions: vec![question],
            config: QuizConfiguration::default(),
            status: QuizStatus::Published,
            total_points: 10.0,
            estimated_duration_minutes: None,
            created_by: Uuid::new_v4(),
            published_at: Some(now),
            total_attempts: 0,
            average_score: 0.0,
            completion_rate: 0.0,
            created_at: now,
            updated_at: now,
        }
    }

    fn completed_attempt(quiz: &Quiz, score: f64, selected: &str, time_spent: i64) -> QuizAttempt {
        let question = &quiz.questions[0];
        QuizAttempt {
            id: Uuid::new_v4(),
            quiz_id: quiz.id,
            student_id: Uuid::new_v4(),
            status: AttemptStatus::Graded,
            attempt_number: 1,
            question_ids: vec![question.id],
            answers: vec![QuizAnswer {
                question_id: question.id,
                answer: AnswerValue::Text(selected.into()),
                time_spent_seconds: time_spent,
                is_correct: Some(selected == "a"),
                points_earned: if selected == "a" { question.points } else { 0.0 },
                submitted_at: Utc::now(),
            }],
            current_question_index: 1,
            total_points: quiz.total_points,
            points_earned: score / 10.0,
            score_percentage: score,
            is_passing: score >= quiz.config.passing_score,
            started_at: Utc::now(),
            submitted_at: Some(Utc::now()),
            time_spent_seconds: time_spent,
            time_remaining_seconds: None,
        }
    }

    #[test]
    fn aggregates_mean_median_and_pass_rate() {
        let quiz = quiz_with_mc();
        let attempts = vec![
            completed_attempt(&quiz, 100.0, "a", 30),
            completed_attempt(&quiz, 50.0, "b", 60),
            completed_attempt(&quiz, 0.0, "b", 90),
        ];
        let stats = compute_statistics(&quiz, &attempts);

        assert_eq!(stats.total_attempts, 3);
        assert_eq!(stats.completed_attempts, 3);
        assert_eq!(stats.unique_students, 3);
        assert_eq!(stats.average_score, 50.0);
        assert_eq!(stats.median_score, 50.0);
        assert!((stats.pass_rate - 33.33).abs() < 0.01);
        assert_eq!(stats.completion_rate, 100.0);
        assert_eq!(stats.average_time_seconds, 60.0);
    }

    #[test]
    fn in_progress_attempts_dilute_completion_not_scores() {
        let quiz = quiz_with_mc();
        let mut open = completed_attempt(&quiz, 0.0, "b", 10);
        open.status = AttemptStatus::InProgress;
        let attempts = vec![completed_attempt(&quiz, 80.0, "a", 30), open];

        let stats = compute_statistics(&quiz, &attempts);
        assert_eq!(stats.total_attempts, 2);
        assert_eq!(stats.completed_attempts, 1);
        assert_eq!(stats.average_score, 80.0);
        assert_eq!(stats.completion_rate, 50.0);
    }

    #[test]
    fn median_handles_even_populations() {
        assert_eq!(median(vec![10.0, 90.0, 30.0, 70.0]), 50.0);
        assert_eq!(median(vec![10.0]), 10.0);
        assert_eq!(median(vec![]), 0.0);
    }

    #[test]
    fn distribution_is_keyed_by_option_text() {
        let quiz = quiz_with_mc();
        let attempts = vec![
            completed_attempt(&quiz, 100.0, "a", 10),
            completed_attempt(&quiz, 100.0, "a", 10),
            completed_attempt(&quiz, 0.0, "b", 10),
        ];
        let stats = compute_statistics(&quiz, &attempts);
        let dist = &stats.questions[0].answers_distribution;
        assert_eq!(dist.get("Alpha"), Some(&2));
        assert_eq!(dist.get("Beta"), Some(&1));
        assert!((stats.questions[0].correct_percentage - 66.66).abs() < 0.01);
    }

    #[test]
    fn rollups_mirror_the_population() {
        let mut quiz = quiz_with_mc();
        let mut open = completed_attempt(&quiz, 0.0, "b", 10);
        open.status = AttemptStatus::Expired;
        let attempts = vec![
            completed_attempt(&quiz, 100.0, "a", 30),
            completed_attempt(&quiz, 50.0, "b", 30),
            open,
        ];
        refresh_quiz_rollups(&mut quiz, &attempts);
        assert_eq!(quiz.total_attempts, 3);
        assert_eq!(quiz.average_score, 75.0);
        assert!((quiz.completion_rate - 66.66).abs() < 0.01);
    }
}
