use crate::dto::attempt_dto::{
    AttemptQuestion, AttemptStatusResponse, StartAttemptResponse, SubmitAnswerRequest,
    SubmitAnswerResponse, SubmitAttemptResponse,
};
use crate::error::{Error, Result};
use crate::models::answer::QuizAnswer;
use crate::models::attempt::{AttemptStatus, QuizAttempt};
use crate::models::question::{Question, QuestionType};
use crate::models::quiz::Quiz;
use crate::services::grading_service::GradingService;
use crate::services::stats_service;
use crate::store::{AttemptStore, QuizStore};
use crate::utils::locks::KeyedMutex;
use crate::utils::time;
use rand::seq::SliceRandom;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// Owns the attempt lifecycle: in_progress -> {submitted, expired},
/// submitted -> graded. Expiry is evaluated lazily on every access
/// rather than by a background timer; an elapsed attempt is marked
/// expired on its next touch.
#[derive(Clone)]
pub struct AttemptService {
    quizzes: Arc<dyn QuizStore>,
    attempts: Arc<dyn AttemptStore>,
    /// Serializes read-modify-write per attempt id.
    attempt_locks: Arc<KeyedMutex<Uuid>>,
    /// Serializes concurrent starts per (quiz, student) so the
    /// max_attempts check and the insert are one exclusive section.
    start_locks: Arc<KeyedMutex<(Uuid, Uuid)>>,
}

impl AttemptService {
    pub fn new(quizzes: Arc<dyn QuizStore>, attempts: Arc<dyn AttemptStore>) -> Self {
        Self {
            quizzes,
            attempts,
            attempt_locks: Arc::new(KeyedMutex::new()),
            start_locks: Arc::new(KeyedMutex::new()),
        }
    }

    pub async fn start_attempt(
        &self,
        quiz_id: Uuid,
        student_id: Uuid,
    ) -> Result<StartAttemptResponse> {
        let now = time::now();
        let quiz = self.fetch_quiz(quiz_id).await?;

        let _guard = self.start_locks.lock((quiz_id, student_id)).await;

        if !quiz.is_available_at(now) {
            return Err(Error::QuizUnavailable(format!(
                "quiz '{}' is not open for attempts",
                quiz.title
            )));
        }

        let prior = self.attempts.by_student_and_quiz(student_id, quiz_id).await?;
        if !prior.is_empty() && !quiz.config.allow_retakes {
            return Err(Error::RetakesDisallowed);
        }
        if let Some(max) = quiz.config.max_attempts {
            if prior.len() as u32 >= max {
                return Err(Error::MaxAttemptsExceeded(max));
            }
        }

        let questions = build_question_set(&quiz);
        // Equals quiz.total_points unless a pool draw serves a subset;
        // snapshotting the served sum keeps percentages within 0-100.
        let total_points: f64 = questions.iter().map(|q| q.points).sum();

        let attempt = QuizAttempt {
            id: Uuid::new_v4(),
            quiz_id,
            student_id,
            status: AttemptStatus::InProgress,
            attempt_number: prior.len() as u32 + 1,
            question_ids: questions.iter().map(|q| q.id).collect(),
            answers: vec![],
            current_question_index: 0,
            total_points,
            points_earned: 0.0,
            score_percentage: 0.0,
            is_passing: false,
            started_at: now,
            submitted_at: None,
            time_spent_seconds: 0,
            time_remaining_seconds: quiz.config.time_limit_minutes.map(|m| m * 60),
        };
        let attempt = self.attempts.save(attempt).await?;
        tracing::info!(
            attempt_id = %attempt.id,
            quiz_id = %quiz_id,
            attempt_number = attempt.attempt_number,
            "attempt started"
        );

        let questions = questions
            .iter()
            .map(|q| AttemptQuestion::from_question(q, quiz.config.shuffle_answers))
            .collect();
        Ok(StartAttemptResponse {
            attempt_id: attempt.id,
            quiz_id,
            attempt_number: attempt.attempt_number,
            status: attempt.status,
            started_at: attempt.started_at,
            time_remaining_seconds: attempt.time_remaining_seconds,
            total_points: attempt.total_points,
            questions,
        })
    }

    pub async fn submit_answer(
        &self,
        attempt_id: Uuid,
        payload: SubmitAnswerRequest,
    ) -> Result<SubmitAnswerResponse> {
        payload.validate()?;
        let now = time::now();
        let _guard = self.attempt_locks.lock(attempt_id).await;

        let mut attempt = self.fetch_attempt(attempt_id).await?;
        if attempt.status != AttemptStatus::InProgress {
            return Err(Error::AttemptNotActive(attempt.status.to_string()));
        }
        let quiz = self.fetch_quiz(attempt.quiz_id).await?;
        if attempt.is_expired_at(quiz.config.time_limit_minutes, now) {
            self.expire(attempt).await?;
            return Err(Error::AttemptExpired);
        }

        // Only questions served at start are answerable; a pool draw
        // serves a subset and the score snapshot covers exactly it.
        if !attempt.serves_question(payload.question_id) {
            return Err(Error::NotFound(format!(
                "question {} is not part of this attempt",
                payload.question_id
            )));
        }
        let question = quiz
            .question(payload.question_id)
            .ok_or_else(|| Error::NotFound(format!("question {}", payload.question_id)))?;
        let evaluation = GradingService::evaluate(question, &payload.answer);

        attempt.upsert_answer(QuizAnswer {
            question_id: question.id,
            answer: payload.answer,
            time_spent_seconds: payload.time_spent_seconds,
            is_correct: evaluation.is_correct,
            points_earned: evaluation.points_earned,
            submitted_at: now,
        });
        attempt.time_spent_seconds += payload.time_spent_seconds;
        attempt.time_remaining_seconds =
            attempt.remaining_seconds_at(quiz.config.time_limit_minutes, now);
        attempt.current_question_index = attempt.answers.len();

        let attempt = self.attempts.save(attempt).await?;
        Ok(SubmitAnswerResponse {
            saved: true,
            question_id: payload.question_id,
            answered_at: now,
            time_remaining_seconds: attempt.time_remaining_seconds,
        })
    }

    pub async fn submit_attempt(&self, attempt_id: Uuid) -> Result<SubmitAttemptResponse> {
        let now = time::now();
        let _guard = self.attempt_locks.lock(attempt_id).await;

        let mut attempt = self.fetch_attempt(attempt_id).await?;
        if attempt.status != AttemptStatus::InProgress {
            return Err(Error::AttemptNotActive(attempt.status.to_string()));
        }
        let quiz = self.fetch_quiz(attempt.quiz_id).await?;
        if attempt.is_expired_at(quiz.config.time_limit_minutes, now) {
            self.expire(attempt).await?;
            return Err(Error::AttemptExpired);
        }

        // Passing threshold is read live from the quiz configuration at
        // grading time, not snapshotted at start.
        GradingService::apply_final_score(&mut attempt, quiz.config.passing_score);
        attempt.status = if quiz.has_essay_questions() {
            AttemptStatus::Submitted
        } else {
            AttemptStatus::Graded
        };
        attempt.submitted_at = Some(now);
        attempt.time_remaining_seconds =
            attempt.remaining_seconds_at(quiz.config.time_limit_minutes, now);

        // A failed save surfaces as a hard error; the score is never
        // reported as recorded unless the store accepted it.
        let attempt = self.attempts.save(attempt).await?;
        tracing::info!(
            attempt_id = %attempt.id,
            status = %attempt.status,
            score = attempt.score_percentage,
            "attempt submitted"
        );
        let show_immediately = quiz.config.show_results_immediately;
        self.refresh_rollups(quiz.id).await?;

        let show_results = quiz_show_results(&attempt, show_immediately);
        let message = match attempt.status {
            AttemptStatus::Graded => "Attempt graded".to_string(),
            _ => "Attempt submitted, essay answers await manual grading".to_string(),
        };
        Ok(SubmitAttemptResponse {
            attempt_id: attempt.id,
            status: attempt.status,
            points_earned: attempt.points_earned,
            total_points: attempt.total_points,
            score_percentage: attempt.score_percentage,
            is_passing: attempt.is_passing,
            show_results,
            message,
        })
    }

    /// Manual grading path for essay answers. Re-scores the attempt
    /// and advances submitted -> graded once no answer is left pending.
    pub async fn grade_essay_answer(
        &self,
        attempt_id: Uuid,
        question_id: Uuid,
        points_awarded: f64,
    ) -> Result<QuizAttempt> {
        let _guard = self.attempt_locks.lock(attempt_id).await;

        let mut attempt = self.fetch_attempt(attempt_id).await?;
        if attempt.status != AttemptStatus::Submitted {
            return Err(Error::AttemptNotActive(attempt.status.to_string()));
        }
        let quiz = self.fetch_quiz(attempt.quiz_id).await?;
        if !attempt.serves_question(question_id) {
            return Err(Error::NotFound(format!(
                "question {} is not part of this attempt",
                question_id
            )));
        }
        let question = quiz
            .question(question_id)
            .ok_or_else(|| Error::NotFound(format!("question {}", question_id)))?;
        if question.question_type != QuestionType::Essay {
            return Err(Error::Validation(format!(
                "question '{}' is auto-graded",
                question.title
            )));
        }
        if !(0.0..=question.points).contains(&points_awarded) {
            return Err(Error::Validation(format!(
                "awarded points must be within 0-{}",
                question.points
            )));
        }

        let answer = attempt
            .answers
            .iter_mut()
            .find(|a| a.question_id == question_id)
            .ok_or_else(|| Error::NotFound(format!("no answer for question {}", question_id)))?;
        answer.points_earned = points_awarded;
        answer.is_correct = Some(points_awarded > 0.0);

        GradingService::apply_final_score(&mut attempt, quiz.config.passing_score);
        let still_pending = attempt.answers.iter().any(|a| a.is_correct.is_none());
        if !still_pending {
            attempt.status = AttemptStatus::Graded;
        }

        let attempt = self.attempts.save(attempt).await?;
        tracing::info!(
            attempt_id = %attempt.id,
            question_id = %question_id,
            status = %attempt.status,
            "essay answer graded"
        );
        self.refresh_rollups(quiz.id).await?;
        Ok(attempt)
    }

    /// Fetches an attempt, applying the lazy expiry transition if its
    /// time window has elapsed.
    pub async fn get_attempt(&self, attempt_id: Uuid) -> Result<QuizAttempt> {
        let now = time::now();
        let _guard = self.attempt_locks.lock(attempt_id).await;

        let attempt = self.fetch_attempt(attempt_id).await?;
        if attempt.status == AttemptStatus::InProgress {
            let quiz = self.fetch_quiz(attempt.quiz_id).await?;
            if attempt.is_expired_at(quiz.config.time_limit_minutes, now) {
                return self.expire(attempt).await;
            }
        }
        Ok(attempt)
    }

    pub async fn attempt_status(&self, attempt_id: Uuid) -> Result<AttemptStatusResponse> {
        let attempt = self.get_attempt(attempt_id).await?;
        Ok(AttemptStatusResponse {
            attempt_id: attempt.id,
            status: attempt.status,
            attempt_number: attempt.attempt_number,
            started_at: attempt.started_at,
            submitted_at: attempt.submitted_at,
            questions_answered: attempt.answers.len(),
            time_remaining_seconds: attempt.time_remaining_seconds,
        })
    }

    pub async fn attempts_for_quiz(&self, quiz_id: Uuid) -> Result<Vec<QuizAttempt>> {
        self.attempts.by_quiz(quiz_id).await
    }

    async fn expire(&self, mut attempt: QuizAttempt) -> Result<QuizAttempt> {
        attempt.status = AttemptStatus::Expired;
        attempt.time_remaining_seconds = Some(0);
        tracing::warn!(attempt_id = %attempt.id, "attempt expired");
        self.attempts.save(attempt).await
    }

    /// Re-reads the quiz right before writing the rolling counters, so
    /// an instructor edit landing since the earlier fetch is not
    /// clobbered by a stale whole-object save.
    async fn refresh_rollups(&self, quiz_id: Uuid) -> Result<()> {
        let mut quiz = self.fetch_quiz(quiz_id).await?;
        let all = self.attempts.by_quiz(quiz_id).await?;
        stats_service::refresh_quiz_rollups(&mut quiz, &all);
        self.quizzes.save(quiz).await?;
        Ok(())
    }

    async fn fetch_quiz(&self, quiz_id: Uuid) -> Result<Quiz> {
        self.quizzes
            .get(quiz_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("quiz {}", quiz_id)))
    }

    async fn fetch_attempt(&self, attempt_id: Uuid) -> Result<QuizAttempt> {
        self.attempts
            .get(attempt_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("attempt {}", attempt_id)))
    }
}

fn quiz_show_results(attempt: &QuizAttempt, show_immediately: bool) -> bool {
    attempt.status == AttemptStatus::Graded && show_immediately
}

/// Selects and orders the questions served to one attempt, honoring
/// pool draws and shuffle flags.
fn build_question_set(quiz: &Quiz) -> Vec<Question> {
    let mut rng = rand::thread_rng();
    let mut questions: Vec<Question> = if quiz.config.randomize_from_pool {
        let pool: Vec<&Question> = quiz
            .questions
            .iter()
            .filter(|q| quiz.question_pool.contains(&q.id))
            .collect();
        let take = quiz
            .config
            .questions_per_attempt
            .unwrap_or(pool.len())
            .min(pool.len());
        pool.choose_multiple(&mut rng, take)
            .map(|q| (*q).clone())
            .collect()
    } else {
        quiz.questions.clone()
    };
    if quiz.config.shuffle_questions {
        questions.shuffle(&mut rng);
    }
    questions
}
