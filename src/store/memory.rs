use crate::error::Result;
use crate::models::attempt::QuizAttempt;
use crate::models::quiz::Quiz;
use crate::store::{AttemptStore, QuizStore};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory quiz store for tests and embedders that do not need
/// durable persistence.
#[derive(Default)]
pub struct InMemoryQuizStore {
    quizzes: RwLock<HashMap<Uuid, Quiz>>,
}

impl InMemoryQuizStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QuizStore for InMemoryQuizStore {
    async fn get(&self, id: Uuid) -> Result<Option<Quiz>> {
        Ok(self.quizzes.read().await.get(&id).cloned())
    }

    async fn save(&self, quiz: Quiz) -> Result<Quiz> {
        self.quizzes.write().await.insert(quiz.id, quiz.clone());
        Ok(quiz)
    }

    async fn by_course(&self, course_id: Uuid) -> Result<Vec<Quiz>> {
        Ok(self
            .quizzes
            .read()
            .await
            .values()
            .filter(|q| q.course_id == Some(course_id))
            .cloned()
            .collect())
    }

    async fn by_instructor(&self, instructor_id: Uuid) -> Result<Vec<Quiz>> {
        Ok(self
            .quizzes
            .read()
            .await
            .values()
            .filter(|q| q.created_by == instructor_id)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryAttemptStore {
    attempts: RwLock<HashMap<Uuid, QuizAttempt>>,
}

impl InMemoryAttemptStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AttemptStore for InMemoryAttemptStore {
    async fn get(&self, id: Uuid) -> Result<Option<QuizAttempt>> {
        Ok(self.attempts.read().await.get(&id).cloned())
    }

    async fn save(&self, attempt: QuizAttempt) -> Result<QuizAttempt> {
        self.attempts
            .write()
            .await
            .insert(attempt.id, attempt.clone());
        Ok(attempt)
    }

    async fn by_quiz(&self, quiz_id: Uuid) -> Result<Vec<QuizAttempt>> {
        let mut rows: Vec<QuizAttempt> = self
            .attempts
            .read()
            .await
            .values()
            .filter(|a| a.quiz_id == quiz_id)
            .cloned()
            .collect();
        rows.sort_by_key(|a| a.started_at);
        Ok(rows)
    }

    async fn by_student_and_quiz(
        &self,
        student_id: Uuid,
        quiz_id: Uuid,
    ) -> Result<Vec<QuizAttempt>> {
        let mut rows: Vec<QuizAttempt> = self
            .attempts
            .read()
            .await
            .values()
            .filter(|a| a.quiz_id == quiz_id && a.student_id == student_id)
            .cloned()
            .collect();
        rows.sort_by_key(|a| a.attempt_number);
        Ok(rows)
    }
}
