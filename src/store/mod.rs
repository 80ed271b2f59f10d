pub mod memory;

use crate::error::Result;
use crate::models::attempt::QuizAttempt;
use crate::models::quiz::Quiz;
use async_trait::async_trait;
use uuid::Uuid;

/// Persistence seam for quizzes. Implemented elsewhere (e.g. a document
/// database); the engine only assumes these operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuizStore: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<Quiz>>;
    async fn save(&self, quiz: Quiz) -> Result<Quiz>;
    async fn by_course(&self, course_id: Uuid) -> Result<Vec<Quiz>>;
    async fn by_instructor(&self, instructor_id: Uuid) -> Result<Vec<Quiz>>;
}

/// Persistence seam for attempts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AttemptStore: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<QuizAttempt>>;
    async fn save(&self, attempt: QuizAttempt) -> Result<QuizAttempt>;
    async fn by_quiz(&self, quiz_id: Uuid) -> Result<Vec<QuizAttempt>>;
    async fn by_student_and_quiz(
        &self,
        student_id: Uuid,
        quiz_id: Uuid,
    ) -> Result<Vec<QuizAttempt>>;
}
