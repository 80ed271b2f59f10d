pub mod dto;
pub mod error;
pub mod models;
pub mod services;
pub mod store;
pub mod utils;

use crate::services::{
    attempt_service::AttemptService, quiz_service::QuizService, stats_service::StatsService,
};
use crate::store::memory::{InMemoryAttemptStore, InMemoryQuizStore};
use crate::store::{AttemptStore, QuizStore};
use std::sync::Arc;

/// Wires the quiz, attempt and statistics services over a shared pair
/// of store handles. The calling layer (HTTP, CLI, whatever) owns
/// transport and auth; this engine owns the assessment semantics.
#[derive(Clone)]
pub struct AssessmentEngine {
    pub quiz_service: QuizService,
    pub attempt_service: AttemptService,
    pub stats_service: StatsService,
}

impl AssessmentEngine {
    pub fn new(quizzes: Arc<dyn QuizStore>, attempts: Arc<dyn AttemptStore>) -> Self {
        let quiz_service = QuizService::new(quizzes.clone());
        let attempt_service = AttemptService::new(quizzes.clone(), attempts.clone());
        let stats_service = StatsService::new(quizzes, attempts);
        Self {
            quiz_service,
            attempt_service,
            stats_service,
        }
    }

    /// Engine over in-memory stores, for tests and embedders without
    /// durable persistence.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryQuizStore::new()),
            Arc::new(InMemoryAttemptStore::new()),
        )
    }
}
