use crate::dto::quiz_dto::{CreateQuestion, CreateQuizRequest};
use crate::error::{Error, Result};
use crate::models::question::{Question, QuestionType};
use crate::models::quiz::{Quiz, QuizConfiguration, QuizStatus};
use crate::store::QuizStore;
use crate::utils::time;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

#[derive(Clone)]
pub struct QuizService {
    quizzes: Arc<dyn QuizStore>,
}

impl QuizService {
    pub fn new(quizzes: Arc<dyn QuizStore>) -> Self {
        Self { quizzes }
    }

    pub async fn create_quiz(&self, payload: CreateQuizRequest, created_by: Uuid) -> Result<Quiz> {
        payload.validate()?;
        validate_config(&payload.config)?;

        let questions = payload
            .questions
            .iter()
            .map(build_question)
            .collect::<Result<Vec<_>>>()?;

        let now = time::now();
        let mut quiz = Quiz {
            id: Uuid::new_v4(),
            title: payload.title,
            description: payload.description,
            instructions: payload.instructions,
            course_id: payload.course_id,
            module_id: payload.module_id,
            lesson_id: payload.lesson_id,
            questions,
            question_pool: vec![],
            config: payload.config,
            status: QuizStatus::Draft,
            total_points: 0.0,
            estimated_duration_minutes: payload.estimated_duration_minutes,
            created_by,
            published_at: None,
            total_attempts: 0,
            average_score: 0.0,
            completion_rate: 0.0,
            created_at: now,
            updated_at: now,
        };
        quiz.recompute_total_points();
        quiz.question_pool = quiz.questions.iter().map(|q| q.id).collect();

        tracing::info!(quiz_id = %quiz.id, questions = quiz.questions.len(), "quiz created");
        self.quizzes.save(quiz).await
    }

    pub async fn get_quiz(&self, quiz_id: Uuid) -> Result<Quiz> {
        self.quizzes
            .get(quiz_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("quiz {}", quiz_id)))
    }

    pub async fn add_question(&self, quiz_id: Uuid, payload: CreateQuestion) -> Result<Quiz> {
        let mut quiz = self.editable_quiz(quiz_id).await?;
        let question = build_question(&payload)?;
        quiz.question_pool.push(question.id);
        quiz.questions.push(question);
        quiz.recompute_total_points();
        quiz.updated_at = time::now();
        self.quizzes.save(quiz).await
    }

    pub async fn replace_questions(
        &self,
        quiz_id: Uuid,
        payload: Vec<CreateQuestion>,
    ) -> Result<Quiz> {
        let mut quiz = self.editable_quiz(quiz_id).await?;
        quiz.questions = payload
            .iter()
            .map(build_question)
            .collect::<Result<Vec<_>>>()?;
        quiz.question_pool = quiz.questions.iter().map(|q| q.id).collect();
        quiz.recompute_total_points();
        quiz.updated_at = time::now();
        self.quizzes.save(quiz).await
    }

    /// Whole-object config replacement; field-level aliasing across
    /// quizzes is not supported.
    pub async fn update_config(&self, quiz_id: Uuid, config: QuizConfiguration) -> Result<Quiz> {
        validate_config(&config)?;
        let mut quiz = self.editable_quiz(quiz_id).await?;
        quiz.config = config;
        quiz.updated_at = time::now();
        self.quizzes.save(quiz).await
    }

    pub async fn publish_quiz(&self, quiz_id: Uuid) -> Result<Quiz> {
        let mut quiz = self.get_quiz(quiz_id).await?;
        if quiz.status != QuizStatus::Draft {
            return Err(Error::Validation(format!(
                "only draft quizzes can be published, quiz is '{}'",
                quiz.status
            )));
        }
        if quiz.questions.is_empty() {
            return Err(Error::Validation(
                "cannot publish a quiz with no questions".into(),
            ));
        }
        let now = time::now();
        quiz.status = QuizStatus::Published;
        quiz.published_at = Some(now);
        quiz.updated_at = now;
        tracing::info!(quiz_id = %quiz.id, "quiz published");
        self.quizzes.save(quiz).await
    }

    pub async fn archive_quiz(&self, quiz_id: Uuid) -> Result<Quiz> {
        let mut quiz = self.get_quiz(quiz_id).await?;
        if quiz.status == QuizStatus::Archived {
            return Ok(quiz);
        }
        quiz.status = QuizStatus::Archived;
        quiz.updated_at = time::now();
        tracing::info!(quiz_id = %quiz.id, "quiz archived");
        self.quizzes.save(quiz).await
    }

    pub async fn list_by_course(&self, course_id: Uuid) -> Result<Vec<Quiz>> {
        self.quizzes.by_course(course_id).await
    }

    pub async fn list_by_instructor(&self, instructor_id: Uuid) -> Result<Vec<Quiz>> {
        self.quizzes.by_instructor(instructor_id).await
    }

    async fn editable_quiz(&self, quiz_id: Uuid) -> Result<Quiz> {
        let quiz = self.get_quiz(quiz_id).await?;
        if quiz.status == QuizStatus::Archived {
            return Err(Error::Validation(
                "archived quizzes cannot be modified".into(),
            ));
        }
        Ok(quiz)
    }
}

fn validate_config(config: &QuizConfiguration) -> Result<()> {
    if !(0.0..=100.0).contains(&config.passing_score) {
        return Err(Error::Validation(format!(
            "passing_score must be within 0-100, got {}",
            config.passing_score
        )));
    }
    if config.max_attempts == Some(0) {
        return Err(Error::Validation("max_attempts must be at least 1".into()));
    }
    if matches!(config.time_limit_minutes, Some(limit) if limit <= 0) {
        return Err(Error::Validation("time_limit_minutes must be positive".into()));
    }
    if let (Some(from), Some(until)) = (config.available_from, config.available_until) {
        if until < from {
            return Err(Error::Validation(
                "available_until precedes available_from".into(),
            ));
        }
    }
    Ok(())
}

fn build_question(payload: &CreateQuestion) -> Result<Question> {
    payload.validate()?;
    let question = Question {
        id: Uuid::new_v4(),
        question_type: payload.question_type,
        title: payload.title.clone(),
        content: payload.content.clone(),
        explanation: payload.explanation.clone(),
        points: payload.points,
        time_limit_seconds: payload.time_limit_seconds,
        options: payload.options.clone(),
        correct_answers: payload.correct_answers.clone(),
        case_sensitive: payload.case_sensitive,
        pairs: payload.pairs.clone(),
        tags: payload.tags.clone(),
        difficulty: payload.difficulty,
    };
    validate_question(&question)?;
    Ok(question)
}

fn validate_question(question: &Question) -> Result<()> {
    if !question.points.is_finite() || question.points < 0.0 {
        return Err(Error::Validation(format!(
            "question '{}' has negative points",
            question.title
        )));
    }
    match question.question_type {
        QuestionType::MultipleChoice | QuestionType::TrueFalse => {
            if question.options.is_empty() {
                return Err(Error::Validation(format!(
                    "question '{}' has no options",
                    question.title
                )));
            }
            if question.correct_option().is_none() {
                return Err(Error::Validation(format!(
                    "question '{}' has no correct option",
                    question.title
                )));
            }
        }
        QuestionType::FillInBlank | QuestionType::Ordering => {
            if question.correct_answers.is_empty() {
                return Err(Error::Validation(format!(
                    "question '{}' has no accepted answers",
                    question.title
                )));
            }
        }
        QuestionType::Matching => {
            if question.pairs.is_empty() {
                return Err(Error::Validation(format!(
                    "question '{}' has no pairs to match",
                    question.title
                )));
            }
        }
        QuestionType::Essay => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::QuestionOption;
    use crate::store::memory::InMemoryQuizStore;

    fn service() -> QuizService {
        QuizService::new(Arc::new(InMemoryQuizStore::new()))
    }

    fn mc_question(points: f64) -> CreateQuestion {
        CreateQuestion {
            question_type: QuestionType::MultipleChoice,
            title: "Capital of France".into(),
            content: "Which city is the capital of France?".into(),
            explanation: None,
            points,
            time_limit_seconds: None,
            options: vec![
                QuestionOption {
                    id: "a".into(),
                    text: "Paris".into(),
                    is_correct: true,
                    explanation: None,
                    order: 0,
                },
                QuestionOption {
                    id: "b".into(),
                    text: "Lyon".into(),
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
        }
    }

    fn request(questions: Vec<CreateQuestion>) -> CreateQuizRequest {
        CreateQuizRequest {
            title: "Geography".into(),
            description: None,
            instructions: None,
            course_id: None,
            module_id: None,
            lesson_id: None,
            questions,
            config: QuizConfiguration::default(),
            estimated_duration_minutes: Some(10),
        }
    }

    #[tokio::test]
    async fn create_quiz_computes_total_points_and_starts_as_draft() {
        let service = service();
        let quiz = service
            .create_quiz(request(vec![mc_question(10.0), mc_question(5.0)]), Uuid::new_v4())
            .await
            .unwrap();
        assert_eq!(quiz.status, QuizStatus::Draft);
        assert_eq!(quiz.total_points, 15.0);
    }

    #[tokio::test]
    async fn total_points_follows_question_mutations() {
        let service = service();
        let quiz = service
            .create_quiz(request(vec![mc_question(10.0)]), Uuid::new_v4())
            .await
            .unwrap();

        let quiz = service.add_question(quiz.id, mc_question(2.5)).await.unwrap();
        assert_eq!(quiz.total_points, 12.5);

        let quiz = service
            .replace_questions(quiz.id, vec![mc_question(1.0)])
            .await
            .unwrap();
        assert_eq!(quiz.total_points, 1.0);
    }

    #[tokio::test]
    async fn mc_question_without_correct_option_is_rejected() {
        let service = service();
        let mut bad = mc_question(5.0);
        for o in bad.options.iter_mut() {
            o.is_correct = false;
        }
        let err = service
            .create_quiz(request(vec![bad]), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn negative_points_are_rejected() {
        let service = service();
        let err = service
            .create_quiz(request(vec![mc_question(-1.0)]), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn publish_requires_questions() {
        let service = service();
        let quiz = service
            .create_quiz(request(vec![]), Uuid::new_v4())
            .await
            .unwrap();
        let err = service.publish_quiz(quiz.id).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn publish_stamps_published_at() {
        let service = service();
        let quiz = service
            .create_quiz(request(vec![mc_question(1.0)]), Uuid::new_v4())
            .await
            .unwrap();
        let quiz = service.publish_quiz(quiz.id).await.unwrap();
        assert_eq!(quiz.status, QuizStatus::Published);
        assert!(quiz.published_at.is_some());

        // Already published: no second publish.
        let err = service.publish_quiz(quiz.id).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn listings_and_summaries_reflect_the_quiz() {
        use crate::dto::quiz_dto::QuizSummary;

        let service = service();
        let instructor = Uuid::new_v4();
        let course = Uuid::new_v4();
        let mut payload = request(vec![mc_question(10.0)]);
        payload.course_id = Some(course);
        service.create_quiz(payload, instructor).await.unwrap();

        let by_course = service.list_by_course(course).await.unwrap();
        assert_eq!(by_course.len(), 1);
        let by_instructor = service.list_by_instructor(instructor).await.unwrap();
        assert_eq!(by_instructor.len(), 1);

        let summary = QuizSummary::from(&by_course[0]);
        assert_eq!(summary.question_count, 1);
        assert_eq!(summary.total_points, 10.0);
        assert_eq!(summary.status, QuizStatus::Draft);
    }

    #[tokio::test]
    async fn empty_title_fails_payload_validation() {
        let service = service();
        let mut payload = request(vec![]);
        payload.title = String::new();
        let err = service.create_quiz(payload, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, Error::InvalidPayload(_)));
        assert!(err.to_string().starts_with("Invalid payload:"));
    }

    #[tokio::test]
    async fn archived_quizzes_are_frozen() {
        let service = service();
        let quiz = service
            .create_quiz(request(vec![mc_question(1.0)]), Uuid::new_v4())
            .await
            .unwrap();
        let quiz = service.archive_quiz(quiz.id).await.unwrap();
        assert_eq!(quiz.status, QuizStatus::Archived);

        let err = service.add_question(quiz.id, mc_question(1.0)).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        let err = service
            .update_config(quiz.id, QuizConfiguration::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn config_is_replaced_wholesale() {
        let service = service();
        let quiz = service
            .create_quiz(request(vec![mc_question(1.0)]), Uuid::new_v4())
            .await
            .unwrap();
        let config = QuizConfiguration {
            passing_score: 85.0,
            allow_retakes: false,
            ..Default::default()
        };
        let quiz = service.update_config(quiz.id, config).await.unwrap();
        assert_eq!(quiz.config.passing_score, 85.0);
        assert!(!quiz.config.allow_retakes);
    }

    #[tokio::test]
    async fn out_of_range_passing_score_is_rejected() {
        let service = service();
        let mut payload = request(vec![]);
        payload.config.passing_score = 140.0;
        let err = service.create_quiz(payload, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }
}
