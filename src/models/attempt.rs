use crate::models::answer::QuizAnswer;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptStatus {
    InProgress,
    Submitted,
    Graded,
    Expired,
}

impl AttemptStatus {
    /// Submitted attempts may still advance to graded; graded and
    /// expired are terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, AttemptStatus::Graded | AttemptStatus::Expired)
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, AttemptStatus::Submitted | AttemptStatus::Graded)
    }
}

impl std::fmt::Display for AttemptStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AttemptStatus::InProgress => "in_progress",
            AttemptStatus::Submitted => "submitted",
            AttemptStatus::Graded => "graded",
            AttemptStatus::Expired => "expired",
        };
        f.write_str(s)
    }
}

/// One student's timed pass through a quiz. References the quiz by id
/// only; `total_points` is snapshotted at start so later quiz edits do
/// not skew percentages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizAttempt {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub student_id: Uuid,
    pub status: AttemptStatus,
    /// 1-based, per student per quiz.
    pub attempt_number: u32,
    /// Ids of the questions served at start. With a pool draw this is
    /// a subset of the quiz; answers to anything else are rejected so
    /// earned points can never exceed the `total_points` snapshot.
    #[serde(default)]
    pub question_ids: Vec<Uuid>,
    /// Unique by question_id (upsert on resubmission).
    pub answers: Vec<QuizAnswer>,
    pub current_question_index: usize,
    pub total_points: f64,
    pub points_earned: f64,
    pub score_percentage: f64,
    pub is_passing: bool,
    pub started_at: DateTime<Utc>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub time_spent_seconds: i64,
    /// None when the quiz has no time limit.
    pub time_remaining_seconds: Option<i64>,
}

impl QuizAttempt {
    /// Pure expiry predicate; terminal and completed attempts never
    /// expire retroactively.
    pub fn is_expired_at(&self, time_limit_minutes: Option<i64>, now: DateTime<Utc>) -> bool {
        if self.status != AttemptStatus::InProgress {
            return false;
        }
        match time_limit_minutes {
            Some(limit) => (now - self.started_at).num_seconds() > limit * 60,
            None => false,
        }
    }

    pub fn remaining_seconds_at(
        &self,
        time_limit_minutes: Option<i64>,
        now: DateTime<Utc>,
    ) -> Option<i64> {
        time_limit_minutes.map(|limit| (limit * 60 - (now - self.started_at).num_seconds()).max(0))
    }

    pub fn answer_for(&self, question_id: Uuid) -> Option<&QuizAnswer> {
        self.answers.iter().find(|a| a.question_id == question_id)
    }

    pub fn serves_question(&self, question_id: Uuid) -> bool {
        self.question_ids.contains(&question_id)
    }

    /// Last write for a question wins; answer changes within the time
    /// window are allowed.
    pub fn upsert_answer(&mut self, answer: QuizAnswer) {
        match self
            .answers
            .iter()
            .position(|a| a.question_id == answer.question_id)
        {
            Some(pos) => self.answers[pos] = answer,
            None => self.answers.push(answer),
        }
    }
}
