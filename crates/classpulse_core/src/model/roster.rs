//! Roster domain records.
//!
//! # Responsibility
//! - Define teacher/student/assessment records and their lifecycle helpers.
//! - Provide validation used by every repository write path.
//!
//! # Invariants
//! - `id` is stable and never reused for another record.
//! - Required text fields are non-empty after trimming.
//! - Point totals are strictly positive.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for every roster record.
pub type EntityId = Uuid;

/// Validation error for roster records.
#[derive(Debug, Clone, PartialEq)]
pub enum RosterValidationError {
    /// A required text field is empty or whitespace-only.
    EmptyField(&'static str),
    /// A point value must be strictly positive.
    NonPositivePoints { field: &'static str, value: i64 },
    /// A score is negative.
    NegativeScore { field: &'static str, value: f64 },
}

impl Display for RosterValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyField(field) => write!(f, "field `{field}` must not be empty"),
            Self::NonPositivePoints { field, value } => {
                write!(f, "field `{field}` must be positive, got {value}")
            }
            Self::NegativeScore { field, value } => {
                write!(f, "field `{field}` must not be negative, got {value}")
            }
        }
    }
}

impl Error for RosterValidationError {}

fn require_non_empty(field: &'static str, value: &str) -> Result<(), RosterValidationError> {
    if value.trim().is_empty() {
        Err(RosterValidationError::EmptyField(field))
    } else {
        Ok(())
    }
}

/// Teacher account owning students and assessments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeacherAccount {
    pub id: EntityId,
    pub username: String,
    pub email: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl TeacherAccount {
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            email: email.into(),
            created_at: now_epoch_ms(),
        }
    }

    pub fn validate(&self) -> Result<(), RosterValidationError> {
        require_non_empty("username", &self.username)?;
        require_non_empty("email", &self.email)
    }
}

/// Student tracked by a teacher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: EntityId,
    /// Owning teacher, when assigned.
    pub teacher_id: Option<EntityId>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub grade_level: Option<i64>,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl Student {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            teacher_id: None,
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            grade_level: None,
            created_at: now_epoch_ms(),
        }
    }

    pub fn validate(&self) -> Result<(), RosterValidationError> {
        require_non_empty("first_name", &self.first_name)?;
        require_non_empty("last_name", &self.last_name)?;
        require_non_empty("email", &self.email)
    }
}

/// Assessment owned by a teacher, parent of questions and submissions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub id: EntityId,
    pub creator_id: Option<EntityId>,
    pub title: String,
    pub description: Option<String>,
    /// Due day, when set. Day granularity.
    pub due_date: Option<chrono::NaiveDate>,
    pub total_points: i64,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl Assessment {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            creator_id: None,
            title: title.into(),
            description: None,
            due_date: None,
            total_points: 100,
            created_at: now_epoch_ms(),
        }
    }

    pub fn validate(&self) -> Result<(), RosterValidationError> {
        require_non_empty("title", &self.title)?;
        if self.total_points <= 0 {
            return Err(RosterValidationError::NonPositivePoints {
                field: "total_points",
                value: self.total_points,
            });
        }
        Ok(())
    }
}

/// Question category for grading and rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    MultipleChoice,
    TrueFalse,
    ShortAnswer,
    Essay,
}

/// One question belonging to an assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentQuestion {
    pub id: EntityId,
    pub assessment_id: EntityId,
    pub question_text: String,
    pub question_type: QuestionType,
    pub points: i64,
    /// Choice options, serialized by the caller (e.g. JSON array text).
    pub options: Option<String>,
    pub correct_answer: Option<String>,
}

impl AssessmentQuestion {
    pub fn new(
        assessment_id: EntityId,
        question_text: impl Into<String>,
        question_type: QuestionType,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            assessment_id,
            question_text: question_text.into(),
            question_type,
            points: 10,
            options: None,
            correct_answer: None,
        }
    }

    pub fn validate(&self) -> Result<(), RosterValidationError> {
        require_non_empty("question_text", &self.question_text)?;
        if self.points <= 0 {
            return Err(RosterValidationError::NonPositivePoints {
                field: "points",
                value: self.points,
            });
        }
        Ok(())
    }
}

/// One student's submission for an assessment, parent of answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentSubmission {
    pub id: EntityId,
    pub assessment_id: EntityId,
    pub student_id: EntityId,
    /// Unix epoch milliseconds.
    pub submitted_at: i64,
    pub graded: bool,
    pub total_score: Option<f64>,
    pub feedback: Option<String>,
}

impl AssessmentSubmission {
    pub fn new(assessment_id: EntityId, student_id: EntityId) -> Self {
        Self {
            id: Uuid::new_v4(),
            assessment_id,
            student_id,
            submitted_at: now_epoch_ms(),
            graded: false,
            total_score: None,
            feedback: None,
        }
    }

    pub fn validate(&self) -> Result<(), RosterValidationError> {
        if let Some(score) = self.total_score {
            if score < 0.0 {
                return Err(RosterValidationError::NegativeScore {
                    field: "total_score",
                    value: score,
                });
            }
        }
        Ok(())
    }
}

/// One answer inside a submission, linked to its question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionAnswer {
    pub id: EntityId,
    pub submission_id: EntityId,
    pub question_id: EntityId,
    pub answer_text: Option<String>,
    pub score: Option<f64>,
    pub feedback: Option<String>,
    /// Whether the score came from the assistant rather than the teacher.
    pub ai_graded: bool,
}

impl QuestionAnswer {
    pub fn new(submission_id: EntityId, question_id: EntityId) -> Self {
        Self {
            id: Uuid::new_v4(),
            submission_id,
            question_id,
            answer_text: None,
            score: None,
            feedback: None,
            ai_graded: false,
        }
    }

    pub fn validate(&self) -> Result<(), RosterValidationError> {
        if let Some(score) = self.score {
            if score < 0.0 {
                return Err(RosterValidationError::NegativeScore {
                    field: "score",
                    value: score,
                });
            }
        }
        Ok(())
    }
}

fn now_epoch_ms() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::{Assessment, AssessmentQuestion, QuestionType, RosterValidationError, Student};
    use uuid::Uuid;

    #[test]
    fn student_requires_names_and_email() {
        let mut student = Student::new("Ada", "Lovelace", "ada@example.edu");
        assert!(student.validate().is_ok());

        student.email = "  ".to_string();
        assert_eq!(
            student.validate(),
            Err(RosterValidationError::EmptyField("email"))
        );
    }

    #[test]
    fn assessment_rejects_non_positive_points() {
        let mut assessment = Assessment::new("Midterm");
        assessment.total_points = 0;
        assert!(matches!(
            assessment.validate(),
            Err(RosterValidationError::NonPositivePoints { .. })
        ));
    }

    #[test]
    fn question_requires_text() {
        let question =
            AssessmentQuestion::new(Uuid::new_v4(), "", QuestionType::MultipleChoice);
        assert_eq!(
            question.validate(),
            Err(RosterValidationError::EmptyField("question_text"))
        );
    }
}
