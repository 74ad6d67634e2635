//! Assessment use-case service.
//!
//! # Responsibility
//! - Provide assessment/question/submission lifecycle APIs.
//! - Aggregate per-answer scores into submission grades.
//!
//! # Invariants
//! - Grading sums every scored answer; unscored answers contribute nothing.
//! - Parent deletions go through the repository's transactional cascades.

use crate::model::roster::{
    Assessment, AssessmentQuestion, AssessmentSubmission, EntityId, QuestionAnswer,
};
use crate::repo::assessment_repo::AssessmentRepository;
use crate::repo::{RepoError, RepoResult};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for assessment use-cases.
#[derive(Debug)]
pub enum AssessmentServiceError {
    /// Target submission does not exist.
    SubmissionNotFound(EntityId),
    /// A submission cannot be graded without recorded answers.
    NoAnswers(EntityId),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for AssessmentServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SubmissionNotFound(id) => write!(f, "submission not found: {id}"),
            Self::NoAnswers(id) => write!(f, "submission {id} has no answers to grade"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => {
                write!(f, "inconsistent assessment state: {details}")
            }
        }
    }
}

impl Error for AssessmentServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for AssessmentServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::SubmissionNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Assessment service facade over repository implementations.
pub struct AssessmentService<R: AssessmentRepository> {
    repo: R,
}

impl<R: AssessmentRepository> AssessmentService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates an assessment through repository persistence.
    pub fn create_assessment(&self, assessment: &Assessment) -> RepoResult<EntityId> {
        self.repo.create_assessment(assessment)
    }

    /// Gets one assessment by stable ID.
    pub fn get_assessment(&self, id: EntityId) -> RepoResult<Option<Assessment>> {
        self.repo.get_assessment(id)
    }

    /// Lists assessments, optionally restricted to one creator.
    pub fn list_assessments(&self, creator_id: Option<EntityId>) -> RepoResult<Vec<Assessment>> {
        self.repo.list_assessments(creator_id)
    }

    /// Deletes an assessment with its questions, submissions and answers.
    pub fn delete_assessment(&mut self, id: EntityId) -> RepoResult<()> {
        self.repo.delete_assessment(id)
    }

    /// Adds one question to an assessment.
    pub fn add_question(&self, question: &AssessmentQuestion) -> RepoResult<EntityId> {
        self.repo.add_question(question)
    }

    /// Lists questions of an assessment in insertion order.
    pub fn list_questions(&self, assessment_id: EntityId) -> RepoResult<Vec<AssessmentQuestion>> {
        self.repo.list_questions(assessment_id)
    }

    /// Creates one submission for an assessment.
    pub fn create_submission(&self, submission: &AssessmentSubmission) -> RepoResult<EntityId> {
        self.repo.create_submission(submission)
    }

    /// Gets one submission by stable ID.
    pub fn get_submission(&self, id: EntityId) -> RepoResult<Option<AssessmentSubmission>> {
        self.repo.get_submission(id)
    }

    /// Lists submissions of an assessment, newest first.
    pub fn list_submissions(
        &self,
        assessment_id: EntityId,
    ) -> RepoResult<Vec<AssessmentSubmission>> {
        self.repo.list_submissions(assessment_id)
    }

    /// Deletes a submission with its answers.
    pub fn delete_submission(&mut self, id: EntityId) -> RepoResult<()> {
        self.repo.delete_submission(id)
    }

    /// Records one answer inside a submission.
    pub fn record_answer(&self, answer: &QuestionAnswer) -> RepoResult<EntityId> {
        self.repo.record_answer(answer)
    }

    /// Lists answers of a submission in insertion order.
    pub fn list_answers(&self, submission_id: EntityId) -> RepoResult<Vec<QuestionAnswer>> {
        self.repo.list_answers(submission_id)
    }

    /// Sums answer scores into the submission grade and marks it graded.
    ///
    /// Returns the persisted submission after grading.
    pub fn grade_submission(
        &self,
        submission_id: EntityId,
        feedback: Option<&str>,
    ) -> Result<AssessmentSubmission, AssessmentServiceError> {
        let answers = self.repo.list_answers(submission_id)?;
        if answers.is_empty() {
            return Err(AssessmentServiceError::NoAnswers(submission_id));
        }

        let total_score: f64 = answers.iter().filter_map(|answer| answer.score).sum();
        self.repo
            .update_submission_grade(submission_id, total_score, feedback)?;

        info!(
            "event=grade_submission module=service status=ok submission={} answers={} total_score={}",
            submission_id,
            answers.len(),
            total_score
        );

        self.repo
            .get_submission(submission_id)?
            .ok_or(AssessmentServiceError::InconsistentState(
                "graded submission not found in read-back",
            ))
    }
}
