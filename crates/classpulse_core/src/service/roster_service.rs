//! Roster use-case service.
//!
//! # Responsibility
//! - Provide teacher-account and student create/get/list/update/delete APIs.
//! - Map repository errors to use-case errors callers can branch on.
//!
//! # Invariants
//! - Writes are verified by read-back; a write that cannot be read back is
//!   an inconsistency, not a success.

use crate::model::roster::{EntityId, Student, TeacherAccount};
use crate::repo::roster_repo::{RosterRepository, StudentListQuery};
use crate::repo::{RepoError, RepoResult};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for roster use-cases.
#[derive(Debug)]
pub enum RosterServiceError {
    /// Target student does not exist.
    StudentNotFound(EntityId),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for RosterServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StudentNotFound(id) => write!(f, "student not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent roster state: {details}"),
        }
    }
}

impl Error for RosterServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for RosterServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::StudentNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Roster service facade over repository implementations.
pub struct RosterService<R: RosterRepository> {
    repo: R,
}

impl<R: RosterRepository> RosterService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a teacher account through repository persistence.
    pub fn create_teacher(&self, teacher: &TeacherAccount) -> RepoResult<EntityId> {
        self.repo.create_teacher(teacher)
    }

    /// Gets one teacher account by stable ID.
    pub fn get_teacher(&self, id: EntityId) -> RepoResult<Option<TeacherAccount>> {
        self.repo.get_teacher(id)
    }

    /// Creates one student and returns the persisted record.
    pub fn create_student(&self, student: &Student) -> Result<Student, RosterServiceError> {
        let id = self.repo.create_student(student)?;
        self.repo
            .get_student(id)?
            .ok_or(RosterServiceError::InconsistentState(
                "created student not found in read-back",
            ))
    }

    /// Gets one student by stable ID.
    pub fn get_student(&self, id: EntityId) -> RepoResult<Option<Student>> {
        self.repo.get_student(id)
    }

    /// Lists students with optional teacher filter and pagination.
    pub fn list_students(&self, query: &StudentListQuery) -> RepoResult<Vec<Student>> {
        self.repo.list_students(query)
    }

    /// Updates a student record and returns the persisted state.
    pub fn update_student(&self, student: &Student) -> Result<Student, RosterServiceError> {
        self.repo.update_student(student)?;
        self.repo
            .get_student(student.id)?
            .ok_or(RosterServiceError::InconsistentState(
                "updated student not found in read-back",
            ))
    }

    /// Deletes a student by stable ID.
    pub fn delete_student(&self, id: EntityId) -> Result<(), RosterServiceError> {
        self.repo.delete_student(id)?;
        Ok(())
    }
}
