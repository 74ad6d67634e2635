//! Domain models for the teacher-assistant core.
//!
//! # Responsibility
//! - Define the canonical roster records: teacher accounts, students,
//!   assessments, questions, submissions, answers.
//!
//! # Invariants
//! - Every roster record is identified by a stable `EntityId`.
//! - Validation runs before persistence; repositories reject invalid
//!   records instead of masking them.

pub mod roster;
