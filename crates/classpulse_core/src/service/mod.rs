//! Use-case services over repository implementations.
//!
//! # Responsibility
//! - Provide stable entry points for core callers (web layer, CLI).
//! - Delegate persistence to injected repository implementations.
//!
//! # Invariants
//! - Services never bypass repository validation/persistence contracts.
//! - The service layer remains storage-agnostic.

pub mod assessment_service;
pub mod roster_service;
