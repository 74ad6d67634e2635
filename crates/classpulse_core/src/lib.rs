//! Core domain logic for the ClassPulse teacher assistant.
//! This crate is the single source of truth for business invariants.

pub mod ai;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod tracker;

pub use ai::{
    AiClientConfig, AiError, AiResult, ChatClient, ChatMessage, ChatRole, ContentKind,
    OpenAiChatClient,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::roster::{
    Assessment, AssessmentQuestion, AssessmentSubmission, EntityId, QuestionAnswer, QuestionType,
    RosterValidationError, Student, TeacherAccount,
};
pub use repo::assessment_repo::{AssessmentRepository, SqliteAssessmentRepository};
pub use repo::roster_repo::{RosterRepository, SqliteRosterRepository, StudentListQuery};
pub use repo::{RepoError, RepoResult};
pub use service::assessment_service::{AssessmentService, AssessmentServiceError};
pub use service::roster_service::{RosterService, RosterServiceError};
pub use tracker::{
    parse_day, Goal, GoalProgress, MetricStats, Period, PeriodComparison, PerformanceTracker,
    TrackerError, TrackerReport, TrackerResult, Trend, TrendAnalysis, TrendStrength,
    DEFAULT_TREND_WINDOW,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
