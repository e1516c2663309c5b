use thiserror::Error;

/// Error taxonomy for plan generation and adaptation.
///
/// Degraded-path failures (recommendation service down, catalog empty) are
/// absorbed where they occur and never appear here; only prerequisite
/// failures and malformed requests propagate to callers.
#[derive(Debug, Error)]
pub enum PlanningError {
    /// The user-profile service could not supply the profile. Hard
    /// prerequisite: aborts the whole generate-or-adapt operation.
    #[error("failed to fetch user profile from auth service")]
    ProfileUnavailable,

    #[error("weekly plan not found")]
    PlanNotFound,

    /// The targeted day is a rest day.
    #[error("no workout planned for this day")]
    NoWorkoutPlanned,

    /// Adaptation input inconsistent with the document; rejected before any
    /// mutation begins.
    #[error("invalid adaptation request: {0}")]
    InvalidAdaptation(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
