//! Error taxonomy for degradation detection
//!
//! Only configuration and compatibility problems are fatal. Degenerate
//! numeric input never reaches this type: strategies always classify.

use crate::interfaces::{HistoryError, StoreError};
use thiserror::Error;

/// Errors raised by the detection engine
#[derive(Error, Debug)]
pub enum DetectionError {
    /// Malformed or missing configuration (e.g. unknown apply policy)
    #[error("invalid degradation configuration: {0}")]
    Configuration(String),

    /// Compared profiles were produced by different collectors or pipelines
    #[error(
        "incompatible configurations: cannot compare profile of '{baseline}' with profile of '{target}'"
    )]
    IncompatibleProfiles { baseline: String, target: String },

    /// Requested strategy identifier is not registered
    #[error("unknown degradation method '{0}'")]
    UnknownMethod(String),

    /// External re-collection failed or was cancelled
    ///
    /// Recovered by the orchestrator; never returned from history checks.
    #[error("collection aborted: {0}")]
    AbortedCollection(String),

    /// Profile could not be read or decoded
    #[error("failed to load profile: {0}")]
    Profile(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    History(#[from] HistoryError),
}

/// Result type for detection operations
pub type Result<T> = std::result::Result<T, DetectionError>;
