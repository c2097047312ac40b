//! Collaborator contracts consumed by the detection engine
//!
//! The revision history, the profile/result store and the job runner live
//! outside this crate. The orchestrator only talks to them through these
//! traits.

use crate::change::DegradationRecord;
use crate::profile::TrackedProfile;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One revision of the tracked history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinorVersion {
    pub checksum: String,
    /// Parent checksums, first parent first
    pub parents: Vec<String>,
    pub author: String,
    pub date: String,
    pub description: String,
}

impl MinorVersion {
    pub fn new(checksum: impl Into<String>, parents: Vec<String>) -> Self {
        Self {
            checksum: checksum.into(),
            parents,
            author: String::new(),
            date: String::new(),
            description: String::new(),
        }
    }
}

/// History errors
#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("unknown minor version '{0}'")]
    UnknownMinorVersion(String),

    #[error("history backend error: {0}")]
    Backend(String),
}

/// Revision history wrapper
pub trait History {
    /// Checksum of the current head
    fn head_minor_version(&self) -> Result<String, HistoryError>;

    /// Finite, newest-first walk starting at `start` (inclusive)
    ///
    /// Re-walking from the same start yields the same sequence.
    fn walk_minor_versions<'a>(
        &'a self,
        start: &str,
    ) -> Result<Box<dyn Iterator<Item = MinorVersion> + 'a>, HistoryError>;

    fn minor_version_info(&self, checksum: &str) -> Result<MinorVersion, HistoryError>;
}

/// Store errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store io error: {0}")]
    Io(String),

    #[error("store data is corrupted: {0}")]
    Corrupt(String),
}

/// Content-addressable profile and result store
pub trait ProfileStore {
    /// Profiles registered for a minor version, in store order
    fn load_profiles(&self, minor_version: &str) -> Result<Vec<TrackedProfile>, StoreError>;

    /// Persisted degradation records of a minor version
    fn load_degradation_records(
        &self,
        minor_version: &str,
    ) -> Result<Vec<DegradationRecord>, StoreError>;

    /// Replace the degradation records of a minor version
    ///
    /// Readers must observe either the old or the new set, never a mix.
    fn store_degradation_records(
        &self,
        minor_version: &str,
        records: &[DegradationRecord],
    ) -> Result<(), StoreError>;
}

/// Reasons a collection job did not produce profiles
///
/// Every variant counts as an aborted collection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollectionError {
    #[error("collection cancelled by operator")]
    Cancelled,

    #[error("collection failed: {0}")]
    Failed(String),

    #[error("resource locked: {0}")]
    ResourceLocked(String),
}

/// Runs the configured benchmarks for a minor version
///
/// Blocking, with no intrinsic timeout. Collected profiles must be registered
/// in the `ProfileStore` before `collect` returns; the returned list names
/// what was registered and the orchestrator reloads the store afterwards.
pub trait JobRunner {
    fn collect(&self, minor_version: &MinorVersion) -> Result<Vec<TrackedProfile>, CollectionError>;
}
