//! In-memory history and store for tests, demos and embedding
//!
//! Not a persistence layer: everything lives in process memory behind a
//! mutex. Replacing the records of a minor version happens under one lock,
//! so readers never observe a partial set.

use crate::change::DegradationRecord;
use crate::interfaces::{History, HistoryError, MinorVersion, ProfileStore, StoreError};
use crate::profile::TrackedProfile;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// First-parent history kept in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryHistory {
    versions: BTreeMap<String, MinorVersion>,
    head: Option<String>,
}

impl InMemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Linear history from checksums given oldest first; the last one is head
    pub fn linear(checksums: &[&str]) -> Self {
        let mut history = Self::new();
        let mut parent: Option<&str> = None;
        for checksum in checksums {
            let parents = parent.map(|p| vec![p.to_string()]).unwrap_or_default();
            history.commit(MinorVersion::new(*checksum, parents));
            parent = Some(*checksum);
        }
        history
    }

    /// Add a minor version and make it the head
    pub fn commit(&mut self, version: MinorVersion) {
        self.head = Some(version.checksum.clone());
        self.versions.insert(version.checksum.clone(), version);
    }
}

impl History for InMemoryHistory {
    fn head_minor_version(&self) -> Result<String, HistoryError> {
        self.head
            .clone()
            .ok_or_else(|| HistoryError::Backend("history is empty".to_string()))
    }

    fn walk_minor_versions<'a>(
        &'a self,
        start: &str,
    ) -> Result<Box<dyn Iterator<Item = MinorVersion> + 'a>, HistoryError> {
        let first = self.minor_version_info(start)?;
        Ok(Box::new(std::iter::successors(Some(first), move |version| {
            version
                .parents
                .first()
                .and_then(|parent| self.versions.get(parent))
                .cloned()
        })))
    }

    fn minor_version_info(&self, checksum: &str) -> Result<MinorVersion, HistoryError> {
        self.versions
            .get(checksum)
            .cloned()
            .ok_or_else(|| HistoryError::UnknownMinorVersion(checksum.to_string()))
    }
}

/// Profile and degradation record store kept in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    profiles: Arc<Mutex<BTreeMap<String, Vec<TrackedProfile>>>>,
    records: Arc<Mutex<BTreeMap<String, Vec<DegradationRecord>>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a profile for a minor version
    pub fn add_profile(&self, minor_version: &str, profile: TrackedProfile) -> Result<(), StoreError> {
        self.profiles
            .lock()
            .map_err(|_| StoreError::Io("profile store mutex poisoned".to_string()))?
            .entry(minor_version.to_string())
            .or_default()
            .push(profile);
        Ok(())
    }

    /// Minor versions with persisted records
    pub fn checked_versions(&self) -> Result<Vec<String>, StoreError> {
        let guard = self
            .records
            .lock()
            .map_err(|_| StoreError::Io("record store mutex poisoned".to_string()))?;
        Ok(guard.keys().cloned().collect())
    }
}

impl ProfileStore for InMemoryStore {
    fn load_profiles(&self, minor_version: &str) -> Result<Vec<TrackedProfile>, StoreError> {
        let guard = self
            .profiles
            .lock()
            .map_err(|_| StoreError::Io("profile store mutex poisoned".to_string()))?;
        Ok(guard.get(minor_version).cloned().unwrap_or_default())
    }

    fn load_degradation_records(
        &self,
        minor_version: &str,
    ) -> Result<Vec<DegradationRecord>, StoreError> {
        let guard = self
            .records
            .lock()
            .map_err(|_| StoreError::Io("record store mutex poisoned".to_string()))?;
        Ok(guard.get(minor_version).cloned().unwrap_or_default())
    }

    fn store_degradation_records(
        &self,
        minor_version: &str,
        records: &[DegradationRecord],
    ) -> Result<(), StoreError> {
        self.records
            .lock()
            .map_err(|_| StoreError::Io("record store mutex poisoned".to_string()))?
            .insert(minor_version.to_string(), records.to_vec());
        Ok(())
    }
}
