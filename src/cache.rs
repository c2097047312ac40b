//! Memo of profiles already resolved per minor version
//!
//! Owned by the caller and passed into every orchestrator call. Entries never
//! expire on their own; `clear` drops them. Clearing only changes the cost of
//! a later run, never its classifications.

use crate::profile::TrackedProfile;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct DegradationCache {
    entries: HashMap<String, Vec<TrackedProfile>>,
}

impl DegradationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, checksum: &str) -> Option<&[TrackedProfile]> {
        self.entries.get(checksum).map(|profiles| profiles.as_slice())
    }

    pub fn put(&mut self, checksum: impl Into<String>, profiles: Vec<TrackedProfile>) {
        self.entries.insert(checksum.into(), profiles);
    }

    pub fn contains(&self, checksum: &str) -> bool {
        self.entries.contains_key(checksum)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
