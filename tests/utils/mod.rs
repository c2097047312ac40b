// Shared helpers for the integration tests: profile builders and a job
// runner fake whose behavior is scripted per minor version.

#![allow(dead_code)]

use perfguard::interfaces::{CollectionError, JobRunner, MinorVersion};
use perfguard::memory::InMemoryStore;
use perfguard::profile::{FittedModel, ModelKind, Profile, Resource, TrackedProfile};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Directory holding the JSON profile fixtures
pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/profiles")
        .join(name)
}

/// Time profile of `./sort` with the given samples of location "sort"
pub fn sort_profile(origin: &str, samples: &[f64]) -> Profile {
    samples
        .iter()
        .fold(Profile::new(origin, "time", "./sort"), |p, &amount| {
            p.with_resource(Resource::new("sort", amount))
        })
}

/// Profile with a single fitted model for location "sort"
pub fn modelled_profile(origin: &str, model: ModelKind, r_square: f64) -> Profile {
    sort_profile(origin, &[10.0]).with_model(FittedModel::new("sort", model, r_square))
}

/// Register `profile` for `minor_version` in `store`
pub fn track(store: &InMemoryStore, minor_version: &str, profile: Profile) {
    let path = format!("{}/{}.json", minor_version, profile.collector);
    store
        .add_profile(minor_version, TrackedProfile::new(path, profile))
        .unwrap();
}

/// Scripted outcome of one collection
#[derive(Debug, Clone)]
pub enum Collection {
    Produce(Profile),
    Fail(CollectionError),
}

/// Job runner replaying scripted outcomes and recording every request
///
/// Produced profiles are registered in the shared store, as a real runner does.
#[derive(Debug)]
pub struct ScriptedRunner {
    store: InMemoryStore,
    outcomes: BTreeMap<String, Collection>,
    requests: RefCell<Vec<String>>,
}

impl ScriptedRunner {
    pub fn new(store: &InMemoryStore) -> Self {
        Self {
            store: store.clone(),
            outcomes: BTreeMap::new(),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn on(mut self, minor_version: &str, outcome: Collection) -> Self {
        self.outcomes.insert(minor_version.to_string(), outcome);
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl JobRunner for ScriptedRunner {
    fn collect(&self, minor_version: &MinorVersion) -> Result<Vec<TrackedProfile>, CollectionError> {
        self.requests.borrow_mut().push(minor_version.checksum.clone());
        match self.outcomes.get(&minor_version.checksum) {
            Some(Collection::Produce(profile)) => {
                let tracked = TrackedProfile::new(
                    format!("{}/collected.json", minor_version.checksum),
                    profile.clone(),
                );
                self.store
                    .add_profile(&minor_version.checksum, tracked.clone())
                    .map_err(|e| CollectionError::Failed(e.to_string()))?;
                Ok(vec![tracked])
            }
            Some(Collection::Fail(err)) => Err(err.clone()),
            None => Err(CollectionError::Failed(format!(
                "no job scripted for {}",
                minor_version.checksum
            ))),
        }
    }
}
