//! History-aware degradation detection
//!
//! For a target minor version the checker picks baselines among its
//! ancestors (per `ApplyPolicy`), pairs each rule-matched target profile with
//! the baseline profile of the same configuration, runs the matching
//! strategies and persists the verdicts for the target (replacing any
//! earlier run).
//!
//! Missing target profiles can be re-collected first. An aborted collection
//! only skips that target: nothing is persisted, nothing is returned, and a
//! history walk carries on with the next minor version.

use crate::cache::DegradationCache;
use crate::change::{DegradationRecord, HistoryEntry};
use crate::config::{ApplyPolicy, DegradationConfig};
use crate::error::{DetectionError, Result};
use crate::interfaces::{History, JobRunner, MinorVersion, ProfileStore};
use crate::pairing::{self, check_compatibility, MethodSelector};
use crate::profile::{Profile, TrackedProfile};
use crate::rules::applicable_rules;
use crate::strategy::{DetectionMethod, Strategy, StrategyRegistry};

/// Target profile scheduled for checking, with the strategies its rules select
struct CheckedProfile<'p> {
    tracked: &'p TrackedProfile,
    strategies: Vec<&'p Strategy>,
}

/// Baseline candidate: an ancestor and its profiles
struct Baseline {
    checksum: String,
    profiles: Vec<TrackedProfile>,
}

/// Orchestrates degradation checks over the revision history
pub struct DegradationChecker<'a> {
    history: &'a dyn History,
    store: &'a dyn ProfileStore,
    runner: &'a dyn JobRunner,
    config: DegradationConfig,
    registry: StrategyRegistry,
}

impl<'a> DegradationChecker<'a> {
    pub fn new(
        history: &'a dyn History,
        store: &'a dyn ProfileStore,
        runner: &'a dyn JobRunner,
        config: DegradationConfig,
    ) -> Self {
        let registry = StrategyRegistry::new(&config.thresholds);
        Self {
            history,
            store,
            runner,
            config,
            registry,
        }
    }

    pub fn config(&self) -> &DegradationConfig {
        &self.config
    }

    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }

    /// Check one minor version against its baseline ancestors
    ///
    /// Returns the persisted records, or an empty list when the target was
    /// skipped because its collection aborted.
    pub fn degradation_in_minor(
        &self,
        checksum: &str,
        cache: &mut DegradationCache,
    ) -> Result<Vec<DegradationRecord>> {
        let target = self.history.minor_version_info(checksum)?;
        let Some(target_profiles) = self.resolve_target_profiles(&target, cache)? else {
            return Ok(Vec::new());
        };

        let checked = self.checked_profiles(&target_profiles);
        let baselines = if checked.is_empty() {
            tracing::debug!(
                minor_version = %target.checksum,
                "no profile matches a configured rule"
            );
            Vec::new()
        } else {
            self.select_baselines(&target, &checked, cache)?
        };

        let mut records = Vec::new();
        for baseline in &baselines {
            for candidate in &checked {
                let target_profile = &candidate.tracked.profile;
                let Some(paired) = baseline
                    .profiles
                    .iter()
                    .find(|b| b.profile.same_configuration(target_profile))
                else {
                    continue;
                };
                check_compatibility(&paired.profile, target_profile)?;

                let results =
                    pairing::run_strategies(&candidate.strategies, &paired.profile, target_profile);
                records.extend(results.into_iter().map(|info| DegradationRecord {
                    info,
                    baseline: baseline.checksum.clone(),
                    profile: candidate.tracked.path.clone(),
                }));
            }
        }

        self.store
            .store_degradation_records(&target.checksum, &records)?;
        tracing::info!(
            minor_version = %target.checksum,
            baselines = baselines.len(),
            records = records.len(),
            "degradation check finished"
        );
        Ok(records)
    }

    /// Check the current head of the history
    pub fn degradation_in_head(&self, cache: &mut DegradationCache) -> Result<Vec<DegradationRecord>> {
        let head = self.history.head_minor_version()?;
        self.degradation_in_minor(&head, cache)
    }

    /// Check every minor version from `start` backwards, newest first
    pub fn degradation_in_history(
        &self,
        start: &str,
        cache: &mut DegradationCache,
    ) -> Result<Vec<HistoryEntry>> {
        let mut entries = Vec::new();
        for version in self.history.walk_minor_versions(start)? {
            let records = self.degradation_in_minor(&version.checksum, cache)?;
            entries.extend(records.into_iter().map(|record| HistoryEntry {
                target: version.checksum.clone(),
                record,
            }));
        }
        Ok(entries)
    }

    /// Compare two given profiles and persist the result for `minor_version`
    ///
    /// # Errors
    /// `IncompatibleProfiles` for descriptor mismatches; nothing is persisted then.
    pub fn check_profiles(
        &self,
        baseline: &TrackedProfile,
        target: &TrackedProfile,
        minor_version: &str,
        selector: MethodSelector,
    ) -> Result<Vec<DegradationRecord>> {
        let results = pairing::degradation_between_files(
            &self.registry,
            &baseline.profile,
            &target.profile,
            minor_version,
            selector,
        )?;
        let records: Vec<DegradationRecord> = results
            .into_iter()
            .map(|info| DegradationRecord {
                info,
                baseline: baseline.profile.origin.clone(),
                profile: target.path.clone(),
            })
            .collect();
        self.store.store_degradation_records(minor_version, &records)?;
        Ok(records)
    }

    /// Previously persisted records of a minor version
    pub fn load_records(&self, checksum: &str) -> Result<Vec<DegradationRecord>> {
        Ok(self.store.load_degradation_records(checksum)?)
    }

    fn has_applicable_rule(&self, profile: &Profile) -> bool {
        !applicable_rules(&self.config.strategies, profile).is_empty()
    }

    /// Target profiles with the (deduplicated) strategies their rules select
    fn checked_profiles<'p>(&'p self, profiles: &'p [TrackedProfile]) -> Vec<CheckedProfile<'p>> {
        profiles
            .iter()
            .filter_map(|tracked| {
                let mut methods: Vec<DetectionMethod> =
                    applicable_rules(&self.config.strategies, &tracked.profile)
                        .into_iter()
                        .map(|rule| rule.method)
                        .collect();
                if methods.is_empty() {
                    return None;
                }
                methods.sort();
                methods.dedup();
                Some(CheckedProfile {
                    tracked,
                    strategies: methods.into_iter().map(|m| self.registry.get(m)).collect(),
                })
            })
            .collect()
    }

    /// Profiles of the target, collecting them first when configured to
    ///
    /// `None` means the collection aborted and the target must be skipped.
    fn resolve_target_profiles(
        &self,
        target: &MinorVersion,
        cache: &mut DegradationCache,
    ) -> Result<Option<Vec<TrackedProfile>>> {
        // Cache entries mirror the store. An entry cached by an ancestor lookup
        // before any collection is re-checked for matching profiles as well
        let mut profiles = match cache.get(&target.checksum) {
            Some(profiles) => profiles.to_vec(),
            None => self.store.load_profiles(&target.checksum)?,
        };
        let has_match = profiles.iter().any(|p| self.has_applicable_rule(&p.profile));
        if !has_match && self.config.collect_before_check {
            tracing::info!(
                minor_version = %target.checksum,
                "no matching profile, collecting before check"
            );
            match self.runner.collect(target) {
                Ok(collected) => {
                    tracing::debug!(
                        minor_version = %target.checksum,
                        collected = collected.len(),
                        "collection finished, reloading profiles"
                    );
                    profiles = self.store.load_profiles(&target.checksum)?;
                }
                Err(err) => {
                    let aborted = DetectionError::AbortedCollection(err.to_string());
                    tracing::warn!(
                        minor_version = %target.checksum,
                        "{}; skipping degradation check",
                        aborted
                    );
                    return Ok(None);
                }
            }
        }

        cache.put(target.checksum.clone(), profiles.clone());
        Ok(Some(profiles))
    }

    /// Profiles of an ancestor, through the cache
    fn ancestor_profiles(
        &self,
        checksum: &str,
        cache: &mut DegradationCache,
    ) -> Result<Vec<TrackedProfile>> {
        if let Some(profiles) = cache.get(checksum) {
            return Ok(profiles.to_vec());
        }
        let profiles = self.store.load_profiles(checksum)?;
        cache.put(checksum, profiles.clone());
        Ok(profiles)
    }

    /// Ancestors carrying a profile pairable with some checked target profile
    fn select_baselines(
        &self,
        target: &MinorVersion,
        checked: &[CheckedProfile<'_>],
        cache: &mut DegradationCache,
    ) -> Result<Vec<Baseline>> {
        // The walk is lazy: `ApplyPolicy::First` stops at the nearest baseline
        let ancestors = self
            .history
            .walk_minor_versions(&target.checksum)?
            .filter(|version| version.checksum != target.checksum);

        let mut baselines = Vec::new();
        for ancestor in ancestors {
            let profiles = self.ancestor_profiles(&ancestor.checksum, cache)?;
            let pairable = profiles.iter().any(|b| {
                checked
                    .iter()
                    .any(|c| b.profile.same_configuration(&c.tracked.profile))
            });
            if !pairable {
                continue;
            }

            tracing::debug!(
                minor_version = %target.checksum,
                baseline = %ancestor.checksum,
                "baseline selected"
            );
            baselines.push(Baseline {
                checksum: ancestor.checksum,
                profiles,
            });
            if self.config.apply == ApplyPolicy::First {
                break;
            }
        }
        Ok(baselines)
    }
}
