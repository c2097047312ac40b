//! Performance profiles as consumed by the detection engine
//!
//! A profile is an immutable bundle of per-location measurements captured by
//! one collector for one command, optionally enriched by postprocessors (e.g.
//! regression-model fitting, which attaches `models`).

use crate::error::{DetectionError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

/// Regression model kinds, ordered by asymptotic complexity class
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    Constant,
    Logarithmic,
    Linear,
    Quadratic,
    Power,
    Exponential,
}

impl ModelKind {
    /// Ordinal complexity class (higher is asymptotically worse)
    pub fn order(self) -> u8 {
        match self {
            Self::Constant => 0,
            Self::Logarithmic => 1,
            Self::Linear => 2,
            Self::Quadratic => 3,
            Self::Power => 4,
            Self::Exponential => 5,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Constant => "constant",
            Self::Logarithmic => "logarithmic",
            Self::Linear => "linear",
            Self::Quadratic => "quadratic",
            Self::Power => "power",
            Self::Exponential => "exponential",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One measurement record for a location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Measurement location (function, call site, allocation site...)
    pub location: String,
    /// Measured amount (time, bytes, exclusive time per call...)
    pub amount: f64,
    /// Number of calls the amount stands for
    #[serde(default = "default_calls")]
    pub calls: u64,
}

fn default_calls() -> u64 {
    1
}

impl Resource {
    pub fn new(location: impl Into<String>, amount: f64) -> Self {
        Self {
            location: location.into(),
            amount,
            calls: 1,
        }
    }

    pub fn with_calls(mut self, calls: u64) -> Self {
        self.calls = calls;
        self
    }
}

/// Candidate regression model fitted to a location's data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedModel {
    pub location: String,
    pub model: ModelKind,
    /// Goodness of fit (coefficient of determination)
    pub r_square: f64,
    #[serde(default)]
    pub coefficients: Vec<f64>,
}

impl FittedModel {
    pub fn new(location: impl Into<String>, model: ModelKind, r_square: f64) -> Self {
        Self {
            location: location.into(),
            model,
            r_square,
            coefficients: Vec::new(),
        }
    }
}

/// Immutable measurement bundle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Checksum of the minor version the profile was collected for
    pub origin: String,
    /// Collector that produced the raw measurements
    pub collector: String,
    /// Postprocessors applied, in order
    #[serde(default)]
    pub postprocessors: Vec<String>,
    /// Invoked command / workload
    pub cmd: String,
    #[serde(default)]
    pub resources: Vec<Resource>,
    #[serde(default)]
    pub models: Vec<FittedModel>,
}

impl Profile {
    pub fn new(
        origin: impl Into<String>,
        collector: impl Into<String>,
        cmd: impl Into<String>,
    ) -> Self {
        Self {
            origin: origin.into(),
            collector: collector.into(),
            postprocessors: Vec::new(),
            cmd: cmd.into(),
            resources: Vec::new(),
            models: Vec::new(),
        }
    }

    pub fn with_postprocessor(mut self, name: impl Into<String>) -> Self {
        self.postprocessors.push(name.into());
        self
    }

    pub fn with_resource(mut self, resource: Resource) -> Self {
        self.resources.push(resource);
        self
    }

    pub fn with_model(mut self, model: FittedModel) -> Self {
        self.models.push(model);
        self
    }

    /// Parse a profile from its JSON representation
    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| DetectionError::Profile(e.to_string()))
    }

    /// Load a profile from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| DetectionError::Profile(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| DetectionError::Profile(format!("{}: {}", path.display(), e)))
    }

    /// Short human-readable descriptor used in messages
    pub fn descriptor(&self) -> String {
        if self.postprocessors.is_empty() {
            format!("{} ({})", self.collector, self.cmd)
        } else {
            format!(
                "{}+{} ({})",
                self.collector,
                self.postprocessors.join("+"),
                self.cmd
            )
        }
    }

    /// Profiles are comparable when collector and postprocessor chain match
    pub fn is_compatible_with(&self, other: &Profile) -> bool {
        self.collector == other.collector && self.postprocessors == other.postprocessors
    }

    /// Comparable and measuring the same command
    pub fn same_configuration(&self, other: &Profile) -> bool {
        self.is_compatible_with(other) && self.cmd == other.cmd
    }

    /// Measured amounts grouped per location, in location order
    pub fn samples_by_location(&self) -> BTreeMap<&str, Vec<f64>> {
        let mut samples: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
        for resource in &self.resources {
            samples
                .entry(resource.location.as_str())
                .or_default()
                .push(resource.amount);
        }
        samples
    }

    /// Total call-count-weighted amount per location
    pub fn totals_by_location(&self) -> BTreeMap<&str, f64> {
        let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
        for resource in &self.resources {
            *totals.entry(resource.location.as_str()).or_default() +=
                resource.amount * resource.calls as f64;
        }
        totals
    }

    /// Fitted models grouped per location
    pub fn models_by_location(&self) -> BTreeMap<&str, Vec<&FittedModel>> {
        let mut models: BTreeMap<&str, Vec<&FittedModel>> = BTreeMap::new();
        for model in &self.models {
            models.entry(model.location.as_str()).or_default().push(model);
        }
        models
    }
}

/// Profile together with its reference in the profile store
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedProfile {
    pub path: String,
    pub profile: Profile,
}

impl TrackedProfile {
    pub fn new(path: impl Into<String>, profile: Profile) -> Self {
        Self {
            path: path.into(),
            profile,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_order_is_monotonic() {
        let kinds = [
            ModelKind::Constant,
            ModelKind::Logarithmic,
            ModelKind::Linear,
            ModelKind::Quadratic,
            ModelKind::Power,
            ModelKind::Exponential,
        ];
        for pair in kinds.windows(2) {
            assert!(pair[0].order() < pair[1].order());
        }
    }

    #[test]
    fn test_samples_grouped_by_location() {
        let profile = Profile::new("abc", "time", "ls")
            .with_resource(Resource::new("foo", 1.0))
            .with_resource(Resource::new("bar", 5.0))
            .with_resource(Resource::new("foo", 3.0));

        let samples = profile.samples_by_location();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples["foo"], vec![1.0, 3.0]);
        assert_eq!(samples.keys().copied().collect::<Vec<_>>(), vec!["bar", "foo"]);
    }

    #[test]
    fn test_totals_weighted_by_calls() {
        let profile = Profile::new("abc", "trace", "ls")
            .with_resource(Resource::new("foo", 2.0).with_calls(10))
            .with_resource(Resource::new("foo", 1.0));

        assert_eq!(profile.totals_by_location()["foo"], 21.0);
    }

    #[test]
    fn test_compatibility() {
        let time = Profile::new("a", "time", "ls");
        let memory = Profile::new("a", "memory", "ls");
        let fitted = Profile::new("a", "time", "ls").with_postprocessor("regression_analysis");
        let other_cmd = Profile::new("a", "time", "cat");

        assert!(time.is_compatible_with(&time));
        assert!(!time.is_compatible_with(&memory));
        assert!(!time.is_compatible_with(&fitted));
        assert!(time.is_compatible_with(&other_cmd));
        assert!(!time.same_configuration(&other_cmd));
    }

    #[test]
    fn test_profile_from_json() {
        let json = r#"{
            "origin": "abc123",
            "collector": "complexity",
            "postprocessors": ["regression_analysis"],
            "cmd": "./sort",
            "resources": [{"location": "sort", "amount": 12.5}],
            "models": [{"location": "sort", "model": "linear", "r_square": 0.97}]
        }"#;

        let profile = Profile::from_json_str(json).unwrap();
        assert_eq!(profile.collector, "complexity");
        assert_eq!(profile.resources[0].calls, 1);
        assert_eq!(profile.models[0].model, ModelKind::Linear);
    }

    #[test]
    fn test_profile_from_invalid_json() {
        let err = Profile::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, DetectionError::Profile(_)));
    }
}
