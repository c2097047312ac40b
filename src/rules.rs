//! Declarative rules selecting which strategy runs on which profiles
//!
//! A rule names a detection method and optionally constrains the profiles it
//! applies to. Unset fields are unconstrained.
//!
//! # Example TOML
//! ```toml
//! [[degradation.strategies]]
//! method = "bmoe"
//! collector = "complexity"
//! postprocessor = "regression_analysis"
//! ```

use crate::profile::Profile;
use crate::strategy::DetectionMethod;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub method: DetectionMethod,

    /// Required collector name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collector: Option<String>,

    /// Postprocessor that must be part of the profile's chain
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postprocessor: Option<String>,

    /// Required command
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cmd: Option<String>,
}

impl Rule {
    pub fn new(method: DetectionMethod) -> Self {
        Self {
            method,
            collector: None,
            postprocessor: None,
            cmd: None,
        }
    }

    pub fn with_collector(mut self, collector: impl Into<String>) -> Self {
        self.collector = Some(collector.into());
        self
    }

    pub fn with_postprocessor(mut self, postprocessor: impl Into<String>) -> Self {
        self.postprocessor = Some(postprocessor.into());
        self
    }

    pub fn with_cmd(mut self, cmd: impl Into<String>) -> Self {
        self.cmd = Some(cmd.into());
        self
    }

    /// Check every populated constraint against the profile
    pub fn is_applicable(&self, profile: &Profile) -> bool {
        let collector_ok = self
            .collector
            .as_ref()
            .map_or(true, |collector| *collector == profile.collector);
        let postprocessor_ok = self
            .postprocessor
            .as_ref()
            .map_or(true, |post| profile.postprocessors.contains(post));
        let cmd_ok = self.cmd.as_ref().map_or(true, |cmd| *cmd == profile.cmd);

        collector_ok && postprocessor_ok && cmd_ok
    }
}

/// Rules from `rules` applicable to `profile`, in configuration order
pub fn applicable_rules<'a>(rules: &'a [Rule], profile: &Profile) -> Vec<&'a Rule> {
    rules.iter().filter(|rule| rule.is_applicable(profile)).collect()
}
