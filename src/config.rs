//! Configuration of degradation detection
//!
//! Read from the `[degradation]` table of a TOML configuration:
//!
//! ```toml
//! [degradation]
//! apply = "first"              # or "all"
//! collect_before_check = true
//!
//! [[degradation.strategies]]
//! method = "bmoe"
//! collector = "complexity"
//! postprocessor = "regression_analysis"
//!
//! [[degradation.strategies]]
//! method = "aat"
//!
//! [degradation.thresholds]
//! aat_threshold = 0.10
//! ```

use crate::error::{DetectionError, Result};
use crate::rules::Rule;
use crate::strategy::DetectionMethod;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Which ancestors serve as baselines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplyPolicy {
    /// Nearest ancestor carrying a matching profile
    #[default]
    First,
    /// Every ancestor carrying a matching profile
    All,
}

impl FromStr for ApplyPolicy {
    type Err = DetectionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" => Ok(Self::First),
            "all" => Ok(Self::All),
            other => Err(DetectionError::Configuration(format!(
                "unknown apply policy '{}' (expected 'first' or 'all')",
                other
            ))),
        }
    }
}

impl fmt::Display for ApplyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::First => f.write_str("first"),
            Self::All => f.write_str("all"),
        }
    }
}

/// Tunable thresholds of the detection strategies
///
/// # Example
/// ```
/// use perfguard::config::StrategyThresholds;
///
/// let thresholds = StrategyThresholds::default();
/// assert_eq!(thresholds.aat_threshold, 0.05);
/// assert!(thresholds.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyThresholds {
    /// Relative change of averages beyond which aat reports a change
    pub aat_threshold: f64,

    /// Minimal r_square of a best model for bmoe to trust it
    pub bmoe_min_fit: f64,

    /// Half-width of fast check's ambiguous band
    pub fast_band: f64,

    /// Minimal baseline stability for a definitive fast check verdict
    pub fast_confidence: f64,

    /// Tukey fence multiplier of eto
    pub eto_iqr_multiplier: f64,

    /// Relative net deviation eto still treats as noise
    pub eto_noise_tolerance: f64,
}

impl Default for StrategyThresholds {
    fn default() -> Self {
        Self {
            aat_threshold: 0.05,
            bmoe_min_fit: 0.90,
            fast_band: 0.05,
            fast_confidence: 0.90,
            eto_iqr_multiplier: 1.5,
            eto_noise_tolerance: 0.01,
        }
    }
}

impl StrategyThresholds {
    /// Fewer reported changes: wider thresholds, stricter fit requirements
    pub fn strict() -> Self {
        Self {
            aat_threshold: 0.10,
            bmoe_min_fit: 0.95,
            fast_band: 0.10,
            fast_confidence: 0.95,
            eto_iqr_multiplier: 3.0,
            eto_noise_tolerance: 0.02,
        }
    }

    /// More reported changes: catch small shifts early
    pub fn permissive() -> Self {
        Self {
            aat_threshold: 0.02,
            bmoe_min_fit: 0.80,
            fast_band: 0.02,
            fast_confidence: 0.80,
            eto_iqr_multiplier: 1.0,
            eto_noise_tolerance: 0.005,
        }
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        let non_negative = [
            ("aat_threshold", self.aat_threshold),
            ("fast_band", self.fast_band),
            ("eto_iqr_multiplier", self.eto_iqr_multiplier),
            ("eto_noise_tolerance", self.eto_noise_tolerance),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{} must be a non-negative number, got {}", name, value));
            }
        }

        let unit = [
            ("bmoe_min_fit", self.bmoe_min_fit),
            ("fast_confidence", self.fast_confidence),
        ];
        for (name, value) in unit {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("{} must be in [0, 1], got {}", name, value));
            }
        }

        Ok(())
    }
}

/// Source of dotted configuration keys (e.g. `degradation.apply`)
pub trait ConfigLookup {
    fn lookup(&self, key: &str) -> Option<toml::Value>;
}

impl ConfigLookup for toml::Table {
    fn lookup(&self, key: &str) -> Option<toml::Value> {
        let mut parts = key.split('.');
        let mut current = self.get(parts.next()?)?;
        for part in parts {
            current = current.as_table()?.get(part)?;
        }
        Some(current.clone())
    }
}

/// Resolved degradation configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DegradationConfig {
    pub apply: ApplyPolicy,
    /// Re-collect missing target profiles before checking
    pub collect_before_check: bool,
    /// Rules in priority order
    pub strategies: Vec<Rule>,
    pub thresholds: StrategyThresholds,
}

impl DegradationConfig {
    /// Read the `degradation.*` keys from a configuration source
    ///
    /// # Errors
    /// `Configuration` for malformed values, `UnknownMethod` for rules naming
    /// an unregistered method.
    pub fn resolve<C: ConfigLookup + ?Sized>(source: &C) -> Result<Self> {
        let apply = match source.lookup("degradation.apply") {
            None => ApplyPolicy::default(),
            Some(toml::Value::String(policy)) => policy.parse()?,
            Some(other) => {
                return Err(DetectionError::Configuration(format!(
                    "degradation.apply must be a string, got {}",
                    other.type_str()
                )))
            }
        };

        let collect_before_check = match source.lookup("degradation.collect_before_check") {
            None => false,
            Some(value) => parse_flag(&value)?,
        };

        let strategies = match source.lookup("degradation.strategies") {
            None => Vec::new(),
            Some(toml::Value::Array(items)) => items
                .into_iter()
                .map(parse_rule)
                .collect::<Result<Vec<_>>>()?,
            Some(other) => {
                return Err(DetectionError::Configuration(format!(
                    "degradation.strategies must be an array of rules, got {}",
                    other.type_str()
                )))
            }
        };

        let thresholds = match source.lookup("degradation.thresholds") {
            None => StrategyThresholds::default(),
            Some(value) => value.try_into::<StrategyThresholds>().map_err(|e| {
                DetectionError::Configuration(format!("degradation.thresholds: {}", e))
            })?,
        };
        thresholds
            .validate()
            .map_err(DetectionError::Configuration)?;

        Ok(Self {
            apply,
            collect_before_check,
            strategies,
            thresholds,
        })
    }

    /// Parse a TOML document holding a `[degradation]` table
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let table: toml::Table = toml::from_str(content)
            .map_err(|e| DetectionError::Configuration(format!("invalid TOML: {}", e)))?;
        Self::resolve(&table)
    }

    /// Load the configuration from a TOML file
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            DetectionError::Configuration(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }
}

fn parse_flag(value: &toml::Value) -> Result<bool> {
    match value {
        toml::Value::Boolean(flag) => Ok(*flag),
        toml::Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Ok(true),
            "false" | "no" | "0" => Ok(false),
            other => Err(DetectionError::Configuration(format!(
                "degradation.collect_before_check: '{}' is not a boolean",
                other
            ))),
        },
        other => Err(DetectionError::Configuration(format!(
            "degradation.collect_before_check must be a boolean, got {}",
            other.type_str()
        ))),
    }
}

fn parse_rule(item: toml::Value) -> Result<Rule> {
    let Some(table) = item.as_table() else {
        return Err(DetectionError::Configuration(format!(
            "degradation rule must be a table, got {}",
            item.type_str()
        )));
    };
    let Some(method) = table.get("method").and_then(|m| m.as_str()) else {
        return Err(DetectionError::Configuration(
            "degradation rule without 'method'".to_string(),
        ));
    };
    // Unknown methods surface as UnknownMethod, not as a generic parse error
    method.parse::<DetectionMethod>()?;

    item.try_into::<Rule>()
        .map_err(|e| DetectionError::Configuration(format!("invalid degradation rule: {}", e)))
}
