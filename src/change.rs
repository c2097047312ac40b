//! Classification results produced by degradation strategies

use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed classification of detected behavior change
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PerformanceChange {
    NoChange,
    Optimization,
    Degradation,
    MaybeOptimization,
    MaybeDegradation,
    TotalOptimization,
    TotalDegradation,
}

impl PerformanceChange {
    /// True for changes that make the target slower (definitive or not)
    pub fn is_degradation(self) -> bool {
        matches!(
            self,
            Self::Degradation | Self::MaybeDegradation | Self::TotalDegradation
        )
    }

    /// True for changes that make the target faster (definitive or not)
    pub fn is_optimization(self) -> bool {
        matches!(
            self,
            Self::Optimization | Self::MaybeOptimization | Self::TotalOptimization
        )
    }
}

impl fmt::Display for PerformanceChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NoChange => "NoChange",
            Self::Optimization => "Optimization",
            Self::Degradation => "Degradation",
            Self::MaybeOptimization => "MaybeOptimization",
            Self::MaybeDegradation => "MaybeDegradation",
            Self::TotalOptimization => "TotalOptimization",
            Self::TotalDegradation => "TotalDegradation",
        };
        f.write_str(name)
    }
}

/// How `DegradationInfo::confidence_rate` was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceType {
    /// Strategy reports no confidence measure
    None,
    /// Coefficient of determination of the fitted models
    RSquare,
    /// One minus the coefficient of variation of the baseline samples
    Stability,
}

impl fmt::Display for ConfidenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("none"),
            Self::RSquare => f.write_str("r_square"),
            Self::Stability => f.write_str("stability"),
        }
    }
}

/// One classified comparison result for a location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DegradationInfo {
    /// Identifier of the strategy that produced the result (e.g. "aat")
    pub strategy: String,
    pub location: String,
    pub classification: PerformanceChange,
    /// Relative change of the target against the baseline, if defined
    pub rate: Option<f64>,
    pub confidence_type: ConfidenceType,
    /// Confidence in `[0, 1]`, if the strategy measures one
    pub confidence_rate: Option<f64>,
    /// Best baseline model, for model-based strategies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_baseline: Option<String>,
    /// Best target model, for model-based strategies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_target: Option<String>,
}

impl DegradationInfo {
    pub fn new(
        strategy: impl Into<String>,
        location: impl Into<String>,
        classification: PerformanceChange,
    ) -> Self {
        Self {
            strategy: strategy.into(),
            location: location.into(),
            classification,
            rate: None,
            confidence_type: ConfidenceType::None,
            confidence_rate: None,
            from_baseline: None,
            to_target: None,
        }
    }

    pub fn with_rate(mut self, rate: Option<f64>) -> Self {
        self.rate = rate;
        self
    }

    pub fn with_confidence(mut self, kind: ConfidenceType, rate: f64) -> Self {
        self.confidence_type = kind;
        self.confidence_rate = Some(rate.clamp(0.0, 1.0));
        self
    }

    pub fn with_models(mut self, baseline: Option<String>, target: Option<String>) -> Self {
        self.from_baseline = baseline;
        self.to_target = target;
        self
    }
}

/// Persisted result: one `DegradationInfo` plus where it came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DegradationRecord {
    pub info: DegradationInfo,
    /// Checksum of the minor version the target was compared against
    pub baseline: String,
    /// Store reference of the target profile
    pub profile: String,
}

/// One entry of a history-wide report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Checksum of the checked (target) minor version
    pub target: String,
    pub record: DegradationRecord,
}
