// Pluggable degradation detection strategies
//
// Each strategy compares a (baseline, target) profile pair and classifies the
// behavioral change per measurement location. The set is closed: methods are
// identified by `DetectionMethod` and resolved once through the
// `StrategyRegistry`, so the only runtime lookup failure is an unknown
// identifier string.
//
// Strategies never fail on degenerate numeric input (zero averages, unfit
// models, identical profiles): every such case maps to a definite
// classification, `NoChange` when genuinely undecidable.

mod average_amount_threshold;
mod best_model_order_equality;
mod exclusive_time_outliers;
mod fast_check;
mod registry;

pub use average_amount_threshold::AverageAmountThreshold;
pub use best_model_order_equality::BestModelOrderEquality;
pub use exclusive_time_outliers::{ExclusiveTimeOutliers, TOTAL_LOCATION};
pub use fast_check::FastCheck;
pub use registry::StrategyRegistry;

use crate::change::DegradationInfo;
use crate::error::DetectionError;
use crate::profile::Profile;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a registered strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DetectionMethod {
    AverageAmountThreshold,
    BestModelOrderEquality,
    FastCheck,
    ExclusiveTimeOutliers,
}

impl DetectionMethod {
    /// Every registered method, in registry order
    pub const ALL: [DetectionMethod; 4] = [
        Self::AverageAmountThreshold,
        Self::BestModelOrderEquality,
        Self::FastCheck,
        Self::ExclusiveTimeOutliers,
    ];

    /// Short identifier (e.g. "aat")
    pub fn id(self) -> &'static str {
        match self {
            Self::AverageAmountThreshold => "aat",
            Self::BestModelOrderEquality => "bmoe",
            Self::FastCheck => "fast",
            Self::ExclusiveTimeOutliers => "eto",
        }
    }

    /// Descriptive identifier (e.g. "average_amount_threshold")
    pub fn long_name(self) -> &'static str {
        match self {
            Self::AverageAmountThreshold => "average_amount_threshold",
            Self::BestModelOrderEquality => "best_model_order_equality",
            Self::FastCheck => "fast_check",
            Self::ExclusiveTimeOutliers => "exclusive_time_outliers",
        }
    }

    fn index(self) -> usize {
        match self {
            Self::AverageAmountThreshold => 0,
            Self::BestModelOrderEquality => 1,
            Self::FastCheck => 2,
            Self::ExclusiveTimeOutliers => 3,
        }
    }
}

impl fmt::Display for DetectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for DetectionMethod {
    type Err = DetectionError;

    /// Accepts both the short id and the descriptive name; `-` and `_` are interchangeable
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|m| m.id() == normalized || m.long_name() == normalized)
            .ok_or_else(|| DetectionError::UnknownMethod(s.to_string()))
    }
}

impl TryFrom<String> for DetectionMethod {
    type Error = DetectionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DetectionMethod> for String {
    fn from(method: DetectionMethod) -> Self {
        method.id().to_string()
    }
}

/// Capability shared by every strategy
///
/// `compare` is pure given its two immutable inputs.
pub trait DetectionStrategy {
    fn method(&self) -> DetectionMethod;

    fn compare(&self, baseline: &Profile, target: &Profile) -> Vec<DegradationInfo>;
}

/// Closed set of configured strategies
#[derive(Debug, Clone)]
pub enum Strategy {
    AverageAmountThreshold(AverageAmountThreshold),
    BestModelOrderEquality(BestModelOrderEquality),
    FastCheck(FastCheck),
    ExclusiveTimeOutliers(ExclusiveTimeOutliers),
}

impl DetectionStrategy for Strategy {
    fn method(&self) -> DetectionMethod {
        match self {
            Self::AverageAmountThreshold(s) => s.method(),
            Self::BestModelOrderEquality(s) => s.method(),
            Self::FastCheck(s) => s.method(),
            Self::ExclusiveTimeOutliers(s) => s.method(),
        }
    }

    fn compare(&self, baseline: &Profile, target: &Profile) -> Vec<DegradationInfo> {
        match self {
            Self::AverageAmountThreshold(s) => s.compare(baseline, target),
            Self::BestModelOrderEquality(s) => s.compare(baseline, target),
            Self::FastCheck(s) => s.compare(baseline, target),
            Self::ExclusiveTimeOutliers(s) => s.compare(baseline, target),
        }
    }
}

#[cfg(test)]
mod tests;
