use crate::config::StrategyThresholds;
use crate::error::Result;
use crate::strategy::{
    AverageAmountThreshold, BestModelOrderEquality, DetectionMethod, DetectionStrategy,
    ExclusiveTimeOutliers, FastCheck, Strategy,
};
use std::collections::BTreeSet;

/// Registry of configured strategies, one per `DetectionMethod`
///
/// Built once from the thresholds; afterwards every lookup by
/// `DetectionMethod` is infallible.
///
/// # Example
/// ```
/// use perfguard::strategy::{DetectionMethod, DetectionStrategy, StrategyRegistry};
///
/// let registry = StrategyRegistry::default();
/// let aat = registry.resolve("average_amount_threshold").unwrap();
/// assert_eq!(aat.method(), DetectionMethod::AverageAmountThreshold);
/// assert!(registry.resolve("bogus").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct StrategyRegistry {
    /// Indexed by `DetectionMethod::index`
    strategies: [Strategy; 4],
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::new(&StrategyThresholds::default())
    }
}

impl StrategyRegistry {
    pub fn new(thresholds: &StrategyThresholds) -> Self {
        Self {
            strategies: [
                Strategy::AverageAmountThreshold(AverageAmountThreshold::new(
                    thresholds.aat_threshold,
                )),
                Strategy::BestModelOrderEquality(BestModelOrderEquality::new(
                    thresholds.bmoe_min_fit,
                )),
                Strategy::FastCheck(FastCheck::new(
                    thresholds.fast_band,
                    thresholds.fast_confidence,
                )),
                Strategy::ExclusiveTimeOutliers(ExclusiveTimeOutliers::new(
                    thresholds.eto_iqr_multiplier,
                    thresholds.eto_noise_tolerance,
                )),
            ],
        }
    }

    /// Identifiers of every registered strategy
    pub fn supported_methods(&self) -> BTreeSet<&'static str> {
        self.strategies.iter().map(|s| s.method().id()).collect()
    }

    /// Resolve a strategy by its short or descriptive identifier
    ///
    /// # Errors
    /// `DetectionError::UnknownMethod` if no strategy is registered under `method_id`.
    pub fn resolve(&self, method_id: &str) -> Result<&Strategy> {
        let method: DetectionMethod = method_id.parse()?;
        Ok(self.get(method))
    }

    pub fn get(&self, method: DetectionMethod) -> &Strategy {
        &self.strategies[method.index()]
    }

    /// All strategies, in registry order
    pub fn strategies(&self) -> &[Strategy] {
        &self.strategies
    }
}
