// Average amount threshold (aat)
//
// Compares the average measured amount per location. The relative change
// `(target - baseline) / baseline` is a degradation above `+threshold` and an
// optimization below `-threshold`.

use crate::change::{DegradationInfo, PerformanceChange};
use crate::profile::Profile;
use crate::stats;
use crate::strategy::{DetectionMethod, DetectionStrategy};

/// Default relative threshold (5%)
pub const DEFAULT_THRESHOLD: f64 = 0.05;

#[derive(Debug, Clone)]
pub struct AverageAmountThreshold {
    threshold: f64,
}

impl Default for AverageAmountThreshold {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl AverageAmountThreshold {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Classify a pair of averages
    ///
    /// With a zero baseline the rate is undefined: two zeros are `NoChange`,
    /// otherwise the sign of the target decides. A rate that overflows is
    /// `NoChange` without a rate.
    pub fn classify(&self, baseline_avg: f64, target_avg: f64) -> (PerformanceChange, Option<f64>) {
        match stats::relative_rate(baseline_avg, target_avg) {
            Some(rate) if rate > self.threshold => (PerformanceChange::Degradation, Some(rate)),
            Some(rate) if rate < -self.threshold => (PerformanceChange::Optimization, Some(rate)),
            Some(rate) => (PerformanceChange::NoChange, Some(rate)),
            None if baseline_avg != 0.0 || target_avg == 0.0 => (PerformanceChange::NoChange, None),
            None if target_avg > 0.0 => (PerformanceChange::Degradation, None),
            None => (PerformanceChange::Optimization, None),
        }
    }
}

impl DetectionStrategy for AverageAmountThreshold {
    fn method(&self) -> DetectionMethod {
        DetectionMethod::AverageAmountThreshold
    }

    fn compare(&self, baseline: &Profile, target: &Profile) -> Vec<DegradationInfo> {
        let baseline_samples = baseline.samples_by_location();
        let target_samples = target.samples_by_location();

        let mut results = Vec::with_capacity(baseline_samples.len());
        for (location, samples) in &baseline_samples {
            let Some(current) = target_samples.get(location) else {
                tracing::debug!(location, "aat: location missing in target, skipped");
                continue;
            };

            let (change, rate) = self.classify(stats::mean(samples), stats::mean(current));
            results.push(DegradationInfo::new(self.method().id(), *location, change).with_rate(rate));
        }
        results
    }
}
