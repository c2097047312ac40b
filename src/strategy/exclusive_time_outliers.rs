// Exclusive time outliers (eto)
//
// Works on per-call-site exclusive times. Per location the baseline samples
// define a robust band `median ± k·IQR`; a target median outside of it marks
// the location as a contributor. One aggregate record then summarizes the
// net call-count-weighted deviation over every location of either profile.

use crate::change::{DegradationInfo, PerformanceChange};
use crate::profile::Profile;
use crate::stats;
use crate::strategy::{DetectionMethod, DetectionStrategy};
use std::collections::BTreeSet;

/// Location label of the aggregate record
pub const TOTAL_LOCATION: &str = "<total>";

/// Tukey's fence multiplier
pub const DEFAULT_IQR_MULTIPLIER: f64 = 1.5;

/// Relative net deviation treated as noise
pub const DEFAULT_NOISE_TOLERANCE: f64 = 0.01;

#[derive(Debug, Clone)]
pub struct ExclusiveTimeOutliers {
    iqr_multiplier: f64,
    noise_tolerance: f64,
}

impl Default for ExclusiveTimeOutliers {
    fn default() -> Self {
        Self::new(DEFAULT_IQR_MULTIPLIER, DEFAULT_NOISE_TOLERANCE)
    }
}

impl ExclusiveTimeOutliers {
    pub fn new(iqr_multiplier: f64, noise_tolerance: f64) -> Self {
        Self {
            iqr_multiplier,
            noise_tolerance,
        }
    }

    fn classify_location(&self, baseline: &[f64], target: &[f64]) -> (PerformanceChange, Option<f64>) {
        let center = stats::median(baseline);
        let fence = self.iqr_multiplier * stats::iqr(baseline);
        let current = stats::median(target);

        let change = if current > center + fence {
            PerformanceChange::Degradation
        } else if current < center - fence {
            PerformanceChange::Optimization
        } else {
            PerformanceChange::NoChange
        };
        (change, stats::relative_rate(center, current))
    }

    fn total_change(signed: f64) -> PerformanceChange {
        if signed > 0.0 {
            PerformanceChange::TotalDegradation
        } else {
            PerformanceChange::TotalOptimization
        }
    }

    /// Net signed deviation relative to the baseline total
    fn aggregate(&self, baseline: &Profile, target: &Profile) -> DegradationInfo {
        let baseline_totals = baseline.totals_by_location();
        let target_totals = target.totals_by_location();
        let locations: BTreeSet<&str> = baseline_totals
            .keys()
            .chain(target_totals.keys())
            .copied()
            .collect();

        let mut deviations = Vec::with_capacity(locations.len());
        for location in &locations {
            let before = baseline_totals.get(location).copied().unwrap_or(0.0);
            let after = target_totals.get(location).copied().unwrap_or(0.0);
            deviations.push(after - before);
        }
        let deviation: f64 = deviations.iter().sum();
        let base_total: f64 = baseline_totals.values().sum();

        let rate = stats::relative_rate(base_total, base_total + deviation);
        let change = match rate {
            Some(rate) if rate.abs() <= self.noise_tolerance => PerformanceChange::NoChange,
            Some(rate) => Self::total_change(rate),
            // Nothing to be relative to: any net time at all is a change
            None if base_total == 0.0 && deviation != 0.0 => Self::total_change(deviation),
            None => PerformanceChange::NoChange,
        };
        DegradationInfo::new(self.method().id(), TOTAL_LOCATION, change).with_rate(rate)
    }
}

impl DetectionStrategy for ExclusiveTimeOutliers {
    fn method(&self) -> DetectionMethod {
        DetectionMethod::ExclusiveTimeOutliers
    }

    fn compare(&self, baseline: &Profile, target: &Profile) -> Vec<DegradationInfo> {
        let baseline_samples = baseline.samples_by_location();
        let target_samples = target.samples_by_location();

        let mut results = Vec::with_capacity(baseline_samples.len() + 1);
        for (location, samples) in &baseline_samples {
            let Some(current) = target_samples.get(location) else {
                continue;
            };
            let (change, rate) = self.classify_location(samples, current);
            results.push(DegradationInfo::new(self.method().id(), *location, change).with_rate(rate));
        }

        results.push(self.aggregate(baseline, target));
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::Resource;

    fn traced(samples: &[(&str, f64, u64)]) -> Profile {
        samples.iter().fold(Profile::new("abc", "trace", "./app"), |p, (loc, amount, calls)| {
            p.with_resource(Resource::new(*loc, *amount).with_calls(*calls))
        })
    }

    #[test]
    fn test_location_outside_fence() {
        let eto = ExclusiveTimeOutliers::default();
        let (change, _) = eto.classify_location(&[10.0, 11.0, 10.0, 12.0, 10.0], &[30.0]);
        assert_eq!(change, PerformanceChange::Degradation);
        let (change, _) = eto.classify_location(&[10.0, 11.0, 10.0, 12.0, 10.0], &[11.0]);
        assert_eq!(change, PerformanceChange::NoChange);
        let (change, _) = eto.classify_location(&[10.0, 11.0, 10.0, 12.0, 10.0], &[1.0]);
        assert_eq!(change, PerformanceChange::Optimization);
    }

    #[test]
    fn test_aggregate_is_weighted_by_calls() {
        let eto = ExclusiveTimeOutliers::default();
        // foo: 10 calls of 1.0 -> 10 calls of 1.5, bar: 1 call of 10.0 -> 1 call of 6.0
        let baseline = traced(&[("foo", 1.0, 10), ("bar", 10.0, 1)]);
        let target = traced(&[("foo", 1.5, 10), ("bar", 6.0, 1)]);

        let total = eto.aggregate(&baseline, &target);
        assert_eq!(total.location, TOTAL_LOCATION);
        assert_eq!(total.classification, PerformanceChange::TotalDegradation);
        assert!((total.rate.unwrap() - 0.05).abs() < 1e-9);
    }

    #[test]
    fn test_aggregate_counts_new_locations() {
        let eto = ExclusiveTimeOutliers::default();
        let baseline = traced(&[("foo", 5.0, 2)]);
        let target = traced(&[("foo", 5.0, 2), ("leak", 5.0, 1)]);

        let total = eto.aggregate(&baseline, &target);
        assert_eq!(total.classification, PerformanceChange::TotalDegradation);
    }

    #[test]
    fn test_aggregate_of_empty_profiles() {
        let eto = ExclusiveTimeOutliers::default();
        let empty = traced(&[]);
        let result = eto.compare(&empty, &empty);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].classification, PerformanceChange::NoChange);
    }

    #[test]
    fn test_aggregate_over_zero_baseline_total() {
        let eto = ExclusiveTimeOutliers::default();
        // Below the relative tolerance in absolute terms, still a change
        let idle = traced(&[("foo", 0.0, 3)]);
        let busy = traced(&[("foo", 0.004, 1)]);

        let total = eto.aggregate(&idle, &busy);
        assert_eq!(total.classification, PerformanceChange::TotalDegradation);
        assert_eq!(total.rate, None);

        let total = eto.aggregate(&idle, &traced(&[("foo", -0.004, 1)]));
        assert_eq!(total.classification, PerformanceChange::TotalOptimization);

        let total = eto.aggregate(&idle, &traced(&[("foo", 0.0, 5)]));
        assert_eq!(total.classification, PerformanceChange::NoChange);
        assert_eq!(total.rate, None);
    }
}
