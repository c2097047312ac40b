// Fast check (fast)
//
// Cheap pre-filter over the summary statistics already stored in the
// profiles: no model refitting. Uses the same relative-rate signal as aat,
// but only commits to a definitive verdict when the change leaves the
// ambiguous band AND the baseline is stable enough to trust it.
//
// Confidence = 1 - coefficient of variation of the baseline samples.

use crate::change::{ConfidenceType, DegradationInfo, PerformanceChange};
use crate::profile::Profile;
use crate::stats;
use crate::strategy::{DetectionMethod, DetectionStrategy};

/// Half-width of the ambiguous band around zero
pub const DEFAULT_BAND: f64 = 0.05;

/// Minimal confidence for a definitive verdict
pub const DEFAULT_CONFIDENCE: f64 = 0.90;

#[derive(Debug, Clone)]
pub struct FastCheck {
    band: f64,
    min_confidence: f64,
}

impl Default for FastCheck {
    fn default() -> Self {
        Self::new(DEFAULT_BAND, DEFAULT_CONFIDENCE)
    }
}

impl FastCheck {
    pub fn new(band: f64, min_confidence: f64) -> Self {
        Self {
            band,
            min_confidence,
        }
    }

    fn maybe(positive: bool) -> PerformanceChange {
        if positive {
            PerformanceChange::MaybeDegradation
        } else {
            PerformanceChange::MaybeOptimization
        }
    }

    /// Classify a pair of averages given the baseline confidence
    pub fn classify(
        &self,
        baseline_avg: f64,
        target_avg: f64,
        confidence: f64,
    ) -> (PerformanceChange, Option<f64>) {
        let Some(rate) = stats::relative_rate(baseline_avg, target_avg) else {
            if baseline_avg != 0.0 || target_avg == 0.0 {
                return (PerformanceChange::NoChange, None);
            }
            return (Self::maybe(target_avg > 0.0), None);
        };

        let change = if rate == 0.0 {
            PerformanceChange::NoChange
        } else if rate.abs() <= self.band || confidence < self.min_confidence {
            Self::maybe(rate > 0.0)
        } else if rate > 0.0 {
            PerformanceChange::Degradation
        } else {
            PerformanceChange::Optimization
        };
        (change, Some(rate))
    }
}

impl DetectionStrategy for FastCheck {
    fn method(&self) -> DetectionMethod {
        DetectionMethod::FastCheck
    }

    fn compare(&self, baseline: &Profile, target: &Profile) -> Vec<DegradationInfo> {
        let baseline_samples = baseline.samples_by_location();
        let target_samples = target.samples_by_location();

        baseline_samples
            .iter()
            .filter_map(|(location, samples)| {
                let current = target_samples.get(location)?;
                let confidence = (1.0 - stats::coefficient_of_variation(samples)).clamp(0.0, 1.0);
                let (change, rate) =
                    self.classify(stats::mean(samples), stats::mean(current), confidence);
                Some(
                    DegradationInfo::new(self.method().id(), *location, change)
                        .with_rate(rate)
                        .with_confidence(ConfidenceType::Stability, confidence),
                )
            })
            .collect()
    }
}
