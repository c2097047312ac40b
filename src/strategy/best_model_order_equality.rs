// Best model order equality (bmoe)
//
// Picks the best fitting regression model per location on each side and
// compares their complexity classes. The class is authoritative: equal
// orders are `NoChange` whatever the coefficients say.

use crate::change::{ConfidenceType, DegradationInfo, PerformanceChange};
use crate::profile::{FittedModel, Profile};
use crate::strategy::{DetectionMethod, DetectionStrategy};
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// Minimal coefficient of determination for a model to be trusted
pub const DEFAULT_MIN_FIT: f64 = 0.90;

#[derive(Debug, Clone)]
pub struct BestModelOrderEquality {
    min_fit: f64,
}

impl Default for BestModelOrderEquality {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_FIT)
    }
}

impl BestModelOrderEquality {
    pub fn new(min_fit: f64) -> Self {
        Self { min_fit }
    }

    /// Model with the highest r_square; ties go to the lower order class
    fn best_model<'a>(models: &[&'a FittedModel]) -> Option<&'a FittedModel> {
        models.iter().copied().max_by(|a, b| {
            a.r_square
                .total_cmp(&b.r_square)
                .then_with(|| b.model.order().cmp(&a.model.order()))
        })
    }

    fn accepted<'a>(&self, model: Option<&'a FittedModel>) -> Option<&'a FittedModel> {
        model.filter(|m| m.r_square >= self.min_fit)
    }
}

impl DetectionStrategy for BestModelOrderEquality {
    fn method(&self) -> DetectionMethod {
        DetectionMethod::BestModelOrderEquality
    }

    fn compare(&self, baseline: &Profile, target: &Profile) -> Vec<DegradationInfo> {
        let baseline_models = baseline.models_by_location();
        let target_models = target.models_by_location();

        // Locations measured on both sides, whether or not models were fitted
        let mut locations: BTreeSet<&str> = baseline_models
            .keys()
            .filter(|loc| target_models.contains_key(*loc))
            .copied()
            .collect();
        let target_resources = target.samples_by_location();
        locations.extend(
            baseline
                .samples_by_location()
                .into_keys()
                .filter(|loc| target_resources.contains_key(loc)),
        );

        let mut results = Vec::with_capacity(locations.len());
        for location in locations {
            let best_baseline =
                Self::best_model(baseline_models.get(location).map_or(&[][..], |m| m.as_slice()));
            let best_target =
                Self::best_model(target_models.get(location).map_or(&[][..], |m| m.as_slice()));

            let baseline_fit = best_baseline.map_or(0.0, |m| m.r_square);
            let target_fit = best_target.map_or(0.0, |m| m.r_square);
            let confidence = baseline_fit.min(target_fit);

            let (baseline_model, target_model) =
                (self.accepted(best_baseline), self.accepted(best_target));
            let change = match (baseline_model, target_model) {
                (Some(from), Some(to)) => match to.model.order().cmp(&from.model.order()) {
                    Ordering::Greater => PerformanceChange::Degradation,
                    Ordering::Less => PerformanceChange::Optimization,
                    Ordering::Equal => PerformanceChange::NoChange,
                },
                _ => {
                    tracing::debug!(
                        location,
                        baseline_fit,
                        target_fit,
                        "bmoe: best model below acceptance threshold, treated as unknown"
                    );
                    PerformanceChange::NoChange
                }
            };

            results.push(
                DegradationInfo::new(self.method().id(), location, change)
                    .with_confidence(ConfidenceType::RSquare, confidence)
                    .with_models(
                        baseline_model.map(|m| m.model.to_string()),
                        target_model.map(|m| m.model.to_string()),
                    ),
            );
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::ModelKind;

    fn fitted(model: ModelKind, r_square: f64) -> Profile {
        Profile::new("abc", "complexity", "./sort")
            .with_postprocessor("regression_analysis")
            .with_model(FittedModel::new("sort", model, r_square))
    }

    #[test]
    fn test_best_model_prefers_highest_fit() {
        let linear = FittedModel::new("sort", ModelKind::Linear, 0.95);
        let quadratic = FittedModel::new("sort", ModelKind::Quadratic, 0.99);
        let best = BestModelOrderEquality::best_model(&[&linear, &quadratic]).unwrap();
        assert_eq!(best.model, ModelKind::Quadratic);
    }

    #[test]
    fn test_best_model_tie_prefers_lower_order() {
        let linear = FittedModel::new("sort", ModelKind::Linear, 0.95);
        let power = FittedModel::new("sort", ModelKind::Power, 0.95);
        let best = BestModelOrderEquality::best_model(&[&power, &linear]).unwrap();
        assert_eq!(best.model, ModelKind::Linear);
    }

    #[test]
    fn test_higher_order_is_degradation() {
        let bmoe = BestModelOrderEquality::default();
        let result = bmoe.compare(
            &fitted(ModelKind::Linear, 0.98),
            &fitted(ModelKind::Quadratic, 0.95),
        );
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].classification, PerformanceChange::Degradation);
        assert_eq!(result[0].confidence_rate, Some(0.95));
        assert_eq!(result[0].from_baseline.as_deref(), Some("linear"));
        assert_eq!(result[0].to_target.as_deref(), Some("quadratic"));
    }

    #[test]
    fn test_unfit_model_is_no_change() {
        let bmoe = BestModelOrderEquality::default();
        let result = bmoe.compare(
            &fitted(ModelKind::Linear, 0.98),
            &fitted(ModelKind::Exponential, 0.40),
        );
        assert_eq!(result[0].classification, PerformanceChange::NoChange);
        assert_eq!(result[0].confidence_rate, Some(0.40));
        assert_eq!(result[0].to_target, None);
    }

    #[test]
    fn test_missing_models_are_unknown() {
        let bmoe = BestModelOrderEquality::default();
        let plain = Profile::new("abc", "time", "ls")
            .with_resource(crate::profile::Resource::new("main", 4.0));
        let result = bmoe.compare(&plain, &plain);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].classification, PerformanceChange::NoChange);
        assert_eq!(result[0].confidence_rate, Some(0.0));
    }
}
