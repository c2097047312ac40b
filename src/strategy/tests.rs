// Cross-strategy scenarios over whole profiles

use super::*;
use crate::change::{ConfidenceType, PerformanceChange};
use crate::profile::{FittedModel, ModelKind, Resource};

fn profile_with(samples: &[(&str, f64)]) -> Profile {
    samples
        .iter()
        .fold(Profile::new("abc", "time", "ls"), |p, (loc, amount)| {
            p.with_resource(Resource::new(*loc, *amount))
        })
}

fn modelled(model: ModelKind, r_square: f64) -> Profile {
    Profile::new("abc", "trace", "./sort")
        .with_resource(Resource::new("sort", 10.0))
        .with_model(FittedModel::new("sort", ModelKind::Constant, 0.2))
        .with_model(FittedModel::new("sort", model, r_square))
}

#[test]
fn test_self_comparison_is_no_change() {
    let profile = profile_with(&[("foo", 10.0), ("foo", 12.0), ("bar", 3.0), ("bar", 4.0)])
        .with_model(FittedModel::new("foo", ModelKind::Linear, 0.97))
        .with_model(FittedModel::new("bar", ModelKind::Constant, 0.95));

    for strategy in StrategyRegistry::default().strategies() {
        let results = strategy.compare(&profile, &profile);
        assert!(!results.is_empty(), "{} produced nothing", strategy.method());
        for info in results {
            assert_eq!(
                info.classification,
                PerformanceChange::NoChange,
                "{} at {}",
                info.strategy,
                info.location
            );
        }
    }
}

#[test]
fn test_zero_profiles_do_not_fail() {
    let zero = profile_with(&[("foo", 0.0), ("bar", 0.0)]);
    let registry = StrategyRegistry::default();

    let aat = registry.get(DetectionMethod::AverageAmountThreshold).compare(&zero, &zero);
    assert_eq!(aat.len(), 2);
    assert!(aat.iter().all(|i| i.classification == PerformanceChange::NoChange));
    assert!(aat.iter().all(|i| i.rate.is_none()));

    let eto = registry.get(DetectionMethod::ExclusiveTimeOutliers).compare(&zero, &zero);
    let total = eto.iter().find(|i| i.location == TOTAL_LOCATION).unwrap();
    assert_eq!(total.classification, PerformanceChange::NoChange);
}

#[test]
fn test_average_increase_is_degradation() {
    let baseline = profile_with(&[("foo", 100.0)]);
    let target = profile_with(&[("foo", 130.0)]);

    let results = StrategyRegistry::default()
        .resolve("aat")
        .unwrap()
        .compare(&baseline, &target);

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].location, "foo");
    assert_eq!(results[0].classification, PerformanceChange::Degradation);
    assert!((results[0].rate.unwrap() - 0.30).abs() < 1e-6);
}

#[test]
fn test_small_drop_is_maybe_optimization() {
    let baseline = profile_with(&[("foo", 100.0)]);
    let target = profile_with(&[("foo", 96.0)]);

    let results = StrategyRegistry::default()
        .get(DetectionMethod::FastCheck)
        .compare(&baseline, &target);

    assert_eq!(results[0].classification, PerformanceChange::MaybeOptimization);
    assert_eq!(results[0].confidence_type, ConfidenceType::Stability);
}

#[test]
fn test_linear_to_quadratic_is_degradation() {
    let results = StrategyRegistry::default()
        .get(DetectionMethod::BestModelOrderEquality)
        .compare(
            &modelled(ModelKind::Linear, 0.98),
            &modelled(ModelKind::Quadratic, 0.96),
        );

    assert_eq!(results.len(), 1);
    let info = &results[0];
    assert_eq!(info.classification, PerformanceChange::Degradation);
    assert_eq!(info.from_baseline.as_deref(), Some("linear"));
    assert_eq!(info.to_target.as_deref(), Some("quadratic"));
    assert_eq!(info.confidence_type, ConfidenceType::RSquare);
    assert!((info.confidence_rate.unwrap() - 0.96).abs() < 1e-9);
}

#[test]
fn test_model_order_direction() {
    let bmoe = BestModelOrderEquality::default();
    let kinds = [
        ModelKind::Constant,
        ModelKind::Logarithmic,
        ModelKind::Linear,
        ModelKind::Quadratic,
        ModelKind::Power,
        ModelKind::Exponential,
    ];
    for &from in &kinds {
        for &to in &kinds {
            let change = bmoe.compare(&modelled(from, 0.99), &modelled(to, 0.99))[0].classification;
            let expected = match to.order().cmp(&from.order()) {
                std::cmp::Ordering::Greater => PerformanceChange::Degradation,
                std::cmp::Ordering::Less => PerformanceChange::Optimization,
                std::cmp::Ordering::Equal => PerformanceChange::NoChange,
            };
            assert_eq!(change, expected, "{} -> {}", from, to);
        }
    }
}

#[test]
fn test_weighted_total_degradation() {
    let baseline = Profile::new("abc", "trace", "./app")
        .with_resource(Resource::new("a", 10.0).with_calls(5))
        .with_resource(Resource::new("b", 50.0).with_calls(1));
    let target = Profile::new("abc", "trace", "./app")
        .with_resource(Resource::new("a", 11.0).with_calls(5))
        .with_resource(Resource::new("b", 50.0).with_calls(1));

    let results = ExclusiveTimeOutliers::default().compare(&baseline, &target);
    let total = results.iter().find(|i| i.location == TOTAL_LOCATION).unwrap();

    assert_eq!(total.classification, PerformanceChange::TotalDegradation);
    assert!((total.rate.unwrap() - 0.05).abs() < 1e-9);
}

#[test]
fn test_method_identifiers() {
    for method in DetectionMethod::ALL {
        assert_eq!(method.id().parse::<DetectionMethod>().unwrap(), method);
        assert_eq!(method.long_name().parse::<DetectionMethod>().unwrap(), method);
    }
    assert_eq!(
        "best-model-order-equality".parse::<DetectionMethod>().unwrap(),
        DetectionMethod::BestModelOrderEquality
    );
    assert!(matches!(
        "median".parse::<DetectionMethod>(),
        Err(DetectionError::UnknownMethod(_))
    ));
}
