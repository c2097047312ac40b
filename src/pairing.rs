//! Comparing a pair of profiles
//!
//! `degradation_between_files` refuses descriptor-incompatible pairs before
//! any strategy runs: comparing measurements of different collectors (or of
//! different postprocessing pipelines) is meaningless.

use crate::change::DegradationInfo;
use crate::error::{DetectionError, Result};
use crate::profile::Profile;
use crate::strategy::{DetectionMethod, DetectionStrategy, Strategy, StrategyRegistry};
use std::fmt;
use std::str::FromStr;

/// Which strategies to run on a pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodSelector {
    /// Every registered strategy, unconditionally
    All,
    Method(DetectionMethod),
}

impl FromStr for MethodSelector {
    type Err = DetectionError;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            Ok(Self::Method(s.parse()?))
        }
    }
}

impl fmt::Display for MethodSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Method(method) => write!(f, "{}", method),
        }
    }
}

/// Fail with `IncompatibleProfiles` unless the descriptors match
pub fn check_compatibility(baseline: &Profile, target: &Profile) -> Result<()> {
    if baseline.is_compatible_with(target) {
        Ok(())
    } else {
        Err(DetectionError::IncompatibleProfiles {
            baseline: baseline.descriptor(),
            target: target.descriptor(),
        })
    }
}

/// Compare two profiles with the selected strategies
///
/// # Errors
/// `IncompatibleProfiles` when collectors or postprocessor chains differ; no
/// strategy is invoked in that case.
pub fn degradation_between_files(
    registry: &StrategyRegistry,
    baseline: &Profile,
    target: &Profile,
    minor_version: &str,
    selector: MethodSelector,
) -> Result<Vec<DegradationInfo>> {
    check_compatibility(baseline, target)?;

    let strategies: Vec<&Strategy> = match selector {
        MethodSelector::All => registry.strategies().iter().collect(),
        MethodSelector::Method(method) => vec![registry.get(method)],
    };
    tracing::debug!(
        minor_version,
        selector = %selector,
        "comparing {} against {}",
        target.descriptor(),
        baseline.descriptor()
    );

    Ok(run_strategies(&strategies, baseline, target))
}

/// Run strategies over one pair
///
/// Several strategies run on scoped worker threads (one per strategy); their
/// merged output is ordered by `(location, strategy)` so it does not depend
/// on scheduling.
pub(crate) fn run_strategies(
    strategies: &[&Strategy],
    baseline: &Profile,
    target: &Profile,
) -> Vec<DegradationInfo> {
    if strategies.len() <= 1 {
        return strategies
            .iter()
            .flat_map(|strategy| strategy.compare(baseline, target))
            .collect();
    }

    let outcome = crossbeam::thread::scope(|scope| {
        let handles: Vec<_> = strategies
            .iter()
            .map(|&strategy| scope.spawn(move |_| strategy.compare(baseline, target)))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join())
            .collect::<std::thread::Result<Vec<_>>>()
    });

    let mut results: Vec<DegradationInfo> = match outcome {
        Ok(Ok(per_strategy)) => per_strategy.into_iter().flatten().collect(),
        Ok(Err(panic)) | Err(panic) => std::panic::resume_unwind(panic),
    };
    results.sort_by(|a, b| {
        a.location
            .cmp(&b.location)
            .then_with(|| a.strategy.cmp(&b.strategy))
    });
    results
}
