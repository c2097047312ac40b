//! Robust statistics shared by the detection strategies
//!
//! Means and sums are accumulated in `f64`. Spread and quantiles go through
//! trueno's SIMD vector primitives and aprender's `DescriptiveStats`, which
//! work on `f32`: samples are shifted by their minimum and scaled by their
//! range first, so large amounts keep their differences and cannot overflow.
//! Empty inputs yield zero instead of errors so strategies can always classify.

use aprender::stats::DescriptiveStats;
use trueno::Vector;

/// Samples mapped onto `[0, 1]` as `(s - offset) / span`
struct Normalized {
    vector: Vector<f32>,
    offset: f64,
    span: f64,
}

impl Normalized {
    fn new(samples: &[f64]) -> Self {
        let (min, max) = samples
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &s| {
                (lo.min(s), hi.max(s))
            });
        let offset = if min.is_finite() { min } else { 0.0 };
        let span = max - min;
        let span = if span > 0.0 && span.is_finite() { span } else { 1.0 };
        let values: Vec<f32> = samples
            .iter()
            .map(|&s| ((s - offset) / span) as f32)
            .collect();
        Self {
            vector: Vector::from_slice(&values),
            offset,
            span,
        }
    }

    fn restore(&self, value: f32) -> f64 {
        self.offset + f64::from(value) * self.span
    }
}

/// Arithmetic mean (0.0 for no samples)
pub fn mean(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    sum(samples) / samples.len() as f64
}

/// Sum of samples
pub fn sum(samples: &[f64]) -> f64 {
    samples.iter().sum()
}

/// Quantile using aprender's R-7 method (0.0 for no samples)
pub fn quantile(samples: &[f64], q: f64) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let normalized = Normalized::new(samples);
    let stats = DescriptiveStats::new(&normalized.vector);
    stats
        .quantile(q)
        .map(|v| normalized.restore(v))
        .unwrap_or(0.0)
}

pub fn median(samples: &[f64]) -> f64 {
    quantile(samples, 0.5)
}

/// Interquartile range (Q3 - Q1)
pub fn iqr(samples: &[f64]) -> f64 {
    quantile(samples, 0.75) - quantile(samples, 0.25)
}

/// Coefficient of variation (std_dev / |mean|)
///
/// Zero for fewer than two samples, a mean near zero, or a spread that is
/// not finite.
pub fn coefficient_of_variation(samples: &[f64]) -> f64 {
    if samples.len() < 2 {
        return 0.0;
    }
    let mean = mean(samples);
    if mean.abs() < 1e-6 {
        return 0.0;
    }
    let normalized = Normalized::new(samples);
    let Ok(std) = normalized.vector.stddev() else {
        return 0.0;
    };
    let cv = f64::from(std) * normalized.span / mean.abs();
    if cv.is_finite() {
        cv
    } else {
        0.0
    }
}

/// Relative change of `target` against `baseline`
///
/// Undefined for a zero baseline, or when the change does not fit in an `f64`.
pub fn relative_rate(baseline: f64, target: f64) -> Option<f64> {
    if baseline == 0.0 {
        return None;
    }
    let rate = (target - baseline) / baseline;
    rate.is_finite().then_some(rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[2.0, 4.0, 6.0]), 4.0);
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn test_median_odd_and_even() {
        assert_eq!(median(&[1.0, 3.0, 5.0, 7.0, 9.0]), 5.0);
        assert_eq!(median(&[1.0, 2.0, 3.0, 4.0]), 2.5);
    }

    #[test]
    fn test_iqr() {
        // R-7: Q1 = 2.0, Q3 = 4.0
        assert!((iqr(&[1.0, 2.0, 3.0, 4.0, 5.0]) - 2.0).abs() < 1e-6);
        assert_eq!(iqr(&[7.0]), 0.0);
    }

    #[test]
    fn test_coefficient_of_variation() {
        assert!(coefficient_of_variation(&[10.0, 11.0, 10.0, 12.0, 10.0]) < 0.2);
        assert!(coefficient_of_variation(&[5.0, 50.0, 3.0, 45.0, 2.0]) > 0.5);
        assert_eq!(coefficient_of_variation(&[100.0, 100.0, 100.0]), 0.0);
        assert_eq!(coefficient_of_variation(&[]), 0.0);
    }

    #[test]
    fn test_relative_rate() {
        assert!((relative_rate(100.0, 130.0).unwrap() - 0.3).abs() < 1e-9);
        assert_eq!(relative_rate(0.0, 5.0), None);
        assert_eq!(relative_rate(f64::MAX, -f64::MAX), None);
    }

    #[test]
    fn test_large_amounts_keep_unit_differences() {
        // Beyond 2^24 neighbouring integers collapse in f32
        assert_eq!(mean(&[16_777_217.0, 16_777_217.0]), 16_777_217.0);
        assert_eq!(sum(&[16_777_216.0, 1.0]), 16_777_217.0);
        assert_eq!(median(&[16_777_216.0, 16_777_217.0, 16_777_218.0]), 16_777_217.0);
        assert!(relative_rate(mean(&[16_777_216.0]), mean(&[16_777_217.0])).unwrap() > 0.0);
    }

    #[test]
    fn test_amounts_beyond_f32_range_stay_finite() {
        let samples = [1e39, 2e39, 3e39];
        assert!((mean(&samples) - 2e39).abs() / 2e39 < 1e-12);
        assert!((median(&samples) - 2e39).abs() / 2e39 < 1e-6);
        assert!((iqr(&samples) - 1e39).abs() / 1e39 < 1e-6);

        let cv = coefficient_of_variation(&samples);
        assert!(cv.is_finite() && cv > 0.0);
        let rate = relative_rate(mean(&[1e39]), mean(&[1e40])).unwrap();
        assert!((rate - 9.0).abs() < 1e-9);
    }
}
