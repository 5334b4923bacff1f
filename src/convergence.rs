//! Statistical convergence of a running sample collection
//!
//! A sampling loop keeps collecting iterations until the coefficient of
//! variation (and optionally the relative width of the t-based confidence
//! interval around the mean) falls inside its budget.

use crate::distributions::DistributionTable;
use crate::stats;
use serde::Serialize;
use tracing::trace;

/// Means at or below this magnitude are treated as zero
const NEAR_ZERO_MEAN: f64 = 1e-9;

/// Outcome of a convergence check
///
/// The statistics are `NaN` when the check stopped before computing them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConvergenceResult {
    pub has_converged: bool,
    pub reason: String,
    pub sample_count: usize,
    pub current_mean: f64,
    pub current_stddev: f64,
    pub current_cv: f64,
    pub standard_error: f64,
    pub confidence_level: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
    pub margin_of_error: f64,
    /// `(ci_upper - ci_lower) / |mean|`
    pub relative_ci_width: f64,
}

impl ConvergenceResult {
    fn not_converged(reason: impl Into<String>, sample_count: usize) -> Self {
        Self {
            has_converged: false,
            reason: reason.into(),
            sample_count,
            current_mean: f64::NAN,
            current_stddev: f64::NAN,
            current_cv: f64::NAN,
            standard_error: f64::NAN,
            confidence_level: f64::NAN,
            ci_lower: f64::NAN,
            ci_upper: f64::NAN,
            margin_of_error: f64::NAN,
            relative_ci_width: f64::NAN,
        }
    }
}

/// CV-only convergence: converged iff `cv <= target_cv`
///
/// The confidence interval is still computed and reported.
pub fn check(
    samples: &[f64],
    target_cv: f64,
    confidence_level: f64,
    min_sample_count: usize,
) -> ConvergenceResult {
    evaluate(samples, target_cv, None, confidence_level, min_sample_count)
}

/// Converged iff both `cv <= target_cv` and the relative CI width is at
/// most `max_ci_width`
pub fn check_with_interval(
    samples: &[f64],
    target_cv: f64,
    max_ci_width: f64,
    confidence_level: f64,
    min_sample_count: usize,
) -> ConvergenceResult {
    evaluate(
        samples,
        target_cv,
        Some(max_ci_width),
        confidence_level,
        min_sample_count,
    )
}

fn evaluate(
    samples: &[f64],
    target_cv: f64,
    max_ci_width: Option<f64>,
    confidence_level: f64,
    min_sample_count: usize,
) -> ConvergenceResult {
    let n = samples.len();
    if n == 0 {
        return ConvergenceResult::not_converged("No samples provided", 0);
    }
    if n < min_sample_count {
        return ConvergenceResult::not_converged(
            format!("Insufficient samples: {n} < {min_sample_count}"),
            n,
        );
    }

    let mean = stats::mean(samples);
    let std_dev = if n == 1 { 0.0 } else { stats::std_dev(samples) };

    if mean.abs() <= NEAR_ZERO_MEAN {
        let mut result = ConvergenceResult::not_converged(
            "Cannot calculate coefficient of variation: mean is zero",
            n,
        );
        result.current_mean = mean;
        result.current_stddev = std_dev;
        return result;
    }
    if !std_dev.is_finite() {
        let mut result =
            ConvergenceResult::not_converged("Invalid standard deviation calculated", n);
        result.current_mean = mean;
        result.current_stddev = std_dev;
        return result;
    }

    let cv = (std_dev / mean).abs();
    if !cv.is_finite() {
        let mut result =
            ConvergenceResult::not_converged("Invalid coefficient of variation calculated", n);
        result.current_mean = mean;
        result.current_stddev = std_dev;
        result.current_cv = cv;
        return result;
    }

    let standard_error = std_dev / (n as f64).sqrt();
    let t = DistributionTable::critical_value(confidence_level, (n - 1) as f64).unwrap_or(f64::NAN);
    let margin_of_error = if standard_error == 0.0 { 0.0 } else { t * standard_error };
    let ci_lower = mean - margin_of_error;
    let ci_upper = mean + margin_of_error;
    let relative_ci_width = ((ci_upper - ci_lower) / mean).abs();

    let cv_ok = cv <= target_cv;
    let reason;
    let has_converged;
    match max_ci_width {
        Some(max_width) => {
            let ci_ok = relative_ci_width <= max_width;
            has_converged = cv_ok && ci_ok;
            reason = if has_converged {
                format!(
                    "Converged: CV {cv:.4} <= {target_cv:.4}, CI width {relative_ci_width:.4} <= {max_width:.4}"
                )
            } else {
                format!(
                    "Not converged: CV {cv:.4} {} {target_cv:.4}, CI width {relative_ci_width:.4} {} {max_width:.4}",
                    if cv_ok { "<=" } else { ">" },
                    if ci_ok { "<=" } else { ">" },
                )
            };
        }
        None => {
            has_converged = cv_ok;
            reason = if cv_ok {
                format!("Converged: CV {cv:.4} <= {target_cv:.4}")
            } else {
                format!("Not converged: CV {cv:.4} > {target_cv:.4}")
            };
        }
    }

    trace!(samples = n, cv, relative_ci_width, has_converged, "convergence check");

    ConvergenceResult {
        has_converged,
        reason,
        sample_count: n,
        current_mean: mean,
        current_stddev: std_dev,
        current_cv: cv,
        standard_error,
        confidence_level,
        ci_lower,
        ci_upper,
        margin_of_error,
        relative_ci_width,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_samples() {
        let result = check(&[], 0.05, 0.95, 10);
        assert!(!result.has_converged);
        assert_eq!(result.reason, "No samples provided");
        assert_eq!(result.sample_count, 0);
    }

    #[test]
    fn test_insufficient_samples_reports_count() {
        let result = check(&[1.0, 2.0, 3.0], 0.05, 0.95, 10);
        assert!(!result.has_converged);
        assert_eq!(result.sample_count, 3);
        assert!(result.reason.starts_with("Insufficient samples"));
    }

    #[test]
    fn test_identical_values_converge() {
        let result = check(&[42.0; 12], 0.05, 0.95, 10);
        assert!(result.has_converged);
        assert_eq!(result.current_cv, 0.0);
        assert_eq!(result.relative_ci_width, 0.0);
        assert!(result.reason.starts_with("Converged"));
    }

    #[test]
    fn test_zero_mean() {
        let result = check(&[-1.0, 1.0, -1.0, 1.0], 0.05, 0.95, 2);
        assert!(!result.has_converged);
        assert!(result.reason.contains("mean is zero"));
    }

    #[test]
    fn test_noisy_samples_do_not_converge() {
        let samples = [10.0, 20.0, 5.0, 30.0, 12.0, 8.0, 25.0, 2.0, 15.0, 18.0];
        let result = check(&samples, 0.05, 0.95, 5);
        assert!(!result.has_converged);
        assert!(result.current_cv > 0.05);
        assert!(result.reason.starts_with("Not converged"));
    }

    #[test]
    fn test_interval_criterion_can_block_convergence() {
        // CV ~0.1 but only 3 samples: the t multiplier makes the CI wide
        let samples = [90.0, 100.0, 110.0];
        let cv_only = check(&samples, 0.2, 0.95, 3);
        assert!(cv_only.has_converged);

        let with_ci = check_with_interval(&samples, 0.2, 0.20, 0.95, 3);
        assert!(!with_ci.has_converged);
        assert!(with_ci.reason.contains("CI width"));
        assert!(with_ci.relative_ci_width > 0.2);
    }

    #[test]
    fn test_interval_fields() {
        let samples = [99.0, 101.0, 100.0, 100.0, 99.5, 100.5, 100.0, 100.0, 99.0, 101.0, 100.0];
        let result = check_with_interval(&samples, 0.05, 0.2, 0.95, 10);
        assert!(result.has_converged);
        assert!((result.current_mean - 100.0).abs() < 1e-9);
        assert!(result.ci_lower < 100.0 && result.ci_upper > 100.0);
        assert!((result.ci_upper - result.ci_lower - 2.0 * result.margin_of_error).abs() < 1e-9);
    }
}
