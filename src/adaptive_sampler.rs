//! Adaptive selection of sampling budgets
//!
//! A short pilot run classifies the operation by its typical duration;
//! each speed category carries its own coefficient-of-variation (CV) and
//! relative confidence-interval (CI) budget.
//!
//! # Strategy
//!
//! | Category | Pilot mean | CV budget | CI budget |
//! |----------|-----------|-----------|-----------|
//! | UltraFast | < 50μs | 0.03 | 0.12 |
//! | Fast | < 0.5ms | 0.04 | 0.15 |
//! | Medium | < 5ms | 0.05 | 0.20 |
//! | Slow | < 50ms | 0.07 | 0.25 |
//! | VerySlow | >= 50ms | 0.10 | 0.30 |
//!
//! The category budget is then bounded by the caller's request: the CV
//! target is never tighter than requested and the CI width is never
//! looser than requested.

use crate::config::SamplingSettings;
use crate::stats;
use serde::{Deserialize, Serialize};

/// Coarse duration class of a benchmarked operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpeedCategory {
    UltraFast,
    Fast,
    Medium,
    Slow,
    VerySlow,
}

impl SpeedCategory {
    /// Classify a duration in nanoseconds
    pub fn classify(nanoseconds: f64) -> Self {
        if nanoseconds < 50_000.0 {
            SpeedCategory::UltraFast
        } else if nanoseconds < 500_000.0 {
            SpeedCategory::Fast
        } else if nanoseconds < 5_000_000.0 {
            SpeedCategory::Medium
        } else if nanoseconds < 50_000_000.0 {
            SpeedCategory::Slow
        } else {
            SpeedCategory::VerySlow
        }
    }

    /// Recommended `(target_cv, max_ci_width)` before bounding
    pub fn budgets(self) -> (f64, f64) {
        match self {
            SpeedCategory::UltraFast => (0.03, 0.12),
            SpeedCategory::Fast => (0.04, 0.15),
            SpeedCategory::Medium => (0.05, 0.20),
            SpeedCategory::Slow => (0.07, 0.25),
            SpeedCategory::VerySlow => (0.10, 0.30),
        }
    }
}

/// Budgets selected for one operation
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AdaptiveSamplingConfig {
    pub category: SpeedCategory,
    pub target_cv: f64,
    pub max_ci_width: f64,
}

/// Select budgets from pilot durations (nanoseconds)
///
/// An empty pilot returns the requested budgets unchanged with the
/// `Medium` category.
pub fn select(pilot_samples: &[f64], settings: &SamplingSettings) -> AdaptiveSamplingConfig {
    if pilot_samples.is_empty() {
        return AdaptiveSamplingConfig {
            category: SpeedCategory::Medium,
            target_cv: settings.target_cv,
            max_ci_width: settings.max_ci_width,
        };
    }

    let category = SpeedCategory::classify(stats::mean(pilot_samples));
    let (cv, ci) = category.budgets();

    AdaptiveSamplingConfig {
        category,
        target_cv: cv.max(settings.target_cv),
        max_ci_width: ci.min(settings.max_ci_width),
    }
}

// ============================================================================
// UNIT TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(target_cv: f64, max_ci_width: f64) -> SamplingSettings {
        SamplingSettings {
            target_cv,
            max_ci_width,
            ..SamplingSettings::default()
        }
    }

    // Test 1: Empty pilot falls back to the request verbatim
    #[test]
    fn test_empty_pilot() {
        let config = select(&[], &settings(0.123, 0.456));
        assert_eq!(config.category, SpeedCategory::Medium);
        assert_eq!(config.target_cv, 0.123);
        assert_eq!(config.max_ci_width, 0.456);
    }

    // Test 2: Category thresholds
    #[test]
    fn test_classify_thresholds() {
        assert_eq!(SpeedCategory::classify(1_000.0), SpeedCategory::UltraFast);
        assert_eq!(SpeedCategory::classify(49_999.0), SpeedCategory::UltraFast);
        assert_eq!(SpeedCategory::classify(50_000.0), SpeedCategory::Fast);
        assert_eq!(SpeedCategory::classify(1_000_000.0), SpeedCategory::Medium);
        assert_eq!(SpeedCategory::classify(10_000_000.0), SpeedCategory::Slow);
        assert_eq!(SpeedCategory::classify(50_000_000.0), SpeedCategory::VerySlow);
    }

    // Test 3: Ultra-fast operations cannot tighten CV below the request
    #[test]
    fn test_cv_never_tighter_than_requested() {
        let config = select(&[1_000.0, 1_200.0, 900.0], &settings(0.05, 0.20));
        assert_eq!(config.category, SpeedCategory::UltraFast);
        assert_eq!(config.target_cv, 0.05);
        assert_eq!(config.max_ci_width, 0.12);
    }

    // Test 4: Slow operations cannot loosen CI beyond the request
    #[test]
    fn test_ci_never_looser_than_requested() {
        let config = select(&[80_000_000.0, 90_000_000.0], &settings(0.05, 0.20));
        assert_eq!(config.category, SpeedCategory::VerySlow);
        assert_eq!(config.target_cv, 0.10);
        assert_eq!(config.max_ci_width, 0.20);
    }

    // Test 5: Classification uses the pilot mean
    #[test]
    fn test_classification_uses_mean() {
        // median 10μs, mean ~3.3ms
        let config = select(&[10_000.0, 10_000.0, 10_000_000.0], &settings(0.05, 0.20));
        assert_eq!(config.category, SpeedCategory::Medium);
    }

    // Test 6: Bounds hold for every category
    #[test]
    fn test_bounds_for_all_categories() {
        let requested = settings(0.06, 0.18);
        for pilot in [1e3, 1e5, 1e6, 1e7, 1e8] {
            let config = select(&[pilot], &requested);
            assert!(config.target_cv >= requested.target_cv);
            assert!(config.max_ci_width <= requested.max_ci_width);
        }
    }
}
