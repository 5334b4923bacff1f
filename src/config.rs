//! TOML configuration for benchdiff
//!
//! Both sections are optional; missing keys take their defaults.
//!
//! # Example benchdiff.toml
//!
//! ```toml
//! [diff]
//! alpha = 0.01
//! test_type = "mann-whitney"
//! outlier_strategy = "adaptive"
//! max_degree_of_parallelism = 8
//! seed = 42
//!
//! [sampling]
//! target_cv = 0.04
//! max_ci_width = 0.15
//! ```

use crate::error::{Result, StatsError};
use crate::regression::DiffSettings;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Budgets for the sampling loop that produces raw timings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingSettings {
    /// Target coefficient of variation
    pub target_cv: f64,
    /// Maximum relative confidence-interval width
    pub max_ci_width: f64,
    pub confidence_level: f64,
    pub min_samples: usize,
    pub max_samples: usize,
}

impl Default for SamplingSettings {
    fn default() -> Self {
        Self {
            target_cv: 0.05,
            max_ci_width: 0.20,
            confidence_level: 0.95,
            min_samples: 10,
            max_samples: 1000,
        }
    }
}

impl SamplingSettings {
    pub fn validate(&self) -> Result<()> {
        if self.target_cv.is_nan() || self.target_cv <= 0.0 {
            return Err(StatsError::InvalidConfig(format!(
                "target_cv must be positive, got {}",
                self.target_cv
            )));
        }
        if self.max_ci_width.is_nan() || self.max_ci_width <= 0.0 {
            return Err(StatsError::InvalidConfig(format!(
                "max_ci_width must be positive, got {}",
                self.max_ci_width
            )));
        }
        if self.confidence_level.is_nan()
            || self.confidence_level <= 0.0
            || self.confidence_level >= 1.0
        {
            return Err(StatsError::InvalidConfig(format!(
                "confidence_level must be in (0, 1), got {}",
                self.confidence_level
            )));
        }
        if self.min_samples > self.max_samples {
            return Err(StatsError::InvalidConfig(format!(
                "min_samples ({}) exceeds max_samples ({})",
                self.min_samples, self.max_samples
            )));
        }
        Ok(())
    }
}

/// Root of benchdiff.toml
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchDiffConfig {
    pub diff: DiffSettings,
    pub sampling: SamplingSettings,
}

impl BenchDiffConfig {
    /// Load and validate a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate TOML content
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.diff.validate()?;
        self.sampling.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outlier::OutlierStrategy;
    use crate::regression::TestType;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = BenchDiffConfig::from_toml_str("").unwrap();
        assert_eq!(config, BenchDiffConfig::default());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
            [diff]
            alpha = 0.01
            test_type = "mann-whitney"
            outlier_strategy = "adaptive"
            disable_ordering = true
            seed = 42

            [sampling]
            target_cv = 0.04
            min_samples = 20
        "#;
        let config = BenchDiffConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.diff.alpha, 0.01);
        assert_eq!(config.diff.test_type, TestType::RankSum);
        assert_eq!(config.diff.outlier_strategy, Some(OutlierStrategy::Adaptive));
        assert!(config.diff.disable_ordering);
        assert_eq!(config.diff.seed, Some(42));
        assert_eq!(config.sampling.target_cv, 0.04);
        assert_eq!(config.sampling.min_samples, 20);
        assert_eq!(config.sampling.max_ci_width, 0.20);
    }

    #[test]
    fn test_unknown_test_type_rejected() {
        let err = BenchDiffConfig::from_toml_str("[diff]\ntest_type = \"anova\"").unwrap_err();
        assert!(matches!(err, StatsError::ConfigParse(_)));
        assert!(err.to_string().contains("anova"));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = BenchDiffConfig::from_toml_str("[diff]\nalpha = 0.0").unwrap_err();
        assert!(matches!(err, StatsError::InvalidConfig(_)));
        let err = BenchDiffConfig::from_toml_str("[sampling]\nmin_samples = 5000").unwrap_err();
        assert!(matches!(err, StatsError::InvalidConfig(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("benchdiff.toml");
        std::fs::write(&path, "[diff]\nround = 5\n").unwrap();
        let config = BenchDiffConfig::load(&path).unwrap();
        assert_eq!(config.diff.round, 5);

        let missing = BenchDiffConfig::load(dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(missing, StatsError::Io(_)));
    }
}
