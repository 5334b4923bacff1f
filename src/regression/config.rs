// Settings for before/after performance comparison
//
// Alpha is the only significance knob; everything else controls which test
// runs, how samples are cleaned, and how the batch is scheduled.

use crate::error::{Result, StatsError};
use crate::outlier::OutlierStrategy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Hypothesis test applied to every test case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TestType {
    /// Welch two-sample t-test
    #[default]
    TTest,
    /// Mann-Whitney-Wilcoxon rank-sum test
    RankSum,
    /// Paired Wilcoxon signed-rank test
    SignedRank,
    /// Two-sample Kolmogorov-Smirnov test
    KolmogorovSmirnov,
}

impl TestType {
    pub fn name(self) -> &'static str {
        match self {
            TestType::TTest => "ttest",
            TestType::RankSum => "ranksum",
            TestType::SignedRank => "signedrank",
            TestType::KolmogorovSmirnov => "kolmogorov-smirnov",
        }
    }
}

impl fmt::Display for TestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TestType {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ttest" | "t-test" => Ok(TestType::TTest),
            "ranksum" | "rank-sum" | "mann-whitney" | "mannwhitney" => Ok(TestType::RankSum),
            "signedrank" | "signed-rank" | "wilcoxon" => Ok(TestType::SignedRank),
            "kolmogorov-smirnov" | "kolmogorovsmirnov" | "ks" => Ok(TestType::KolmogorovSmirnov),
            _ => Err(StatsError::UnsupportedTestType(s.to_string())),
        }
    }
}

impl TryFrom<String> for TestType {
    type Error = StatsError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<TestType> for String {
    fn from(test_type: TestType) -> Self {
        test_type.name().to_string()
    }
}

/// Configuration of one comparison batch
///
/// # Example
/// ```
/// use benchdiff::regression::{DiffSettings, TestType};
///
/// let settings = DiffSettings::default();
/// assert_eq!(settings.alpha, 0.005);
/// assert_eq!(settings.test_type, TestType::TTest);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffSettings {
    /// Significance level; a test case changed when `p <= alpha`
    pub alpha: f64,

    /// Digits kept for means, medians and statistics
    pub round: u32,

    pub test_type: TestType,

    /// Clean samples with Tukey fences before testing
    pub use_outlier_detection: bool,

    /// Side(s) to trim; `None` trims both tails
    pub outlier_strategy: Option<OutlierStrategy>,

    /// Worker threads used across test cases
    pub max_degree_of_parallelism: usize,

    /// Return results in completion order
    pub disable_ordering: bool,

    /// Seed for down-sampling; `None` draws from OS entropy
    pub seed: Option<u64>,
}

impl Default for DiffSettings {
    fn default() -> Self {
        Self {
            alpha: 0.005,
            round: 3,
            test_type: TestType::TTest,
            use_outlier_detection: true,
            outlier_strategy: None,
            max_degree_of_parallelism: 4,
            disable_ordering: false,
            seed: None,
        }
    }
}

impl DiffSettings {
    /// Fewer false positives, more false negatives
    pub fn strict() -> Self {
        Self {
            alpha: 0.001,
            ..Self::default()
        }
    }

    /// Catch potential changes early
    pub fn permissive() -> Self {
        Self {
            alpha: 0.05,
            outlier_strategy: Some(OutlierStrategy::Adaptive),
            ..Self::default()
        }
    }

    pub fn with_test_type(mut self, test_type: TestType) -> Self {
        self.test_type = test_type;
        self
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.alpha.is_nan() || self.alpha <= 0.0 || self.alpha >= 1.0 {
            return Err(StatsError::InvalidConfig(format!(
                "alpha must be in (0, 1), got {}",
                self.alpha
            )));
        }

        if self.max_degree_of_parallelism == 0 {
            return Err(StatsError::InvalidConfig(
                "max_degree_of_parallelism must be >= 1".to_string(),
            ));
        }

        if self.round > 15 {
            return Err(StatsError::InvalidConfig(format!(
                "round must be <= 15, got {}",
                self.round
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = DiffSettings::default();
        assert_eq!(settings.alpha, 0.005);
        assert_eq!(settings.round, 3);
        assert!(settings.use_outlier_detection);
        assert_eq!(settings.max_degree_of_parallelism, 4);
        assert!(!settings.disable_ordering);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_presets_validate() {
        assert_eq!(DiffSettings::strict().alpha, 0.001);
        assert!(DiffSettings::strict().validate().is_ok());
        assert_eq!(
            DiffSettings::permissive().outlier_strategy,
            Some(OutlierStrategy::Adaptive)
        );
        assert!(DiffSettings::permissive().validate().is_ok());
    }

    #[test]
    fn test_invalid_alpha() {
        assert!(DiffSettings::default().with_alpha(1.5).validate().is_err());
        assert!(DiffSettings::default().with_alpha(0.0).validate().is_err());
        assert!(DiffSettings::default().with_alpha(f64::NAN).validate().is_err());
    }

    #[test]
    #[allow(clippy::field_reassign_with_default)]
    fn test_invalid_parallelism() {
        let mut settings = DiffSettings::default();
        settings.max_degree_of_parallelism = 0;
        assert!(matches!(
            settings.validate(),
            Err(StatsError::InvalidConfig(_))
        ));
    }

    #[test]
    #[allow(clippy::field_reassign_with_default)]
    fn test_invalid_round() {
        let mut settings = DiffSettings::default();
        settings.round = 16;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_test_type_names() {
        assert_eq!("ttest".parse::<TestType>().unwrap(), TestType::TTest);
        assert_eq!("Mann-Whitney".parse::<TestType>().unwrap(), TestType::RankSum);
        assert_eq!("wilcoxon".parse::<TestType>().unwrap(), TestType::SignedRank);
        assert_eq!("KS".parse::<TestType>().unwrap(), TestType::KolmogorovSmirnov);
        assert_eq!(
            "anova".parse::<TestType>().unwrap_err(),
            StatsError::UnsupportedTestType("anova".to_string())
        );
    }

    #[test]
    fn test_settings_from_json() {
        let settings: DiffSettings =
            serde_json::from_str(r#"{"alpha": 0.01, "test_type": "ranksum"}"#).unwrap();
        assert_eq!(settings.alpha, 0.01);
        assert_eq!(settings.test_type, TestType::RankSum);
        assert_eq!(settings.round, 3);
    }
}
