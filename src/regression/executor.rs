// Per-test-case hypothesis test execution
//
// Every executor prepares the samples, runs one hypothesis test and rounds
// the result for reporting. Failures never escape: they are captured as a
// failed result so one bad test case cannot take down the batch.

use crate::error::Result;
use crate::hypothesis::{
    HypothesisTest, KsHypothesis, MannWhitneyWilcoxonTest, Tail, TwoSampleKolmogorovSmirnovTest,
    TwoSampleTTest, WilcoxonSignedRankTest, DEFAULT_SIZE,
};
use crate::outlier::OutlierDetectionResult;
use crate::regression::config::{DiffSettings, TestType};
use crate::regression::preprocess::{
    Preprocessor, DEFAULT_MAX_ARRAY_SIZE, DEFAULT_MIN_ARRAY_SIZE,
};
use crate::stats;
use rayon::prelude::*;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use tracing::warn;

/// Digits kept for reported p-values
pub const P_VALUE_DIGITS: u32 = 4;

/// Down-sampled rank-sum repetitions for larger inputs
pub const RANK_SUM_ITERATIONS: usize = 25;

/// Combined sample size above which the rank-sum test is repeated
pub const RANK_SUM_REPEAT_THRESHOLD: usize = 20;

/// Keys of the `extra` map
pub mod extra_keys {
    pub const DEGREES_OF_FREEDOM: &str = "DegreesOfFreedom";
    pub const STANDARD_ERROR: &str = "StandardError";
    pub const POWER: &str = "Power";
    pub const STATISTIC1: &str = "Statistic1";
    pub const STATISTIC2: &str = "Statistic2";
    pub const ITERATIONS: &str = "Iterations";
    pub const ZERO_DIFFERENCES: &str = "ZeroDifferences";
    pub const EXACT: &str = "Exact";
    pub const EMPIRICAL_DISTRIBUTION1: &str = "EmpiricalDistribution1";
    pub const EMPIRICAL_DISTRIBUTION2: &str = "EmpiricalDistribution2";
    pub const SIZE: &str = "Size";
    pub const TAIL: &str = "Tail";
}

/// Direction of a significant change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChangeDescription {
    /// Mean went up: slower
    Regressed,
    /// Mean went down: faster
    Improved,
    #[serde(rename = "No Change")]
    NoChange,
}

impl ChangeDescription {
    pub fn classify(significant: bool, mean_before: f64, mean_after: f64) -> Self {
        if !significant {
            ChangeDescription::NoChange
        } else if mean_after > mean_before {
            ChangeDescription::Regressed
        } else {
            ChangeDescription::Improved
        }
    }
}

impl fmt::Display for ChangeDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChangeDescription::Regressed => "Regressed",
            ChangeDescription::Improved => "Improved",
            ChangeDescription::NoChange => "No Change",
        })
    }
}

/// Rounded statistics of a successful comparison
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestStatistics {
    pub mean_before: f64,
    pub mean_after: f64,
    pub median_before: f64,
    pub median_after: f64,
    pub statistic: f64,
    pub p_value: f64,
    pub change_description: ChangeDescription,
    pub sample_size_before: usize,
    pub sample_size_after: usize,
    pub raw_before: Vec<f64>,
    pub raw_after: Vec<f64>,
    pub extra: BTreeMap<String, Value>,
}

impl TestStatistics {
    /// Central tendency of the analyzed samples, sizes and raw data of the
    /// inputs
    fn describe(
        settings: &DiffSettings,
        before: &[f64],
        after: &[f64],
        analyzed_before: &[f64],
        analyzed_after: &[f64],
    ) -> Self {
        let round = |x: f64| stats::round_to(x, settings.round);
        Self {
            mean_before: round(stats::mean(analyzed_before)),
            mean_after: round(stats::mean(analyzed_after)),
            median_before: round(stats::median(analyzed_before)),
            median_after: round(stats::median(analyzed_after)),
            statistic: f64::NAN,
            p_value: f64::NAN,
            change_description: ChangeDescription::NoChange,
            sample_size_before: before.len(),
            sample_size_after: after.len(),
            raw_before: before.to_vec(),
            raw_after: after.to_vec(),
            extra: BTreeMap::new(),
        }
    }

    fn with_outcome(mut self, settings: &DiffSettings, statistic: f64, p_value: f64, significant: bool) -> Self {
        self.statistic = stats::round_to(statistic, settings.round);
        self.p_value = stats::round_to(p_value, P_VALUE_DIGITS);
        self.change_description =
            ChangeDescription::classify(significant, self.mean_before, self.mean_after);
        self
    }

    fn with_extra(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.extra.insert(key.to_string(), value.into());
        self
    }
}

/// Outcome of one test case: statistics or the captured error
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StatisticalTestResult {
    Success(TestStatistics),
    Failed { error: String },
}

impl StatisticalTestResult {
    pub fn is_failed(&self) -> bool {
        matches!(self, StatisticalTestResult::Failed { .. })
    }

    pub fn statistics(&self) -> Option<&TestStatistics> {
        match self {
            StatisticalTestResult::Success(stats) => Some(stats),
            StatisticalTestResult::Failed { .. } => None,
        }
    }
}

/// Interval around the observed difference of means
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
    pub level: f64,
}

/// Test result together with the outlier analysis of both inputs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestResultWithOutlierAnalysis {
    pub result: StatisticalTestResult,
    pub confidence_interval: Option<ConfidenceInterval>,
    pub outliers_before: Option<OutlierDetectionResult>,
    pub outliers_after: Option<OutlierDetectionResult>,
}

impl TestResultWithOutlierAnalysis {
    pub fn failed(error: impl fmt::Display) -> Self {
        Self {
            result: StatisticalTestResult::Failed {
                error: error.to_string(),
            },
            confidence_interval: None,
            outliers_before: None,
            outliers_after: None,
        }
    }
}

/// Run the test selected by `settings.test_type` on one before/after pair
pub fn execute(before: &[f64], after: &[f64], settings: &DiffSettings) -> TestResultWithOutlierAnalysis {
    let preprocessor = Preprocessor::new(settings);
    let outcome = match settings.test_type {
        TestType::TTest => t_test(before, after, settings, &preprocessor),
        TestType::RankSum => rank_sum(before, after, settings, &preprocessor),
        TestType::SignedRank => signed_rank(before, after, settings, &preprocessor),
        TestType::KolmogorovSmirnov => kolmogorov_smirnov(before, after, settings, &preprocessor),
    };

    outcome.unwrap_or_else(|e| {
        warn!(test_type = %settings.test_type, error = %e, "hypothesis test failed");
        TestResultWithOutlierAnalysis::failed(e)
    })
}

fn t_test(
    before: &[f64],
    after: &[f64],
    settings: &DiffSettings,
    preprocessor: &Preprocessor,
) -> Result<TestResultWithOutlierAnalysis> {
    let first = preprocessor.preprocess(before);
    let second = preprocessor.preprocess(after);
    let test = TwoSampleTTest::new(first.sample(), second.sample(), false, 0.0, Tail::TwoTail)?;

    let round = |x: f64| stats::round_to(x, settings.round);
    let statistics = TestStatistics::describe(settings, before, after, first.sample(), second.sample())
        .with_outcome(
            settings,
            test.statistic(),
            test.p_value(),
            test.is_significant(settings.alpha),
        )
        .with_extra(extra_keys::DEGREES_OF_FREEDOM, round(test.degrees_of_freedom()))
        .with_extra(extra_keys::STANDARD_ERROR, round(test.standard_error()))
        .with_extra(extra_keys::POWER, round(test.analysis().power()));

    let (lower, upper) = test.confidence_interval();
    Ok(TestResultWithOutlierAnalysis {
        result: StatisticalTestResult::Success(statistics),
        confidence_interval: Some(ConfidenceInterval {
            lower: round(lower),
            upper: round(upper),
            level: 1.0 - DEFAULT_SIZE,
        }),
        outliers_before: first.outlier_analysis,
        outliers_after: second.outlier_analysis,
    })
}

fn rank_sum(
    before: &[f64],
    after: &[f64],
    settings: &DiffSettings,
    preprocessor: &Preprocessor,
) -> Result<TestResultWithOutlierAnalysis> {
    let iterations = if before.len() + after.len() > RANK_SUM_REPEAT_THRESHOLD {
        RANK_SUM_ITERATIONS
    } else {
        1
    };

    let tests = (0..iterations)
        .into_par_iter()
        .map(|i| {
            let (first, second) = preprocessor.preprocess_jointly_with_down_sample(
                before,
                after,
                DEFAULT_MIN_ARRAY_SIZE,
                DEFAULT_MAX_ARRAY_SIZE,
                i as u64,
            );
            MannWhitneyWilcoxonTest::new(first.sample(), second.sample(), Tail::TwoTail)
        })
        .collect::<Result<Vec<_>>>()?;

    let p_values: Vec<f64> = tests.iter().map(|t| t.p_value()).collect();
    let significant: Vec<f64> = p_values.iter().copied().filter(|&p| p < settings.alpha).collect();
    let is_significant = significant.len() as f64 / tests.len() as f64 > 0.5;
    let p_value = if is_significant {
        stats::mean(&significant)
    } else {
        let rest: Vec<f64> = p_values.iter().copied().filter(|&p| p > settings.alpha).collect();
        if rest.is_empty() {
            stats::mean(&p_values)
        } else {
            stats::mean(&rest)
        }
    };

    let statistic = mean_by(&tests, |t| t.statistic());

    let statistics = TestStatistics::describe(settings, before, after, before, after)
        .with_outcome(settings, statistic, p_value, is_significant)
        .with_extra(extra_keys::STATISTIC1, mean_by(&tests, |t| t.statistic1()))
        .with_extra(extra_keys::STATISTIC2, mean_by(&tests, |t| t.statistic2()))
        .with_extra(extra_keys::ITERATIONS, iterations as u64);

    Ok(TestResultWithOutlierAnalysis {
        result: StatisticalTestResult::Success(statistics),
        confidence_interval: None,
        outliers_before: preprocessor.preprocess(before).outlier_analysis,
        outliers_after: preprocessor.preprocess(after).outlier_analysis,
    })
}

fn mean_by<T>(items: &[T], f: impl Fn(&T) -> f64) -> f64 {
    stats::mean(&items.iter().map(f).collect::<Vec<_>>())
}

fn signed_rank(
    before: &[f64],
    after: &[f64],
    settings: &DiffSettings,
    preprocessor: &Preprocessor,
) -> Result<TestResultWithOutlierAnalysis> {
    // pairs need equal lengths; no upper cap so the exact p-value can reach alpha
    let (first, second) = preprocessor.preprocess_jointly_with_down_sample(
        before,
        after,
        DEFAULT_MIN_ARRAY_SIZE,
        usize::MAX,
        0,
    );
    let test = WilcoxonSignedRankTest::new(first.sample(), second.sample(), Tail::TwoTail)?;

    let statistics = TestStatistics::describe(settings, before, after, first.sample(), second.sample())
        .with_outcome(
            settings,
            test.statistic(),
            test.p_value(),
            test.is_significant(settings.alpha),
        )
        .with_extra(extra_keys::ZERO_DIFFERENCES, test.zero_count() as u64)
        .with_extra(extra_keys::EXACT, test.is_exact());

    Ok(TestResultWithOutlierAnalysis {
        result: StatisticalTestResult::Success(statistics),
        confidence_interval: None,
        outliers_before: first.outlier_analysis,
        outliers_after: second.outlier_analysis,
    })
}

fn kolmogorov_smirnov(
    before: &[f64],
    after: &[f64],
    settings: &DiffSettings,
    preprocessor: &Preprocessor,
) -> Result<TestResultWithOutlierAnalysis> {
    let first = preprocessor.preprocess(before);
    let second = preprocessor.preprocess(after);
    let test =
        TwoSampleKolmogorovSmirnovTest::new(first.sample(), second.sample(), KsHypothesis::Unequal)?;

    let statistics = TestStatistics::describe(settings, before, after, first.sample(), second.sample())
        .with_outcome(
            settings,
            test.statistic(),
            test.p_value(),
            test.is_significant(settings.alpha),
        )
        .with_extra(
            extra_keys::EMPIRICAL_DISTRIBUTION1,
            test.empirical1().samples().to_vec(),
        )
        .with_extra(
            extra_keys::EMPIRICAL_DISTRIBUTION2,
            test.empirical2().samples().to_vec(),
        )
        .with_extra(extra_keys::SIZE, DEFAULT_SIZE)
        .with_extra(extra_keys::TAIL, format!("{:?}", test.tail()));

    Ok(TestResultWithOutlierAnalysis {
        result: StatisticalTestResult::Success(statistics),
        confidence_interval: None,
        outliers_before: first.outlier_analysis,
        outliers_after: second.outlier_analysis,
    })
}
