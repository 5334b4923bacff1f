// Before/after performance comparison
//
// Raw timing samples from two runs are grouped by test case, optionally
// cleaned of outliers, and compared with a two-sample hypothesis test.
// A test case is reported as changed only when the p-value reaches the
// configured significance level; the direction comes from the means.
//
// Pipeline:
// - aggregate: concatenate repeated batches of one test case
// - preprocess: outlier removal and random down-sampling
// - executor: run the configured test, round and describe the result
// - engine: parallel fan-out over test cases, deterministic ordering

mod aggregate;
mod config;
mod engine;
mod executor;
mod preprocess;

pub use aggregate::{aggregate, AggregatedPerformanceResult, RawSampleSet};
pub use config::{DiffSettings, TestType};
pub use engine::{compute, TestCaseResult, MIN_AGGREGATED_SAMPLES, ORDERING_LIMIT};
pub use executor::{
    execute, extra_keys, ChangeDescription, ConfidenceInterval, StatisticalTestResult,
    TestResultWithOutlierAnalysis, TestStatistics, P_VALUE_DIGITS,
};
pub use preprocess::{down_sample, PreprocessedData, Preprocessor};

#[cfg(test)]
mod tests;
