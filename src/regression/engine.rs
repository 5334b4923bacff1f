// Parallel before/after comparison across all test cases
//
// Test cases are discovered from the "after" collection, compared on a
// bounded rayon pool and accumulated in a lock-free queue. Completion
// order is nondeterministic, so results are sorted by test-case identity
// afterwards unless ordering is disabled or the batch is large.

use crate::error::{Result, StatsError};
use crate::outlier::OutlierDetectionResult;
use crate::regression::aggregate::{aggregate, RawSampleSet};
use crate::regression::config::DiffSettings;
use crate::regression::executor::{self, ChangeDescription, ConfidenceInterval, StatisticalTestResult};
use crate::test_case_id::{sort_by_test_case_id, TestCaseId};
use crossbeam::queue::SegQueue;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Batches larger than this are returned unsorted
pub const ORDERING_LIMIT: usize = 60;

/// Test cases with fewer aggregated values on either side are skipped
pub const MIN_AGGREGATED_SAMPLES: usize = 3;

/// Comparison of one test case
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestCaseResult {
    pub test_case_id: TestCaseId,
    pub test_result: StatisticalTestResult,
    pub confidence_interval: Option<ConfidenceInterval>,
    pub outliers_before: Option<OutlierDetectionResult>,
    pub outliers_after: Option<OutlierDetectionResult>,
}

impl TestCaseResult {
    pub fn statistic(&self) -> Option<f64> {
        self.test_result.statistics().map(|s| s.statistic)
    }

    pub fn p_value(&self) -> Option<f64> {
        self.test_result.statistics().map(|s| s.p_value)
    }

    pub fn change_description(&self) -> Option<ChangeDescription> {
        self.test_result.statistics().map(|s| s.change_description)
    }

    pub fn raw_before(&self) -> &[f64] {
        self.test_result.statistics().map(|s| s.raw_before.as_slice()).unwrap_or_default()
    }

    pub fn raw_after(&self) -> &[f64] {
        self.test_result.statistics().map(|s| s.raw_after.as_slice()).unwrap_or_default()
    }
}

/// Compare every test case present in `after` against `before`
///
/// Test cases missing from `before`, or with fewer than
/// [`MIN_AGGREGATED_SAMPLES`] values on either side, produce no result.
/// A failing hypothesis test produces a failed result instead of an error.
///
/// # Errors
///
/// Invalid settings, or a worker pool that cannot be built
pub fn compute(
    before: &[RawSampleSet],
    after: &[RawSampleSet],
    settings: &DiffSettings,
) -> Result<Vec<TestCaseResult>> {
    settings.validate()?;

    let test_case_ids = distinct_test_case_ids(after);
    debug!(
        test_cases = test_case_ids.len(),
        test_type = %settings.test_type,
        "starting comparison"
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(settings.max_degree_of_parallelism)
        .build()
        .map_err(|e| StatsError::ThreadPool(e.to_string()))?;

    let accumulator = SegQueue::new();
    pool.install(|| {
        test_case_ids.par_iter().for_each(|id| {
            if let Some(result) = compare_test_case(id, before, after, settings) {
                accumulator.push(result);
            }
        });
    });

    let mut results: Vec<TestCaseResult> = std::iter::from_fn(|| accumulator.pop()).collect();

    if settings.disable_ordering || results.len() > ORDERING_LIMIT {
        return Ok(results);
    }

    if !sort_by_test_case_id(&mut results, |r| Some(&r.test_case_id)) {
        warn!("test case identity ordering failed, sorted by display name instead");
    }
    Ok(results)
}

/// Identities in `sets`, first occurrence wins
fn distinct_test_case_ids(sets: &[RawSampleSet]) -> Vec<TestCaseId> {
    let mut seen = HashSet::new();
    sets.iter()
        .map(RawSampleSet::test_case_id)
        .filter(|id| seen.insert(id.clone()))
        .collect()
}

fn compare_test_case(
    id: &TestCaseId,
    before: &[RawSampleSet],
    after: &[RawSampleSet],
    settings: &DiffSettings,
) -> Option<TestCaseResult> {
    let after_compiled = aggregate(id, after)?;
    let before_compiled = aggregate(id, before)?;

    let before_values = &before_compiled.aggregated_raw_values;
    let after_values = &after_compiled.aggregated_raw_values;
    if before_values.len() < MIN_AGGREGATED_SAMPLES || after_values.len() < MIN_AGGREGATED_SAMPLES {
        debug!(
            test_case = %id,
            before = before_values.len(),
            after = after_values.len(),
            "skipping test case with too few samples"
        );
        return None;
    }

    debug!(
        test_case = %id,
        before = before_values.len(),
        after = after_values.len(),
        iterations = after_compiled.iteration_count,
        "comparing test case"
    );

    let outcome = executor::execute(before_values, after_values, settings);
    Some(TestCaseResult {
        test_case_id: id.clone(),
        test_result: outcome.result,
        confidence_interval: outcome.confidence_interval,
        outliers_before: outcome.outliers_before,
        outliers_after: outcome.outliers_after,
    })
}
