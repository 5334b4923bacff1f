// Aggregation of repeated runs of one test case
//
// A test case may have been executed in several batches; the hypothesis
// tests consume the concatenation of every batch's raw values.

use crate::test_case_id::TestCaseId;
use serde::{Deserialize, Serialize};

/// Raw timings (milliseconds) of one executed batch of a test case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSampleSet {
    pub display_name: String,
    pub raw_values: Vec<f64>,
    #[serde(default)]
    pub warmup_count: usize,
    /// Measured iterations; defaults to the number of raw values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_count: Option<usize>,
}

impl RawSampleSet {
    pub fn new(display_name: impl Into<String>, raw_values: Vec<f64>) -> Self {
        Self {
            display_name: display_name.into(),
            raw_values,
            warmup_count: 0,
            sample_count: None,
        }
    }

    pub fn with_warmup(mut self, warmup_count: usize) -> Self {
        self.warmup_count = warmup_count;
        self
    }

    pub fn test_case_id(&self) -> TestCaseId {
        TestCaseId::parse(&self.display_name)
    }

    pub fn sample_count(&self) -> usize {
        self.sample_count.unwrap_or(self.raw_values.len())
    }
}

/// All raw values of one test case across batches
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedPerformanceResult {
    pub test_case_id: TestCaseId,
    pub aggregated_raw_values: Vec<f64>,
    pub iteration_count: usize,
    pub warmup_count: usize,
}

/// Concatenate the sets belonging to `test_case_id`, in input order
///
/// Returns `None` when no set matches.
pub fn aggregate<'a, I>(test_case_id: &TestCaseId, sets: I) -> Option<AggregatedPerformanceResult>
where
    I: IntoIterator<Item = &'a RawSampleSet>,
{
    let matching: Vec<&RawSampleSet> = sets
        .into_iter()
        .filter(|set| set.test_case_id() == *test_case_id)
        .collect();
    if matching.is_empty() {
        return None;
    }

    Some(AggregatedPerformanceResult {
        test_case_id: test_case_id.clone(),
        aggregated_raw_values: matching
            .iter()
            .flat_map(|set| set.raw_values.iter().copied())
            .collect(),
        iteration_count: matching.iter().map(|set| set.sample_count()).sum(),
        warmup_count: matching.iter().map(|set| set.warmup_count).sum(),
    })
}
