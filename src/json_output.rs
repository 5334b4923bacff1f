//! JSON output format for comparison results
//!
//! `--format json` implementation

use crate::outlier::OutlierDetectionResult;
use crate::regression::{
    ChangeDescription, ConfidenceInterval, DiffSettings, StatisticalTestResult, TestCaseResult,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Outlier counts of one side of a comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonOutliers {
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
    pub total: usize,
}

impl From<&OutlierDetectionResult> for JsonOutliers {
    fn from(result: &OutlierDetectionResult) -> Self {
        Self {
            lower: result.lower_outliers.clone(),
            upper: result.upper_outliers.clone(),
            total: result.total_outliers,
        }
    }
}

/// A single compared test case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonTestCase {
    /// Display name, e.g. `Suite.Parse(Size: 10)`
    pub test_case_id: String,
    /// "Regressed", "Improved", "No Change" or "Failed"
    pub change_description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statistic: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean_before: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean_after: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub median_before: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub median_after: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence_interval: Option<(f64, f64)>,
    pub raw_before: Vec<f64>,
    pub raw_after: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outliers_before: Option<JsonOutliers>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outliers_after: Option<JsonOutliers>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub extra: BTreeMap<String, Value>,
    /// Error message of a failed comparison
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&TestCaseResult> for JsonTestCase {
    fn from(result: &TestCaseResult) -> Self {
        let mut case = JsonTestCase {
            test_case_id: result.test_case_id.display_name(),
            change_description: "Failed".to_string(),
            statistic: None,
            p_value: None,
            mean_before: None,
            mean_after: None,
            median_before: None,
            median_after: None,
            confidence_interval: result
                .confidence_interval
                .map(|ConfidenceInterval { lower, upper, .. }| (lower, upper)),
            raw_before: Vec::new(),
            raw_after: Vec::new(),
            outliers_before: result.outliers_before.as_ref().map(JsonOutliers::from),
            outliers_after: result.outliers_after.as_ref().map(JsonOutliers::from),
            extra: BTreeMap::new(),
            error: None,
        };

        match &result.test_result {
            StatisticalTestResult::Success(stats) => {
                case.change_description = stats.change_description.to_string();
                case.statistic = Some(stats.statistic);
                case.p_value = Some(stats.p_value);
                case.mean_before = Some(stats.mean_before);
                case.mean_after = Some(stats.mean_after);
                case.median_before = Some(stats.median_before);
                case.median_after = Some(stats.median_after);
                case.raw_before = stats.raw_before.clone();
                case.raw_after = stats.raw_after.clone();
                case.extra = stats.extra.clone();
            }
            StatisticalTestResult::Failed { error } => {
                case.error = Some(error.clone());
            }
        }
        case
    }
}

/// Settings echoed into the report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonSettings {
    pub alpha: f64,
    pub test_type: String,
    pub use_outlier_detection: bool,
}

/// Summary statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JsonSummary {
    pub total: usize,
    pub regressed: usize,
    pub improved: usize,
    pub unchanged: usize,
    pub failed: usize,
}

/// Root JSON output structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonOutput {
    /// Format version identifier
    pub version: String,
    /// Format name
    pub format: String,
    pub settings: JsonSettings,
    pub results: Vec<JsonTestCase>,
    pub summary: JsonSummary,
}

impl JsonOutput {
    pub fn new(settings: &DiffSettings) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            format: "benchdiff-json-v1".to_string(),
            settings: JsonSettings {
                alpha: settings.alpha,
                test_type: settings.test_type.to_string(),
                use_outlier_detection: settings.use_outlier_detection,
            },
            results: Vec::new(),
            summary: JsonSummary::default(),
        }
    }

    /// Add a compared test case and update the summary
    pub fn add_result(&mut self, result: &TestCaseResult) {
        self.summary.total += 1;
        match result.change_description() {
            Some(ChangeDescription::Regressed) => self.summary.regressed += 1,
            Some(ChangeDescription::Improved) => self.summary.improved += 1,
            Some(ChangeDescription::NoChange) => self.summary.unchanged += 1,
            None => self.summary.failed += 1,
        }
        self.results.push(JsonTestCase::from(result));
    }

    pub fn from_results(settings: &DiffSettings, results: &[TestCaseResult]) -> Self {
        let mut output = Self::new(settings);
        for result in results {
            output.add_result(result);
        }
        output
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
