//! Outlier detection for wall-clock timing samples
//!
//! Both detectors fence the data with Tukey's rule: with `Q1`/`Q3` the
//! first and third quartiles and `IQR = Q3 - Q1`, values below
//! `Q1 - 1.5·IQR` or above `Q3 + 1.5·IQR` are outliers. Samples with
//! three or fewer values are never fenced.
//!
//! | Strategy | Lower tail | Upper tail |
//! |----------|-----------|-----------|
//! | `RemoveUpper` | kept | removed |
//! | `RemoveLower` | removed | kept |
//! | `RemoveAll` | removed | removed |
//! | `DontRemove` | reported only | reported only |
//! | `Adaptive` | removed if the data calls for it | removed if the data calls for it |

use crate::stats;
use serde::{Deserialize, Serialize};

/// Tukey multiplier for the inner fences
pub const FENCE_MULTIPLIER: f64 = 1.5;

/// Samples at or below this size are returned unmodified
pub const MIN_FENCED_SAMPLES: usize = 3;

/// Which side(s) of the distribution the configurable detector trims
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutlierStrategy {
    /// Right-tail only; timing noise is almost always slow outliers
    #[default]
    RemoveUpper,
    RemoveLower,
    RemoveAll,
    /// Detect and report, keep everything in the clean set
    DontRemove,
    /// Pick a side from the outliers actually found
    Adaptive,
}

/// Partition of a sample into clean data and outliers
///
/// For every strategy except `DontRemove`,
/// `clean.len() + lower.len() + upper.len() == original.len()`. Under
/// `DontRemove` the detected outliers are reported while the clean set
/// equals the original.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OutlierDetectionResult {
    pub original_data: Vec<f64>,
    pub data_with_outliers_removed: Vec<f64>,
    pub lower_outliers: Vec<f64>,
    pub upper_outliers: Vec<f64>,
    pub total_outliers: usize,
}

impl OutlierDetectionResult {
    fn untouched(data: &[f64]) -> Self {
        Self {
            original_data: data.to_vec(),
            data_with_outliers_removed: data.to_vec(),
            lower_outliers: Vec::new(),
            upper_outliers: Vec::new(),
            total_outliers: 0,
        }
    }

    pub fn has_outliers(&self) -> bool {
        self.total_outliers > 0
    }
}

/// Inner Tukey fences of a sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TukeyFences {
    pub lower: f64,
    pub upper: f64,
}

impl TukeyFences {
    pub fn from_data(data: &[f64]) -> Self {
        let (q1, q3) = stats::quartiles(data);
        let iqr = q3 - q1;
        Self {
            lower: q1 - FENCE_MULTIPLIER * iqr,
            upper: q3 + FENCE_MULTIPLIER * iqr,
        }
    }

    pub fn is_below(&self, x: f64) -> bool {
        x < self.lower
    }

    pub fn is_above(&self, x: f64) -> bool {
        x > self.upper
    }
}

/// Separates raw samples into clean data and outliers
pub trait OutlierDetector: Send + Sync {
    fn detect(&self, data: &[f64]) -> OutlierDetectionResult;
}

/// Fixed policy: fence both tails and drop everything outside
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultOutlierDetector;

impl OutlierDetector for DefaultOutlierDetector {
    fn detect(&self, data: &[f64]) -> OutlierDetectionResult {
        partition(data, OutlierStrategy::RemoveAll)
    }
}

/// Policy chosen by an [`OutlierStrategy`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigurableOutlierDetector {
    strategy: OutlierStrategy,
}

impl ConfigurableOutlierDetector {
    pub fn new(strategy: OutlierStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> OutlierStrategy {
        self.strategy
    }
}

impl OutlierDetector for ConfigurableOutlierDetector {
    fn detect(&self, data: &[f64]) -> OutlierDetectionResult {
        partition(data, self.strategy)
    }
}

/// Detector for an optional strategy; `None` selects the fixed policy
pub fn detector_for(strategy: Option<OutlierStrategy>) -> Box<dyn OutlierDetector> {
    match strategy {
        Some(strategy) => Box::new(ConfigurableOutlierDetector::new(strategy)),
        None => Box::new(DefaultOutlierDetector),
    }
}

/// Resolve `Adaptive` from the number of candidates on each side
fn choose_adaptive(lower: usize, upper: usize) -> OutlierStrategy {
    if upper > 0 && lower == 0 {
        OutlierStrategy::RemoveUpper
    } else if lower > 0 && upper == 0 {
        OutlierStrategy::RemoveLower
    } else if lower + upper >= 2 {
        OutlierStrategy::RemoveAll
    } else {
        OutlierStrategy::RemoveUpper
    }
}

fn partition(data: &[f64], strategy: OutlierStrategy) -> OutlierDetectionResult {
    if data.len() <= MIN_FENCED_SAMPLES {
        return OutlierDetectionResult::untouched(data);
    }

    let fences = TukeyFences::from_data(data);
    let below: Vec<f64> = data.iter().copied().filter(|&x| fences.is_below(x)).collect();
    let above: Vec<f64> = data.iter().copied().filter(|&x| fences.is_above(x)).collect();

    let effective = match strategy {
        OutlierStrategy::Adaptive => choose_adaptive(below.len(), above.len()),
        other => other,
    };

    if effective == OutlierStrategy::DontRemove {
        let total_outliers = below.len() + above.len();
        return OutlierDetectionResult {
            original_data: data.to_vec(),
            data_with_outliers_removed: data.to_vec(),
            lower_outliers: below,
            upper_outliers: above,
            total_outliers,
        };
    }

    let trim_lower = matches!(
        effective,
        OutlierStrategy::RemoveLower | OutlierStrategy::RemoveAll
    );
    let trim_upper = matches!(
        effective,
        OutlierStrategy::RemoveUpper | OutlierStrategy::RemoveAll
    );

    let clean: Vec<f64> = data
        .iter()
        .copied()
        .filter(|&x| !(trim_lower && fences.is_below(x)) && !(trim_upper && fences.is_above(x)))
        .collect();
    let lower_outliers = if trim_lower { below } else { Vec::new() };
    let upper_outliers = if trim_upper { above } else { Vec::new() };
    let total_outliers = lower_outliers.len() + upper_outliers.len();

    OutlierDetectionResult {
        original_data: data.to_vec(),
        data_with_outliers_removed: clean,
        lower_outliers,
        upper_outliers,
        total_outliers,
    }
}
