// Sample preparation ahead of hypothesis testing
//
// Outlier removal followed, for the rank tests, by uniform random
// down-sampling without replacement. Down-sampled elements keep their
// original relative order.

use crate::outlier::{detector_for, OutlierDetectionResult, OutlierDetector};
use crate::regression::config::DiffSettings;
use rand::rngs::StdRng;
use rand::seq::index;
use rand::SeedableRng;

/// Samples below this size are never cleaned
pub const MIN_ANALYSIS_SAMPLE_SIZE: usize = 3;

/// Default down-sampling bounds
pub const DEFAULT_MIN_ARRAY_SIZE: usize = 3;
pub const DEFAULT_MAX_ARRAY_SIZE: usize = 10;

/// A sample after preparation
#[derive(Debug, Clone, PartialEq)]
pub struct PreprocessedData {
    pub raw_data: Vec<f64>,
    pub outlier_analysis: Option<OutlierDetectionResult>,
}

impl PreprocessedData {
    /// Data the test should consume: the cleaned set when outlier
    /// detection ran, the raw data otherwise
    pub fn sample(&self) -> &[f64] {
        match &self.outlier_analysis {
            Some(analysis) => &analysis.data_with_outliers_removed,
            None => &self.raw_data,
        }
    }
}

pub struct Preprocessor {
    detector: Box<dyn OutlierDetector>,
    use_outlier_detection: bool,
    seed: Option<u64>,
}

impl Preprocessor {
    pub fn new(settings: &DiffSettings) -> Self {
        Self {
            detector: detector_for(settings.outlier_strategy),
            use_outlier_detection: settings.use_outlier_detection,
            seed: settings.seed,
        }
    }

    pub fn with_detector(
        detector: Box<dyn OutlierDetector>,
        use_outlier_detection: bool,
        seed: Option<u64>,
    ) -> Self {
        Self {
            detector,
            use_outlier_detection,
            seed,
        }
    }

    /// Outlier detection only
    pub fn preprocess(&self, raw_data: &[f64]) -> PreprocessedData {
        let outlier_analysis = (self.use_outlier_detection
            && raw_data.len() >= MIN_ANALYSIS_SAMPLE_SIZE)
            .then(|| self.detector.detect(raw_data));
        PreprocessedData {
            raw_data: raw_data.to_vec(),
            outlier_analysis,
        }
    }

    /// Outlier detection then down-sampling to at most `max_size`
    /// elements
    ///
    /// `stream` selects an independent random stream when a seed is set.
    pub fn preprocess_with_down_sample(
        &self,
        raw_data: &[f64],
        min_size: usize,
        max_size: usize,
        stream: u64,
    ) -> PreprocessedData {
        let mut rng = self.rng(stream);
        match self.preprocess(raw_data).outlier_analysis {
            Some(mut analysis) => {
                analysis.data_with_outliers_removed =
                    down_sample(&analysis.data_with_outliers_removed, min_size, max_size, &mut rng);
                PreprocessedData {
                    raw_data: raw_data.to_vec(),
                    outlier_analysis: Some(analysis),
                }
            }
            None => PreprocessedData {
                raw_data: down_sample(raw_data, min_size, max_size, &mut rng),
                outlier_analysis: None,
            },
        }
    }

    /// Clean both samples, then down-sample both to
    /// `min(len1, len2, max_size)` so they end up the same length
    pub fn preprocess_jointly_with_down_sample(
        &self,
        sample1: &[f64],
        sample2: &[f64],
        min_size: usize,
        max_size: usize,
        stream: u64,
    ) -> (PreprocessedData, PreprocessedData) {
        let mut rng = self.rng(stream);
        let mut first = self.preprocess(sample1);
        let mut second = self.preprocess(sample2);
        let target = first.sample().len().min(second.sample().len()).min(max_size);

        for data in [&mut first, &mut second] {
            match &mut data.outlier_analysis {
                Some(analysis) => {
                    analysis.data_with_outliers_removed = down_sample(
                        &analysis.data_with_outliers_removed,
                        min_size,
                        target,
                        &mut rng,
                    );
                }
                None => {
                    data.raw_data = down_sample(&data.raw_data, min_size, target, &mut rng);
                }
            }
        }

        (first, second)
    }

    fn rng(&self, stream: u64) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(stream)),
            None => StdRng::from_entropy(),
        }
    }
}

/// Uniform random subset of `max_size` elements, in input order
///
/// Inputs already within `max_size`, or within `min_size`, come back
/// unchanged. A `max_size` below `min_size` is raised to `min_size`.
pub fn down_sample(input: &[f64], min_size: usize, max_size: usize, rng: &mut StdRng) -> Vec<f64> {
    let max_size = max_size.max(min_size);
    if input.len() <= max_size || input.len() <= min_size {
        return input.to_vec();
    }

    let mut picked = index::sample(rng, input.len(), max_size).into_vec();
    picked.sort_unstable();
    picked.into_iter().map(|i| input[i]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outlier::DefaultOutlierDetector;

    fn seeded(use_outliers: bool) -> Preprocessor {
        Preprocessor::with_detector(Box::new(DefaultOutlierDetector), use_outliers, Some(7))
    }

    #[test]
    fn test_preprocess_without_detection() {
        let data = [1.0, 2.0, 3.0, 100.0];
        let result = seeded(false).preprocess(&data);
        assert!(result.outlier_analysis.is_none());
        assert_eq!(result.sample(), &data);
    }

    #[test]
    fn test_preprocess_removes_outliers() {
        let data = [10.0, 10.1, 9.9, 10.0, 10.2, 9.8, 10.0, 50.0];
        let result = seeded(true).preprocess(&data);
        assert_eq!(result.sample().len(), 7);
        assert_eq!(result.raw_data.len(), 8);
    }

    #[test]
    fn test_tiny_sample_not_analyzed() {
        let result = seeded(true).preprocess(&[1.0, 2.0]);
        assert!(result.outlier_analysis.is_none());
    }

    #[test]
    fn test_down_sample_bounds() {
        let mut rng = StdRng::seed_from_u64(1);
        let data: Vec<f64> = (0..50).map(f64::from).collect();
        let out = down_sample(&data, 3, 10, &mut rng);
        assert_eq!(out.len(), 10);
        assert!(out.windows(2).all(|w| w[0] < w[1]));

        let short = [1.0, 2.0, 3.0];
        assert_eq!(down_sample(&short, 3, 10, &mut rng), short.to_vec());
        // max below min is raised to min
        assert_eq!(down_sample(&data, 5, 2, &mut rng).len(), 5);
    }

    #[test]
    fn test_seeded_down_sampling_is_reproducible() {
        let data: Vec<f64> = (0..100).map(f64::from).collect();
        let a = seeded(false).preprocess_with_down_sample(&data, 3, 10, 4);
        let b = seeded(false).preprocess_with_down_sample(&data, 3, 10, 4);
        assert_eq!(a, b);
        let c = seeded(false).preprocess_with_down_sample(&data, 3, 10, 5);
        assert_ne!(a.sample(), c.sample());
    }

    #[test]
    fn test_joint_down_sampling_equalizes_lengths() {
        let first: Vec<f64> = (0..40).map(f64::from).collect();
        let second: Vec<f64> = (0..7).map(f64::from).collect();
        let (a, b) = seeded(false).preprocess_jointly_with_down_sample(&first, &second, 3, 10, 0);
        assert_eq!(a.sample().len(), 7);
        assert_eq!(b.sample().len(), 7);

        let (a, b) = seeded(true).preprocess_jointly_with_down_sample(&first, &first, 3, 10, 0);
        assert_eq!(a.sample().len(), 10);
        assert_eq!(b.sample().len(), 10);
        assert_eq!(a.raw_data.len(), 40);
    }
}
