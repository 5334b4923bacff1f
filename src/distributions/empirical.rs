use super::ContinuousDistribution;
use crate::stats;
use serde::{Deserialize, Serialize};

/// Step-function CDF of an observed sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmpiricalDistribution {
    samples: Vec<f64>,
}

impl EmpiricalDistribution {
    pub fn new(samples: &[f64]) -> Self {
        Self {
            samples: stats::sorted(samples),
        }
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn mean(&self) -> f64 {
        stats::mean(&self.samples)
    }
}

impl ContinuousDistribution for EmpiricalDistribution {
    /// Fraction of samples `<= x`; zero for an empty sample
    fn cdf(&self, x: f64) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let count = self.samples.partition_point(|&v| v <= x);
        count as f64 / self.samples.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_function() {
        let e = EmpiricalDistribution::new(&[3.0, 1.0, 2.0, 2.0]);
        assert_eq!(e.cdf(0.5), 0.0);
        assert_eq!(e.cdf(1.0), 0.25);
        assert_eq!(e.cdf(2.0), 0.75);
        assert_eq!(e.cdf(10.0), 1.0);
        assert_eq!(e.cdf(f64::NEG_INFINITY), 0.0);
    }

    #[test]
    fn test_empty_sample() {
        let e = EmpiricalDistribution::new(&[]);
        assert!(e.is_empty());
        assert_eq!(e.cdf(1.0), 0.0);
    }
}
