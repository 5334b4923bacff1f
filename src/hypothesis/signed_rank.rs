use super::{statistic_to_p_value, HypothesisTest, Tail};
use crate::distributions::{ContinuityCorrection, WilcoxonDistribution, WILCOXON_EXACT_LIMIT};
use crate::error::{Result, StatsError};
use crate::stats;

/// Paired Wilcoxon signed-rank test
///
/// Works on the differences `sample1[i] - sample2[i]`. Exact zero
/// differences carry no sign and are dropped before ranking. The
/// statistic `W+` is the sum of ranks of the positive differences.
#[derive(Debug, Clone)]
pub struct WilcoxonSignedRankTest {
    statistic: f64,
    p_value: f64,
    tail: Tail,
    differences: Vec<f64>,
    ranks: Vec<f64>,
    zeros: usize,
    exact: bool,
}

impl WilcoxonSignedRankTest {
    pub fn new(sample1: &[f64], sample2: &[f64], tail: Tail) -> Result<Self> {
        Self::with_method(sample1, sample2, tail, None)
    }

    /// # Errors
    ///
    /// - [`StatsError::DimensionMismatch`] for samples of different length
    /// - [`StatsError::ExactWithZeros`] when `exact == Some(true)` and some
    ///   pair has a zero difference
    pub fn with_method(
        sample1: &[f64],
        sample2: &[f64],
        tail: Tail,
        exact: Option<bool>,
    ) -> Result<Self> {
        if sample1.len() != sample2.len() {
            return Err(StatsError::DimensionMismatch {
                before: sample1.len(),
                after: sample2.len(),
            });
        }
        if sample1.is_empty() {
            return Err(StatsError::InsufficientData(
                "signed-rank test needs at least one pair".to_string(),
            ));
        }

        let all: Vec<f64> = sample1.iter().zip(sample2).map(|(a, b)| a - b).collect();
        let differences: Vec<f64> = all.iter().copied().filter(|&d| d != 0.0).collect();
        let zeros = all.len() - differences.len();

        if zeros > 0 && exact == Some(true) {
            return Err(StatsError::ExactWithZeros);
        }

        if differences.is_empty() {
            return Ok(Self {
                statistic: 0.0,
                p_value: 1.0,
                tail,
                differences,
                ranks: Vec::new(),
                zeros,
                exact: false,
            });
        }

        let magnitudes: Vec<f64> = differences.iter().map(|d| d.abs()).collect();
        let (ranks, _) = stats::rank_with_ties(&magnitudes);
        let statistic: f64 = differences
            .iter()
            .zip(&ranks)
            .filter(|(d, _)| **d > 0.0)
            .map(|(_, r)| r)
            .sum();

        let use_exact = exact.unwrap_or(zeros == 0 && ranks.len() <= WILCOXON_EXACT_LIMIT);
        let correction = match tail {
            Tail::TwoTail => ContinuityCorrection::Midpoint,
            Tail::OneUpper | Tail::OneLower => ContinuityCorrection::KeepInside,
        };
        let distribution =
            WilcoxonDistribution::with_ranks(&ranks, Some(use_exact))?.with_correction(correction);
        let p_value = statistic_to_p_value(statistic, &distribution, tail);

        Ok(Self {
            statistic,
            p_value,
            tail,
            differences,
            ranks,
            zeros,
            exact: use_exact,
        })
    }

    /// Non-zero paired differences
    pub fn differences(&self) -> &[f64] {
        &self.differences
    }

    pub fn ranks(&self) -> &[f64] {
        &self.ranks
    }

    /// Number of pairs dropped for having a zero difference
    pub fn zero_count(&self) -> usize {
        self.zeros
    }

    pub fn is_exact(&self) -> bool {
        self.exact
    }
}

impl HypothesisTest for WilcoxonSignedRankTest {
    fn statistic(&self) -> f64 {
        self.statistic
    }

    fn p_value(&self) -> f64 {
        self.p_value
    }

    fn tail(&self) -> Tail {
        self.tail
    }
}
