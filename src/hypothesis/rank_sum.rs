use super::{statistic_to_p_value, HypothesisTest, Tail};
use crate::distributions::{ContinuityCorrection, MannWhitneyDistribution};
use crate::error::{Result, StatsError};
use crate::stats;

/// Mann-Whitney-Wilcoxon rank-sum test
///
/// Both samples are ranked jointly (mid-ranks for ties). `U1` and `U2`
/// are the rank sums minus their minimum possible values; the reported
/// statistic is the `U` of the smaller sample, and the tails are read
/// from the first sample's point of view (`OneUpper` means the first
/// sample tends to be larger).
#[derive(Debug, Clone)]
pub struct MannWhitneyWilcoxonTest {
    statistic: f64,
    p_value: f64,
    tail: Tail,
    statistic1: f64,
    statistic2: f64,
    rank_sum1: f64,
    rank_sum2: f64,
    ranks1: Vec<f64>,
    ranks2: Vec<f64>,
    exact: bool,
}

impl MannWhitneyWilcoxonTest {
    /// Run the test, choosing exact or approximate evaluation by size
    pub fn new(sample1: &[f64], sample2: &[f64], tail: Tail) -> Result<Self> {
        Self::with_method(sample1, sample2, tail, None)
    }

    /// Run the test with the exact table forced on (`Some(true)`), off
    /// (`Some(false)`) or chosen by size (`None`)
    ///
    /// # Errors
    ///
    /// Both samples must be non-empty and together hold at least two values
    pub fn with_method(
        sample1: &[f64],
        sample2: &[f64],
        tail: Tail,
        exact: Option<bool>,
    ) -> Result<Self> {
        let n1 = sample1.len();
        let n2 = sample2.len();
        if n1 == 0 || n2 == 0 {
            return Err(StatsError::InsufficientData(format!(
                "rank-sum test needs non-empty samples, got {n1} and {n2}"
            )));
        }

        let joint: Vec<f64> = sample1.iter().chain(sample2.iter()).copied().collect();
        let (ranks, _) = stats::rank_with_ties(&joint);
        let (ranks1, ranks2) = ranks.split_at(n1);

        let rank_sum1: f64 = ranks1.iter().sum();
        let rank_sum2: f64 = ranks2.iter().sum();
        let statistic1 = rank_sum1 - (n1 * (n1 + 1)) as f64 / 2.0;
        let statistic2 = rank_sum2 - (n2 * (n2 + 1)) as f64 / 2.0;
        let statistic = if n1 <= n2 { statistic1 } else { statistic2 };

        let correction = match tail {
            Tail::TwoTail => ContinuityCorrection::Midpoint,
            Tail::OneUpper | Tail::OneLower => ContinuityCorrection::KeepInside,
        };
        let distribution =
            MannWhitneyDistribution::with_ranks(&ranks, n1, n2, exact)?.with_correction(correction);

        let p_value = if !distribution.is_exact() && distribution.std_dev() == 0.0 {
            // every value tied: no evidence either way
            1.0
        } else {
            statistic_to_p_value(statistic, &distribution, tail)
        };

        Ok(Self {
            statistic,
            p_value,
            tail,
            statistic1,
            statistic2,
            rank_sum1,
            rank_sum2,
            ranks1: ranks1.to_vec(),
            ranks2: ranks2.to_vec(),
            exact: distribution.is_exact(),
        })
    }

    /// `U` of the first sample
    pub fn statistic1(&self) -> f64 {
        self.statistic1
    }

    /// `U` of the second sample
    pub fn statistic2(&self) -> f64 {
        self.statistic2
    }

    pub fn rank_sums(&self) -> (f64, f64) {
        (self.rank_sum1, self.rank_sum2)
    }

    pub fn ranks1(&self) -> &[f64] {
        &self.ranks1
    }

    pub fn ranks2(&self) -> &[f64] {
        &self.ranks2
    }

    pub fn is_exact(&self) -> bool {
        self.exact
    }
}

impl HypothesisTest for MannWhitneyWilcoxonTest {
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
