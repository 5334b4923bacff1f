// Two-sample hypothesis tests
//
// Each test reduces a before/after pair to a statistic and a p-value
// under its null distribution. The tail decides which side(s) of the
// distribution count as evidence against the null.

mod kolmogorov_smirnov;
mod power;
mod rank_sum;
mod signed_rank;

pub use kolmogorov_smirnov::{KsHypothesis, TwoSampleKolmogorovSmirnovTest};
pub use power::TwoSampleTPowerAnalysis;
pub use rank_sum::MannWhitneyWilcoxonTest;
pub use signed_rank::WilcoxonSignedRankTest;
pub use t_test::TwoSampleTTest;

use crate::distributions::ContinuousDistribution;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Default significance level used for confidence intervals and power
pub const DEFAULT_SIZE: f64 = 0.05;

/// Which side(s) of the null distribution are considered significant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Tail {
    /// The two samples differ in either direction
    #[default]
    TwoTail,
    /// The first sample's statistic is larger than expected
    OneUpper,
    /// The first sample's statistic is smaller than expected
    OneLower,
}

/// Common surface of every two-sample test
pub trait HypothesisTest {
    fn statistic(&self) -> f64;

    fn p_value(&self) -> f64;

    fn tail(&self) -> Tail;

    /// `p <= alpha`
    fn is_significant(&self, alpha: f64) -> bool {
        self.p_value() <= alpha
    }
}

/// Convert a test statistic into a p-value under `distribution`
///
/// Two-tailed p-values double the smaller tail and are capped at one,
/// which for a symmetric distribution equals `2·P(X > |x|)`.
pub fn statistic_to_p_value<D>(statistic: f64, distribution: &D, tail: Tail) -> f64
where
    D: ContinuousDistribution + ?Sized,
{
    match tail {
        Tail::TwoTail => {
            let lower = distribution.cdf(statistic);
            let upper = distribution.ccdf(statistic);
            (2.0 * lower.min(upper)).min(1.0)
        }
        Tail::OneUpper => distribution.ccdf(statistic),
        Tail::OneLower => distribution.cdf(statistic),
    }
}

/// Statistic whose p-value under `distribution` equals `p`
///
/// # Errors
///
/// Propagates inverse-CDF failures (probability out of range, failed
/// root search)
pub fn p_value_to_statistic<D>(p: f64, distribution: &D, tail: Tail) -> Result<f64>
where
    D: ContinuousDistribution + ?Sized,
{
    match tail {
        Tail::TwoTail => distribution.inverse_cdf(1.0 - p / 2.0),
        Tail::OneUpper => distribution.inverse_cdf(1.0 - p),
        Tail::OneLower => distribution.inverse_cdf(p),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distributions::StudentTDistribution;

    #[test]
    fn test_two_tail_doubles_upper_tail_for_symmetric_distribution() {
        let t = StudentTDistribution::new(8.0).unwrap();
        let p = statistic_to_p_value(2.0, &t, Tail::TwoTail);
        assert!((p - 2.0 * t.ccdf(2.0)).abs() < 1e-14);
        let p_neg = statistic_to_p_value(-2.0, &t, Tail::TwoTail);
        assert!((p - p_neg).abs() < 1e-14);
    }

    #[test]
    fn test_inverse_pair_round_trips() {
        let t = StudentTDistribution::new(12.0).unwrap();
        for tail in [Tail::TwoTail, Tail::OneUpper, Tail::OneLower] {
            let stat = p_value_to_statistic(0.05, &t, tail).unwrap();
            let p = statistic_to_p_value(stat, &t, tail);
            assert!((p - 0.05).abs() < 1e-5, "{tail:?}: {p}");
        }
    }
}
