use super::{HypothesisTest, Tail};
use crate::distributions::{ContinuousDistribution, EmpiricalDistribution, KolmogorovSmirnovDistribution};
use crate::error::{Result, StatsError};
use crate::stats;
use serde::{Deserialize, Serialize};

/// Alternative hypothesis of the two-sample Kolmogorov-Smirnov test,
/// phrased in terms of the empirical CDFs `F1` and `F2`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum KsHypothesis {
    /// `F1 != F2` somewhere; statistic `sup |F1 - F2|`
    #[default]
    Unequal,
    /// `F1` lies above `F2` (the first sample tends to be smaller);
    /// statistic `sup (F1 - F2)`
    FirstGreater,
    /// `F1` lies below `F2`; statistic `sup (F2 - F1)`
    FirstLess,
}

impl KsHypothesis {
    pub fn tail(self) -> Tail {
        match self {
            KsHypothesis::Unequal => Tail::TwoTail,
            KsHypothesis::FirstGreater => Tail::OneUpper,
            KsHypothesis::FirstLess => Tail::OneLower,
        }
    }
}

/// Two-sample Kolmogorov-Smirnov test
///
/// The statistic is the largest gap between the two empirical CDFs over
/// the merged sample space. Its p-value comes from the KS distribution
/// with effective size `n1·n2/(n1+n2)`; one-sided alternatives use the
/// exact one-sided upper tail.
#[derive(Debug, Clone)]
pub struct TwoSampleKolmogorovSmirnovTest {
    statistic: f64,
    p_value: f64,
    hypothesis: KsHypothesis,
    empirical1: EmpiricalDistribution,
    empirical2: EmpiricalDistribution,
    distribution: KolmogorovSmirnovDistribution,
}

impl TwoSampleKolmogorovSmirnovTest {
    /// # Errors
    ///
    /// Both samples must be non-empty
    pub fn new(sample1: &[f64], sample2: &[f64], hypothesis: KsHypothesis) -> Result<Self> {
        let n1 = sample1.len();
        let n2 = sample2.len();
        if n1 == 0 || n2 == 0 {
            return Err(StatsError::InsufficientData(format!(
                "Kolmogorov-Smirnov test needs non-empty samples, got {n1} and {n2}"
            )));
        }

        let distribution = KolmogorovSmirnovDistribution::new((n1 * n2) as f64 / (n1 + n2) as f64)?;
        let empirical1 = EmpiricalDistribution::new(sample1);
        let empirical2 = EmpiricalDistribution::new(sample2);

        let mut merged: Vec<f64> = sample1.iter().chain(sample2.iter()).copied().collect();
        merged = stats::sorted(&merged);
        merged.dedup();

        let gaps = merged.iter().map(|&x| empirical1.cdf(x) - empirical2.cdf(x));
        let statistic = match hypothesis {
            KsHypothesis::Unequal => gaps.map(f64::abs).fold(0.0, f64::max),
            KsHypothesis::FirstGreater => gaps.fold(0.0, f64::max),
            KsHypothesis::FirstLess => gaps.map(|g| -g).fold(0.0, f64::max),
        };

        let p_value = match hypothesis {
            KsHypothesis::Unequal => distribution.ccdf(statistic),
            KsHypothesis::FirstGreater | KsHypothesis::FirstLess => {
                distribution.one_sided_ccdf(statistic)
            }
        }
        .clamp(0.0, 1.0);

        Ok(Self {
            statistic,
            p_value,
            hypothesis,
            empirical1,
            empirical2,
            distribution,
        })
    }

    pub fn hypothesis(&self) -> KsHypothesis {
        self.hypothesis
    }

    pub fn empirical1(&self) -> &EmpiricalDistribution {
        &self.empirical1
    }

    pub fn empirical2(&self) -> &EmpiricalDistribution {
        &self.empirical2
    }

    /// Effective sample size of the null distribution
    pub fn effective_size(&self) -> f64 {
        self.distribution.samples()
    }
}

impl HypothesisTest for TwoSampleKolmogorovSmirnovTest {
    fn statistic(&self) -> f64 {
        self.statistic
    }

    fn p_value(&self) -> f64 {
        self.p_value
    }

    fn tail(&self) -> Tail {
        self.hypothesis.tail()
    }
}
