use super::exact::ExactTable;
use super::normal::NormalDistribution;
use super::{ContinuityCorrection, ContinuousDistribution};
use crate::error::{Result, StatsError};
use crate::stats;

/// Largest per-sample size evaluated with the exact table
pub const EXACT_LIMIT: usize = 30;

/// Null distribution of the Mann-Whitney U statistic
///
/// Evaluated at the `U` of the smaller sample. When the first sample is
/// the larger one the lower and upper tails are swapped, so both tails
/// always read from the first sample's point of view.
#[derive(Debug, Clone)]
pub struct MannWhitneyDistribution {
    n1: usize,
    n2: usize,
    correction: ContinuityCorrection,
    exact: Option<ExactTable>,
    approximation: NormalDistribution,
}

impl MannWhitneyDistribution {
    /// Normal approximation without tie information
    pub fn new(n1: usize, n2: usize) -> Result<Self> {
        check_sizes(n1, n2)?;
        let mean = (n1 * n2) as f64 / 2.0;
        let std_dev = ((n1 * n2) as f64 * (n1 + n2 + 1) as f64 / 12.0).sqrt();
        Ok(Self {
            n1,
            n2,
            correction: ContinuityCorrection::None,
            exact: None,
            approximation: NormalDistribution::new(mean, std_dev)?,
        })
    }

    /// Distribution conditioned on the observed (joint) ranks
    ///
    /// `ranks` holds the mid-ranks of both samples concatenated. `exact`
    /// forces or forbids the exact table; by default it is used when both
    /// samples have at most [`EXACT_LIMIT`] values. The approximation's
    /// variance is tie-corrected.
    pub fn with_ranks(ranks: &[f64], n1: usize, n2: usize, exact: Option<bool>) -> Result<Self> {
        check_sizes(n1, n2)?;
        if ranks.len() <= 1 {
            return Err(StatsError::InvalidArgument(
                "the rank vector must contain at least 2 elements".to_string(),
            ));
        }
        if ranks.iter().any(|&r| r < 0.0) {
            return Err(StatsError::InvalidArgument(
                "rank values cannot be negative".to_string(),
            ));
        }

        let n = ranks.len() as f64;
        let (_, ties) = stats::rank_with_ties(ranks);
        let correction = stats::tie_correction_sum(&ties) / (n * (n - 1.0));
        let mean = (n1 * n2) as f64 / 2.0;
        let variance = (n1 * n2) as f64 / 12.0 * ((n1 + n2) as f64 + 1.0 - correction);
        let std_dev = variance.max(0.0).sqrt();

        let use_exact = exact.unwrap_or(n1 <= EXACT_LIMIT && n2 <= EXACT_LIMIT);
        let exact = use_exact.then(|| ExactTable::mann_whitney(ranks, n1.min(n2)));

        Ok(Self {
            n1,
            n2,
            correction: ContinuityCorrection::None,
            exact,
            approximation: NormalDistribution::new(mean, std_dev)?,
        })
    }

    pub fn with_correction(mut self, correction: ContinuityCorrection) -> Self {
        self.correction = correction;
        self
    }

    pub fn is_exact(&self) -> bool {
        self.exact.is_some()
    }

    pub fn mean(&self) -> f64 {
        self.approximation.mean()
    }

    pub fn std_dev(&self) -> f64 {
        self.approximation.std_dev()
    }

    pub fn sample_sizes(&self) -> (usize, usize) {
        (self.n1, self.n2)
    }

    fn lower_tail(&self, x: f64) -> f64 {
        if let Some(table) = &self.exact {
            return table.cdf(x);
        }
        let x = match self.correction {
            ContinuityCorrection::Midpoint => midpoint(x, self.mean()),
            ContinuityCorrection::KeepInside => x + 0.5,
            ContinuityCorrection::None => x,
        };
        self.approximation.cdf(x)
    }

    fn upper_tail(&self, x: f64) -> f64 {
        if let Some(table) = &self.exact {
            return table.ccdf(x);
        }
        let x = match self.correction {
            ContinuityCorrection::Midpoint => midpoint(x, self.mean()),
            ContinuityCorrection::KeepInside => x - 0.5,
            ContinuityCorrection::None => x,
        };
        self.approximation.ccdf(x)
    }
}

impl ContinuousDistribution for MannWhitneyDistribution {
    fn cdf(&self, x: f64) -> f64 {
        if self.n1 <= self.n2 {
            self.lower_tail(x)
        } else {
            self.upper_tail(x)
        }
    }

    fn ccdf(&self, x: f64) -> f64 {
        if self.n1 <= self.n2 {
            self.upper_tail(x)
        } else {
            self.lower_tail(x)
        }
    }

    fn inverse_cdf(&self, p: f64) -> Result<f64> {
        if self.exact.is_none() {
            return self.approximation.inverse_cdf(p);
        }
        super::inverse_by_search(|x| self.cdf(x), p)
    }
}

fn midpoint(x: f64, mean: f64) -> f64 {
    if x > mean {
        x - 0.5
    } else {
        x + 0.5
    }
}

fn check_sizes(n1: usize, n2: usize) -> Result<()> {
    if n1 == 0 || n2 == 0 {
        return Err(StatsError::InsufficientData(format!(
            "both samples need at least one observation (n1 = {n1}, n2 = {n2})"
        )));
    }
    Ok(())
}
