// Probability distributions for two-sample hypothesis testing
//
// Every distribution exposes a CDF, a complementary CDF and an inverse
// CDF. The complementary CDF is computed directly where that matters for
// tail accuracy; the inverse falls back to a bracketed Brent search when
// no closed form exists.
//
// Rank distributions (Mann-Whitney, Wilcoxon) are evaluated exactly for
// small samples from a frequency table and by a continuity-corrected
// normal approximation otherwise.

mod empirical;
mod exact;
mod kolmogorov_smirnov;
mod mann_whitney;
mod noncentral_t;
mod normal;
pub mod special;
mod student_t;
mod table;
mod wilcoxon;

pub use empirical::EmpiricalDistribution;
pub use exact::ExactTable;
pub use kolmogorov_smirnov::KolmogorovSmirnovDistribution;
pub use mann_whitney::{MannWhitneyDistribution, EXACT_LIMIT as MANN_WHITNEY_EXACT_LIMIT};
pub use noncentral_t::NoncentralTDistribution;
pub use normal::{standard_cdf, standard_inverse_cdf, NormalDistribution};
pub use student_t::StudentTDistribution;
pub use table::DistributionTable;
pub use wilcoxon::{WilcoxonDistribution, EXACT_LIMIT as WILCOXON_EXACT_LIMIT};

use crate::error::{Result, StatsError};
use crate::search;
use serde::{Deserialize, Serialize};

/// Continuity correction applied when a discrete rank statistic is
/// approximated by a normal distribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ContinuityCorrection {
    /// No correction
    #[default]
    None,
    /// Move half a unit towards the mean (two-tailed tests)
    Midpoint,
    /// Move half a unit into the tail being measured (one-tailed tests)
    KeepInside,
}

/// A univariate distribution over the real line
pub trait ContinuousDistribution {
    /// `P(X <= x)`
    fn cdf(&self, x: f64) -> f64;

    /// `P(X > x)`
    fn ccdf(&self, x: f64) -> f64 {
        1.0 - self.cdf(x)
    }

    /// Smallest `x` with `cdf(x) >= p`
    ///
    /// # Errors
    ///
    /// Returns an error for `p` outside `[0, 1]` or when the search fails
    fn inverse_cdf(&self, p: f64) -> Result<f64> {
        inverse_by_search(|x| self.cdf(x), p)
    }
}

/// Numerically invert a monotone CDF by expanding a bracket around zero
/// and running Brent's method inside it
pub(crate) fn inverse_by_search<F>(cdf: F, p: f64) -> Result<f64>
where
    F: Fn(f64) -> f64,
{
    if !(0.0..=1.0).contains(&p) {
        return Err(StatsError::InvalidArgument(format!(
            "probability must be within [0, 1], got {p}"
        )));
    }
    if p == 0.0 {
        return Ok(f64::NEG_INFINITY);
    }
    if p == 1.0 {
        return Ok(f64::INFINITY);
    }

    let mut lower = -1.0_f64;
    let mut upper = 1.0_f64;
    while cdf(lower) > p {
        lower *= 2.0;
        if !lower.is_finite() {
            return Err(StatsError::InvalidArgument(format!(
                "cannot bracket quantile {p}"
            )));
        }
    }
    while cdf(upper) < p {
        upper *= 2.0;
        if !upper.is_finite() {
            return Err(StatsError::InvalidArgument(format!(
                "cannot bracket quantile {p}"
            )));
        }
    }

    search::find(cdf, p, lower, upper)
}
