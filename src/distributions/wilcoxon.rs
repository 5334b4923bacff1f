use super::exact::ExactTable;
use super::normal::NormalDistribution;
use super::{ContinuityCorrection, ContinuousDistribution};
use crate::error::{Result, StatsError};

/// Largest number of signed ranks evaluated with the exact table
pub const EXACT_LIMIT: usize = 12;

/// Null distribution of the Wilcoxon signed-rank statistic `W+`
#[derive(Debug, Clone)]
pub struct WilcoxonDistribution {
    n: usize,
    correction: ContinuityCorrection,
    exact: Option<ExactTable>,
    approximation: NormalDistribution,
}

impl WilcoxonDistribution {
    /// Normal approximation for `n` non-zero differences
    pub fn new(n: usize) -> Result<Self> {
        if n == 0 {
            return Err(StatsError::InsufficientData(
                "signed-rank distribution needs at least one non-zero difference".to_string(),
            ));
        }
        let nf = n as f64;
        let mean = nf * (nf + 1.0) / 4.0;
        let std_dev = (nf * (nf + 1.0) * (2.0 * nf + 1.0) / 24.0).sqrt();
        Ok(Self {
            n,
            correction: ContinuityCorrection::None,
            exact: None,
            approximation: NormalDistribution::new(mean, std_dev)?,
        })
    }

    /// Distribution conditioned on the observed ranks of `|difference|`
    ///
    /// Zero ranks are ignored by the exact table. By default the exact
    /// table is used for at most [`EXACT_LIMIT`] ranks.
    pub fn with_ranks(ranks: &[f64], exact: Option<bool>) -> Result<Self> {
        let mut dist = Self::new(ranks.len())?;
        if exact.unwrap_or(ranks.len() <= EXACT_LIMIT) {
            let non_zero: Vec<f64> = ranks.iter().copied().filter(|&r| r != 0.0).collect();
            dist.exact = Some(ExactTable::wilcoxon(&non_zero));
        }
        Ok(dist)
    }

    pub fn with_correction(mut self, correction: ContinuityCorrection) -> Self {
        self.correction = correction;
        self
    }

    pub fn is_exact(&self) -> bool {
        self.exact.is_some()
    }

    pub fn sample_size(&self) -> usize {
        self.n
    }

    pub fn mean(&self) -> f64 {
        self.approximation.mean()
    }

    pub fn std_dev(&self) -> f64 {
        self.approximation.std_dev()
    }
}

impl ContinuousDistribution for WilcoxonDistribution {
    fn cdf(&self, x: f64) -> f64 {
        if let Some(table) = &self.exact {
            return table.cdf(x);
        }
        let x = match self.correction {
            ContinuityCorrection::Midpoint if x > self.mean() => x - 0.5,
            ContinuityCorrection::Midpoint => x + 0.5,
            ContinuityCorrection::KeepInside => x + 0.5,
            ContinuityCorrection::None => x,
        };
        self.approximation.cdf(x)
    }

    fn ccdf(&self, x: f64) -> f64 {
        if let Some(table) = &self.exact {
            return table.ccdf(x);
        }
        let x = match self.correction {
            ContinuityCorrection::Midpoint if x > self.mean() => x - 0.5,
            ContinuityCorrection::Midpoint => x + 0.5,
            ContinuityCorrection::KeepInside => x - 0.5,
            ContinuityCorrection::None => x,
        };
        self.approximation.ccdf(x)
    }

    fn inverse_cdf(&self, p: f64) -> Result<f64> {
        if self.exact.is_none() {
            return self.approximation.inverse_cdf(p);
        }
        super::inverse_by_search(|x| self.cdf(x), p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moments() {
        let d = WilcoxonDistribution::new(10).unwrap();
        assert_eq!(d.mean(), 27.5);
        assert!((d.std_dev() - (10.0 * 11.0 * 21.0 / 24.0f64).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_exact_lower_tail() {
        let ranks: Vec<f64> = (1..=10).map(f64::from).collect();
        let d = WilcoxonDistribution::with_ranks(&ranks, None).unwrap();
        assert!(d.is_exact());
        // only the all-negative pattern gives W+ = 0
        assert!((d.cdf(0.0) - 1.0 / 1024.0).abs() < 1e-15);
        assert!((d.ccdf(55.0) - 1.0 / 1024.0).abs() < 1e-15);
    }

    #[test]
    fn test_large_sample_uses_approximation() {
        let ranks: Vec<f64> = (1..=20).map(f64::from).collect();
        let d = WilcoxonDistribution::with_ranks(&ranks, None).unwrap();
        assert!(!d.is_exact());
        assert!((d.cdf(d.mean()) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_zero_size_rejected() {
        assert!(WilcoxonDistribution::new(0).is_err());
    }
}
