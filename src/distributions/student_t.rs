use super::normal::standard_cdf;
use super::special::incomplete_beta;
use super::{inverse_by_search, ContinuousDistribution};
use crate::error::{Result, StatsError};

/// Student's t distribution with (possibly fractional) degrees of freedom
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StudentTDistribution {
    degrees_of_freedom: f64,
}

impl StudentTDistribution {
    /// # Errors
    ///
    /// Degrees of freedom must be positive (infinity is allowed and yields
    /// the standard normal)
    pub fn new(degrees_of_freedom: f64) -> Result<Self> {
        if degrees_of_freedom.is_nan() || degrees_of_freedom <= 0.0 {
            return Err(StatsError::InvalidArgument(format!(
                "degrees of freedom must be positive, got {degrees_of_freedom}"
            )));
        }
        Ok(Self { degrees_of_freedom })
    }

    pub fn degrees_of_freedom(&self) -> f64 {
        self.degrees_of_freedom
    }

    /// One-tail mass `P(T > |t|)`
    fn tail(&self, t: f64) -> f64 {
        let df = self.degrees_of_freedom;
        if df.is_infinite() {
            return standard_cdf(-t.abs());
        }
        let x = df / (df + t * t);
        0.5 * incomplete_beta(df / 2.0, 0.5, x)
    }
}

impl ContinuousDistribution for StudentTDistribution {
    fn cdf(&self, t: f64) -> f64 {
        if t.is_nan() {
            return f64::NAN;
        }
        if t == f64::INFINITY {
            return 1.0;
        }
        if t == f64::NEG_INFINITY {
            return 0.0;
        }
        let tail = self.tail(t);
        if t > 0.0 {
            1.0 - tail
        } else {
            tail
        }
    }

    fn ccdf(&self, t: f64) -> f64 {
        self.cdf(-t)
    }

    fn inverse_cdf(&self, p: f64) -> Result<f64> {
        if p == 0.5 {
            return Ok(0.0);
        }
        inverse_by_search(|x| self.cdf(x), p)
    }
}
