use super::{ContinuousDistribution, StudentTDistribution};
use crate::error::{Result, StatsError};

/// Two-sided Student-t critical values
///
/// # Example
/// ```
/// use benchdiff::distributions::DistributionTable;
///
/// let t = DistributionTable::critical_value(0.95, 10.0).unwrap();
/// assert!((t - 2.228).abs() < 1e-3);
/// ```
pub struct DistributionTable;

impl DistributionTable {
    /// Value `t` such that `P(|T| <= t) = confidence_level` for `df`
    /// degrees of freedom
    ///
    /// # Errors
    ///
    /// `confidence_level` must lie strictly inside `(0, 1)` and `df` must be
    /// positive
    pub fn critical_value(confidence_level: f64, degrees_of_freedom: f64) -> Result<f64> {
        if confidence_level.is_nan() || confidence_level <= 0.0 || confidence_level >= 1.0 {
            return Err(StatsError::InvalidArgument(format!(
                "confidence level must be in (0, 1), got {confidence_level}"
            )));
        }
        let dist = StudentTDistribution::new(degrees_of_freedom)?;
        dist.inverse_cdf(1.0 - (1.0 - confidence_level) / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_critical_values() {
        let t10 = DistributionTable::critical_value(0.95, 10.0).unwrap();
        assert!((t10 - 2.228).abs() < 1e-3);
        let t1 = DistributionTable::critical_value(0.95, 1.0).unwrap();
        assert!((t1 - 12.706).abs() < 1e-3);
        let t30 = DistributionTable::critical_value(0.99, 30.0).unwrap();
        assert!((t30 - 2.750).abs() < 1e-3);
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(DistributionTable::critical_value(1.0, 10.0).is_err());
        assert!(DistributionTable::critical_value(0.95, 0.0).is_err());
    }
}
