use super::{p_value_to_statistic, Tail, DEFAULT_SIZE};
use crate::distributions::{ContinuousDistribution, NoncentralTDistribution, StudentTDistribution};
use crate::error::{Result, StatsError};
use crate::search;
use serde::Serialize;

/// Residual above which a solved quantity is reported as `NaN`
const SOLVE_TOLERANCE: f64 = 1e-5;

/// Power analysis for the two-sample t-test
///
/// Holds the four linked quantities (power, effect size, significance
/// level and sample sizes). `compute_power` derives power from the other
/// three; the other `compute_*` methods solve for one quantity with
/// Brent's method while holding the requested power fixed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TwoSampleTPowerAnalysis {
    pub tail: Tail,
    pub power: f64,
    pub size: f64,
    pub samples1: f64,
    pub samples2: f64,
    /// Standardized effect (Cohen's d)
    pub effect: f64,
}

impl Default for TwoSampleTPowerAnalysis {
    fn default() -> Self {
        Self {
            tail: Tail::TwoTail,
            power: 0.8,
            size: DEFAULT_SIZE,
            samples1: 2.0,
            samples2: 2.0,
            effect: 0.0,
        }
    }
}

impl TwoSampleTPowerAnalysis {
    pub fn new(tail: Tail) -> Self {
        Self {
            tail,
            ..Self::default()
        }
    }

    /// Post-hoc analysis attached to a finished test
    ///
    /// Power is `NaN` when it cannot be evaluated (for example an infinite
    /// effect from constant samples).
    pub(crate) fn for_test(tail: Tail, effect: f64, samples1: f64, samples2: f64, size: f64) -> Self {
        let mut analysis = Self {
            tail,
            power: f64::NAN,
            size,
            samples1,
            samples2,
            effect,
        };
        if let Err(err) = analysis.compute_power() {
            tracing::trace!("power analysis unavailable: {err}");
            analysis.power = f64::NAN;
        }
        analysis
    }

    pub fn power(&self) -> f64 {
        self.power
    }

    pub fn total_samples(&self) -> f64 {
        self.samples1 + self.samples2
    }

    /// Recompute `power` from effect, size and sample sizes
    pub fn compute_power(&mut self) -> Result<()> {
        self.power = power_for(self.tail, self.size, self.samples1, self.samples2, self.effect)?;
        Ok(())
    }

    /// Solve for the effect size that reaches the requested power
    pub fn compute_effect(&mut self) -> Result<()> {
        let target = self.power;
        let (tail, size, n1, n2) = (self.tail, self.size, self.samples1, self.samples2);
        let effect = search::find(
            |e| power_for(tail, size, n1, n2, e).unwrap_or(f64::NAN),
            target,
            1e-5,
            1e5,
        )?;
        self.effect = effect;
        let achieved = power_for(tail, size, n1, n2, effect)?;
        if (target - achieved).abs() > SOLVE_TOLERANCE {
            self.effect = f64::NAN;
        }
        self.power = target;
        Ok(())
    }

    /// Solve for the significance level that reaches the requested power
    pub fn compute_size(&mut self) -> Result<()> {
        let target = self.power;
        let (tail, effect, n1, n2) = (self.tail, self.effect, self.samples1, self.samples2);
        let size = search::find(
            |a| power_for(tail, a, n1, n2, effect).unwrap_or(f64::NAN),
            target,
            0.0,
            1.0,
        )?;
        self.size = size;
        let achieved = power_for(tail, size, n1, n2, effect)?;
        if (target - achieved).abs() > SOLVE_TOLERANCE {
            self.size = f64::NAN;
        }
        self.power = target;
        Ok(())
    }

    /// Solve for sample sizes, keeping `samples2 = proportion * samples1`
    pub fn compute_samples(&mut self, proportion: f64) -> Result<()> {
        if proportion.is_nan() || proportion <= 0.0 {
            return Err(StatsError::InvalidArgument(format!(
                "sample proportion must be positive, got {proportion}"
            )));
        }
        let target = self.power;
        let (tail, size, effect) = (self.tail, self.size, self.effect);
        let n = search::find(
            |n| power_for(tail, size, n, n * proportion, effect).unwrap_or(f64::NAN),
            target,
            2.0,
            1e4,
        )?;
        self.samples1 = n;
        self.samples2 = n * proportion;
        let achieved = power_for(tail, size, n, n * proportion, effect)?;
        if (target - achieved).abs() > SOLVE_TOLERANCE {
            self.samples1 = f64::NAN;
            self.samples2 = f64::NAN;
        }
        self.power = target;
        Ok(())
    }
}

fn power_for(tail: Tail, size: f64, n1: f64, n2: f64, effect: f64) -> Result<f64> {
    let df = n1 + n2 - 2.0;
    let delta = effect / (1.0 / n1 + 1.0 / n2).sqrt();
    let central = StudentTDistribution::new(df)?;
    let shifted = NoncentralTDistribution::new(df, delta)?;

    let power = match tail {
        Tail::TwoTail => {
            let b = p_value_to_statistic(size, &central, Tail::TwoTail)?;
            shifted.cdf(-b) + shifted.ccdf(b)
        }
        Tail::OneUpper => {
            let b = p_value_to_statistic(size, &central, Tail::OneUpper)?;
            shifted.ccdf(b)
        }
        Tail::OneLower => {
            let b = p_value_to_statistic(size, &central, Tail::OneLower)?;
            shifted.cdf(b)
        }
    };
    Ok(power)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_effect_has_power_equal_to_size() {
        let mut analysis = TwoSampleTPowerAnalysis {
            samples1: 20.0,
            samples2: 20.0,
            effect: 0.0,
            ..TwoSampleTPowerAnalysis::default()
        };
        analysis.compute_power().unwrap();
        assert!((analysis.power() - 0.05).abs() < 1e-4);
    }

    #[test]
    fn test_power_grows_with_effect() {
        let mut small = TwoSampleTPowerAnalysis {
            samples1: 20.0,
            samples2: 20.0,
            effect: 0.2,
            ..TwoSampleTPowerAnalysis::default()
        };
        let mut large = TwoSampleTPowerAnalysis {
            effect: 1.0,
            ..small.clone()
        };
        small.compute_power().unwrap();
        large.compute_power().unwrap();
        assert!(large.power() > small.power());
        // d = 1 with 20 per group is roughly 87% power
        assert!((large.power() - 0.869).abs() < 0.01);
    }

    #[test]
    fn test_compute_samples_for_medium_effect() {
        // the textbook answer for d = 0.5, alpha = 0.05, power = 0.8 is ~64 per group
        let mut analysis = TwoSampleTPowerAnalysis {
            effect: 0.5,
            ..TwoSampleTPowerAnalysis::default()
        };
        analysis.compute_samples(1.0).unwrap();
        assert!((analysis.samples1 - 64.0).abs() < 1.0, "{}", analysis.samples1);
        assert_eq!(analysis.power(), 0.8);
    }

    #[test]
    fn test_compute_effect_inverts_power() {
        let mut analysis = TwoSampleTPowerAnalysis {
            samples1: 64.0,
            samples2: 64.0,
            ..TwoSampleTPowerAnalysis::default()
        };
        analysis.compute_effect().unwrap();
        assert!((analysis.effect - 0.5).abs() < 0.02);
    }

    #[test]
    fn test_compute_size() {
        let mut analysis = TwoSampleTPowerAnalysis {
            samples1: 64.0,
            samples2: 64.0,
            effect: 0.5,
            ..TwoSampleTPowerAnalysis::default()
        };
        analysis.compute_size().unwrap();
        assert!((analysis.size - 0.05).abs() < 0.01);
    }

    #[test]
    fn test_invalid_proportion() {
        let mut analysis = TwoSampleTPowerAnalysis::new(Tail::OneUpper);
        assert!(analysis.compute_samples(0.0).is_err());
    }
}
