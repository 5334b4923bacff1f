//! Exact null distributions of rank-sum statistics
//!
//! Mid-ranks are multiples of one half, so doubling them gives integers
//! and the distribution of a sum of ranks can be counted with a subset-sum
//! table instead of enumerating every combination.

use serde::Serialize;

/// Discrete distribution stored as `(value, probability)` pairs in
/// ascending order of value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExactTable {
    support: Vec<(f64, f64)>,
}

impl ExactTable {
    /// Distribution of the Mann-Whitney U of a random `k`-subset of `ranks`
    ///
    /// `U = sum(subset) - k(k + 1)/2`
    pub fn mann_whitney(ranks: &[f64], k: usize) -> Self {
        let doubled = doubled_ranks(ranks);
        let max_sum: usize = doubled.iter().sum();

        // counts[j][s]: number of j-subsets whose doubled sum is s
        let mut counts = vec![vec![0.0_f64; max_sum + 1]; k + 1];
        counts[0][0] = 1.0;
        for &r in &doubled {
            for j in (1..=k).rev() {
                for s in (r..=max_sum).rev() {
                    let prev = counts[j - 1][s - r];
                    if prev != 0.0 {
                        counts[j][s] += prev;
                    }
                }
            }
        }

        let offset = (k * (k + 1)) as f64 / 2.0;
        Self::from_counts(&counts[k], |s| s as f64 / 2.0 - offset)
    }

    /// Distribution of the Wilcoxon `W+` for the given (non-zero) ranks
    /// when every sign is equally likely
    pub fn wilcoxon(ranks: &[f64]) -> Self {
        let doubled = doubled_ranks(ranks);
        let max_sum: usize = doubled.iter().sum();

        let mut counts = vec![0.0_f64; max_sum + 1];
        counts[0] = 1.0;
        for &r in &doubled {
            for s in (r..=max_sum).rev() {
                counts[s] += counts[s - r];
            }
        }

        Self::from_counts(&counts, |s| s as f64 / 2.0)
    }

    fn from_counts<F>(counts: &[f64], value_of: F) -> Self
    where
        F: Fn(usize) -> f64,
    {
        let total: f64 = counts.iter().sum();
        let support = counts
            .iter()
            .enumerate()
            .filter(|(_, &c)| c > 0.0)
            .map(|(s, &c)| (value_of(s), c / total))
            .collect();
        Self { support }
    }

    /// `P(X <= x)`
    pub fn cdf(&self, x: f64) -> f64 {
        let p: f64 = self
            .support
            .iter()
            .take_while(|(v, _)| *v <= x + 1e-9)
            .map(|(_, p)| p)
            .sum();
        p.min(1.0)
    }

    /// `P(X >= x)`
    pub fn ccdf(&self, x: f64) -> f64 {
        let p: f64 = self
            .support
            .iter()
            .rev()
            .take_while(|(v, _)| *v >= x - 1e-9)
            .map(|(_, p)| p)
            .sum();
        p.min(1.0)
    }

    pub fn support(&self) -> &[(f64, f64)] {
        &self.support
    }
}

fn doubled_ranks(ranks: &[f64]) -> Vec<usize> {
    ranks.iter().map(|r| (r * 2.0).round().max(0.0) as usize).collect()
}
