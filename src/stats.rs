//! Descriptive statistics shared by the detectors and hypothesis tests
//!
//! All functions are pure and operate on `f64` slices. Quantities that are
//! undefined for the given input (mean of nothing, variance of a single
//! value) come back as `NaN` so callers can surface a diagnostic instead
//! of silently using zero.

/// Arithmetic mean, `NaN` for an empty slice
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return f64::NAN;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

/// Unbiased sample variance (n - 1 denominator), `NaN` below two values
pub fn variance(data: &[f64]) -> f64 {
    if data.len() < 2 {
        return f64::NAN;
    }
    let m = mean(data);
    let sum_sq: f64 = data.iter().map(|x| (x - m).powi(2)).sum();
    sum_sq / (data.len() - 1) as f64
}

/// Sample standard deviation
pub fn std_dev(data: &[f64]) -> f64 {
    variance(data).sqrt()
}

/// Returns a sorted copy of `data` (total order, NaN last)
pub fn sorted(data: &[f64]) -> Vec<f64> {
    let mut out = data.to_vec();
    out.sort_by(f64::total_cmp);
    out
}

/// Median of an unsorted slice, `NaN` when empty
pub fn median(data: &[f64]) -> f64 {
    if data.is_empty() {
        return f64::NAN;
    }
    percentile(&sorted(data), 50.0)
}

/// Percentile of already-sorted data using linear interpolation
///
/// `percentile` is in `[0, 100]`. The rank is `p/100 * (n - 1)`, which
/// gives the same quartiles as the common "type 7" definition.
pub fn percentile(sorted_data: &[f64], percentile: f64) -> f64 {
    if sorted_data.is_empty() {
        return f64::NAN;
    }
    if sorted_data.len() == 1 {
        return sorted_data[0];
    }

    let index = (percentile / 100.0).clamp(0.0, 1.0) * (sorted_data.len() - 1) as f64;
    let lower = index.floor() as usize;
    let upper = index.ceil() as usize;

    if lower == upper {
        sorted_data[lower]
    } else {
        let weight = index - lower as f64;
        sorted_data[lower] * (1.0 - weight) + sorted_data[upper] * weight
    }
}

/// First and third quartiles of unsorted data
pub fn quartiles(data: &[f64]) -> (f64, f64) {
    let s = sorted(data);
    (percentile(&s, 25.0), percentile(&s, 75.0))
}

/// Mid-ranks of `values` (1-based) together with the size of every tie group
///
/// Tied values all receive the average of the ranks they span. The tie
/// group sizes include singleton groups; a group of size `t` contributes
/// `t^3 - t` to the usual tie correction, which is zero for singletons.
pub fn rank_with_ties(values: &[f64]) -> (Vec<f64>, Vec<usize>) {
    let n = values.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; n];
    let mut ties = Vec::new();
    let mut i = 0;
    while i < n {
        let mut j = i + 1;
        while j < n && values[order[j]] == values[order[i]] {
            j += 1;
        }
        // positions i..j share the same value; ranks are i+1..=j
        let mid_rank = (i + 1 + j) as f64 / 2.0;
        for &idx in &order[i..j] {
            ranks[idx] = mid_rank;
        }
        ties.push(j - i);
        i = j;
    }
    (ranks, ties)
}

/// Sum of `t^3 - t` over all tie groups
pub fn tie_correction_sum(ties: &[usize]) -> f64 {
    ties.iter()
        .map(|&t| {
            let t = t as f64;
            t * t * t - t
        })
        .sum()
}

/// Round half away from zero to `digits` decimal places
pub fn round_to(value: f64, digits: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let factor = 10f64.powi(digits as i32);
    let scaled = value * factor;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / factor
}
