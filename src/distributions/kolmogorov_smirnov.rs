//! Kolmogorov-Smirnov distribution of the sup-distance statistic
//!
//! The CDF switches between Durbin's matrix method, Pomeranz's recursion
//! and the Pelz-Good asymptotic series depending on `n` and `n·x²`, and
//! the upper tail uses the exact one-sided (Smirnov) sum where it is more
//! accurate than `1 - cdf`. The sample size may be fractional, which is
//! how the two-sample test passes its effective size `n1·n2/(n1+n2)`.

use super::special::{factorial, log_binomial, log_factorial};
use super::ContinuousDistribution;
use crate::error::{Result, StatsError};
use std::f64::consts::PI;

const PI2: f64 = PI * PI;
const PI4: f64 = PI2 * PI2;
const PI6: f64 = PI4 * PI2;
const SQRT_2PI: f64 = 2.506_628_274_631_000_7;
const SQRT_HALF_PI: f64 = 1.253_314_137_315_500_3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KolmogorovSmirnovDistribution {
    samples: f64,
}

impl KolmogorovSmirnovDistribution {
    /// # Errors
    ///
    /// The (effective) number of samples must be positive
    pub fn new(samples: f64) -> Result<Self> {
        if samples.is_nan() || samples <= 0.0 {
            return Err(StatsError::InvalidArgument(format!(
                "the number of samples must be positive, got {samples}"
            )));
        }
        Ok(Self { samples })
    }

    pub fn samples(&self) -> f64 {
        self.samples
    }

    /// Upper tail of the one-sided statistic `D+`
    pub fn one_sided_ccdf(&self, x: f64) -> f64 {
        one_side_upper_tail(self.samples, x)
    }
}

impl ContinuousDistribution for KolmogorovSmirnovDistribution {
    fn cdf(&self, x: f64) -> f64 {
        cumulative(self.samples, x)
    }

    fn ccdf(&self, x: f64) -> f64 {
        complementary(self.samples, x)
    }
}

fn cumulative(n: f64, x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    let nxx = n * x * x;
    let nn = n.ceil() as usize;

    if x >= 1.0 || nxx >= 18.0 {
        return 1.0;
    }
    if x <= 0.5 / n {
        return 0.0;
    }
    if n == 1.0 {
        return 2.0 * x - 1.0;
    }
    if x <= 1.0 / n {
        return if n > 20.0 {
            (log_factorial(n) + n * (2.0 * x - 1.0 / n).ln()).exp()
        } else {
            factorial(n) * (2.0 * x - 1.0 / n).powf(n)
        };
    }
    if x >= 1.0 - 1.0 / n {
        return 1.0 - 2.0 * (1.0 - x).powf(n);
    }

    if n <= 140.0 {
        if nxx < 0.754_693 {
            return durbin(nn, x);
        }
        if nxx < 4.0 {
            return pomeranz(nn, x);
        }
        return 1.0 - complementary(n, x);
    }

    if n <= 100_000.0 && n * nxx * x <= 1.96 {
        durbin(nn, x)
    } else {
        pelz_good(n, x)
    }
}

fn complementary(n: f64, x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    let nxx = n * x * x;

    if x >= 1.0 || nxx >= 370.0 {
        return 0.0;
    }
    if x <= 0.5 / n || nxx <= 0.0274 {
        return 1.0;
    }
    if n == 1.0 {
        return 2.0 - 2.0 * x;
    }
    if x <= 1.0 / n {
        return if n > 20.0 {
            1.0 - (log_factorial(n) + n * (2.0 * x - 1.0 / n).ln()).exp()
        } else {
            1.0 - factorial(n) * (2.0 * x - 1.0 / n).powf(n)
        };
    }
    if x >= 1.0 - 1.0 / n {
        return 2.0 * (1.0 - x).powf(n);
    }

    let threshold = if n <= 140.0 { 4.0 } else { 2.2 };
    if nxx >= threshold {
        (2.0 * one_side_upper_tail(n, x)).min(1.0)
    } else {
        1.0 - cumulative(n, x)
    }
}

/// Pelz-Good asymptotic series for large `n`
fn pelz_good(n: f64, x: f64) -> f64 {
    const EPS: f64 = 1e-10;
    const TERMS: usize = 20;

    let sqrt_n = n.sqrt();
    let z = sqrt_n * x;
    let z2 = z * z;
    let z3 = z2 * z;
    let z4 = z2 * z2;
    let z6 = z4 * z2;
    let z7 = z4 * z3;
    let z8 = z4 * z4;
    let z10 = z8 * z2;
    let w = -PI2 / (2.0 * z2);

    let half = |k: usize| (k as f64 + 0.5) * (k as f64 + 0.5);

    let mut t0 = 0.0;
    for k in 0..=TERMS {
        let kk = k as f64 + 0.5;
        let term = (kk * kk * w).exp();
        t0 += term;
        if term <= EPS * t0 {
            break;
        }
    }

    let mut t1 = 0.0;
    for k in 0..=TERMS {
        let kk = half(k);
        let term = (PI2 * kk - z2) * (kk * w).exp();
        t1 += term;
        if term.abs() <= EPS * t1.abs() {
            break;
        }
    }

    let mut t2a = 0.0;
    for k in 0..=TERMS {
        let kk = half(k);
        let term = (6.0 * z6 + 2.0 * z4 + PI2 * (2.0 * z4 - 5.0 * z2) * kk
            + PI4 * (1.0 - 2.0 * z2) * kk * kk)
            * (kk * w).exp();
        t2a += term;
        if term.abs() <= EPS * t2a.abs() {
            break;
        }
    }

    let mut t2b = 0.0;
    for k in 1..=TERMS {
        let kk = (k * k) as f64;
        let term = PI2 * kk * (kk * w).exp();
        t2b += term;
        if term <= EPS * t2b {
            break;
        }
    }

    let mut t3a = 0.0;
    for k in 0..=TERMS {
        let kk = half(k);
        let term = (-30.0 * z6 - 90.0 * z8
            + PI2 * (135.0 * z4 - 96.0 * z6) * kk
            + PI4 * (212.0 * z4 - 60.0 * z2) * kk * kk
            + PI6 * kk * kk * kk * (5.0 - 30.0 * z2))
            * (kk * w).exp();
        t3a += term;
        if term.abs() <= EPS * t3a.abs() {
            break;
        }
    }

    let mut t3b = 0.0;
    for k in 1..=TERMS {
        let kk = (k * k) as f64;
        let term = (3.0 * PI2 * kk * z2 - PI4 * kk * kk) * (kk * w).exp();
        t3b += term;
        if term.abs() <= EPS * t3b.abs() {
            break;
        }
    }

    t0 * (SQRT_2PI / z)
        + t1 * (SQRT_HALF_PI / (sqrt_n * 3.0 * z4))
        + t2a * (SQRT_HALF_PI / (n * 36.0 * z7))
        - t2b * (SQRT_HALF_PI / (n * 18.0 * z3))
        + t3a * (SQRT_HALF_PI / (n * sqrt_n * 3240.0 * z10))
        + t3b * (SQRT_HALF_PI / (n * sqrt_n * 108.0 * z6))
}

/// Exact upper tail of the one-sided statistic (Smirnov's formula)
fn one_side_upper_tail(n: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 1.0;
    }
    if x >= 1.0 {
        return 0.0;
    }

    if n > 200_000.0 {
        let t = 6.0 * n * x + 1.0;
        let v = t * t / (18.0 * n);
        let w = (1.0 - (2.0 * v * v - 4.0 * v - 1.0) / (18.0 * n)) * (-v).exp();
        return w.clamp(0.0, 1.0);
    }

    const EPS: f64 = 1e-12;
    let mut jmax = (n * (1.0 - x)) as i64;
    if 1.0 - x - jmax as f64 / n <= 0.0 {
        jmax -= 1;
    }
    let jdiv = if n > 3000.0 { 2 } else { 3 };
    let mut j = jmax / jdiv + 1;

    let mut log_comb = log_binomial(n, j as f64);
    let log_comb0 = log_comb;
    let mut sum = 0.0;

    while j <= jmax {
        let jf = j as f64;
        let q = jf / n + x;
        let term = (log_comb + (jf - 1.0) * q.ln() + (n - jf) * (-q).ln_1p()).exp();
        sum += term;
        log_comb += ((n - jf) / (jf + 1.0)).ln();
        if term <= sum * EPS {
            break;
        }
        j += 1;
    }

    j = jmax / jdiv;
    let jf = j as f64;
    log_comb = log_comb0 + ((jf + 1.0) / (n - jf)).ln();
    while j > 0 {
        let jf = j as f64;
        let q = jf / n + x;
        let term = (log_comb + (jf - 1.0) * q.ln() + (n - jf) * (-q).ln_1p()).exp();
        sum += term;
        log_comb += (jf / (n - jf + 1.0)).ln();
        if term <= sum * EPS {
            break;
        }
        j -= 1;
    }

    sum * x + (n * (-x).ln_1p()).exp()
}

/// Durbin's matrix formula, exact for integer `n`
fn durbin(n: usize, d: f64) -> f64 {
    let k = (n as f64 * d) as usize + 1;
    let m = 2 * k - 1;
    let h = k as f64 - n as f64 * d;

    let mut a = vec![0.0; m * m];
    for i in 0..m {
        for j in 0..m {
            if i + 1 >= j {
                a[i * m + j] = 1.0;
            }
        }
    }
    for i in 0..m {
        a[i * m] -= h.powi(i as i32 + 1);
        a[(m - 1) * m + i] -= h.powi((m - i) as i32);
    }
    a[(m - 1) * m] += if 2.0 * h - 1.0 > 0.0 {
        (2.0 * h - 1.0).powi(m as i32)
    } else {
        0.0
    };
    for i in 0..m {
        for j in 0..m {
            if i + 1 > j {
                for g in 1..=(i + 1 - j) {
                    a[i * m + j] /= g as f64;
                }
            }
        }
    }

    let (v, mut ev) = matrix_power(&a, 0, m, n);
    let mut s = v[(k - 1) * m + (k - 1)];
    for i in 1..=n {
        s = s * i as f64 / n as f64;
        if s < 1e-140 {
            s *= 1e140;
            ev -= 140;
        }
    }
    s * 10f64.powi(ev)
}

fn matrix_multiply(x: &[f64], y: &[f64], m: usize) -> Vec<f64> {
    let mut out = vec![0.0; m * m];
    for i in 0..m {
        for j in 0..m {
            let mut s = 0.0;
            for k in 0..m {
                s += x[i * m + k] * y[k * m + j];
            }
            out[i * m + j] = s;
        }
    }
    out
}

/// `A^n` with a decimal exponent carried alongside to avoid overflow
fn matrix_power(a: &[f64], ea: i32, m: usize, n: usize) -> (Vec<f64>, i32) {
    if n == 1 {
        return (a.to_vec(), ea);
    }

    let (v, ev) = matrix_power(a, ea, m, n / 2);
    let mut b = matrix_multiply(&v, &v, m);
    let mut eb = 2 * ev;
    let mid = (m / 2) * m + m / 2;
    if b[mid] > 1e140 {
        b.iter_mut().for_each(|x| *x *= 1e-140);
        eb += 140;
    }

    let (mut v, mut ev) = if n % 2 == 0 {
        (b, eb)
    } else {
        (matrix_multiply(a, &b, m), ea + eb)
    };
    if v[mid] > 1e140 {
        v.iter_mut().for_each(|x| *x *= 1e-140);
        ev += 140;
    }
    (v, ev)
}

/// Pomeranz's recursion, stable for moderate `n·x²`
fn pomeranz(n: usize, x: f64) -> f64 {
    const EPS: f64 = 1e-15;
    const ENO: i32 = 350;
    let renorm = 2f64.powi(ENO);

    let t = n as f64 * x;
    let len = 2 * n + 3;
    let mut a = vec![0.0; len];
    let mut floors = vec![0.0; len];
    let mut ceilings = vec![0.0; len];
    let mut v = [vec![0.0; n + 2], vec![0.0; n + 2]];
    let mut h = [
        vec![0.0; n + 2],
        vec![0.0; n + 2],
        vec![0.0; n + 2],
        vec![0.0; n + 2],
    ];

    let z = compute_limits(t, &mut floors, &mut ceilings);
    compute_a(n, &mut a, z);
    compute_h(n, &a, &mut h);

    v[1][1] = renorm;
    let mut coreno = 1;
    let mut r1 = 0;
    let mut r2 = 1;

    for i in 2..=(2 * n + 2) {
        let jlow = ((2.0 + floors[i]) as i64).max(1) as usize;
        let jup = (ceilings[i] as i64).min(n as i64 + 1).max(0) as usize;
        let klow = ((2.0 + floors[i - 1]) as i64).max(1) as usize;
        let kup0 = ceilings[i - 1] as i64;

        let w = (a[i] - a[i - 1]) / n as f64;
        let s = (0..4).find(|&s| (w - h[s][1]).abs() <= EPS).unwrap_or(3);

        let mut min_sum = renorm;
        r1 = (r1 + 1) & 1;
        r2 = (r2 + 1) & 1;

        for j in jlow..=jup {
            let kup = (kup0.min(j as i64)).max(0) as usize;
            let mut sum = 0.0;
            let mut k = kup;
            while k >= klow {
                sum += v[r1][k] * h[s][j - k];
                if k == 0 {
                    break;
                }
                k -= 1;
            }
            v[r2][j] = sum;
            if sum < min_sum {
                min_sum = sum;
            }
        }

        if min_sum < 1e-280 {
            for j in jlow..=jup {
                v[r2][j] *= renorm;
            }
            coreno += 1;
        }
    }

    let sum = v[r2][n + 1];
    let log = log_factorial(n as f64) - (coreno * ENO) as f64 * std::f64::consts::LN_2 + sum.ln();
    if log >= 0.0 {
        1.0
    } else {
        log.exp()
    }
}

fn compute_limits(t: f64, floors: &mut [f64], ceilings: &mut [f64]) -> f64 {
    let floor = t.floor();
    let ceiling = t.ceil();
    let mut z = t - floor;
    let w = ceiling - t;
    let len = floors.len();

    let half = |i: usize| (i / 2) as f64;

    if z > 0.5 {
        for i in (1..len).step_by(2) {
            floors[i] = half(i) - 1.0 - floor;
        }
        for i in (2..len).step_by(2) {
            floors[i] = half(i) - 2.0 - floor;
        }
        for i in (1..len).step_by(2) {
            ceilings[i] = half(i) + 1.0 + floor;
        }
        for i in (2..len).step_by(2) {
            ceilings[i] = half(i) + floor;
        }
    } else if z > 0.0 {
        ceilings[1] = 1.0 + floor;
        for (i, f) in floors.iter_mut().enumerate().skip(1) {
            *f = half(i) - 1.0 - floor;
        }
        for (i, c) in ceilings.iter_mut().enumerate().skip(2) {
            *c = half(i) + floor;
        }
    } else {
        for i in (1..len).step_by(2) {
            floors[i] = half(i) - floor;
        }
        for i in (2..len).step_by(2) {
            floors[i] = half(i) - 1.0 - floor;
        }
        for i in (1..len).step_by(2) {
            ceilings[i] = half(i) + floor;
        }
        for i in (2..len).step_by(2) {
            ceilings[i] = half(i) - 1.0 + floor;
        }
    }

    if w < z {
        z = w;
    }
    z
}

fn compute_a(n: usize, a: &mut [f64], z: f64) {
    let len = a.len();
    a[0] = 0.0;
    a[1] = 0.0;
    a[2] = z;
    a[3] = 1.0 - z;
    for i in 4..len - 1 {
        a[i] = a[i - 2] + 1.0;
    }
    a[len - 1] = n as f64;
}

fn compute_h(n: usize, a: &[f64], h: &mut [Vec<f64>; 4]) {
    let nf = n as f64;
    let steps = [2.0 * a[2] / nf, (1.0 - 2.0 * a[2]) / nf, a[2] / nf];
    for (row, &w) in h.iter_mut().zip(steps.iter()) {
        row[0] = 1.0;
        for j in 1..=n + 1 {
            row[j] = w * row[j - 1] / j as f64;
        }
    }
    h[3][0] = 1.0;
    for j in 1..=n + 1 {
        h[3][j] = 0.0;
    }
}
