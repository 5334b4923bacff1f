//! Bracketed root finding (Brent's method)
//!
//! Used by power analysis and by inverse-CDF queries that have no closed
//! form. The search combines bisection, secant and inverse quadratic
//! interpolation and never leaves the current bracket.

use crate::error::{Result, StatsError};

/// Default absolute tolerance on the root location
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

/// Default iteration cap
pub const DEFAULT_MAX_ITERATIONS: usize = 500;

/// Find `x` in `[lower, upper]` with `f(x) == 0`
///
/// # Errors
///
/// - [`StatsError::NonFiniteBound`] if either bound is infinite or NaN
/// - [`StatsError::NegativeTolerance`] if `tol < 0`
/// - [`StatsError::RootNotBracketed`] if `f(lower)` and `f(upper)` share a sign
/// - [`StatsError::FunctionNotFinite`] if any evaluation is NaN or infinite
/// - [`StatsError::MaxIterationsReached`] if the bracket does not shrink in time
///
/// # Example
/// ```
/// use benchdiff::search::find_root;
///
/// let root = find_root(|x| x - 5.0, 0.0, 10.0, 1e-6, 500).unwrap();
/// assert!((root - 5.0).abs() < 1e-6);
/// ```
pub fn find_root<F>(f: F, lower: f64, upper: f64, tol: f64, max_iter: usize) -> Result<f64>
where
    F: Fn(f64) -> f64,
{
    if !lower.is_finite() || !upper.is_finite() {
        return Err(StatsError::NonFiniteBound { lower, upper });
    }
    if tol < 0.0 {
        return Err(StatsError::NegativeTolerance(tol));
    }

    let eval = |x: f64| -> Result<f64> {
        let value = f(x);
        if value.is_finite() {
            Ok(value)
        } else {
            Err(StatsError::FunctionNotFinite { x, value })
        }
    };

    // a: previous iterate, b: best estimate, c: contrapoint
    let mut a = lower;
    let mut b = upper;
    let mut fa = eval(a)?;
    let mut fb = eval(b)?;

    if sign(fa) == sign(fb) {
        return Err(StatsError::RootNotBracketed {
            lower,
            upper,
            f_lower: fa,
            f_upper: fb,
        });
    }

    let mut c = a;
    let mut fc = fa;

    for _ in 0..max_iter {
        let prev_step = b - a;

        if fc.abs() < fb.abs() {
            a = b;
            fa = fb;
            b = c;
            fb = fc;
            c = a;
            fc = fa;
        }

        let tol_act = f64::EPSILON * b.abs() + tol / 2.0;
        let mut step = (c - b) / 2.0;

        if step.abs() <= tol_act || fb == 0.0 {
            return Ok(b);
        }

        if prev_step.abs() >= tol_act && fa.abs() > fb.abs() {
            let cb = c - b;
            let (mut p, mut q);
            if a == c {
                // secant
                let t1 = fb / fa;
                p = cb * t1;
                q = 1.0 - t1;
            } else {
                // inverse quadratic interpolation
                let qa = fa / fc;
                let qb = fb / fc;
                let t2 = fb / fa;
                p = t2 * (cb * qa * (qa - qb) - (b - a) * (qb - 1.0));
                q = (qa - 1.0) * (qb - 1.0) * (t2 - 1.0);
            }

            if p > 0.0 {
                q = -q;
            } else {
                p = -p;
            }

            if p < 0.75 * cb * q - (tol_act * q).abs() / 2.0 && p < (prev_step * q / 2.0).abs() {
                step = p / q;
            }
        }

        if step.abs() < tol_act {
            step = if step > 0.0 { tol_act } else { -tol_act };
        }

        a = b;
        fa = fb;
        b += step;
        fb = eval(b)?;

        if (fb > 0.0 && fc > 0.0) || (fb < 0.0 && fc < 0.0) {
            c = a;
            fc = fa;
        }
    }

    Err(StatsError::MaxIterationsReached(max_iter))
}

/// Find `x` in `[lower, upper]` with `f(x) == target`
pub fn find<F>(f: F, target: f64, lower: f64, upper: f64) -> Result<f64>
where
    F: Fn(f64) -> f64,
{
    find_root(
        |x| f(x) - target,
        lower,
        upper,
        DEFAULT_TOLERANCE,
        DEFAULT_MAX_ITERATIONS,
    )
}

fn sign(x: f64) -> i8 {
    if x > 0.0 {
        1
    } else if x < 0.0 {
        -1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_root() {
        let root = find_root(|x| x - 5.0, 0.0, 10.0, 1e-6, 500).unwrap();
        assert!((root - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_root_at_bound() {
        let root = find_root(|x| x, 0.0, 1.0, 1e-6, 500).unwrap();
        assert!(root.abs() < 1e-6);
    }

    #[test]
    fn test_cubic_root() {
        let root = find_root(|x| x * x * x - 2.0 * x - 5.0, 2.0, 3.0, 1e-10, 500).unwrap();
        assert!((root - 2.094_551_481_542_327).abs() < 1e-8);
    }

    #[test]
    fn test_not_bracketed() {
        let err = find_root(|x| x * x + 1.0, 0.0, 10.0, 1e-6, 500).unwrap_err();
        assert!(matches!(err, StatsError::RootNotBracketed { .. }));
    }

    #[test]
    fn test_infinite_bound_rejected() {
        let err = find_root(|x| x, f64::NEG_INFINITY, 1.0, 1e-6, 500).unwrap_err();
        assert!(matches!(err, StatsError::NonFiniteBound { .. }));
    }

    #[test]
    fn test_negative_tolerance_rejected() {
        let err = find_root(|x| x, -1.0, 1.0, -1e-3, 500).unwrap_err();
        assert_eq!(err, StatsError::NegativeTolerance(-1e-3));
    }

    #[test]
    fn test_non_finite_evaluation() {
        let err = find_root(|x| if x > 0.5 { f64::NAN } else { x - 1.0 }, 0.0, 1.0, 1e-6, 500)
            .unwrap_err();
        assert!(matches!(err, StatsError::FunctionNotFinite { .. }));
    }

    #[test]
    fn test_max_iterations() {
        let err = find_root(|x| x.powi(3) - 0.3, 0.0, 1.0, 0.0, 2).unwrap_err();
        assert_eq!(err, StatsError::MaxIterationsReached(2));
    }

    #[test]
    fn test_find_target_value() {
        let x = find(|x| x * x, 4.0, 0.0, 10.0).unwrap();
        assert!((x - 2.0).abs() < 1e-6);
    }
}
