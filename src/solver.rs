//! Bounded root finding shared by the mortality calibrator and the
//! equilibrium solvers
//!
//! Callers supply an evaluator closure; the search only needs the function to
//! change sign once over the bracket.

/// Stopping rules for a continuous bisection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BisectionConfig {
    /// Stop when `|f(x)|` falls to or below this value
    pub value_tolerance: f64,
    /// Stop when the bracket half-width falls below this value
    pub x_tolerance: f64,
    pub max_iterations: u32,
}

impl Default for BisectionConfig {
    fn default() -> Self {
        Self {
            value_tolerance: 1e-10,
            x_tolerance: 1e-10,
            max_iterations: 200,
        }
    }
}

/// Best estimate of a root inside the bracket
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootEstimate {
    pub x: f64,
    /// `f(x)` at the returned point
    pub residual: f64,
    pub iterations: u32,
    /// False when the iteration budget ran out first
    pub converged: bool,
}

/// Outcome of a bracketed search
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bisection {
    Root(RootEstimate),
    /// `f` has the same sign at both ends of the bracket
    NoSignChange { f_lo: f64, f_hi: f64 },
}

/// Bisection for a root of `f` on `[lo, hi]`
pub fn bisect<F>(mut f: F, lo: f64, hi: f64, config: BisectionConfig) -> Bisection
where
    F: FnMut(f64) -> f64,
{
    let (mut lo, mut hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
    let mut f_lo = f(lo);
    let f_hi = f(hi);

    if f_lo.abs() <= config.value_tolerance {
        return Bisection::Root(RootEstimate { x: lo, residual: f_lo, iterations: 0, converged: true });
    }
    if f_hi.abs() <= config.value_tolerance {
        return Bisection::Root(RootEstimate { x: hi, residual: f_hi, iterations: 0, converged: true });
    }
    if f_lo.signum() == f_hi.signum() {
        return Bisection::NoSignChange { f_lo, f_hi };
    }

    let mut mid = 0.5 * (lo + hi);
    let mut f_mid = f(mid);
    for iteration in 1..=config.max_iterations {
        if f_mid.abs() <= config.value_tolerance || 0.5 * (hi - lo) < config.x_tolerance {
            return Bisection::Root(RootEstimate { x: mid, residual: f_mid, iterations: iteration, converged: true });
        }

        if f_mid.signum() == f_lo.signum() {
            lo = mid;
            f_lo = f_mid;
        } else {
            hi = mid;
        }
        mid = 0.5 * (lo + hi);
        f_mid = f(mid);
    }

    Bisection::Root(RootEstimate {
        x: mid,
        residual: f_mid,
        iterations: config.max_iterations,
        converged: f_mid.abs() <= config.value_tolerance,
    })
}

/// Smallest integer in `[lo, hi]` for which `pred` holds
///
/// Assumes `pred` switches from false to true at most once over the range.
/// Returns `lo` if it already holds there and `None` if it fails at `hi`.
/// When the predicate is not monotone the answer is a switching point, not
/// necessarily the smallest one.
pub fn first_satisfying<P>(lo: u32, hi: u32, mut pred: P) -> Option<u32>
where
    P: FnMut(u32) -> bool,
{
    if lo > hi {
        return None;
    }
    if pred(lo) {
        return Some(lo);
    }
    if !pred(hi) {
        return None;
    }

    // Invariant: pred(fail) is false, pred(pass) is true
    let mut fail = lo;
    let mut pass = hi;
    while pass - fail > 1 {
        let mid = fail + (pass - fail) / 2;
        if pred(mid) {
            pass = mid;
        } else {
            fail = mid;
        }
    }
    Some(pass)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bisect_square_root() {
        let outcome = bisect(|x| x * x - 2.0, 0.0, 2.0, BisectionConfig::default());
        match outcome {
            Bisection::Root(root) => {
                assert!(root.converged);
                assert!((root.x - 2.0_f64.sqrt()).abs() < 1e-9);
            }
            other => panic!("expected root, got {:?}", other),
        }
    }

    #[test]
    fn test_bisect_decreasing_function() {
        let outcome = bisect(|x| 10.0 - 4.0 * x, 0.0, 5.0, BisectionConfig::default());
        let Bisection::Root(root) = outcome else { panic!("expected root") };
        assert!((root.x - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_bisect_without_sign_change() {
        let outcome = bisect(|x| x + 1.0, 0.0, 1.0, BisectionConfig::default());
        assert_eq!(outcome, Bisection::NoSignChange { f_lo: 1.0, f_hi: 2.0 });
    }

    #[test]
    fn test_bisect_root_at_bound() {
        let outcome = bisect(|x| x - 1.0, 1.0, 3.0, BisectionConfig::default());
        let Bisection::Root(root) = outcome else { panic!("expected root") };
        assert_eq!(root.x, 1.0);
        assert_eq!(root.iterations, 0);
    }

    #[test]
    fn test_bisect_respects_iteration_budget() {
        let config = BisectionConfig { value_tolerance: 0.0, x_tolerance: 0.0, max_iterations: 5 };
        let Bisection::Root(root) = bisect(|x| x - 0.3, 0.0, 1.0, config) else { panic!("expected root") };
        assert_eq!(root.iterations, 5);
        assert!(!root.converged);
        assert!((root.x - 0.3).abs() < 1.0 / 32.0);
    }

    #[test]
    fn test_first_satisfying() {
        assert_eq!(first_satisfying(50, 80, |a| a >= 67), Some(67));
        assert_eq!(first_satisfying(50, 80, |_| true), Some(50));
        assert_eq!(first_satisfying(50, 80, |_| false), None);
        assert_eq!(first_satisfying(50, 80, |a| a >= 80), Some(80));
        assert_eq!(first_satisfying(60, 60, |a| a >= 60), Some(60));
        assert_eq!(first_satisfying(61, 60, |_| true), None);
    }
}
