//! Absolute value of a residuum in a hot loop, branch versus intrinsic.
//!
//! The loop resets the residuum to `±1.0` on every middle iteration and
//! then takes its absolute value `inner` times. Written as a comparison
//! and negation, the compiler has to keep a branch (or a select) because
//! `-0.0 < 0.0` is false and the sign bit must survive. `f64::abs` clears
//! the sign bit in one instruction.

use std::hint::black_box;

use crate::config::ResiduumConfig;

/// Which absolute-value implementation the loop uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AbsMethod {
    /// `if x < 0 { -x } else { x }`
    Branch,
    /// [`f64::abs`]
    #[default]
    Intrinsic,
}

impl AbsMethod {
    /// Apply this method to `x`.
    #[inline]
    pub fn apply(self, x: f64) -> f64 {
        match self {
            Self::Branch => abs_branch(x),
            Self::Intrinsic => abs_intrinsic(x),
        }
    }
}

/// Absolute value by comparison. Keeps the sign of `-0.0`.
#[inline]
pub fn abs_branch(x: f64) -> f64 {
    if x < 0.0 {
        -x
    } else {
        x
    }
}

/// Absolute value by clearing the sign bit.
#[inline]
pub fn abs_intrinsic(x: f64) -> f64 {
    x.abs()
}

#[inline]
fn run_with(config: &ResiduumConfig, abs: impl Fn(f64) -> f64) -> f64 {
    let mut residuum = 0.0;
    for _ in 0..config.outer {
        for j in 0..config.middle {
            residuum = if j % 2 == 1 { 1.0 } else { -1.0 };
            for _ in 0..config.inner {
                residuum = abs(black_box(residuum));
            }
        }
    }
    residuum
}

/// Run the triple loop and return the final residuum.
///
/// Zero in any loop count leaves the residuum at `0.0`; zero inner
/// iterations return the last reset value.
pub fn run(config: &ResiduumConfig) -> f64 {
    // One monomorphized loop per method.
    let result = match config.method {
        AbsMethod::Branch => run_with(config, abs_branch),
        AbsMethod::Intrinsic => run_with(config, abs_intrinsic),
    };
    log::debug!(
        "{:?}: {} abs calls, residuum {result}",
        config.method,
        config.total_ops()
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small(method: AbsMethod) -> ResiduumConfig {
        ResiduumConfig {
            outer: 3,
            middle: 4,
            inner: 5,
            method,
        }
    }

    #[test]
    fn both_methods_end_at_one() {
        assert_eq!(run(&small(AbsMethod::Branch)), 1.0);
        assert_eq!(run(&small(AbsMethod::Intrinsic)), 1.0);
    }

    #[test]
    fn negative_zero_differs() {
        assert!(abs_branch(-0.0).is_sign_negative());
        assert!(abs_intrinsic(-0.0).is_sign_positive());
        assert_eq!(AbsMethod::Branch.apply(-2.5), 2.5);
        assert_eq!(AbsMethod::Intrinsic.apply(-2.5), 2.5);
    }

    #[test]
    fn nan_stays_nan() {
        assert!(abs_branch(f64::NAN).is_nan());
        assert!(abs_intrinsic(f64::NAN).is_nan());
        assert_eq!(abs_branch(f64::NEG_INFINITY), f64::INFINITY);
    }

    #[test]
    fn zero_iterations_is_zero() {
        let cfg = ResiduumConfig {
            outer: 0,
            ..small(AbsMethod::Branch)
        };
        assert_eq!(run(&cfg), 0.0);
    }

    #[test]
    fn zero_inner_returns_last_reset() {
        // Last middle index 3 is odd, so the final reset is +1.0.
        let cfg = ResiduumConfig {
            inner: 0,
            ..small(AbsMethod::Intrinsic)
        };
        assert_eq!(run(&cfg), 1.0);
        let cfg = ResiduumConfig {
            middle: 1,
            inner: 0,
            ..small(AbsMethod::Intrinsic)
        };
        assert_eq!(run(&cfg), -1.0);
    }

    #[test]
    fn printed_form() {
        assert_eq!(format!("{:.6}", run(&small(AbsMethod::Branch))), "1.000000");
    }
}
