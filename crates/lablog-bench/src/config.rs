//! Run configuration for each benchmark program.
//!
//! Every program runs with fixed constants. They live here as `Default`
//! impls so tests and benches can shrink them, and `validate()` rejects
//! settings that would divide by zero or measure nothing.

use crate::error::ConfigError;
use crate::residuum::AbsMethod;
use crate::timing::Guard;

// ── MicroConfig ────────────────────────────────────────────────────

/// Settings for the stopwatch micro-benchmark of [`sum`](fn@crate::sum).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MicroConfig {
    /// Calls per timed loop. Default: 100,000,000.
    pub iterations: u64,
    /// `(a, b)` argument pairs, each timed separately. Default: `(1, 2)`, `(10, 20)`.
    pub cases: Vec<(i64, i64)>,
    /// Whether the loop hides its work from the optimizer. Default: [`Guard::Naive`].
    pub guard: Guard,
}

impl Default for MicroConfig {
    fn default() -> Self {
        Self {
            iterations: 100_000_000,
            cases: vec![(1, 2), (10, 20)],
            guard: Guard::Naive,
        }
    }
}

impl MicroConfig {
    /// Check that there is something to time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.iterations == 0 {
            return Err(ConfigError::ZeroIterations { name: "iterations" });
        }
        if self.cases.is_empty() {
            return Err(ConfigError::NoCases);
        }
        Ok(())
    }
}

// ── MonteCarloConfig ───────────────────────────────────────────────

/// Settings for the π estimate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MonteCarloConfig {
    /// Points to draw. Default: 10,000,000.
    pub num_points: u64,
    /// Fixed seed for a reproducible run; `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            num_points: 10_000_000,
            seed: None,
        }
    }
}

impl MonteCarloConfig {
    /// Reject zero points.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_points == 0 {
            return Err(ConfigError::NoPoints);
        }
        Ok(())
    }
}

// ── ResiduumConfig ─────────────────────────────────────────────────

/// Settings for the absolute-value loop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResiduumConfig {
    /// Outermost loop count. Default: 1000.
    pub outer: u64,
    /// Middle loop count; the residuum is reset here. Default: 1000.
    pub middle: u64,
    /// Absolute values taken per reset. Default: 1000.
    pub inner: u64,
    /// How the absolute value is computed. Default: [`AbsMethod::Intrinsic`].
    pub method: AbsMethod,
}

impl Default for ResiduumConfig {
    fn default() -> Self {
        Self {
            outer: 1000,
            middle: 1000,
            inner: 1000,
            method: AbsMethod::Intrinsic,
        }
    }
}

impl ResiduumConfig {
    /// Reject zero loop counts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, count) in [
            ("outer", self.outer),
            ("middle", self.middle),
            ("inner", self.inner),
        ] {
            if count == 0 {
                return Err(ConfigError::ZeroIterations { name });
            }
        }
        Ok(())
    }

    /// Total absolute-value operations performed.
    pub fn total_ops(&self) -> u64 {
        self.outer
            .saturating_mul(self.middle)
            .saturating_mul(self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        MicroConfig::default().validate().unwrap();
        MonteCarloConfig::default().validate().unwrap();
        ResiduumConfig::default().validate().unwrap();
        assert_eq!(ResiduumConfig::default().total_ops(), 1_000_000_000);
    }

    #[test]
    fn micro_rejects_empty_work() {
        let cfg = MicroConfig {
            iterations: 0,
            ..MicroConfig::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::ZeroIterations { name: "iterations" })
        );
        let cfg = MicroConfig {
            cases: Vec::new(),
            ..MicroConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::NoCases));
    }

    #[test]
    fn monte_carlo_rejects_zero_points() {
        let cfg = MonteCarloConfig {
            num_points: 0,
            seed: Some(1),
        };
        assert_eq!(cfg.validate(), Err(ConfigError::NoPoints));
    }

    #[test]
    fn residuum_names_the_zero_loop() {
        let cfg = ResiduumConfig {
            middle: 0,
            ..ResiduumConfig::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::ZeroIterations { name: "middle" })
        );
        assert_eq!(cfg.validate().unwrap_err().to_string(), "middle must be at least 1");
    }
}
