//! Monte Carlo estimate of π.
//!
//! Points are drawn uniformly from the square `[-1, 1)²`; the fraction
//! landing inside the unit circle approaches `π / 4`. The count of hits is
//! binomial, so the estimate's standard error shrinks as `1 / √n`.

use std::f64::consts::PI;
use std::fmt;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::MonteCarloConfig;
use crate::error::ConfigError;

/// Hit count from one Monte Carlo run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PiEstimate {
    /// Points with `x² + y² <= 1`.
    pub inside: u64,
    /// Points drawn.
    pub total: u64,
}

impl PiEstimate {
    /// `4 * inside / total`; NaN when no points were drawn.
    pub fn value(&self) -> f64 {
        4.0 * self.inside as f64 / self.total as f64
    }

    /// Standard error of [`value`](Self::value) from the observed hit rate.
    pub fn standard_error(&self) -> f64 {
        let p = self.inside as f64 / self.total as f64;
        4.0 * (p * (1.0 - p) / self.total as f64).sqrt()
    }

    /// Whether the estimate is within `sigmas` standard errors of π.
    pub fn within(&self, sigmas: f64) -> bool {
        (self.value() - PI).abs() <= tolerance(self.total, sigmas)
    }
}

impl fmt::Display for PiEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pi: {}", significant(self.value(), 6))
    }
}

/// `value` to `digits` significant digits with trailing zeros dropped,
/// switching to exponent form outside `[1e-4, 10^digits)` like C's `%g`.
pub fn significant(value: f64, digits: usize) -> String {
    if value.is_nan() {
        return "nan".into();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.into();
    }
    if value == 0.0 {
        return "0".into();
    }
    let digits = digits.max(1);
    let sci = format!("{:.*e}", digits - 1, value);
    let (mantissa, exp) = sci.split_once('e').unwrap_or((&sci, "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    if exp < -4 || exp >= digits as i32 {
        let sign = if exp < 0 { '-' } else { '+' };
        return format!("{}e{sign}{:02}", trim_zeros(mantissa), exp.unsigned_abs());
    }
    let decimals = (digits as i32 - 1 - exp) as usize;
    trim_zeros(&format!("{value:.decimals$}")).to_owned()
}

fn trim_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

/// Expected deviation bound after `num_points` draws, in units of π.
///
/// Uses the true hit probability `π / 4`, so it does not depend on the
/// run being judged.
pub fn tolerance(num_points: u64, sigmas: f64) -> f64 {
    let p = PI / 4.0;
    sigmas * 4.0 * (p * (1.0 - p) / num_points as f64).sqrt()
}

/// Draw `num_points` points from `rng` and count circle hits.
pub fn estimate_pi<R: Rng + ?Sized>(rng: &mut R, num_points: u64) -> PiEstimate {
    let mut inside = 0u64;
    for _ in 0..num_points {
        let x: f64 = rng.random_range(-1.0..1.0);
        let y: f64 = rng.random_range(-1.0..1.0);
        if x * x + y * y <= 1.0 {
            inside += 1;
        }
    }
    PiEstimate {
        inside,
        total: num_points,
    }
}

/// Reproducible estimate from a ChaCha8 stream seeded with `seed`.
pub fn estimate_pi_seeded(seed: u64, num_points: u64) -> PiEstimate {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    estimate_pi(&mut rng, num_points)
}

/// Estimate with a fresh seed drawn from the thread-local entropy source.
///
/// Returns the seed too; passing it to [`estimate_pi_seeded`] repeats the run.
pub fn estimate_pi_entropy(num_points: u64) -> (u64, PiEstimate) {
    let seed: u64 = rand::rng().random();
    (seed, estimate_pi_seeded(seed, num_points))
}

/// Validate `config` and run it. An entropy seed is logged at `info`.
pub fn run(config: &MonteCarloConfig) -> Result<PiEstimate, ConfigError> {
    config.validate()?;
    let estimate = match config.seed {
        Some(seed) => estimate_pi_seeded(seed, config.num_points),
        None => {
            let (seed, estimate) = estimate_pi_entropy(config.num_points);
            log::info!("seed {seed}");
            estimate
        }
    };
    log::debug!(
        "{} of {} points inside, value {} ± {:.2e}",
        estimate.inside,
        estimate.total,
        estimate.value(),
        estimate.standard_error()
    );
    Ok(estimate)
}
