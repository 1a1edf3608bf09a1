//! Stopwatch timing.
//!
//! A timed loop around a pure function is only meaningful if the compiler
//! cannot delete the loop. [`Guard::Naive`] reproduces the common mistake
//! of timing a loop whose result is unused; [`Guard::BlackBox`] routes
//! inputs and outputs through [`std::hint::black_box`] so every call runs.

use std::fmt;
use std::hint::black_box;
use std::time::{Duration, Instant};

use crate::error::ConfigError;
use crate::sum::sum;

/// How a timed loop is protected from the optimizer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Guard {
    /// Result discarded; the loop may be optimized away entirely.
    #[default]
    Naive,
    /// Arguments and result pass through `black_box`.
    BlackBox,
}

/// Run `f` `iterations` times and return the wall-clock time taken.
#[inline]
pub fn time_iterations(iterations: u64, mut f: impl FnMut()) -> Duration {
    let start = Instant::now();
    for _ in 0..iterations {
        f();
    }
    start.elapsed()
}

/// Run `f` once, returning its result and how long it took.
pub fn measure<R>(f: impl FnOnce() -> R) -> (R, Duration) {
    let start = Instant::now();
    let result = f();
    (result, start.elapsed())
}

/// One timed loop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Measurement {
    /// What was timed, e.g. `sum(1, 2)`.
    pub label: String,
    /// Loop iterations.
    pub iterations: u64,
    /// Total time for all iterations.
    pub elapsed: Duration,
}

impl Measurement {
    /// Whole microseconds elapsed, truncated.
    pub fn micros(&self) -> u128 {
        self.elapsed.as_micros()
    }

    /// Mean nanoseconds per iteration; zero when nothing ran.
    pub fn nanos_per_iter(&self) -> f64 {
        if self.iterations == 0 {
            return 0.0;
        }
        self.elapsed.as_nanos() as f64 / self.iterations as f64
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} took {} microseconds", self.label, self.micros())
    }
}

/// Time `iterations` calls of `sum(a, b)`.
pub fn time_sum(a: i64, b: i64, iterations: u64, guard: Guard) -> Measurement {
    let elapsed = match guard {
        Guard::Naive => time_iterations(iterations, || {
            let _ = sum(a, b);
        }),
        Guard::BlackBox => time_iterations(iterations, || {
            black_box(sum(black_box(a), black_box(b)));
        }),
    };
    let m = Measurement {
        label: format!("sum({a}, {b})"),
        iterations,
        elapsed,
    };
    log::debug!("{m} ({:.3} ns/iter, {guard:?})", m.nanos_per_iter());
    m
}

// ── Repeated sampling ──────────────────────────────────────────────

/// Distribution of per-iteration times over several timed loops.
#[derive(Clone, Debug, PartialEq)]
pub struct SampleSummary {
    /// Number of timed loops.
    pub samples: usize,
    /// Fastest loop, ns per iteration.
    pub min: f64,
    /// Slowest loop, ns per iteration.
    pub max: f64,
    /// Mean of the per-loop figures.
    pub mean: f64,
    /// Median of the per-loop figures.
    pub median: f64,
    /// Sample standard deviation; zero for a single sample.
    pub std_dev: f64,
}

impl SampleSummary {
    /// Summarize per-iteration nanosecond figures.
    pub fn from_nanos(values: &[f64]) -> Result<Self, ConfigError> {
        if values.is_empty() {
            return Err(ConfigError::NoSamples);
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        let n = sorted.len();
        let mean = sorted.iter().sum::<f64>() / n as f64;
        let median = if n % 2 == 1 {
            sorted[n / 2]
        } else {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        };
        let std_dev = if n > 1 {
            let var = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
            var.sqrt()
        } else {
            0.0
        };
        Ok(Self {
            samples: n,
            min: sorted[0],
            max: sorted[n - 1],
            mean,
            median,
            std_dev,
        })
    }
}

impl fmt::Display for SampleSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "median {:.3} ns/iter (mean {:.3} ± {:.3}, range {:.3}..{:.3}, n={})",
            self.median, self.mean, self.std_dev, self.min, self.max, self.samples
        )
    }
}

/// Time `samples` separate loops of `iterations` calls each.
///
/// Repeating the loop exposes run-to-run noise that one stopwatch reading
/// hides.
pub fn sample(
    samples: usize,
    iterations: u64,
    mut f: impl FnMut(),
) -> Result<SampleSummary, ConfigError> {
    if samples == 0 {
        return Err(ConfigError::NoSamples);
    }
    if iterations == 0 {
        return Err(ConfigError::ZeroIterations { name: "iterations" });
    }
    let per_iter: Vec<f64> = (0..samples)
        .map(|_| time_iterations(iterations, &mut f).as_nanos() as f64 / iterations as f64)
        .collect();
    SampleSummary::from_nanos(&per_iter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_program_output() {
        let m = Measurement {
            label: "sum(1, 2)".into(),
            iterations: 10,
            elapsed: Duration::from_nanos(12_345_678),
        };
        assert_eq!(m.to_string(), "sum(1, 2) took 12345 microseconds");
    }

    #[test]
    fn time_sum_labels_case() {
        let m = time_sum(10, 20, 1000, Guard::BlackBox);
        assert_eq!(m.label, "sum(10, 20)");
        assert_eq!(m.iterations, 1000);
        assert!(m.to_string().starts_with("sum(10, 20) took "));
    }

    #[test]
    fn zero_iterations_is_zero_rate() {
        let m = time_sum(1, 2, 0, Guard::Naive);
        assert_eq!(m.nanos_per_iter(), 0.0);
    }

    #[test]
    fn time_iterations_runs_closure_each_time() {
        let mut calls = 0u64;
        time_iterations(37, || calls += 1);
        assert_eq!(calls, 37);
    }

    #[test]
    fn measure_returns_result() {
        let (value, elapsed) = measure(|| sum(2, 3));
        assert_eq!(value, 5);
        assert!(elapsed < Duration::from_secs(1));
    }

    #[test]
    fn summary_statistics() {
        let s = SampleSummary::from_nanos(&[4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(s.min, 1.0);
        assert_eq!(s.max, 4.0);
        assert_eq!(s.mean, 2.5);
        assert_eq!(s.median, 2.5);
        assert!((s.std_dev - (5.0f64 / 3.0).sqrt()).abs() < 1e-12);

        let single = SampleSummary::from_nanos(&[7.0]).unwrap();
        assert_eq!(single.std_dev, 0.0);
        assert_eq!(single.median, 7.0);
    }

    #[test]
    fn sample_rejects_empty_runs() {
        assert_eq!(sample(0, 10, || {}), Err(ConfigError::NoSamples));
        assert_eq!(
            sample(3, 0, || {}),
            Err(ConfigError::ZeroIterations { name: "iterations" })
        );
        let s = sample(5, 100, || {
            black_box(sum(black_box(1), black_box(2)));
        })
        .unwrap();
        assert_eq!(s.samples, 5);
        assert!(s.min <= s.median && s.median <= s.max);
    }
}
