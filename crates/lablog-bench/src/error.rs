//! Configuration errors.

use thiserror::Error;

/// Errors detected by the `validate()` methods in [`config`](crate::config).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A loop would run zero times.
    #[error("{name} must be at least 1")]
    ZeroIterations {
        /// Which count was zero.
        name: &'static str,
    },
    /// The micro-benchmark has nothing to measure.
    #[error("no sum cases configured")]
    NoCases,
    /// Monte Carlo needs at least one point to divide by.
    #[error("num_points must be at least 1")]
    NoPoints,
    /// Samples must be at least 1 to summarize.
    #[error("samples must be at least 1")]
    NoSamples,
}
