//! Workloads and timing helpers behind the lablog benchmark programs.
//!
//! - [`mod@sum`]: the trivial function both micro-benchmarks measure
//! - [`timing`]: stopwatch loops, with and without optimizer barriers
//! - [`monte_carlo`]: estimating π from uniform random points
//! - [`residuum`]: branch versus intrinsic absolute value in a hot loop
//! - [`config`]: the constants each program runs with, validated
//!
//! Criterion benches live under `benches/`; the runnable programs under
//! `examples/`.

#![deny(missing_docs)]
#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod config;
pub mod error;
pub mod monte_carlo;
pub mod residuum;
pub mod sum;
pub mod timing;

pub use config::{MicroConfig, MonteCarloConfig, ResiduumConfig};
pub use error::ConfigError;
pub use monte_carlo::PiEstimate;
pub use residuum::AbsMethod;
pub use sum::sum;
pub use timing::{Guard, Measurement, SampleSummary};
