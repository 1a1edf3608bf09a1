//! Monte Carlo estimate of π from 10,000,000 uniform points.
//!
//! Prints `Pi: 3.14xxx`. Each run draws a fresh seed; the seed is logged at
//! `info` so a run can be repeated.

use lablog_bench::monte_carlo::{self, tolerance};
use lablog_bench::MonteCarloConfig;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = MonteCarloConfig::default();
    let estimate = monte_carlo::run(&config)?;
    log::info!(
        "error {:+.2e}, 5σ bound {:.2e}",
        estimate.value() - std::f64::consts::PI,
        tolerance(config.num_points, 5.0)
    );
    println!("{estimate}");
    Ok(())
}
