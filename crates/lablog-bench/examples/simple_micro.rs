//! Naive stopwatch micro-benchmark of `sum(a, b)`.
//!
//! Times 100,000,000 calls per argument pair and prints one line each:
//!
//! ```text
//! sum(1, 2) took 0 microseconds
//! sum(10, 20) took 0 microseconds
//! ```
//!
//! With optimizations on, the unguarded loop is usually deleted outright,
//! which is the point the program makes. Set `RUST_LOG=debug` to also see
//! the same cases timed behind `black_box`.

use lablog_bench::timing::{sample, time_sum};
use lablog_bench::{sum, Guard, MicroConfig};
use std::hint::black_box;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = MicroConfig::default();
    config.validate()?;

    for &(a, b) in &config.cases {
        println!("{}", time_sum(a, b, config.iterations, config.guard));
    }

    if log::log_enabled!(log::Level::Debug) {
        for &(a, b) in &config.cases {
            let guarded = time_sum(a, b, config.iterations, Guard::BlackBox);
            let spread = sample(10, config.iterations / 10, || {
                black_box(sum(black_box(a), black_box(b)));
            })?;
            log::debug!("guarded: {guarded}; {spread}");
        }
    }
    Ok(())
}
