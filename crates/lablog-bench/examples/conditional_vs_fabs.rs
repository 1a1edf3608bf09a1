//! Absolute value of a residuum, 10⁹ times.
//!
//! Prints the final residuum, `1.000000`. The method defaults to
//! `f64::abs`; the elapsed time for both methods is logged at `info`.

use lablog_bench::residuum::run;
use lablog_bench::timing::measure;
use lablog_bench::{AbsMethod, ResiduumConfig};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = ResiduumConfig::default();
    config.validate()?;

    let (residuum, elapsed) = measure(|| run(&config));
    log::info!("{:?}: {elapsed:?}", config.method);

    if log::log_enabled!(log::Level::Info) {
        let other = ResiduumConfig {
            method: match config.method {
                AbsMethod::Branch => AbsMethod::Intrinsic,
                AbsMethod::Intrinsic => AbsMethod::Branch,
            },
            ..config.clone()
        };
        let (_, elapsed) = measure(|| run(&other));
        log::info!("{:?}: {elapsed:?}", other.method);
    }

    println!("{residuum:.6}");
    Ok(())
}
