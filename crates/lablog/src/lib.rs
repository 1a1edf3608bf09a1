//! lablog: the programs behind a set of blog posts on scientific file
//! formats and on measuring small pieces of code.
//!
//! This is the facade crate. It re-exports the sub-crates and adds
//! [`solution`], the HDF5 example as a library function.
//!
//! # Quick start
//!
//! ```rust
//! use lablog::prelude::*;
//!
//! let tree = lablog::solution::solution_tree().unwrap();
//! let bytes = FileWriter::new(&tree).to_bytes().unwrap();
//! let file = H5File::from_bytes(&bytes).unwrap();
//! lablog::solution::check_solution(&file).unwrap();
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`h5`] | `lablog-h5` | HDF5 object model, writer and reader |
//! | [`bench`] | `lablog-bench` | Timing, Monte Carlo π, residuum loop |
//! | [`solution`] | this crate | The `solution.h5` example file |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// HDF5 object model, writer and reader (`lablog-h5`).
///
/// Build a [`h5::Group`] tree, serialize it with [`h5::FileWriter`], and
/// read files back with [`h5::H5File`].
pub use lablog_h5 as h5;

/// Benchmark workloads (`lablog-bench`).
///
/// Stopwatch timing in [`bench::timing`], π estimation in
/// [`bench::monte_carlo`], and the absolute-value loop in
/// [`bench::residuum`].
pub use lablog_bench as bench;

pub mod solution;

/// Common imports.
pub mod prelude {
    // HDF5
    pub use lablog_h5::{AttrValue, Dataset, FileWriter, Group, H5Error, H5File};

    // Benchmarks
    pub use lablog_bench::{
        AbsMethod, ConfigError, Guard, Measurement, MicroConfig, MonteCarloConfig, PiEstimate,
        ResiduumConfig,
    };

    // Solution file
    pub use crate::solution::{check_solution, solution_tree, write_solution, SolutionError};
}
