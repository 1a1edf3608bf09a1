//! Write `solution.h5` into the current directory.
//!
//! The file holds the group `important_data` with a string attribute, and
//! inside it the 3×3 `f32` dataset `my_cool_data` with a `mean` attribute.
//! Inspect it with `h5dump solution.h5`.

use lablog::h5::H5File;
use lablog::solution::{check_solution, write_solution, FILE_NAME};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    write_solution(FILE_NAME)?;

    if log::log_enabled!(log::Level::Debug) {
        let file = H5File::open(FILE_NAME)?;
        check_solution(&file)?;
        log::debug!("{FILE_NAME} reads back as written");
    }
    Ok(())
}
