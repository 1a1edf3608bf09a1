//! Test fixtures shared across the lablog crates.
//!
//! Holds the expected content of the HDF5 example file as plain values, so
//! both the format crate and the facade can assert against one source, plus
//! float-tolerance helpers.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

// ── Solution file content ──────────────────────────────────────────

pub const SOLUTION_FILE: &str = "solution.h5";
pub const GROUP_NAME: &str = "important_data";
pub const DATASET_NAME: &str = "my_cool_data";
pub const DATASET_PATH: &str = "important_data/my_cool_data";
pub const CONTENT_ATTR: &str = "content";
pub const CONTENT: &str = "Contains a dataset with the answer to everything!";
pub const MEAN_ATTR: &str = "mean";
pub const MEAN: f32 = 42.05;
pub const SHAPE: [u64; 2] = [3, 3];

/// The 3×3 matrix, row-major.
pub const MATRIX: [f32; 9] = [42.0, 42.0, 42.0, 42.0, 42.0, 42.0, 42.0, 42.0, 42.42];

// ── Assertions ─────────────────────────────────────────────────────

/// Panic unless `actual` is within `tolerance` of `expected`.
#[track_caller]
pub fn assert_within(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "{actual} not within {tolerance} of {expected}"
    );
}

/// Panic unless two `f32` slices are bitwise identical.
#[track_caller]
pub fn assert_bits_eq(actual: &[f32], expected: &[f32]) {
    let a: Vec<u32> = actual.iter().map(|v| v.to_bits()).collect();
    let e: Vec<u32> = expected.iter().map(|v| v.to_bits()).collect();
    assert_eq!(a, e, "{actual:?} != {expected:?}");
}
