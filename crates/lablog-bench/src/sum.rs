//! The measured workload.

/// Add two integers, wrapping on overflow.
#[inline]
pub fn sum(a: i64, b: i64) -> i64 {
    a.wrapping_add(b)
}
