//! Secretnum Fixed-Point Encoding
//!
//! Fixed-point representation for arithmetic secret shares.
//! Uses i64 raw values with a configurable scaling factor 2^S.

mod error;
mod fixed;
mod vector;

pub use error::{FixedPointError, Result};
pub use fixed::{Fixed, DEFAULT_SCALE, MAX_SCALE};
pub use vector::FixedVector;
