//! Fixed-point error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FixedPointError {
    #[error("value {value} is too large to encode as a fixed-point i64")]
    Overflow { value: f64 },

    #[error("value {value} is below the representable fixed-point range")]
    Underflow { value: f64 },

    #[error("operands use different scales (left {expected}, right {got})")]
    ScaleMismatch { expected: u8, got: u8 },

    #[error("operands have different lengths (left {expected}, right {got})")]
    LengthMismatch { expected: usize, got: usize },

    #[error("scale exponent {0} exceeds the supported maximum of 52")]
    InvalidScale(u8),
}

pub type Result<T> = std::result::Result<T, FixedPointError>;
