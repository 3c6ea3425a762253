//! Fixed-point vectors
//!
//! Batch form of [`Fixed`] for whole share buffers: one scale for every
//! element, elementwise wrapping arithmetic.

use crate::error::{FixedPointError, Result};
use crate::fixed::Fixed;

/// A vector of fixed-point raws sharing one scale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedVector {
    /// Raw i64 values.
    pub data: Vec<i64>,
    /// Scale exponent common to all elements.
    pub scale: u8,
}

impl FixedVector {
    /// Wrap raw values under the given scale.
    pub fn from_raw(data: Vec<i64>, scale: u8) -> Self {
        Self { data, scale }
    }

    /// Encode a slice of floats elementwise.
    pub fn from_f64_slice(values: &[f64], scale: u8) -> Result<Self> {
        let mut data = Vec::with_capacity(values.len());
        for &v in values {
            data.push(Fixed::from_f64(v, scale)?.raw);
        }
        Ok(Self { data, scale })
    }

    /// Decode all elements back to floats.
    pub fn to_f64_vec(&self) -> Vec<f64> {
        let factor = (1u64 << self.scale) as f64;
        self.data.iter().map(|&raw| raw as f64 / factor).collect()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn zip(&self, other: &Self, f: fn(i64, i64) -> i64) -> Result<Self> {
        if self.scale != other.scale {
            return Err(FixedPointError::ScaleMismatch {
                expected: self.scale,
                got: other.scale,
            });
        }
        if self.len() != other.len() {
            return Err(FixedPointError::LengthMismatch {
                expected: self.len(),
                got: other.len(),
            });
        }
        let data = self
            .data
            .iter()
            .zip(&other.data)
            .map(|(&a, &b)| f(a, b))
            .collect();
        Ok(Self { data, scale: self.scale })
    }

    /// Elementwise wrapping addition.
    pub fn add(&self, other: &Self) -> Result<Self> {
        self.zip(other, i64::wrapping_add)
    }

    /// Elementwise wrapping subtraction.
    pub fn sub(&self, other: &Self) -> Result<Self> {
        self.zip(other, i64::wrapping_sub)
    }
}
