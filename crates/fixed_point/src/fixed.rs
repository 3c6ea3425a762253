//! Fixed-point scalar type

use crate::error::{FixedPointError, Result};

/// Default scale exponent. S=24 gives a resolution of about 6e-8, well inside
/// the 1e-6 round-trip tolerance the array layer promises.
pub const DEFAULT_SCALE: u8 = 24;

/// Largest usable scale exponent; beyond this, routing through f64 loses
/// integer precision.
pub const MAX_SCALE: u8 = 52;

fn check_scale_exp(scale: u8) -> Result<()> {
    if scale > MAX_SCALE {
        return Err(FixedPointError::InvalidScale(scale));
    }
    Ok(())
}

/// A fixed-point number: an i64 raw value with an implicit scale, so the
/// represented value is `raw / 2^scale`. Addition and subtraction wrap, since
/// arithmetic shares live in the ring Z_2^64.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fixed {
    /// The raw integer value.
    pub raw: i64,
    /// Scale exponent.
    pub scale: u8,
}

impl Fixed {
    /// Wrap a raw integer under the given scale.
    pub fn from_raw(raw: i64, scale: u8) -> Result<Self> {
        check_scale_exp(scale)?;
        Ok(Self { raw, scale })
    }

    /// Encode a float, rounding to the nearest representable value.
    pub fn from_f64(value: f64, scale: u8) -> Result<Self> {
        check_scale_exp(scale)?;
        if !value.is_finite() {
            return Err(FixedPointError::Overflow { value });
        }
        let scaled = value * (1u64 << scale) as f64;
        if scaled > i64::MAX as f64 {
            return Err(FixedPointError::Overflow { value });
        }
        if scaled < i64::MIN as f64 {
            return Err(FixedPointError::Underflow { value });
        }
        Ok(Self { raw: scaled.round() as i64, scale })
    }

    /// Encode a float at [`DEFAULT_SCALE`].
    pub fn from_f64_default(value: f64) -> Result<Self> {
        Self::from_f64(value, DEFAULT_SCALE)
    }

    /// Decode back to a float.
    pub fn to_f64(self) -> f64 {
        self.raw as f64 / (1u64 << self.scale) as f64
    }

    fn zip(self, other: Self, f: fn(i64, i64) -> i64) -> Result<Self> {
        if self.scale != other.scale {
            return Err(FixedPointError::ScaleMismatch {
                expected: self.scale,
                got: other.scale,
            });
        }
        Ok(Self { raw: f(self.raw, other.raw), scale: self.scale })
    }

    /// Wrapping addition; scales must agree.
    pub fn add(self, other: Self) -> Result<Self> {
        self.zip(other, i64::wrapping_add)
    }

    /// Wrapping subtraction; scales must agree.
    pub fn sub(self, other: Self) -> Result<Self> {
        self.zip(other, i64::wrapping_sub)
    }

    /// Multiplication through the double-width product, rescaled back down.
    /// Unlike add/sub this detects overflow: a wrapped product would decode to
    /// an unrelated value rather than a congruent share.
    pub fn mul(self, other: Self) -> Result<Self> {
        if self.scale != other.scale {
            return Err(FixedPointError::ScaleMismatch {
                expected: self.scale,
                got: other.scale,
            });
        }
        let rescaled = ((self.raw as i128) * (other.raw as i128)) >> self.scale;
        if i64::try_from(rescaled).is_err() {
            return Err(FixedPointError::Overflow {
                value: self.to_f64() * other.to_f64(),
            });
        }
        Ok(Self { raw: rescaled as i64, scale: self.scale })
    }

    /// Wrapping negation.
    pub fn neg(self) -> Self {
        Self { raw: self.raw.wrapping_neg(), scale: self.scale }
    }
}
