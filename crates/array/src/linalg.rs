//! Linear algebra helpers

use crate::array::{Operand, SecureArray};
use crate::error::{ArrayError, Result};
use crate::math::sum;

/// Inner product of two 1-D arrays.
pub fn inner(a: &SecureArray, b: &SecureArray) -> Result<SecureArray> {
    if a.ndim() != 1 || b.ndim() != 1 {
        return Err(ArrayError::unsupported(
            "inner product is only supported for 1-d arrays",
        ));
    }
    sum(&a.mul(Operand::Secret(b))?, None)
}

/// Dot product: the matrix product for 1-D and 2-D operands.
pub fn dot(a: &SecureArray, b: Operand) -> Result<SecureArray> {
    a.matmul(b)
}
