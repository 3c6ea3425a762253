//! Operand broadcasting
//!
//! Binary operations accept a secret array, a plaintext array, or a bare
//! scalar on the right-hand side. Broadcasting resolves the pair to equal
//! shapes: a rank-0 operand is replicated to the other side's shape (an
//! engine resize for secret values, a value-replication resize for plain
//! ones); any other shape difference is a mismatch.

use crate::array::{Operand, SecureArray};
use crate::error::{ArrayError, Result};
use crate::plain::PlainArray;

/// The left operand after broadcasting.
pub(crate) enum Lhs<'a> {
    Borrowed(&'a SecureArray),
    Owned(SecureArray),
}

impl Lhs<'_> {
    pub(crate) fn get(&self) -> &SecureArray {
        match self {
            Lhs::Borrowed(array) => array,
            Lhs::Owned(array) => array,
        }
    }
}

/// The right operand after broadcasting.
pub(crate) enum Rhs<'a> {
    Secret(&'a SecureArray),
    SecretOwned(SecureArray),
    Plain(PlainArray),
}

/// Resolve a secret/operand pair to equal shapes, or fail.
pub(crate) fn auto_broadcast<'a>(
    a: &'a SecureArray,
    b: Operand<'a>,
) -> Result<(Lhs<'a>, Rhs<'a>)> {
    // Bare scalars become rank-0 plain arrays first.
    let b = match b {
        Operand::Scalar(value) => Rhs::Plain(PlainArray::scalar(value)),
        Operand::Bool(value) => Rhs::Plain(PlainArray::bool_scalar(value)),
        Operand::Plain(plain) => Rhs::Plain(plain.clone()),
        Operand::Secret(array) => Rhs::Secret(array),
    };

    let b_shape = match &b {
        Rhs::Secret(array) => array.shape(),
        Rhs::SecretOwned(array) => array.shape(),
        Rhs::Plain(plain) => plain.shape(),
    };

    if a.shape() == b_shape {
        return Ok((Lhs::Borrowed(a), b));
    }
    if a.ndim() != 0 && b_shape.ndim() != 0 {
        return Err(ArrayError::ShapeMismatch {
            left: a.shape(),
            right: b_shape,
        });
    }
    if a.ndim() == 0 {
        let resized = a.resize_to(b_shape)?;
        return Ok((Lhs::Owned(resized), b));
    }
    let b = match b {
        Rhs::Plain(plain) => Rhs::Plain(plain.resized(a.shape())),
        Rhs::Secret(array) => Rhs::SecretOwned(array.resize_to(a.shape())?),
        Rhs::SecretOwned(array) => Rhs::SecretOwned(array.resize_to(a.shape())?),
    };
    Ok((Lhs::Borrowed(a), b))
}
