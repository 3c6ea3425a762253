//! Grouped aggregates
//!
//! Each aggregate takes a data matrix of n rows and a one-hot encoding
//! matrix of n rows by g groups, where `encoding[i][j]` marks row i as a
//! member of group j. The result has one row per data column and one column
//! per group: `out[c][g]` aggregates column c over the rows of group g.

use secretnum_engine::{DType, Opcode, OperandKind};

use crate::array::SecureArray;
use crate::error::{ArrayError, Result};
use crate::shape::Shape;

fn dispatch(x: &SecureArray, encoding: &SecureArray, opcode: Opcode) -> Result<SecureArray> {
    if x.dtype() != DType::Numeric || encoding.dtype() != DType::Numeric {
        return Err(ArrayError::unsupported("groupby requires numeric arrays"));
    }
    let (rows, cols) = match x.shape() {
        Shape::Matrix(r, c) => (r, c),
        other => {
            return Err(ArrayError::unsupported(format!(
                "groupby requires a 2-d data matrix, got shape {other}"
            )))
        }
    };
    let (enc_rows, groups) = match encoding.shape() {
        Shape::Matrix(r, c) => (r, c),
        other => {
            return Err(ArrayError::unsupported(format!(
                "groupby requires a 2-d encoding matrix, got shape {other}"
            )))
        }
    };
    if rows != enc_rows {
        return Err(ArrayError::ShapeMismatch {
            left: x.shape(),
            right: encoding.shape(),
        });
    }

    let session = x.session().clone();
    let out = session.new_share(Shape::Matrix(cols, groups), DType::Numeric)?;
    let am = OperandKind::ShareNumeric;
    session.execute(opcode, &[am, am, am], &[&x.buffer, &encoding.buffer, &out])?;
    Ok(SecureArray::from_buffer(out))
}

/// Per-group sums of each data column.
pub fn groupby_sum(x: &SecureArray, encoding: &SecureArray) -> Result<SecureArray> {
    dispatch(x, encoding, Opcode::GroupbySum)
}

/// Per-group row counts, replicated for each data column.
pub fn groupby_count(x: &SecureArray, encoding: &SecureArray) -> Result<SecureArray> {
    dispatch(x, encoding, Opcode::GroupbyCount)
}

/// Per-group maxima of each data column.
pub fn groupby_max(x: &SecureArray, encoding: &SecureArray) -> Result<SecureArray> {
    dispatch(x, encoding, Opcode::GroupbyMax)
}

/// Per-group minima of each data column.
pub fn groupby_min(x: &SecureArray, encoding: &SecureArray) -> Result<SecureArray> {
    dispatch(x, encoding, Opcode::GroupbyMin)
}
