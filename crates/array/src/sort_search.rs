//! Selection, argmax and sorting
//!
//! The argmax opcode works column-wise on the inner matrix, so only axis 0 is
//! native: axis 1 transposes first and the flattened form reshapes to a
//! single column. Minima are derived by negating, finding maxima, and
//! negating back.

use secretnum_engine::{DType, Opcode, OperandKind};

use crate::array::SecureArray;
use crate::error::{ArrayError, Result};
use crate::shape::Shape;

/// Elementwise selection: `x` where `cond` holds, `y` elsewhere.
pub fn select(cond: &SecureArray, x: &SecureArray, y: &SecureArray) -> Result<SecureArray> {
    if cond.dtype() != DType::Boolean {
        return Err(ArrayError::unsupported("select requires a boolean condition"));
    }
    if x.dtype() != DType::Numeric || y.dtype() != DType::Numeric {
        return Err(ArrayError::unsupported("select requires numeric branches"));
    }
    if cond.shape() != x.shape() {
        return Err(ArrayError::ShapeMismatch { left: cond.shape(), right: x.shape() });
    }
    if cond.shape() != y.shape() {
        return Err(ArrayError::ShapeMismatch { left: cond.shape(), right: y.shape() });
    }
    let session = cond.session().clone();
    let out = session.new_share(x.shape(), DType::Numeric)?;
    let am = OperandKind::ShareNumeric;
    session.execute(
        Opcode::Multiplexer,
        &[OperandKind::ShareBoolean, am, am, am],
        &[&cond.buffer, &y.buffer, &x.buffer, &out],
    )?;
    Ok(SecureArray::from_buffer(out))
}

/// Indices of the maxima and the maximum values along an axis. `None`
/// searches the flattened array and yields rank-0 results.
pub fn argmax_and_max(
    arr: &SecureArray,
    axis: Option<usize>,
) -> Result<(SecureArray, SecureArray)> {
    if arr.dtype() != DType::Numeric {
        return Err(ArrayError::unsupported("argmax requires a numeric array"));
    }
    if let Some(axis) = axis {
        if axis >= arr.ndim().max(1) {
            return Err(ArrayError::index(format!(
                "axis {axis} is out of bounds for a {}-d array",
                arr.ndim()
            )));
        }
    }
    if arr.size() == 0 {
        return Err(ArrayError::index("argmax of an empty array"));
    }

    // Normalize to a matrix whose columns are the search lanes.
    enum Work<'a> {
        Borrowed(&'a SecureArray),
        Owned(SecureArray),
    }
    let (work, out_shape) = match (arr.shape(), axis) {
        (Shape::Matrix(_, c), Some(0)) => (Work::Borrowed(arr), Shape::Vector(c)),
        // The bounds check above leaves axis 1 as the only other Some value.
        (Shape::Matrix(r, _), Some(_)) => (Work::Owned(arr.transpose()?), Shape::Vector(r)),
        (Shape::Matrix(_, _), None) | (Shape::Vector(_), _) => {
            (Work::Owned(arr.reshape(&[-1, 1])?), Shape::Scalar)
        }
        (Shape::Scalar, _) => (Work::Owned(arr.reshape(&[-1, 1])?), Shape::Scalar),
    };
    let work_ref = match &work {
        Work::Borrowed(array) => *array,
        Work::Owned(array) => array,
    };

    let session = arr.session().clone();
    let max_index = session.new_share(out_shape, DType::Numeric)?;
    let max_value = session.new_share(out_shape, DType::Numeric)?;
    let am = OperandKind::ShareNumeric;
    session.execute(
        Opcode::ArgmaxAndMax,
        &[am, am, am],
        &[&work_ref.buffer, &max_index, &max_value],
    )?;
    if let Work::Owned(array) = work {
        array.buffer.release()?;
    }
    Ok((
        SecureArray::from_buffer(max_index),
        SecureArray::from_buffer(max_value),
    ))
}

/// Indices of the minima and the minimum values along an axis.
pub fn argmin_and_min(
    arr: &SecureArray,
    axis: Option<usize>,
) -> Result<(SecureArray, SecureArray)> {
    let negated = arr.neg()?;
    let (min_index, negated_min) = argmax_and_max(&negated, axis)?;
    Ok((min_index, negated_min.neg()?))
}

/// Indices of the maxima along an axis.
pub fn argmax(arr: &SecureArray, axis: Option<usize>) -> Result<SecureArray> {
    let (max_index, _) = argmax_and_max(arr, axis)?;
    Ok(max_index)
}

/// Indices of the minima along an axis.
pub fn argmin(arr: &SecureArray, axis: Option<usize>) -> Result<SecureArray> {
    let negated = arr.neg()?;
    argmax(&negated, axis)
}

/// A sorted flat copy of the array. 2-D arrays only support the flattened
/// sort (`axis` must be `None`).
pub fn sort(arr: &SecureArray, axis: Option<i64>) -> Result<SecureArray> {
    if arr.ndim() == 2 && axis.is_some() {
        return Err(ArrayError::unsupported(
            "2-d array sort only supports the flattened form",
        ));
    }
    let mut sorted = arr.copy()?;
    sorted.sort_inplace()?;
    sorted.flatten()
}
