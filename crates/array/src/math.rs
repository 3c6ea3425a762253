//! Reductions
//!
//! The engine has no multi-element reduce opcode, so sum and prod are
//! iterative folds over per-row (or per-column) block extractions: cost is
//! linear in the reduced dimension's extent. Max and min ride on the
//! argmax opcode.

use secretnum_engine::DType;

use crate::array::{Operand, SecureArray};
use crate::error::{ArrayError, Result};
use crate::index::{ArrayIndex, AxisIndex};
use crate::plain::PlainArray;
use crate::sort_search::argmax_and_max;

fn validate_axis(axis: Option<usize>, ndim: usize) -> Result<()> {
    if let Some(axis) = axis {
        if axis >= ndim.max(1) {
            return Err(ArrayError::index(format!(
                "axis {axis} is out of bounds for a {ndim}-d array"
            )));
        }
    }
    Ok(())
}

/// One lane of a fold: the i-th row or column as a fresh array.
fn lane(arr: &SecureArray, axis: usize, i: usize) -> Result<SecureArray> {
    if axis == 0 {
        arr.get(ArrayIndex::at(i as i64))
    } else {
        arr.get(ArrayIndex::pair(AxisIndex::all(), AxisIndex::at(i as i64)))
    }
}

fn fold(
    arr: &SecureArray,
    axis: usize,
    extent: usize,
    combine: fn(&SecureArray, Operand) -> Result<SecureArray>,
    empty: f64,
) -> Result<SecureArray> {
    if extent == 0 {
        let session = arr.session();
        let buffer = session.make_share(
            Some(&PlainArray::scalar(empty)),
            crate::shape::Shape::Scalar,
            DType::Numeric,
            0,
        )?;
        return Ok(SecureArray::from_buffer(buffer));
    }
    let mut acc = lane(arr, axis, 0)?;
    for i in 1..extent {
        let next = lane(arr, axis, i)?;
        acc = combine(&acc, Operand::Secret(&next))?;
    }
    Ok(acc)
}

fn reduce(
    arr: &SecureArray,
    axis: Option<usize>,
    combine: fn(&SecureArray, Operand) -> Result<SecureArray>,
    empty: f64,
) -> Result<SecureArray> {
    validate_axis(axis, arr.ndim())?;
    match (arr.shape().dims().as_slice(), axis) {
        ([], _) => arr.copy(),
        ([n], _) => fold(arr, 0, *n, combine, empty),
        ([r, _], Some(0)) => fold(arr, 0, *r, combine, empty),
        ([_, c], Some(1)) => fold(arr, 1, *c, combine, empty),
        ([r, _], None) => {
            let per_column = fold(arr, 0, *r, combine, empty)?;
            reduce(&per_column, None, combine, empty)
        }
        _ => unreachable!("rank and axis validated above"),
    }
}

/// Sum of array elements over an axis; the whole array when `axis` is `None`.
pub fn sum(arr: &SecureArray, axis: Option<usize>) -> Result<SecureArray> {
    arr_numeric(arr, "sum")?;
    reduce(arr, axis, SecureArray::add, 0.0)
}

/// Product of array elements over an axis.
pub fn prod(arr: &SecureArray, axis: Option<usize>) -> Result<SecureArray> {
    arr_numeric(arr, "prod")?;
    reduce(arr, axis, SecureArray::mul, 1.0)
}

/// Maximum of an array, or the maxima along an axis.
pub fn max(arr: &SecureArray, axis: Option<usize>) -> Result<SecureArray> {
    let (_, max_value) = argmax_and_max(arr, axis)?;
    Ok(max_value)
}

/// Minimum of an array, or the minima along an axis.
pub fn min(arr: &SecureArray, axis: Option<usize>) -> Result<SecureArray> {
    let negated = arr.neg()?;
    let (_, max_value) = argmax_and_max(&negated, axis)?;
    max_value.neg()
}

fn arr_numeric(arr: &SecureArray, what: &str) -> Result<()> {
    if arr.dtype() != DType::Numeric {
        return Err(ArrayError::unsupported(format!(
            "{what} requires a numeric array"
        )));
    }
    Ok(())
}
