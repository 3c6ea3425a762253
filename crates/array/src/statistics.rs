//! Statistical reductions

use crate::array::{Operand, SecureArray};
use crate::error::{ArrayError, Result};
use crate::math::{max, min, sum};

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

/// Arithmetic mean along an axis; of all elements when `axis` is `None`.
pub fn mean(arr: &SecureArray, axis: Option<usize>) -> Result<SecureArray> {
    validate_axis(axis, arr.ndim())?;
    let count = match (arr.shape().dims().as_slice(), axis) {
        (dims, None) => dims.iter().product::<usize>(),
        ([n], _) => *n,
        ([r, _], Some(0)) => *r,
        ([_, c], Some(1)) => *c,
        (_, _) => 1,
    };
    sum(arr, axis)?.div(Operand::Scalar(count as f64))
}

/// Weighted average along an axis. With no weights this is [`mean`]; with
/// weights it is `sum(arr * w, axis) / sum(w, axis)`. For `axis == 1`, 1-D
/// weights broadcast across rows; otherwise the weight shape must match.
pub fn average(
    arr: &SecureArray,
    axis: Option<usize>,
    weights: Option<Operand>,
) -> Result<SecureArray> {
    let Some(weights) = weights else {
        return mean(arr, axis);
    };
    validate_axis(axis, arr.ndim())?;

    match weights {
        Operand::Secret(w) => {
            let w = if axis == Some(1) && w.ndim() == 1 {
                WeightArray::Owned(w.resize_to(arr.shape())?)
            } else if w.shape() != arr.shape() {
                return Err(ArrayError::ShapeMismatch {
                    left: arr.shape(),
                    right: w.shape(),
                });
            } else {
                WeightArray::Borrowed(w)
            };
            let w = w.get();
            let weighted = arr.mul(Operand::Secret(w))?;
            sum(&weighted, axis)?.div(Operand::Secret(&sum(w, axis)?))
        }
        Operand::Plain(w) => {
            let w = if axis == Some(1) && w.ndim() == 1 {
                w.resized(arr.shape())
            } else if w.shape() != arr.shape() {
                return Err(ArrayError::ShapeMismatch {
                    left: arr.shape(),
                    right: w.shape(),
                });
            } else {
                w.clone()
            };
            let weighted = arr.mul(Operand::Plain(&w))?;
            let denominator = w.sum_axis(axis)?;
            sum(&weighted, axis)?.div(Operand::Plain(&denominator))
        }
        Operand::Scalar(_) | Operand::Bool(_) => Err(ArrayError::unsupported(
            "weights must be an array",
        )),
    }
}

enum WeightArray<'a> {
    Borrowed(&'a SecureArray),
    Owned(SecureArray),
}

impl WeightArray<'_> {
    fn get(&self) -> &SecureArray {
        match self {
            WeightArray::Borrowed(array) => array,
            WeightArray::Owned(array) => array,
        }
    }
}

/// Range of values (maximum minus minimum) along an axis.
pub fn ptp(arr: &SecureArray, axis: Option<usize>) -> Result<SecureArray> {
    let low = min(arr, axis)?;
    max(arr, axis)?.sub(Operand::Secret(&low))
}
