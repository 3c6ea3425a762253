//! Stacking and shape free functions
//!
//! Stacking takes at least two arrays, infers the result shape exactly as the
//! equivalent plaintext stacking would, and only then issues pairwise stack
//! opcodes, releasing every intermediate so only the inputs survive.

use secretnum_engine::{DType, Opcode, OperandKind};

use crate::array::SecureArray;
use crate::error::{ArrayError, Result};
use crate::shape::Shape;

fn validate_inputs(arrays: &[&SecureArray], what: &str) -> Result<()> {
    if arrays.len() < 2 {
        return Err(ArrayError::construction(format!(
            "{what} needs at least 2 arrays, got {}",
            arrays.len()
        )));
    }
    for array in arrays {
        if array.dtype() != DType::Numeric {
            return Err(ArrayError::unsupported(format!(
                "{what} requires numeric arrays"
            )));
        }
    }
    Ok(())
}

/// Result shape of stacking `b` below `a`; 1-D inputs count as single rows.
fn vstack_shape(a: Shape, b: Shape) -> Result<Shape> {
    let rows_cols = |s: Shape| match s {
        Shape::Vector(n) => Some((1, n)),
        Shape::Matrix(r, c) => Some((r, c)),
        Shape::Scalar => None,
    };
    match (rows_cols(a), rows_cols(b)) {
        (Some((ar, ac)), Some((br, bc))) if ac == bc => Ok(Shape::Matrix(ar + br, ac)),
        (Some(_), Some(_)) => Err(ArrayError::ShapeMismatch { left: a, right: b }),
        _ => Err(ArrayError::construction(
            "cannot stack 0-d arrays",
        )),
    }
}

/// Result shape of stacking `b` to the right of `a`; 1-D inputs concatenate.
fn hstack_shape(a: Shape, b: Shape) -> Result<Shape> {
    match (a, b) {
        (Shape::Vector(n), Shape::Vector(m)) => Ok(Shape::Vector(n + m)),
        (Shape::Matrix(ar, ac), Shape::Matrix(br, bc)) if ar == br => {
            Ok(Shape::Matrix(ar, ac + bc))
        }
        (Shape::Matrix(_, _), Shape::Matrix(_, _)) => {
            Err(ArrayError::ShapeMismatch { left: a, right: b })
        }
        _ => Err(ArrayError::ShapeMismatch { left: a, right: b }),
    }
}

fn stack_fold(
    arrays: &[&SecureArray],
    opcode: Opcode,
    shape_rule: fn(Shape, Shape) -> Result<Shape>,
) -> Result<SecureArray> {
    // The whole fold is shape-checked before the first opcode.
    let mut shapes = Vec::with_capacity(arrays.len() - 1);
    let mut folded = arrays[0].shape();
    for array in &arrays[1..] {
        folded = shape_rule(folded, array.shape())?;
        shapes.push(folded);
    }

    let session = arrays[0].session().clone();
    let am = OperandKind::ShareNumeric;
    let mut acc: Option<SecureArray> = None;
    for (array, &shape) in arrays[1..].iter().zip(&shapes) {
        let out = session.new_share(shape, DType::Numeric)?;
        let lhs = match &acc {
            Some(intermediate) => &intermediate.buffer,
            None => &arrays[0].buffer,
        };
        session.execute(opcode, &[am, am, am], &[lhs, &array.buffer, &out])?;
        if let Some(intermediate) = acc.take() {
            intermediate.buffer.release()?;
        }
        acc = Some(SecureArray::from_buffer(out));
    }
    acc.ok_or_else(|| ArrayError::construction("stacking needs at least 2 arrays"))
}

/// Stack arrays in sequence vertically (row wise).
pub fn vstack(arrays: &[&SecureArray]) -> Result<SecureArray> {
    validate_inputs(arrays, "vstack")?;
    stack_fold(arrays, Opcode::VStack, vstack_shape)
}

/// Stack arrays in sequence horizontally (column wise).
pub fn hstack(arrays: &[&SecureArray]) -> Result<SecureArray> {
    validate_inputs(arrays, "hstack")?;
    stack_fold(arrays, Opcode::HStack, hstack_shape)
}

/// Alias for [`vstack`].
pub fn row_stack(arrays: &[&SecureArray]) -> Result<SecureArray> {
    vstack(arrays)
}

/// Stack 1-D arrays as columns into a 2-D array; 2-D inputs pass through to
/// [`hstack`].
pub fn column_stack(arrays: &[&SecureArray]) -> Result<SecureArray> {
    validate_inputs(arrays, "column_stack")?;
    if arrays[0].ndim() == 1 {
        let columns: Vec<SecureArray> = arrays
            .iter()
            .map(|array| array.reshape(&[-1, 1]))
            .collect::<Result<_>>()?;
        let refs: Vec<&SecureArray> = columns.iter().collect();
        return hstack(&refs);
    }
    hstack(arrays)
}

/// Join arrays along an existing axis; `None` stacks rows and flattens.
pub fn concatenate(arrays: &[&SecureArray], axis: Option<usize>) -> Result<SecureArray> {
    validate_inputs(arrays, "concatenate")?;
    let ndim = arrays[0].ndim();
    match axis {
        None => row_stack(arrays)?.flatten(),
        Some(0) => match ndim {
            0 => Err(ArrayError::construction(
                "zero-dimensional arrays cannot be concatenated",
            )),
            1 => hstack(arrays),
            _ => vstack(arrays),
        },
        Some(1) if ndim == 2 => hstack(arrays),
        Some(axis) => Err(ArrayError::index(format!(
            "axis {axis} is out of bounds for a {ndim}-d array"
        ))),
    }
}

/// Free-function form of [`SecureArray::reshape`].
pub fn reshape(arr: &SecureArray, dims: &[i64]) -> Result<SecureArray> {
    arr.reshape(dims)
}

/// Free-function form of [`SecureArray::resize`].
pub fn resize(arr: &SecureArray, dims: &[i64]) -> Result<SecureArray> {
    arr.resize(dims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vstack_shape_rules() {
        assert_eq!(
            vstack_shape(Shape::Vector(3), Shape::Vector(3)).unwrap(),
            Shape::Matrix(2, 3)
        );
        assert_eq!(
            vstack_shape(Shape::Matrix(2, 3), Shape::Vector(3)).unwrap(),
            Shape::Matrix(3, 3)
        );
        assert!(vstack_shape(Shape::Vector(3), Shape::Vector(4)).is_err());
        assert!(vstack_shape(Shape::Scalar, Shape::Vector(3)).is_err());
    }

    #[test]
    fn test_hstack_shape_rules() {
        assert_eq!(
            hstack_shape(Shape::Vector(3), Shape::Vector(4)).unwrap(),
            Shape::Vector(7)
        );
        assert_eq!(
            hstack_shape(Shape::Matrix(2, 3), Shape::Matrix(2, 1)).unwrap(),
            Shape::Matrix(2, 4)
        );
        assert!(hstack_shape(Shape::Matrix(2, 3), Shape::Matrix(3, 3)).is_err());
        assert!(hstack_shape(Shape::Vector(3), Shape::Matrix(1, 3)).is_err());
    }
}
