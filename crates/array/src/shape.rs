//! Logical array shapes
//!
//! Arrays are rank 0, 1, or 2; rank is fixed at creation and rank 3+ is
//! rejected everywhere. The engine stores every value as a rectangular matrix,
//! so each logical shape maps to inner matrix dimensions: a scalar is (1, 1)
//! and a vector of n elements is a single row (1, n).

use crate::error::{ArrayError, Result};

/// The closed set of supported array shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Scalar,
    Vector(usize),
    Matrix(usize, usize),
}

impl Shape {
    /// Build a shape from a dimension list. Lists longer than 2 are rejected.
    pub fn from_dims(dims: &[usize]) -> Result<Shape> {
        match dims {
            [] => Ok(Shape::Scalar),
            [n] => Ok(Shape::Vector(*n)),
            [r, c] => Ok(Shape::Matrix(*r, *c)),
            _ => Err(ArrayError::construction(format!(
                "only rank 0, 1 or 2 arrays are supported, got rank {}",
                dims.len()
            ))),
        }
    }

    /// Dimension list of the shape.
    pub fn dims(&self) -> Vec<usize> {
        match *self {
            Shape::Scalar => vec![],
            Shape::Vector(n) => vec![n],
            Shape::Matrix(r, c) => vec![r, c],
        }
    }

    /// Number of dimensions.
    pub fn ndim(&self) -> usize {
        match self {
            Shape::Scalar => 0,
            Shape::Vector(_) => 1,
            Shape::Matrix(_, _) => 2,
        }
    }

    /// Number of elements.
    pub fn size(&self) -> usize {
        match *self {
            Shape::Scalar => 1,
            Shape::Vector(n) => n,
            Shape::Matrix(r, c) => r * c,
        }
    }

    /// Inner engine-matrix dimensions: (rows, cols).
    pub fn inner_dims(&self) -> (usize, usize) {
        match *self {
            Shape::Scalar => (1, 1),
            Shape::Vector(n) => (1, n),
            Shape::Matrix(r, c) => (r, c),
        }
    }

    /// Shape with the two axes swapped; identity for rank < 2.
    pub fn transposed(&self) -> Shape {
        match *self {
            Shape::Matrix(r, c) => Shape::Matrix(c, r),
            other => other,
        }
    }
}

impl std::fmt::Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Shape::Scalar => write!(f, "()"),
            Shape::Vector(n) => write!(f, "({n},)"),
            Shape::Matrix(r, c) => write!(f, "({r}, {c})"),
        }
    }
}

/// Resolve a reshape target with at most one `-1` wildcard dimension against
/// a source element count. The wildcard takes whatever extent makes the total
/// count match; a non-divisible count is rejected.
pub fn resolve_reshape(size: usize, dims: &[i64]) -> Result<Shape> {
    if dims.len() > 2 {
        return Err(ArrayError::construction(format!(
            "cannot reshape to rank {} (max 2)",
            dims.len()
        )));
    }
    if dims.iter().filter(|&&d| d == -1).count() > 1 {
        return Err(ArrayError::construction(
            "can only specify one unknown dimension",
        ));
    }
    if dims.iter().any(|&d| d < -1) {
        return Err(ArrayError::construction(format!(
            "negative dimensions in {dims:?}"
        )));
    }

    let shape = match *dims {
        [] => Shape::Scalar,
        [-1] => Shape::Vector(size),
        [n] => Shape::Vector(n as usize),
        [-1, c] => {
            let c = c as usize;
            if c == 0 || size % c != 0 {
                return Err(ArrayError::construction(format!(
                    "cannot reshape array of size {size} into shape (-1, {c})"
                )));
            }
            Shape::Matrix(size / c, c)
        }
        [r, -1] => {
            let r = r as usize;
            if r == 0 || size % r != 0 {
                return Err(ArrayError::construction(format!(
                    "cannot reshape array of size {size} into shape ({r}, -1)"
                )));
            }
            Shape::Matrix(r, size / r)
        }
        [r, c] => Shape::Matrix(r as usize, c as usize),
        _ => unreachable!("rank checked above"),
    };

    if shape.size() != size {
        return Err(ArrayError::construction(format!(
            "cannot reshape array of size {size} into shape {shape}"
        )));
    }
    Ok(shape)
}

/// Resolve a resize target. Unlike reshape the element count may change;
/// wildcards and negative dimensions are rejected.
pub fn resolve_resize(dims: &[i64]) -> Result<Shape> {
    if dims.iter().any(|&d| d < 0) {
        return Err(ArrayError::construction(
            "all resize dimensions must be non-negative",
        ));
    }
    let dims: Vec<usize> = dims.iter().map(|&d| d as usize).collect();
    Shape::from_dims(&dims)
}
