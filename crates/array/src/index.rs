//! Index-to-block translation
//!
//! An integer/slice/pair index plus a shape resolves to the rectangular block
//! (row start, col start, row count, col count) the engine's block opcodes
//! operate on. Rank-1 arrays map to a single logical row, so their only axis
//! indexes along the columns. Pure; never touches the engine.

use crate::error::{ArrayError, Result};
use crate::shape::Shape;

/// An index along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisIndex {
    /// A single position; negative values count from the end.
    At(i64),
    /// A half-open range; `None` bounds default to the axis limits.
    Slice {
        start: Option<i64>,
        stop: Option<i64>,
    },
}

impl AxisIndex {
    pub fn at(index: i64) -> AxisIndex {
        AxisIndex::At(index)
    }

    pub fn slice(start: impl Into<Option<i64>>, stop: impl Into<Option<i64>>) -> AxisIndex {
        AxisIndex::Slice {
            start: start.into(),
            stop: stop.into(),
        }
    }

    /// The full axis.
    pub fn all() -> AxisIndex {
        AxisIndex::Slice { start: None, stop: None }
    }
}

/// An index expression over a whole array: one axis index, or one per axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayIndex {
    Axis(AxisIndex),
    Pair(AxisIndex, AxisIndex),
}

impl ArrayIndex {
    pub fn at(index: i64) -> ArrayIndex {
        ArrayIndex::Axis(AxisIndex::at(index))
    }

    pub fn slice(start: impl Into<Option<i64>>, stop: impl Into<Option<i64>>) -> ArrayIndex {
        ArrayIndex::Axis(AxisIndex::slice(start, stop))
    }

    pub fn pair(rows: AxisIndex, cols: AxisIndex) -> ArrayIndex {
        ArrayIndex::Pair(rows, cols)
    }
}

/// The rectangular sub-region an index selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub row_start: usize,
    pub col_start: usize,
    pub row_count: usize,
    pub col_count: usize,
}

impl Block {
    pub fn size(&self) -> usize {
        self.row_count * self.col_count
    }
}

fn normalize_int(index: i64, limit: usize, axis: usize) -> Result<usize> {
    let limit_i = limit as i64;
    if index >= limit_i || index < -limit_i {
        return Err(ArrayError::index(format!(
            "index {index} is out of bounds for axis {axis} with size {limit}"
        )));
    }
    Ok(index.rem_euclid(limit_i) as usize)
}

/// Normalize a slice along one axis to (start, count). Empty slices are
/// rejected, stricter than numpy.
fn normalize_slice(
    start: Option<i64>,
    stop: Option<i64>,
    limit: usize,
    axis: usize,
) -> Result<(usize, usize)> {
    let limit_i = limit as i64;
    let start = start.unwrap_or(0);
    let stop = stop.unwrap_or(limit_i);
    if start >= limit_i || start < -limit_i || stop > limit_i || stop < -limit_i {
        return Err(ArrayError::index(format!(
            "slice {start}..{stop} is out of bounds for axis {axis} with size {limit}"
        )));
    }
    let start = if start < 0 { start.rem_euclid(limit_i) } else { start } as usize;
    let stop = if stop < 0 { stop.rem_euclid(limit_i) } else { stop } as usize;
    if start >= stop {
        return Err(ArrayError::index(
            "empty array, slice start must be less than slice stop",
        ));
    }
    Ok((start, stop - start))
}

/// Resolve an index against a shape into the engine block it selects.
pub fn resolve(index: ArrayIndex, shape: Shape) -> Result<Block> {
    match (index, shape) {
        (_, Shape::Scalar) => Err(ArrayError::index("cannot index a 0-d array")),
        (ArrayIndex::Axis(AxisIndex::At(i)), Shape::Vector(n)) => {
            let col_start = normalize_int(i, n, 0)?;
            Ok(Block { row_start: 0, col_start, row_count: 1, col_count: 1 })
        }
        (ArrayIndex::Axis(AxisIndex::Slice { start, stop }), Shape::Vector(n)) => {
            let (col_start, col_count) = normalize_slice(start, stop, n, 0)?;
            Ok(Block { row_start: 0, col_start, row_count: 1, col_count })
        }
        (ArrayIndex::Pair(_, _), Shape::Vector(_)) => {
            Err(ArrayError::index("too many indices for a 1-d array"))
        }
        (ArrayIndex::Axis(AxisIndex::At(i)), Shape::Matrix(r, c)) => {
            let row_start = normalize_int(i, r, 0)?;
            Ok(Block { row_start, col_start: 0, row_count: 1, col_count: c })
        }
        (ArrayIndex::Axis(AxisIndex::Slice { start, stop }), Shape::Matrix(r, c)) => {
            let (row_start, row_count) = normalize_slice(start, stop, r, 0)?;
            Ok(Block { row_start, col_start: 0, row_count, col_count: c })
        }
        (ArrayIndex::Pair(rows, cols), Shape::Matrix(r, c)) => {
            let (row_start, row_count) = match rows {
                AxisIndex::At(i) => (normalize_int(i, r, 0)?, 1),
                AxisIndex::Slice { start, stop } => normalize_slice(start, stop, r, 0)?,
            };
            let (col_start, col_count) = match cols {
                AxisIndex::At(i) => (normalize_int(i, c, 1)?, 1),
                AxisIndex::Slice { start, stop } => normalize_slice(start, stop, c, 1)?,
            };
            Ok(Block { row_start, col_start, row_count, col_count })
        }
    }
}

/// The logical shape of the value an index selects, matching what numpy would
/// produce for the same expression.
pub fn result_shape(index: ArrayIndex, shape: Shape) -> Result<Shape> {
    let block = resolve(index, shape)?;
    Ok(match (index, shape) {
        (ArrayIndex::Axis(AxisIndex::At(_)), Shape::Vector(_)) => Shape::Scalar,
        (ArrayIndex::Axis(AxisIndex::Slice { .. }), Shape::Vector(_)) => {
            Shape::Vector(block.col_count)
        }
        (ArrayIndex::Axis(AxisIndex::At(_)), Shape::Matrix(_, _)) => {
            Shape::Vector(block.col_count)
        }
        (ArrayIndex::Axis(AxisIndex::Slice { .. }), Shape::Matrix(_, _)) => {
            Shape::Matrix(block.row_count, block.col_count)
        }
        (ArrayIndex::Pair(AxisIndex::At(_), AxisIndex::At(_)), Shape::Matrix(_, _)) => {
            Shape::Scalar
        }
        (ArrayIndex::Pair(AxisIndex::At(_), AxisIndex::Slice { .. }), Shape::Matrix(_, _)) => {
            Shape::Vector(block.col_count)
        }
        (ArrayIndex::Pair(AxisIndex::Slice { .. }, AxisIndex::At(_)), Shape::Matrix(_, _)) => {
            Shape::Vector(block.row_count)
        }
        (ArrayIndex::Pair(AxisIndex::Slice { .. }, AxisIndex::Slice { .. }), Shape::Matrix(_, _)) => {
            Shape::Matrix(block.row_count, block.col_count)
        }
        _ => unreachable!("resolve rejected this combination"),
    })
}
