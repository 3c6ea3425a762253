//! Row-major 2-D matrix container
//!
//! The engine stores every register as a rectangular matrix; rank-0 and
//! rank-1 logical arrays arrive normalized to one row. Logical shape is
//! tracked above the engine, in the array layer's buffers.

use crate::error::{EngineError, Result};

/// A dense row-major matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

impl<T> Matrix<T> {
    /// Create a matrix from row-major data. The data length must be
    /// `rows * cols`.
    pub fn new(rows: usize, cols: usize, data: Vec<T>) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(EngineError::Dimension {
                context: format!(
                    "matrix of {}x{} requires {} elements, got {}",
                    rows,
                    cols,
                    rows * cols,
                    data.len()
                ),
            });
        }
        Ok(Self { rows, cols, data })
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Total number of elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the matrix has no elements.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Row-major element slice.
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Consume into the row-major element vector.
    pub fn into_data(self) -> Vec<T> {
        self.data
    }
}

impl<T: Copy> Matrix<T> {
    /// Element at (row, col).
    pub fn get(&self, row: usize, col: usize) -> T {
        self.data[row * self.cols + col]
    }

    /// Overwrite element at (row, col).
    pub fn set(&mut self, row: usize, col: usize, value: T) {
        self.data[row * self.cols + col] = value;
    }

    /// A matrix of the given dimensions filled with one value.
    pub fn filled(rows: usize, cols: usize, value: T) -> Self {
        Self {
            rows,
            cols,
            data: vec![value; rows * cols],
        }
    }

    /// Same data reinterpreted with new dimensions (row-major order kept).
    pub fn reshaped(&self, rows: usize, cols: usize) -> Result<Self> {
        Self::new(rows, cols, self.data.clone())
    }

    /// Transposed copy.
    pub fn transposed(&self) -> Self {
        let mut data = Vec::with_capacity(self.data.len());
        for c in 0..self.cols {
            for r in 0..self.rows {
                data.push(self.get(r, c));
            }
        }
        Self {
            rows: self.cols,
            cols: self.rows,
            data,
        }
    }

    /// Rectangular sub-block copy.
    pub fn block(&self, row_start: usize, col_start: usize, rows: usize, cols: usize) -> Self {
        let mut data = Vec::with_capacity(rows * cols);
        for r in row_start..row_start + rows {
            for c in col_start..col_start + cols {
                data.push(self.get(r, c));
            }
        }
        Self { rows, cols, data }
    }

    /// Elementwise map.
    pub fn map<U: Copy, F: Fn(T) -> U>(&self, f: F) -> Matrix<U> {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|&x| f(x)).collect(),
        }
    }

    /// Cyclic-repetition resize (numpy `np.resize` semantics): the new matrix
    /// is filled row-major from the source repeated as often as needed.
    pub fn resized(&self, rows: usize, cols: usize, fill: T) -> Self {
        let total = rows * cols;
        let data = if self.data.is_empty() {
            vec![fill; total]
        } else {
            (0..total).map(|i| self.data[i % self.data.len()]).collect()
        };
        Self { rows, cols, data }
    }
}

/// A plaintext matrix of either element dtype, as handed back by the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum PlainMatrix {
    Numeric(Matrix<f64>),
    Boolean(Matrix<bool>),
}

impl PlainMatrix {
    /// Number of rows.
    pub fn rows(&self) -> usize {
        match self {
            PlainMatrix::Numeric(m) => m.rows(),
            PlainMatrix::Boolean(m) => m.rows(),
        }
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        match self {
            PlainMatrix::Numeric(m) => m.cols(),
            PlainMatrix::Boolean(m) => m.cols(),
        }
    }

    /// Total number of elements.
    pub fn len(&self) -> usize {
        match self {
            PlainMatrix::Numeric(m) => m.len(),
            PlainMatrix::Boolean(m) => m.len(),
        }
    }

    /// Whether the matrix has no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
