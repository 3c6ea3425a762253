//! Party-local plaintext arrays
//!
//! `PlainArray` is the plaintext side of the facade: the data a party stages
//! before sharing, receives from a reveal, or supplies as a public operand.
//! Creation helpers mirror the usual numpy constructors so both parties can
//! build identical public inputs.

use secretnum_engine::{Matrix, PlainMatrix};

use crate::error::{ArrayError, Result};
use crate::shape::Shape;
use secretnum_engine::DType;

#[derive(Debug, Clone, PartialEq)]
enum PlainData {
    Numeric(Vec<f64>),
    Boolean(Vec<bool>),
}

/// A plaintext rank-0/1/2 array of either dtype.
#[derive(Debug, Clone, PartialEq)]
pub struct PlainArray {
    shape: Shape,
    data: PlainData,
}

impl PlainArray {
    /// A rank-0 numeric value.
    pub fn scalar(value: f64) -> PlainArray {
        PlainArray {
            shape: Shape::Scalar,
            data: PlainData::Numeric(vec![value]),
        }
    }

    /// A rank-1 numeric array.
    pub fn vector(values: &[f64]) -> PlainArray {
        PlainArray {
            shape: Shape::Vector(values.len()),
            data: PlainData::Numeric(values.to_vec()),
        }
    }

    /// A rank-2 numeric array from row-major data.
    pub fn matrix(rows: usize, cols: usize, values: Vec<f64>) -> Result<PlainArray> {
        if values.len() != rows * cols {
            return Err(ArrayError::construction(format!(
                "matrix ({rows}, {cols}) requires {} elements, got {}",
                rows * cols,
                values.len()
            )));
        }
        Ok(PlainArray {
            shape: Shape::Matrix(rows, cols),
            data: PlainData::Numeric(values),
        })
    }

    /// A rank-0 boolean value.
    pub fn bool_scalar(value: bool) -> PlainArray {
        PlainArray {
            shape: Shape::Scalar,
            data: PlainData::Boolean(vec![value]),
        }
    }

    /// A rank-1 boolean array.
    pub fn bool_vector(values: &[bool]) -> PlainArray {
        PlainArray {
            shape: Shape::Vector(values.len()),
            data: PlainData::Boolean(values.to_vec()),
        }
    }

    /// A rank-2 boolean array from row-major data.
    pub fn bool_matrix(rows: usize, cols: usize, values: Vec<bool>) -> Result<PlainArray> {
        if values.len() != rows * cols {
            return Err(ArrayError::construction(format!(
                "matrix ({rows}, {cols}) requires {} elements, got {}",
                rows * cols,
                values.len()
            )));
        }
        Ok(PlainArray {
            shape: Shape::Matrix(rows, cols),
            data: PlainData::Boolean(values),
        })
    }

    /// An array of the given shape filled with one value.
    pub fn full(shape: Shape, value: f64) -> PlainArray {
        PlainArray {
            shape,
            data: PlainData::Numeric(vec![value; shape.size()]),
        }
    }

    pub fn zeros(shape: Shape) -> PlainArray {
        Self::full(shape, 0.0)
    }

    pub fn ones(shape: Shape) -> PlainArray {
        Self::full(shape, 1.0)
    }

    /// The n-by-n identity matrix.
    pub fn identity(n: usize) -> PlainArray {
        let mut data = vec![0.0; n * n];
        for i in 0..n {
            data[i * n + i] = 1.0;
        }
        PlainArray {
            shape: Shape::Matrix(n, n),
            data: PlainData::Numeric(data),
        }
    }

    /// Evenly spaced values over the half-open interval `[start, stop)`.
    pub fn arange(start: f64, stop: f64, step: f64) -> Result<PlainArray> {
        if step == 0.0 {
            return Err(ArrayError::construction("arange step must not be zero"));
        }
        let count = ((stop - start) / step).ceil().max(0.0) as usize;
        let values: Vec<f64> = (0..count).map(|i| start + step * i as f64).collect();
        Ok(PlainArray {
            shape: Shape::Vector(count),
            data: PlainData::Numeric(values),
        })
    }

    /// `num` evenly spaced samples over `[start, stop]` (or `[start, stop)`
    /// when `endpoint` is false).
    pub fn linspace(start: f64, stop: f64, num: usize, endpoint: bool) -> PlainArray {
        let values = if num == 0 {
            Vec::new()
        } else if num == 1 {
            vec![start]
        } else {
            let div = if endpoint { num - 1 } else { num } as f64;
            let step = (stop - start) / div;
            (0..num).map(|i| start + step * i as f64).collect()
        };
        PlainArray {
            shape: Shape::Vector(num),
            data: PlainData::Numeric(values),
        }
    }

    /// Samples spaced evenly on a log scale: `base^x` for `x` in
    /// `linspace(start, stop)`.
    pub fn logspace(start: f64, stop: f64, num: usize, endpoint: bool, base: f64) -> PlainArray {
        let lin = Self::linspace(start, stop, num, endpoint);
        match lin.data {
            PlainData::Numeric(values) => PlainArray {
                shape: lin.shape,
                data: PlainData::Numeric(values.into_iter().map(|v| base.powf(v)).collect()),
            },
            PlainData::Boolean(_) => unreachable!("linspace is numeric"),
        }
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn ndim(&self) -> usize {
        self.shape.ndim()
    }

    pub fn size(&self) -> usize {
        self.shape.size()
    }

    pub fn dtype(&self) -> DType {
        match self.data {
            PlainData::Numeric(_) => DType::Numeric,
            PlainData::Boolean(_) => DType::Boolean,
        }
    }

    /// Row-major numeric elements; errors for boolean arrays.
    pub fn as_numeric(&self) -> Result<&[f64]> {
        match &self.data {
            PlainData::Numeric(values) => Ok(values),
            PlainData::Boolean(_) => Err(ArrayError::unsupported(
                "numeric access to a boolean array",
            )),
        }
    }

    /// Row-major boolean elements; errors for numeric arrays.
    pub fn as_boolean(&self) -> Result<&[bool]> {
        match &self.data {
            PlainData::Boolean(values) => Ok(values),
            PlainData::Numeric(_) => Err(ArrayError::unsupported(
                "boolean access to a numeric array",
            )),
        }
    }

    /// Same data under a new shape of equal element count.
    pub fn reshaped(&self, shape: Shape) -> Result<PlainArray> {
        if shape.size() != self.size() {
            return Err(ArrayError::construction(format!(
                "cannot reshape array of size {} into shape {shape}",
                self.size()
            )));
        }
        Ok(PlainArray {
            shape,
            data: self.data.clone(),
        })
    }

    /// Cyclic-repetition resize (numpy `np.resize` semantics).
    pub fn resized(&self, shape: Shape) -> PlainArray {
        let total = shape.size();
        let data = match &self.data {
            PlainData::Numeric(values) => PlainData::Numeric(if values.is_empty() {
                vec![0.0; total]
            } else {
                (0..total).map(|i| values[i % values.len()]).collect()
            }),
            PlainData::Boolean(values) => PlainData::Boolean(if values.is_empty() {
                vec![false; total]
            } else {
                (0..total).map(|i| values[i % values.len()]).collect()
            }),
        };
        PlainArray { shape, data }
    }

    /// Plain sum along an axis, mirroring the secure reduction's axis rules.
    /// Used when a weighted average carries plaintext weights.
    pub fn sum_axis(&self, axis: Option<usize>) -> Result<PlainArray> {
        let values = self.as_numeric()?;
        Ok(match (self.shape, axis) {
            (Shape::Scalar, _) => self.clone(),
            (Shape::Vector(_), None | Some(0)) => {
                PlainArray::scalar(values.iter().sum())
            }
            (Shape::Matrix(r, c), Some(0)) => {
                let mut acc = vec![0.0; c];
                for row in 0..r {
                    for col in 0..c {
                        acc[col] += values[row * c + col];
                    }
                }
                PlainArray::vector(&acc)
            }
            (Shape::Matrix(r, c), Some(1)) => {
                let mut acc = vec![0.0; r];
                for row in 0..r {
                    for col in 0..c {
                        acc[row] += values[row * c + col];
                    }
                }
                PlainArray::vector(&acc)
            }
            (Shape::Matrix(_, _), None) => PlainArray::scalar(values.iter().sum()),
            (shape, Some(axis)) => {
                return Err(ArrayError::index(format!(
                    "axis {axis} is out of bounds for shape {shape}"
                )))
            }
        })
    }

    /// The engine-side matrix for a numeric array (rank < 2 normalizes to one
    /// row).
    pub(crate) fn to_inner_numeric(&self) -> Result<Matrix<f64>> {
        let values = self.as_numeric()?.to_vec();
        let (rows, cols) = self.shape.inner_dims();
        Matrix::new(rows, cols, values).map_err(Into::into)
    }

    /// The engine-side matrix for a boolean array.
    pub(crate) fn to_inner_boolean(&self) -> Result<Matrix<bool>> {
        let values = self.as_boolean()?.to_vec();
        let (rows, cols) = self.shape.inner_dims();
        Matrix::new(rows, cols, values).map_err(Into::into)
    }

    /// Wrap an engine result matrix under a logical shape.
    pub(crate) fn from_plain_matrix(matrix: PlainMatrix, shape: Shape) -> Result<PlainArray> {
        if matrix.len() != shape.size() {
            return Err(ArrayError::construction(format!(
                "engine returned {} elements for shape {shape}",
                matrix.len()
            )));
        }
        let data = match matrix {
            PlainMatrix::Numeric(m) => PlainData::Numeric(m.into_data()),
            PlainMatrix::Boolean(m) => PlainData::Boolean(m.into_data()),
        };
        Ok(PlainArray { shape, data })
    }
}
