//! The secret-shared array facade
//!
//! `SecureArray` wraps one owned buffer and turns array-level operations into
//! opcode dispatches. All validation (shape, dtype, index bounds, operand
//! kinds) happens here before anything reaches the engine. Comparisons and
//! logical operations always produce boolean-kind results; `le`, `ne` and the
//! public-rhs form of `ge` are derived from `ge`/`eq` plus negation rather
//! than dedicated opcodes.

use secretnum_engine::{DType, Matrix, Opcode, OperandKind, PartyId};

use crate::broadcast::{auto_broadcast, Rhs};
use crate::buffer::Buffer;
use crate::error::{ArrayError, Result};
use crate::index::{self, ArrayIndex, Block};
use crate::plain::PlainArray;
use crate::session::Session;
use crate::shape::{resolve_reshape, resolve_resize, Shape};

/// A right-hand operand for binary operations.
pub enum Operand<'a> {
    Secret(&'a SecureArray),
    Plain(&'a PlainArray),
    Scalar(f64),
    Bool(bool),
}

/// One party's raw share of an array, for persistence or transport outside
/// the live session.
#[derive(Debug, Clone, PartialEq)]
pub struct RawShare {
    shape: Shape,
    data: Vec<i64>,
}

impl RawShare {
    pub fn new(shape: Shape, data: Vec<i64>) -> Result<RawShare> {
        if data.len() != shape.size() {
            return Err(ArrayError::construction(format!(
                "raw share of shape {shape} requires {} elements, got {}",
                shape.size(),
                data.len()
            )));
        }
        Ok(RawShare { shape, data })
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn data(&self) -> &[i64] {
        &self.data
    }

    pub(crate) fn to_inner_matrix(&self) -> Result<Matrix<i64>> {
        let (rows, cols) = self.shape.inner_dims();
        Matrix::new(rows, cols, self.data.clone()).map_err(Into::into)
    }
}

/// A rank-0/1/2 array whose elements exist only as shares inside the engine.
pub struct SecureArray {
    pub(crate) buffer: Buffer,
}

impl SecureArray {
    pub(crate) fn from_buffer(buffer: Buffer) -> SecureArray {
        SecureArray { buffer }
    }

    pub fn shape(&self) -> Shape {
        self.buffer.shape()
    }

    pub fn ndim(&self) -> usize {
        self.shape().ndim()
    }

    pub fn size(&self) -> usize {
        self.shape().size()
    }

    pub fn dtype(&self) -> DType {
        self.buffer.dtype()
    }

    pub fn session(&self) -> &Session {
        self.buffer.session()
    }

    fn require_numeric(&self, what: &str) -> Result<()> {
        if self.dtype() != DType::Numeric {
            return Err(ArrayError::unsupported(format!(
                "{what} requires a numeric array"
            )));
        }
        Ok(())
    }

    fn require_boolean(&self, what: &str) -> Result<()> {
        if self.dtype() != DType::Boolean {
            return Err(ArrayError::unsupported(format!(
                "{what} requires a boolean array"
            )));
        }
        Ok(())
    }

    /// Dispatch a binary opcode whose rhs may stay public. A bare scalar rhs
    /// goes through as a public scalar operand instead of a replicated public
    /// matrix.
    fn binary_with_public_rhs(
        &self,
        other: Operand,
        opcode: Opcode,
        out_dtype: DType,
    ) -> Result<SecureArray> {
        if let Operand::Scalar(value) = other {
            return self.binary_scalar_rhs(value, opcode, out_dtype);
        }
        let (lhs, rhs) = auto_broadcast(self, other)?;
        let lhs = lhs.get();
        let session = lhs.session().clone();
        let out = session.new_share(lhs.shape(), out_dtype)?;
        let in_kind = OperandKind::share_of(lhs.dtype());
        let out_kind = OperandKind::share_of(out_dtype);
        match rhs {
            Rhs::Secret(r) => {
                self.check_same_dtype(r)?;
                session.execute(opcode, &[in_kind, in_kind, out_kind], &[&lhs.buffer, &r.buffer, &out])?;
            }
            Rhs::SecretOwned(r) => {
                self.check_same_dtype(&r)?;
                session.execute(opcode, &[in_kind, in_kind, out_kind], &[&lhs.buffer, &r.buffer, &out])?;
            }
            Rhs::Plain(plain) => {
                if plain.dtype() != lhs.dtype() {
                    return Err(ArrayError::unsupported(
                        "mixed-dtype operands are not supported",
                    ));
                }
                let public = session.new_public_plain(&plain)?;
                session.execute(
                    opcode,
                    &[in_kind, OperandKind::public_of(lhs.dtype()), out_kind],
                    &[&lhs.buffer, &public, &out],
                )?;
                public.release()?;
            }
        }
        Ok(SecureArray::from_buffer(out))
    }

    fn binary_scalar_rhs(
        &self,
        value: f64,
        opcode: Opcode,
        out_dtype: DType,
    ) -> Result<SecureArray> {
        let session = self.session().clone();
        let out = session.new_share(self.shape(), out_dtype)?;
        let scalar = session.new_public_scalar(value)?;
        session.execute(
            opcode,
            &[
                OperandKind::ShareNumeric,
                OperandKind::PublicScalar,
                OperandKind::share_of(out_dtype),
            ],
            &[&self.buffer, &scalar, &out],
        )?;
        scalar.release()?;
        Ok(SecureArray::from_buffer(out))
    }

    /// Dispatch a binary opcode that only takes share operands; a plain rhs
    /// is converted to a share first.
    fn binary_share_rhs(
        &self,
        other: Operand,
        opcode: Opcode,
        out_dtype: DType,
        swap: bool,
    ) -> Result<SecureArray> {
        let (lhs, rhs) = auto_broadcast(self, other)?;
        let lhs = lhs.get();
        let session = lhs.session().clone();
        let rhs = ensure_secret(&session, rhs, lhs.dtype())?;
        let rhs = rhs.get();
        self.check_same_dtype(rhs)?;
        let out = session.new_share(lhs.shape(), out_dtype)?;
        let in_kind = OperandKind::share_of(lhs.dtype());
        let out_kind = OperandKind::share_of(out_dtype);
        let (first, second) = if swap { (rhs, lhs) } else { (lhs, rhs) };
        session.execute(
            opcode,
            &[in_kind, in_kind, out_kind],
            &[&first.buffer, &second.buffer, &out],
        )?;
        Ok(SecureArray::from_buffer(out))
    }

    fn check_same_dtype(&self, other: &SecureArray) -> Result<()> {
        if self.dtype() != other.dtype() {
            return Err(ArrayError::unsupported(
                "mixed-dtype operands are not supported",
            ));
        }
        Ok(())
    }

    fn arith(&self, other: Operand, opcode: Opcode) -> Result<SecureArray> {
        self.require_numeric("arithmetic")?;
        self.binary_with_public_rhs(other, opcode, DType::Numeric)
    }

    /// Elementwise addition.
    pub fn add(&self, other: Operand) -> Result<SecureArray> {
        self.arith(other, Opcode::Add)
    }

    /// Elementwise subtraction.
    pub fn sub(&self, other: Operand) -> Result<SecureArray> {
        self.arith(other, Opcode::Sub)
    }

    /// Elementwise multiplication.
    pub fn mul(&self, other: Operand) -> Result<SecureArray> {
        self.arith(other, Opcode::Mul)
    }

    /// Elementwise division.
    pub fn div(&self, other: Operand) -> Result<SecureArray> {
        self.arith(other, Opcode::Div)
    }

    /// Elementwise negation.
    pub fn neg(&self) -> Result<SecureArray> {
        self.mul(Operand::Scalar(-1.0))
    }

    /// Elementwise less-than; boolean result.
    pub fn lt(&self, other: Operand) -> Result<SecureArray> {
        self.require_numeric("comparison")?;
        self.binary_with_public_rhs(other, Opcode::Lt, DType::Boolean)
    }

    /// Elementwise greater-than; boolean result.
    pub fn gt(&self, other: Operand) -> Result<SecureArray> {
        self.require_numeric("comparison")?;
        self.binary_with_public_rhs(other, Opcode::Gt, DType::Boolean)
    }

    /// Elementwise equality; boolean result.
    pub fn eq(&self, other: Operand) -> Result<SecureArray> {
        self.require_numeric("comparison")?;
        self.binary_with_public_rhs(other, Opcode::Eq, DType::Boolean)
    }

    /// Elementwise greater-or-equal; boolean result. The engine has no
    /// public-rhs form, so a plain operand is shared first.
    pub fn ge(&self, other: Operand) -> Result<SecureArray> {
        self.require_numeric("comparison")?;
        self.binary_share_rhs(other, Opcode::Ge, DType::Boolean, false)
    }

    /// Elementwise less-or-equal, evaluated as `other >= self`.
    pub fn le(&self, other: Operand) -> Result<SecureArray> {
        self.require_numeric("comparison")?;
        self.binary_share_rhs(other, Opcode::Ge, DType::Boolean, true)
    }

    /// Elementwise inequality, evaluated as `not (self == other)`.
    pub fn ne(&self, other: Operand) -> Result<SecureArray> {
        self.eq(other)?.not()
    }

    /// Elementwise logical negation; boolean arrays only.
    pub fn not(&self) -> Result<SecureArray> {
        self.require_boolean("logical negation")?;
        let session = self.session().clone();
        let out = session.new_share(self.shape(), DType::Boolean)?;
        let kind = OperandKind::ShareBoolean;
        session.execute(Opcode::Not, &[kind, kind], &[&self.buffer, &out])?;
        Ok(SecureArray::from_buffer(out))
    }

    fn logical(&self, other: Operand, opcode: Opcode) -> Result<SecureArray> {
        self.require_boolean("logical operation")?;
        self.binary_share_rhs(other, opcode, DType::Boolean, false)
    }

    /// Elementwise logical and; boolean arrays only.
    pub fn and(&self, other: Operand) -> Result<SecureArray> {
        self.logical(other, Opcode::And)
    }

    /// Elementwise logical or; boolean arrays only.
    pub fn or(&self, other: Operand) -> Result<SecureArray> {
        self.logical(other, Opcode::Or)
    }

    /// Elementwise logical xor; boolean arrays only.
    pub fn xor(&self, other: Operand) -> Result<SecureArray> {
        self.logical(other, Opcode::Xor)
    }

    /// A fresh array with the same contents, extracted as a full block.
    pub fn copy(&self) -> Result<SecureArray> {
        let (rows, cols) = self.shape().inner_dims();
        self.extract_block(
            Block { row_start: 0, col_start: 0, row_count: rows, col_count: cols },
            self.shape(),
        )
    }

    /// Select the sub-array an index names into a fresh buffer.
    pub fn get(&self, idx: ArrayIndex) -> Result<SecureArray> {
        let block = index::resolve(idx, self.shape())?;
        let out_shape = index::result_shape(idx, self.shape())?;
        let result = self.extract_block(block, out_shape)?;
        // Column blocks of logically 1-D results move to row storage.
        if out_shape.ndim() == 1 && block.row_count != 1 {
            let session = self.session().clone();
            let flattened = session.inner_flatten(result.buffer)?;
            return Ok(SecureArray::from_buffer(flattened));
        }
        Ok(result)
    }

    fn extract_block(&self, block: Block, out_shape: Shape) -> Result<SecureArray> {
        let session = self.session().clone();
        let out = session.new_share(out_shape, self.dtype())?;
        let rs = session.new_public_index(block.row_start as i64)?;
        let cs = session.new_public_index(block.col_start as i64)?;
        let rn = session.new_public_index(block.row_count as i64)?;
        let cn = session.new_public_index(block.col_count as i64)?;
        let kind = OperandKind::share_of(self.dtype());
        let ci = OperandKind::PublicIndex;
        session.execute(
            Opcode::GetItem,
            &[kind, ci, ci, ci, ci, kind],
            &[&self.buffer, &rs, &cs, &rn, &cn, &out],
        )?;
        for temp in [rs, cs, rn, cn] {
            temp.release()?;
        }
        Ok(SecureArray::from_buffer(out))
    }

    /// Overwrite the sub-array an index names. Scalars and plain arrays are
    /// coerced into a temporary share sized to the block.
    pub fn set(&mut self, idx: ArrayIndex, value: Operand) -> Result<()> {
        let block = index::resolve(idx, self.shape())?;
        let block_shape = Shape::Matrix(block.row_count, block.col_count);
        let session = self.session().clone();

        enum Staged<'a> {
            Borrowed(&'a SecureArray),
            Owned(SecureArray),
        }
        let staged = match value {
            Operand::Scalar(v) => {
                self.require_numeric("numeric assignment")?;
                let plain = PlainArray::scalar(v).resized(block_shape);
                Staged::Owned(SecureArray::from_buffer(session.make_share(
                    Some(&plain),
                    block_shape,
                    DType::Numeric,
                    0,
                )?))
            }
            Operand::Bool(v) => {
                self.require_boolean("boolean assignment")?;
                let plain = PlainArray::bool_scalar(v).resized(block_shape);
                Staged::Owned(SecureArray::from_buffer(session.make_share(
                    Some(&plain),
                    block_shape,
                    DType::Boolean,
                    0,
                )?))
            }
            Operand::Plain(plain) => {
                if plain.dtype() != self.dtype() {
                    return Err(ArrayError::unsupported(
                        "mixed-dtype assignment is not supported",
                    ));
                }
                if plain.size() != block.size() {
                    return Err(ArrayError::ShapeMismatch {
                        left: block_shape,
                        right: plain.shape(),
                    });
                }
                let plain = plain.reshaped(block_shape)?;
                Staged::Owned(SecureArray::from_buffer(session.make_share(
                    Some(&plain),
                    block_shape,
                    self.dtype(),
                    0,
                )?))
            }
            Operand::Secret(array) => {
                self.check_same_dtype(array)?;
                if array.size() != block.size() {
                    return Err(ArrayError::ShapeMismatch {
                        left: block_shape,
                        right: array.shape(),
                    });
                }
                Staged::Borrowed(array)
            }
        };
        let value_array = match &staged {
            Staged::Borrowed(array) => *array,
            Staged::Owned(array) => array,
        };

        let rs = session.new_public_index(block.row_start as i64)?;
        let cs = session.new_public_index(block.col_start as i64)?;
        let rn = session.new_public_index(block.row_count as i64)?;
        let cn = session.new_public_index(block.col_count as i64)?;
        let kind = OperandKind::share_of(self.dtype());
        let ci = OperandKind::PublicIndex;
        session.execute(
            Opcode::SetItem,
            &[kind, kind, ci, ci, ci, ci],
            &[&value_array.buffer, &self.buffer, &rs, &cs, &rn, &cn],
        )?;
        for temp in [rs, cs, rn, cn] {
            temp.release()?;
        }
        if let Staged::Owned(array) = staged {
            array.buffer.release()?;
        }
        Ok(())
    }

    /// A new array with the same data under a new shape. One dimension may be
    /// `-1` and is inferred from the element count.
    pub fn reshape(&self, dims: &[i64]) -> Result<SecureArray> {
        let shape = resolve_reshape(self.size(), dims)?;
        self.shape_op(Opcode::Reshape, shape)
    }

    /// A new array of the given shape filled by cyclic repetition.
    pub fn resize(&self, dims: &[i64]) -> Result<SecureArray> {
        self.resize_to(resolve_resize(dims)?)
    }

    pub(crate) fn resize_to(&self, shape: Shape) -> Result<SecureArray> {
        self.shape_op(Opcode::Resize, shape)
    }

    fn shape_op(&self, opcode: Opcode, shape: Shape) -> Result<SecureArray> {
        let session = self.session().clone();
        let (rows, cols) = shape.inner_dims();
        let out = session.new_share(shape, self.dtype())?;
        let rows = session.new_public_index(rows as i64)?;
        let cols = session.new_public_index(cols as i64)?;
        let kind = OperandKind::share_of(self.dtype());
        let ci = OperandKind::PublicIndex;
        session.execute(opcode, &[kind, ci, ci, kind], &[&self.buffer, &rows, &cols, &out])?;
        rows.release()?;
        cols.release()?;
        Ok(SecureArray::from_buffer(out))
    }

    /// The array collapsed to one dimension.
    pub fn flatten(&self) -> Result<SecureArray> {
        self.reshape(&[-1])
    }

    /// Alias for [`SecureArray::flatten`].
    pub fn ravel(&self) -> Result<SecureArray> {
        self.flatten()
    }

    /// The array with its two axes swapped; a plain copy for rank < 2.
    pub fn transpose(&self) -> Result<SecureArray> {
        if self.ndim() < 2 {
            return self.copy();
        }
        let session = self.session().clone();
        let out = session.new_share(self.shape().transposed(), self.dtype())?;
        let kind = OperandKind::share_of(self.dtype());
        session.execute(Opcode::Transpose, &[kind, kind], &[&self.buffer, &out])?;
        Ok(SecureArray::from_buffer(out))
    }

    /// Matrix product with numpy 1-D/2-D shape rules.
    pub fn matmul(&self, other: Operand) -> Result<SecureArray> {
        self.require_numeric("matmul")?;
        let out_shape = match &other {
            Operand::Secret(array) => {
                array.require_numeric("matmul")?;
                matmul_shape(self.shape(), array.shape())?
            }
            Operand::Plain(plain) => {
                if plain.dtype() != DType::Numeric {
                    return Err(ArrayError::unsupported("matmul requires a numeric array"));
                }
                matmul_shape(self.shape(), plain.shape())?
            }
            Operand::Scalar(_) | Operand::Bool(_) => {
                return Err(ArrayError::unsupported(
                    "matmul does not support scalar operands",
                ))
            }
        };

        let session = self.session().clone();
        let out = session.new_share(out_shape, DType::Numeric)?;
        let am = OperandKind::ShareNumeric;
        match other {
            Operand::Secret(array) => {
                // A 1-D rhs multiplies as a column.
                if array.ndim() == 1 {
                    let column = array.reshape(&[-1, 1])?;
                    session.execute(
                        Opcode::MatMul,
                        &[am, am, am],
                        &[&self.buffer, &column.buffer, &out],
                    )?;
                    column.buffer.release()?;
                } else {
                    session.execute(
                        Opcode::MatMul,
                        &[am, am, am],
                        &[&self.buffer, &array.buffer, &out],
                    )?;
                }
            }
            Operand::Plain(plain) => {
                let staged = if plain.ndim() == 1 {
                    plain.reshaped(Shape::Matrix(plain.size(), 1))?
                } else {
                    plain.clone()
                };
                let public = session.new_public_plain(&staged)?;
                session.execute(
                    Opcode::MatMul,
                    &[am, OperandKind::PublicNumeric, am],
                    &[&self.buffer, &public, &out],
                )?;
                public.release()?;
            }
            Operand::Scalar(_) | Operand::Bool(_) => unreachable!("rejected above"),
        }

        // A matrix-by-vector product lands column-stored; move it to the
        // canonical row form.
        if out_shape.ndim() == 1 && self.shape().inner_dims().0 != 1 {
            let flattened = session.inner_flatten(out)?;
            return Ok(SecureArray::from_buffer(flattened));
        }
        Ok(SecureArray::from_buffer(out))
    }

    /// Reconstruct the plaintext for one party. Only the target party
    /// receives a value; every other party gets `None`.
    pub fn reveal_to(&self, party: PartyId) -> Result<Option<PlainArray>> {
        let session = self.session().clone();
        let private = session.new_private(self.shape(), self.dtype(), None, party)?;
        session.execute(
            Opcode::Reveal,
            &[
                OperandKind::share_of(self.dtype()),
                OperandKind::private_of(self.dtype()),
            ],
            &[&self.buffer, &private],
        )?;
        let result = if session.party() == party {
            let matrix = session.read_back(&private)?;
            Some(PlainArray::from_plain_matrix(matrix, self.shape())?)
        } else {
            None
        };
        private.release()?;
        Ok(result)
    }

    /// Export this party's raw share for persistence or transport.
    pub fn to_share(&self) -> Result<RawShare> {
        let matrix = self.session().export_share(&self.buffer)?;
        RawShare::new(self.shape(), matrix.into_data())
    }

    /// Sort all elements in place without changing shape.
    pub fn sort_inplace(&mut self) -> Result<()> {
        self.require_numeric("sort")?;
        self.session().clone().execute(
            Opcode::QuickSort,
            &[OperandKind::ShareNumeric],
            &[&self.buffer],
        )
    }

    /// A row-permutation of the array sorted by one column's values.
    pub fn sort_by_column(&self, column: i64) -> Result<SecureArray> {
        self.require_numeric("sort")?;
        let cols = match self.shape() {
            Shape::Matrix(_, c) => c,
            other => {
                return Err(ArrayError::unsupported(format!(
                    "sort_by_column requires a 2-d array, got shape {other}"
                )))
            }
        };
        if column < 0 || column as usize >= cols {
            return Err(ArrayError::index(format!(
                "column {column} is out of bounds for {cols} columns"
            )));
        }
        let session = self.session().clone();
        let out = session.new_share(self.shape(), DType::Numeric)?;
        let key = session.new_public_index(column)?;
        session.execute(
            Opcode::QuickSort,
            &[
                OperandKind::ShareNumeric,
                OperandKind::PublicIndex,
                OperandKind::ShareNumeric,
            ],
            &[&self.buffer, &key, &out],
        )?;
        key.release()?;
        Ok(SecureArray::from_buffer(out))
    }
}

/// A secret rhs for share-only opcodes, converting plain operands.
enum RhsSecret<'a> {
    Borrowed(&'a SecureArray),
    Owned(SecureArray),
}

impl RhsSecret<'_> {
    fn get(&self) -> &SecureArray {
        match self {
            RhsSecret::Borrowed(array) => array,
            RhsSecret::Owned(array) => array,
        }
    }
}

fn ensure_secret<'a>(session: &Session, rhs: Rhs<'a>, dtype: DType) -> Result<RhsSecret<'a>> {
    match rhs {
        Rhs::Secret(array) => Ok(RhsSecret::Borrowed(array)),
        Rhs::SecretOwned(array) => Ok(RhsSecret::Owned(array)),
        Rhs::Plain(plain) => {
            if plain.dtype() != dtype {
                return Err(ArrayError::unsupported(
                    "mixed-dtype operands are not supported",
                ));
            }
            let buffer = session.make_share(Some(&plain), plain.shape(), dtype, 0)?;
            Ok(RhsSecret::Owned(SecureArray::from_buffer(buffer)))
        }
    }
}

/// Result shape of a 1-D/2-D matrix product, or the mismatch it would raise.
fn matmul_shape(a: Shape, b: Shape) -> Result<Shape> {
    let mismatch = || ArrayError::ShapeMismatch { left: a, right: b };
    match (a, b) {
        (Shape::Scalar, _) | (_, Shape::Scalar) => Err(ArrayError::unsupported(
            "matmul does not support 0-d operands",
        )),
        (Shape::Vector(n), Shape::Vector(m)) => {
            if n == m {
                Ok(Shape::Scalar)
            } else {
                Err(mismatch())
            }
        }
        (Shape::Vector(n), Shape::Matrix(r, c)) => {
            if n == r {
                Ok(Shape::Vector(c))
            } else {
                Err(mismatch())
            }
        }
        (Shape::Matrix(_, c), Shape::Vector(m)) => {
            if c == m {
                Ok(Shape::Vector(matmul_rows(a)))
            } else {
                Err(mismatch())
            }
        }
        (Shape::Matrix(r, c), Shape::Matrix(r2, c2)) => {
            if c == r2 {
                Ok(Shape::Matrix(r, c2))
            } else {
                Err(mismatch())
            }
        }
    }
}

fn matmul_rows(a: Shape) -> usize {
    match a {
        Shape::Matrix(r, _) => r,
        _ => 1,
    }
}
