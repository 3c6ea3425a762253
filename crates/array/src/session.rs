//! The session context
//!
//! A `Session` is the explicit capability object every array operation goes
//! through: it owns the engine and the peer channel for one party. Handles are
//! cheap clones of a shared context, so buffers can release their registers on
//! drop without a global engine.

use std::cell::RefCell;
use std::rc::Rc;

use secretnum_engine::{
    recv_shape, send_shape, Channel, DType, Engine, EngineConfig, LocalEngine, Matrix,
    MemoryChannel, Opcode, OperandKind, PartyId, PlainMatrix, Register, Seed,
};
use tracing::debug;

use crate::buffer::Buffer;
use crate::error::{ArrayError, Result};
use crate::plain::PlainArray;
use crate::shape::Shape;

struct SessionInner {
    engine: Box<dyn Engine>,
    channel: Box<dyn Channel>,
}

/// A per-party computation context.
#[derive(Clone)]
pub struct Session {
    inner: Rc<RefCell<SessionInner>>,
    party: PartyId,
}

impl Session {
    /// Bind a session to an engine and the channel to the single peer.
    pub fn new(engine: Box<dyn Engine>, channel: Box<dyn Channel>) -> Session {
        let party = engine.party_id();
        debug!(party, "session created");
        Session {
            inner: Rc::new(RefCell::new(SessionInner { engine, channel })),
            party,
        }
    }

    /// A single-process session over the reference engine, as party 0.
    pub fn in_process() -> Session {
        Self::in_process_with_config(EngineConfig::default())
    }

    /// A single-process session with an explicit engine configuration.
    pub fn in_process_with_config(config: EngineConfig) -> Session {
        let (local, _peer) = MemoryChannel::pair();
        Session::new(
            Box::new(LocalEngine::with_config(0, config)),
            Box::new(local),
        )
    }

    /// The party this session computes for.
    pub fn party(&self) -> PartyId {
        self.party
    }

    pub(crate) fn release_register(&self, register: Register) -> Result<()> {
        self.inner
            .borrow_mut()
            .engine
            .release(register)
            .map_err(Into::into)
    }

    fn allocate(&self, kind: OperandKind, seed: Seed, owner: Option<PartyId>) -> Result<Register> {
        self.inner
            .borrow_mut()
            .engine
            .allocate(kind, seed, owner)
            .map_err(Into::into)
    }

    /// Allocate an empty share register for an opcode output.
    pub(crate) fn new_share(&self, shape: Shape, dtype: DType) -> Result<Buffer> {
        let kind = OperandKind::share_of(dtype);
        let register = self.allocate(kind, Seed::Empty, None)?;
        Ok(Buffer::new(self.clone(), register, shape, dtype, kind))
    }

    /// Allocate a share register seeded with this party's raw share.
    pub(crate) fn new_share_seeded(
        &self,
        shape: Shape,
        dtype: DType,
        raw: Matrix<i64>,
    ) -> Result<Buffer> {
        let kind = OperandKind::share_of(dtype);
        let register = self.allocate(kind, Seed::RawShare(raw), None)?;
        Ok(Buffer::new(self.clone(), register, shape, dtype, kind))
    }

    /// Allocate a private register owned by `owner`, optionally staged with
    /// that party's plaintext.
    pub(crate) fn new_private(
        &self,
        shape: Shape,
        dtype: DType,
        data: Option<&PlainArray>,
        owner: PartyId,
    ) -> Result<Buffer> {
        let seed = match data {
            None => Seed::Empty,
            Some(plain) => {
                if plain.size() != shape.size() {
                    return Err(ArrayError::construction(format!(
                        "staged data has {} elements for shape {shape}",
                        plain.size()
                    )));
                }
                let plain = plain.reshaped(shape)?;
                match dtype {
                    DType::Numeric => Seed::Numeric(plain.to_inner_numeric()?),
                    DType::Boolean => Seed::Boolean(plain.to_inner_boolean()?),
                }
            }
        };
        let kind = OperandKind::private_of(dtype);
        let register = self.allocate(kind, seed, Some(owner))?;
        Ok(Buffer::new(self.clone(), register, shape, dtype, kind))
    }

    /// Allocate a public matrix register known identically to both parties.
    pub(crate) fn new_public_plain(&self, plain: &PlainArray) -> Result<Buffer> {
        let dtype = plain.dtype();
        let seed = match dtype {
            DType::Numeric => Seed::Numeric(plain.to_inner_numeric()?),
            DType::Boolean => Seed::Boolean(plain.to_inner_boolean()?),
        };
        let kind = OperandKind::public_of(dtype);
        let register = self.allocate(kind, seed, None)?;
        Ok(Buffer::new(self.clone(), register, plain.shape(), dtype, kind))
    }

    /// Allocate a public scalar register (bare numeric rhs operands).
    pub(crate) fn new_public_scalar(&self, value: f64) -> Result<Buffer> {
        let register = self.allocate(OperandKind::PublicScalar, Seed::Scalar(value), None)?;
        Ok(Buffer::new(
            self.clone(),
            register,
            Shape::Scalar,
            DType::Numeric,
            OperandKind::PublicScalar,
        ))
    }

    /// Allocate a public index register (opcode parameters).
    pub(crate) fn new_public_index(&self, value: i64) -> Result<Buffer> {
        let register = self.allocate(OperandKind::PublicIndex, Seed::Index(value), None)?;
        Ok(Buffer::new(
            self.clone(),
            register,
            Shape::Scalar,
            DType::Numeric,
            OperandKind::PublicIndex,
        ))
    }

    /// Stage plaintext in a private register, share it, and release the
    /// staging register. `data` is `None` on every party except the provider.
    pub(crate) fn make_share(
        &self,
        data: Option<&PlainArray>,
        shape: Shape,
        dtype: DType,
        provider: PartyId,
    ) -> Result<Buffer> {
        let private = self.new_private(shape, dtype, data, provider)?;
        let share = self.new_share(shape, dtype)?;
        self.execute(
            Opcode::Share,
            &[OperandKind::private_of(dtype), OperandKind::share_of(dtype)],
            &[&private, &share],
        )?;
        private.release()?;
        Ok(share)
    }

    /// Validate an opcode signature and dispatch it against live buffers.
    /// Validation happens here, before the engine is touched.
    pub(crate) fn execute(
        &self,
        opcode: Opcode,
        kinds: &[OperandKind],
        buffers: &[&Buffer],
    ) -> Result<()> {
        opcode.validate_kinds(kinds)?;
        let registers: Vec<Register> = buffers
            .iter()
            .map(|buffer| buffer.register())
            .collect::<Result<_>>()?;
        self.inner
            .borrow_mut()
            .engine
            .execute(opcode, kinds, &registers)
            .map_err(Into::into)
    }

    pub(crate) fn read_back(&self, buffer: &Buffer) -> Result<PlainMatrix> {
        let register = buffer.register()?;
        self.inner
            .borrow_mut()
            .engine
            .read_back(register)
            .map_err(Into::into)
    }

    pub(crate) fn export_share(&self, buffer: &Buffer) -> Result<Matrix<i64>> {
        let register = buffer.register()?;
        self.inner
            .borrow_mut()
            .engine
            .export_share(register)
            .map_err(Into::into)
    }

    /// Replace a buffer whose inner matrix is a column (or block) with a
    /// single-row register of the same logical shape. Block extraction and
    /// matrix multiply leave logically 1-D results stored column-wise; the
    /// row form is the canonical storage for rank-1 arrays.
    pub(crate) fn inner_flatten(&self, buffer: Buffer) -> Result<Buffer> {
        let shape = buffer.shape();
        let dtype = buffer.dtype();
        let out = self.new_share(shape, dtype)?;
        let rows = self.new_public_index(1)?;
        let cols = self.new_public_index(shape.size() as i64)?;
        let kind = buffer.kind();
        self.execute(
            Opcode::Reshape,
            &[kind, OperandKind::PublicIndex, OperandKind::PublicIndex, kind],
            &[&buffer, &rows, &cols, &out],
        )?;
        rows.release()?;
        cols.release()?;
        buffer.release()?;
        Ok(out)
    }

    pub(crate) fn send_shape(&self, dims: &[usize]) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        send_shape(inner.channel.as_mut(), dims).map_err(Into::into)
    }

    pub(crate) fn recv_shape(&self) -> Result<Vec<usize>> {
        let mut inner = self.inner.borrow_mut();
        recv_shape(inner.channel.as_mut()).map_err(Into::into)
    }
}
