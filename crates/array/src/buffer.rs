//! Owning buffer handles
//!
//! A `Buffer` binds a logical shape and dtype to one engine register and owns
//! that register exclusively. The register is released exactly once: either
//! explicitly through [`Buffer::release`], which surfaces engine errors, or
//! on drop as a backstop. After release the handle is permanently dead.

use secretnum_engine::{DType, OperandKind, Register};
use tracing::warn;

use crate::error::{ArrayError, Result};
use crate::session::Session;
use crate::shape::Shape;

pub(crate) struct Buffer {
    session: Session,
    register: Option<Register>,
    shape: Shape,
    dtype: DType,
    kind: OperandKind,
}

impl Buffer {
    pub(crate) fn new(
        session: Session,
        register: Register,
        shape: Shape,
        dtype: DType,
        kind: OperandKind,
    ) -> Buffer {
        Buffer { session, register: Some(register), shape, dtype, kind }
    }

    pub(crate) fn shape(&self) -> Shape {
        self.shape
    }

    pub(crate) fn dtype(&self) -> DType {
        self.dtype
    }

    pub(crate) fn kind(&self) -> OperandKind {
        self.kind
    }

    pub(crate) fn session(&self) -> &Session {
        &self.session
    }

    /// The live register, or a lifecycle error if the buffer was released.
    pub(crate) fn register(&self) -> Result<Register> {
        self.register
            .ok_or_else(|| ArrayError::lifecycle("buffer used after release"))
    }

    /// Release the register now, propagating engine failures.
    pub(crate) fn release(mut self) -> Result<()> {
        match self.register.take() {
            Some(register) => self.session.release_register(register),
            None => Ok(()),
        }
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        if let Some(register) = self.register.take() {
            if let Err(err) = self.session.release_register(register) {
                warn!(%register, error = %err, "register release failed during drop");
            }
        }
    }
}
