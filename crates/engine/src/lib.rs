//! Secretnum Engine Contract
//!
//! The secure-computation engine is an external collaborator: it holds every
//! array value as an opaque register and executes opcodes drawn from a fixed
//! allow-list. This crate pins down that contract: register handles, operand
//! kinds, the opcode allow-list with per-opcode operand signatures, and the
//! shape-exchange wire format. It also provides [`LocalEngine`], an in-process
//! reference engine that honors the full contract while executing opcodes on
//! plaintext.
//!
//! Both parties must issue matching opcodes in matching order; that discipline
//! belongs to the callers and cannot be verified here beyond symmetric code
//! paths.

mod channel;
mod config;
mod error;
mod kind;
mod local;
mod matrix;
mod opcode;
mod register;

pub use channel::{recv_shape, send_shape, Channel, MemoryChannel};
pub use config::EngineConfig;
pub use error::{EngineError, Result};
pub use kind::{DType, OperandKind, Visibility};
pub use local::LocalEngine;
pub use matrix::{Matrix, PlainMatrix};
pub use opcode::Opcode;
pub use register::{PartyId, Register};

/// Seed data supplied when allocating a register.
///
/// `Empty` allocates an output register the engine will write into; the other
/// variants stage a party's plaintext, a raw share, or a public value.
#[derive(Debug, Clone)]
pub enum Seed {
    Empty,
    Numeric(Matrix<f64>),
    Boolean(Matrix<bool>),
    RawShare(Matrix<i64>),
    Scalar(f64),
    Index(i64),
}

/// The engine contract.
///
/// Contract obligations of callers: allocate the output register before
/// dispatching an opcode that writes to it, supply operand registers in the
/// exact kind order the opcode expects, and never touch a register after
/// [`Engine::release`]. All engine calls are synchronous; an opcode returns
/// only after any underlying multi-party exchange completes.
pub trait Engine {
    /// The party this engine instance computes for.
    fn party_id(&self) -> PartyId;

    /// Allocate a register of the given kind.
    ///
    /// `owner` must be `Some` for private kinds (the party whose plaintext the
    /// buffer stages) and `None` otherwise.
    fn allocate(&mut self, kind: OperandKind, seed: Seed, owner: Option<PartyId>)
        -> Result<Register>;

    /// Execute an opcode against live registers. The declared operand kinds
    /// must match the registers' actual kinds; unknown opcode/kind
    /// combinations are rejected before any work happens.
    fn execute(&mut self, opcode: Opcode, kinds: &[OperandKind], regs: &[Register]) -> Result<()>;

    /// Read plaintext out of a private register. Only legal for the owning
    /// party.
    fn read_back(&mut self, reg: Register) -> Result<PlainMatrix>;

    /// Export the calling party's raw share of a share register as fixed-width
    /// integers.
    fn export_share(&mut self, reg: Register) -> Result<Matrix<i64>>;

    /// Release a register. Every register must be released exactly once;
    /// releasing twice or using a released register is an error.
    fn release(&mut self, reg: Register) -> Result<()>;
}
