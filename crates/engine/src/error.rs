//! Engine error types

use secretnum_fixed_point::FixedPointError;
use thiserror::Error;

use crate::register::{PartyId, Register};

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Unsupported operation {opcode}: {detail}")]
    UnsupportedOperation { opcode: &'static str, detail: String },

    #[error("Register {0} is not live (never allocated or already released)")]
    DeadRegister(Register),

    #[error("Read-back denied: register owned by party {owner}, local party is {local}")]
    NotOwner { local: PartyId, owner: PartyId },

    #[error("Dimension mismatch: {context}")]
    Dimension { context: String },

    #[error("Fixed-point error: {0}")]
    FixedPoint(#[from] FixedPointError),

    #[error("Channel I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed shape exchange: {0}")]
    Wire(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
