//! Secretnum Array Layer
//!
//! A numpy-like rank-0/1/2 array abstraction whose element values exist only
//! as cryptographic shares inside a secure-computation engine. This crate is
//! the abstraction layer: shape and dtype bookkeeping, index-to-block
//! translation, broadcasting, buffer lifecycle, and the opcode dispatch that
//! turns array operations into engine calls. The cryptographic protocols and
//! the transport live behind the [`secretnum_engine`] contract.
//!
//! Everything goes through an explicit [`Session`]: the per-party context
//! owning the engine and the peer channel. Both parties must run the same
//! sequence of operations; that symmetry is a caller obligation.

mod array;
mod broadcast;
mod buffer;
mod creation;
mod error;
mod groupby;
mod index;
mod linalg;
mod manipulation;
mod math;
mod plain;
mod session;
mod shape;
mod sort_search;
mod statistics;

pub use array::{Operand, RawShare, SecureArray};
pub use creation::{
    arange, array, copy, empty, from_share, full, identity, linspace, logspace, ones, zeros,
};
pub use error::{ArrayError, Result};
pub use groupby::{groupby_count, groupby_max, groupby_min, groupby_sum};
pub use index::{ArrayIndex, AxisIndex, Block};
pub use linalg::{dot, inner};
pub use manipulation::{
    column_stack, concatenate, hstack, reshape, resize, row_stack, vstack,
};
pub use math::{max, min, prod, sum};
pub use plain::PlainArray;
pub use session::Session;
pub use shape::Shape;
pub use sort_search::{argmax, argmax_and_max, argmin, argmin_and_min, select, sort};
pub use statistics::{average, mean, ptp};

pub use secretnum_engine::{DType, EngineConfig, PartyId};
