//! Array-creation entry points
//!
//! Creating a secret array from one party's plaintext is the only operation
//! in this layer that talks to the peer directly: the provider sends the
//! shape over the channel so both parties agree on dimensions before shares
//! exist. The numpy-style helpers build a plaintext on both sides and then
//! go through the same path.

use secretnum_engine::{DType, PartyId};

use crate::array::{RawShare, SecureArray};
use crate::error::{ArrayError, Result};
use crate::plain::PlainArray;
use crate::session::Session;
use crate::shape::Shape;

/// Create a secret array from the provider party's plaintext. Every other
/// party passes `None` and learns only the shape.
pub fn array(
    session: &Session,
    data: Option<&PlainArray>,
    provider: PartyId,
    dtype: DType,
) -> Result<SecureArray> {
    let shape = if session.party() == provider {
        let data = data.ok_or_else(|| {
            ArrayError::construction("the providing party must supply plaintext data")
        })?;
        if data.dtype() != dtype {
            return Err(ArrayError::construction(format!(
                "data dtype {:?} does not match requested dtype {dtype:?}",
                data.dtype()
            )));
        }
        session.send_shape(&data.shape().dims())?;
        data.shape()
    } else {
        Shape::from_dims(&session.recv_shape()?)?
    };
    let staged = if session.party() == provider { data } else { None };
    let buffer = session.make_share(staged, shape, dtype, provider)?;
    Ok(SecureArray::from_buffer(buffer))
}

/// Rebuild a secret array from this party's exported raw share.
pub fn from_share(session: &Session, share: &RawShare, dtype: DType) -> Result<SecureArray> {
    let buffer = session.new_share_seeded(share.shape(), dtype, share.to_inner_matrix()?)?;
    Ok(SecureArray::from_buffer(buffer))
}

/// An array of the given shape filled with zeros.
pub fn zeros(session: &Session, shape: Shape, provider: PartyId) -> Result<SecureArray> {
    array(session, Some(&PlainArray::zeros(shape)), provider, DType::Numeric)
}

/// An array of the given shape filled with ones.
pub fn ones(session: &Session, shape: Shape, provider: PartyId) -> Result<SecureArray> {
    array(session, Some(&PlainArray::ones(shape)), provider, DType::Numeric)
}

/// An array of the given shape filled with one value.
pub fn full(session: &Session, shape: Shape, value: f64, provider: PartyId) -> Result<SecureArray> {
    array(session, Some(&PlainArray::full(shape, value)), provider, DType::Numeric)
}

/// An array of the given shape without meaningful contents.
pub fn empty(session: &Session, shape: Shape, provider: PartyId) -> Result<SecureArray> {
    zeros(session, shape, provider)
}

/// The n-by-n identity matrix.
pub fn identity(session: &Session, n: usize, provider: PartyId) -> Result<SecureArray> {
    array(session, Some(&PlainArray::identity(n)), provider, DType::Numeric)
}

/// Evenly spaced values over `[start, stop)`.
pub fn arange(
    session: &Session,
    start: f64,
    stop: f64,
    step: f64,
    provider: PartyId,
) -> Result<SecureArray> {
    array(
        session,
        Some(&PlainArray::arange(start, stop, step)?),
        provider,
        DType::Numeric,
    )
}

/// `num` evenly spaced samples over `[start, stop]`.
pub fn linspace(
    session: &Session,
    start: f64,
    stop: f64,
    num: usize,
    provider: PartyId,
) -> Result<SecureArray> {
    array(
        session,
        Some(&PlainArray::linspace(start, stop, num, true)),
        provider,
        DType::Numeric,
    )
}

/// `num` samples spaced evenly on a base-10 log scale.
pub fn logspace(
    session: &Session,
    start: f64,
    stop: f64,
    num: usize,
    provider: PartyId,
) -> Result<SecureArray> {
    array(
        session,
        Some(&PlainArray::logspace(start, stop, num, true, 10.0)),
        provider,
        DType::Numeric,
    )
}

/// A copy of the array.
pub fn copy(arr: &SecureArray) -> Result<SecureArray> {
    arr.copy()
}
