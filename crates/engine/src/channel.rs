//! Peer channel and the shape-exchange wire format
//!
//! The only network exchange owned by the array layer is the shape handshake
//! performed when materializing a secret array from one party's plaintext:
//! a 4-byte dimension count followed by that many 4-byte dimension sizes,
//! little-endian.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::Cursor;
use std::rc::Rc;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{EngineError, Result};

/// A dedicated byte channel to the single peer party.
pub trait Channel {
    /// Send raw bytes to the peer.
    fn send(&mut self, bytes: &[u8]) -> Result<()>;

    /// Receive exactly `len` bytes from the peer.
    fn recv(&mut self, len: usize) -> Result<Vec<u8>>;
}

/// Send a shape over the channel: dimension count, then each dimension size.
pub fn send_shape(channel: &mut dyn Channel, dims: &[usize]) -> Result<()> {
    let mut buf = Vec::with_capacity(4 + 4 * dims.len());
    buf.write_i32::<LittleEndian>(dims.len() as i32)?;
    for &dim in dims {
        if dim > i32::MAX as usize {
            return Err(EngineError::Wire(format!("dimension {dim} exceeds wire width")));
        }
        buf.write_i32::<LittleEndian>(dim as i32)?;
    }
    channel.send(&buf)
}

/// Receive a shape from the channel (inverse of [`send_shape`]).
pub fn recv_shape(channel: &mut dyn Channel) -> Result<Vec<usize>> {
    let header = channel.recv(4)?;
    let ndim = Cursor::new(header).read_i32::<LittleEndian>()?;
    if ndim < 0 {
        return Err(EngineError::Wire(format!("negative dimension count {ndim}")));
    }
    if ndim == 0 {
        return Ok(Vec::new());
    }
    let body = channel.recv(4 * ndim as usize)?;
    let mut cursor = Cursor::new(body);
    let mut dims = Vec::with_capacity(ndim as usize);
    for _ in 0..ndim {
        let dim = cursor.read_i32::<LittleEndian>()?;
        if dim < 0 {
            return Err(EngineError::Wire(format!("negative dimension size {dim}")));
        }
        dims.push(dim as usize);
    }
    Ok(dims)
}

/// In-memory channel endpoint for single-process setups and tests.
///
/// [`MemoryChannel::pair`] returns two crossed endpoints; bytes written on one
/// side become readable on the other. Reads are non-blocking: asking for more
/// bytes than the peer has sent is a wire error, not a stall.
pub struct MemoryChannel {
    incoming: Rc<RefCell<VecDeque<u8>>>,
    outgoing: Rc<RefCell<VecDeque<u8>>>,
}

impl MemoryChannel {
    /// Create a crossed pair of endpoints.
    pub fn pair() -> (MemoryChannel, MemoryChannel) {
        let a = Rc::new(RefCell::new(VecDeque::new()));
        let b = Rc::new(RefCell::new(VecDeque::new()));
        (
            MemoryChannel {
                incoming: a.clone(),
                outgoing: b.clone(),
            },
            MemoryChannel {
                incoming: b,
                outgoing: a,
            },
        )
    }
}

impl Channel for MemoryChannel {
    fn send(&mut self, bytes: &[u8]) -> Result<()> {
        self.outgoing.borrow_mut().extend(bytes.iter().copied());
        Ok(())
    }

    fn recv(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut queue = self.incoming.borrow_mut();
        if queue.len() < len {
            return Err(EngineError::Wire(format!(
                "peer sent {} bytes, need {}",
                queue.len(),
                len
            )));
        }
        Ok(queue.drain(..len).collect())
    }
}
