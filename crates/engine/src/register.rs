//! Register handles and party identifiers

/// A computing party. The layer supports exactly two: 0 and 1.
pub type PartyId = u8;

/// Opaque handle to a value held inside the engine.
///
/// Handles are engine-local; they carry no meaning to the peer party.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Register(u64);

impl Register {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw register address.
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for Register {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "r{}", self.0)
    }
}
