//! Operand kind and dtype enums
//!
//! The engine's type system is the closed product {Private, Share, Public} ×
//! {numeric, boolean}, plus two public scalar kinds used for opcode
//! parameters (block offsets, reshape dimensions, sort keys).

/// Element type of a buffer. Fixed at creation; operations that change the
/// logical type always allocate a new buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DType {
    /// 64-bit float semantics (stored as fixed-point shares in the engine)
    Numeric,
    /// Boolean
    Boolean,
}

/// Who can see a value in plaintext.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Plaintext held by exactly one party
    Private,
    /// Secret-shared across both parties
    Share,
    /// Known identically to both parties
    Public,
}

/// The kind of value a register holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandKind {
    PrivateNumeric,
    PrivateBoolean,
    ShareNumeric,
    ShareBoolean,
    PublicNumeric,
    PublicBoolean,
    /// A single public f64
    PublicScalar,
    /// A single public integer (block offsets, dimensions, column keys)
    PublicIndex,
}

impl OperandKind {
    /// Visibility class of the kind.
    pub fn visibility(self) -> Visibility {
        match self {
            OperandKind::PrivateNumeric | OperandKind::PrivateBoolean => Visibility::Private,
            OperandKind::ShareNumeric | OperandKind::ShareBoolean => Visibility::Share,
            OperandKind::PublicNumeric
            | OperandKind::PublicBoolean
            | OperandKind::PublicScalar
            | OperandKind::PublicIndex => Visibility::Public,
        }
    }

    /// Element dtype for matrix kinds; `None` for the public scalar kinds.
    pub fn dtype(self) -> Option<DType> {
        match self {
            OperandKind::PrivateNumeric | OperandKind::ShareNumeric | OperandKind::PublicNumeric => {
                Some(DType::Numeric)
            }
            OperandKind::PrivateBoolean | OperandKind::ShareBoolean | OperandKind::PublicBoolean => {
                Some(DType::Boolean)
            }
            OperandKind::PublicScalar | OperandKind::PublicIndex => None,
        }
    }

    /// Share kind for a dtype.
    pub fn share_of(dtype: DType) -> Self {
        match dtype {
            DType::Numeric => OperandKind::ShareNumeric,
            DType::Boolean => OperandKind::ShareBoolean,
        }
    }

    /// Private kind for a dtype.
    pub fn private_of(dtype: DType) -> Self {
        match dtype {
            DType::Numeric => OperandKind::PrivateNumeric,
            DType::Boolean => OperandKind::PrivateBoolean,
        }
    }

    /// Public matrix kind for a dtype.
    pub fn public_of(dtype: DType) -> Self {
        match dtype {
            DType::Numeric => OperandKind::PublicNumeric,
            DType::Boolean => OperandKind::PublicBoolean,
        }
    }
}

impl std::fmt::Display for OperandKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self {
            OperandKind::PrivateNumeric => "pdm",
            OperandKind::PrivateBoolean => "pbm",
            OperandKind::ShareNumeric => "am",
            OperandKind::ShareBoolean => "bm",
            OperandKind::PublicNumeric => "cdm",
            OperandKind::PublicBoolean => "cbm",
            OperandKind::PublicScalar => "cd",
            OperandKind::PublicIndex => "ci",
        };
        f.write_str(tag)
    }
}
