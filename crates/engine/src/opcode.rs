//! The opcode allow-list and per-opcode operand signatures
//!
//! Every opcode has a fixed operand layout (inputs first, output last, except
//! the in-place forms). [`Opcode::validate_kinds`] rejects any operand-kind
//! combination the engine does not support; the facade calls it before
//! dispatch so invalid calls never reach the engine, and engines call it
//! again as a contract check.

use crate::error::{EngineError, Result};
use crate::kind::OperandKind;

use OperandKind::*;

/// A named operation dispatched to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    Add,
    Sub,
    Mul,
    Div,
    Lt,
    Gt,
    Ge,
    Eq,
    Not,
    And,
    Or,
    Xor,
    Reveal,
    Share,
    Multiplexer,
    ArgmaxAndMax,
    QuickSort,
    Reshape,
    Resize,
    Transpose,
    MatMul,
    SetItem,
    GetItem,
    VStack,
    HStack,
    GroupbySum,
    GroupbyCount,
    GroupbyMax,
    GroupbyMin,
}

impl Opcode {
    /// Wire/mnemonic name of the opcode.
    pub fn name(self) -> &'static str {
        match self {
            Opcode::Add => "add",
            Opcode::Sub => "sub",
            Opcode::Mul => "mul",
            Opcode::Div => "div",
            Opcode::Lt => "lt",
            Opcode::Gt => "gt",
            Opcode::Ge => "ge",
            Opcode::Eq => "eq",
            Opcode::Not => "not",
            Opcode::And => "and",
            Opcode::Or => "or",
            Opcode::Xor => "xor",
            Opcode::Reveal => "reveal",
            Opcode::Share => "share",
            Opcode::Multiplexer => "multiplexer",
            Opcode::ArgmaxAndMax => "argmax_and_max",
            Opcode::QuickSort => "quick_sort",
            Opcode::Reshape => "reshape",
            Opcode::Resize => "resize",
            Opcode::Transpose => "transpose",
            Opcode::MatMul => "mat_mul",
            Opcode::SetItem => "set_item",
            Opcode::GetItem => "get_item",
            Opcode::VStack => "vstack",
            Opcode::HStack => "hstack",
            Opcode::GroupbySum => "groupby_sum",
            Opcode::GroupbyCount => "groupby_count",
            Opcode::GroupbyMax => "groupby_max",
            Opcode::GroupbyMin => "groupby_min",
        }
    }

    /// Check an operand-kind list against this opcode's signature.
    pub fn validate_kinds(self, kinds: &[OperandKind]) -> Result<()> {
        let ok = match self {
            // Arithmetic: share op (share | public matrix | public scalar)
            // -> share, numeric only
            Opcode::Add | Opcode::Sub | Opcode::Mul | Opcode::Div => matches!(
                kinds,
                [
                    ShareNumeric,
                    ShareNumeric | PublicNumeric | PublicScalar,
                    ShareNumeric
                ]
            ),
            // Comparisons produce boolean shares. `ge` has no public-rhs
            // variant; callers convert the rhs to a share first.
            Opcode::Lt | Opcode::Gt | Opcode::Eq => matches!(
                kinds,
                [
                    ShareNumeric,
                    ShareNumeric | PublicNumeric | PublicScalar,
                    ShareBoolean
                ]
            ),
            Opcode::Ge => matches!(kinds, [ShareNumeric, ShareNumeric, ShareBoolean]),
            Opcode::Not => matches!(kinds, [ShareBoolean, ShareBoolean]),
            Opcode::And | Opcode::Or | Opcode::Xor => {
                matches!(kinds, [ShareBoolean, ShareBoolean, ShareBoolean])
            }
            Opcode::Reveal => matches!(
                kinds,
                [ShareNumeric, PrivateNumeric] | [ShareBoolean, PrivateBoolean]
            ),
            Opcode::Share => matches!(
                kinds,
                [PrivateNumeric, ShareNumeric] | [PrivateBoolean, ShareBoolean]
            ),
            Opcode::Multiplexer => matches!(
                kinds,
                [ShareBoolean, ShareNumeric, ShareNumeric, ShareNumeric]
            ),
            Opcode::ArgmaxAndMax => {
                matches!(kinds, [ShareNumeric, ShareNumeric, ShareNumeric])
            }
            // One-operand form sorts in place; three-operand form sorts rows
            // by a public column key into a fresh register.
            Opcode::QuickSort => matches!(
                kinds,
                [ShareNumeric] | [ShareNumeric, PublicIndex, ShareNumeric]
            ),
            Opcode::Reshape | Opcode::Resize => matches!(
                kinds,
                [ShareNumeric, PublicIndex, PublicIndex, ShareNumeric]
                    | [ShareBoolean, PublicIndex, PublicIndex, ShareBoolean]
            ),
            Opcode::Transpose => matches!(
                kinds,
                [ShareNumeric, ShareNumeric] | [ShareBoolean, ShareBoolean]
            ),
            Opcode::MatMul => matches!(
                kinds,
                [ShareNumeric, ShareNumeric | PublicNumeric, ShareNumeric]
            ),
            Opcode::SetItem => matches!(
                kinds,
                [
                    ShareNumeric,
                    ShareNumeric,
                    PublicIndex,
                    PublicIndex,
                    PublicIndex,
                    PublicIndex
                ] | [
                    ShareBoolean,
                    ShareBoolean,
                    PublicIndex,
                    PublicIndex,
                    PublicIndex,
                    PublicIndex
                ]
            ),
            Opcode::GetItem => matches!(
                kinds,
                [
                    ShareNumeric,
                    PublicIndex,
                    PublicIndex,
                    PublicIndex,
                    PublicIndex,
                    ShareNumeric
                ] | [
                    ShareBoolean,
                    PublicIndex,
                    PublicIndex,
                    PublicIndex,
                    PublicIndex,
                    ShareBoolean
                ]
            ),
            Opcode::VStack | Opcode::HStack => {
                matches!(kinds, [ShareNumeric, ShareNumeric, ShareNumeric])
            }
            Opcode::GroupbySum | Opcode::GroupbyCount | Opcode::GroupbyMax | Opcode::GroupbyMin => {
                matches!(kinds, [ShareNumeric, ShareNumeric, ShareNumeric])
            }
        };

        if ok {
            Ok(())
        } else {
            Err(EngineError::UnsupportedOperation {
                opcode: self.name(),
                detail: format!(
                    "operand kinds [{}] not supported",
                    kinds
                        .iter()
                        .map(|k| k.to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            })
        }
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
