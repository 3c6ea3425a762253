//! In-process reference engine
//!
//! `LocalEngine` honors the full register/opcode contract (kind signatures,
//! eager rejection of unsupported combinations, strict lifecycle with
//! zeroization of released share material) while executing opcodes on
//! plaintext. Arithmetic shares are stored as fixed-point i64 raws; the
//! "sharing" is the degenerate additive split whose peer share is identically
//! zero, so share export/import is the fixed-point encoding itself and is
//! exactly round-trippable within one process. Randomized sharing and the
//! cryptographic protocols live in the external production engine.

use std::collections::HashMap;

use secretnum_fixed_point::{Fixed, FixedVector};
use tracing::{debug, trace};
use zeroize::Zeroize;

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::kind::{OperandKind, Visibility};
use crate::matrix::{Matrix, PlainMatrix};
use crate::opcode::Opcode;
use crate::register::{PartyId, Register};
use crate::{Engine, Seed};

enum Slot {
    PrivateNumeric {
        owner: PartyId,
        data: Option<Matrix<f64>>,
    },
    PrivateBoolean {
        owner: PartyId,
        data: Option<Matrix<bool>>,
    },
    ShareNumeric(Matrix<i64>),
    ShareBoolean(Matrix<bool>),
    PublicNumeric(Matrix<f64>),
    PublicBoolean(Matrix<bool>),
    PublicScalar(f64),
    PublicIndex(i64),
}

impl Slot {
    fn kind(&self) -> OperandKind {
        match self {
            Slot::PrivateNumeric { .. } => OperandKind::PrivateNumeric,
            Slot::PrivateBoolean { .. } => OperandKind::PrivateBoolean,
            Slot::ShareNumeric(_) => OperandKind::ShareNumeric,
            Slot::ShareBoolean(_) => OperandKind::ShareBoolean,
            Slot::PublicNumeric(_) => OperandKind::PublicNumeric,
            Slot::PublicBoolean(_) => OperandKind::PublicBoolean,
            Slot::PublicScalar(_) => OperandKind::PublicScalar,
            Slot::PublicIndex(_) => OperandKind::PublicIndex,
        }
    }
}

/// The in-process reference engine.
pub struct LocalEngine {
    party: PartyId,
    config: EngineConfig,
    slots: HashMap<u64, Slot>,
    next_addr: u64,
}

impl LocalEngine {
    /// Create an engine computing for the given party with default config.
    pub fn new(party: PartyId) -> Self {
        Self::with_config(party, EngineConfig::default())
    }

    /// Create an engine with an explicit configuration.
    pub fn with_config(party: PartyId, config: EngineConfig) -> Self {
        Self {
            party,
            config,
            slots: HashMap::new(),
            next_addr: 0,
        }
    }

    /// Number of live registers (used by lifecycle tests).
    pub fn live_registers(&self) -> usize {
        self.slots.len()
    }

    fn insert(&mut self, slot: Slot) -> Register {
        let reg = Register::new(self.next_addr);
        self.next_addr += 1;
        self.slots.insert(reg.raw(), slot);
        reg
    }

    fn slot(&self, reg: Register) -> Result<&Slot> {
        self.slots
            .get(&reg.raw())
            .ok_or(EngineError::DeadRegister(reg))
    }

    fn store(&mut self, reg: Register, slot: Slot) -> Result<()> {
        match self.slots.get_mut(&reg.raw()) {
            Some(entry) => {
                *entry = slot;
                Ok(())
            }
            None => Err(EngineError::DeadRegister(reg)),
        }
    }

    fn encode(&self, m: &Matrix<f64>) -> Result<Matrix<i64>> {
        let encoded = FixedVector::from_f64_slice(m.data(), self.config.scale)?;
        Matrix::new(m.rows(), m.cols(), encoded.data)
    }

    fn decode(&self, m: &Matrix<i64>) -> Matrix<f64> {
        let factor = (1u64 << self.config.scale) as f64;
        m.map(|raw| raw as f64 / factor)
    }

    fn encode_scalar(&self, v: f64) -> Result<i64> {
        Ok(Fixed::from_f64(v, self.config.scale)?.raw)
    }

    fn share_numeric(&self, reg: Register) -> Result<Matrix<i64>> {
        match self.slot(reg)? {
            Slot::ShareNumeric(m) => Ok(m.clone()),
            other => Err(unexpected("share_numeric", other.kind())),
        }
    }

    fn share_boolean(&self, reg: Register) -> Result<Matrix<bool>> {
        match self.slot(reg)? {
            Slot::ShareBoolean(m) => Ok(m.clone()),
            other => Err(unexpected("share_boolean", other.kind())),
        }
    }

    /// A numeric operand as fixed-point raws: either an arithmetic share or a
    /// public matrix encoded on the fly.
    fn numeric_raws(&self, reg: Register) -> Result<Matrix<i64>> {
        match self.slot(reg)? {
            Slot::ShareNumeric(m) => Ok(m.clone()),
            Slot::PublicNumeric(m) => self.encode(m),
            other => Err(unexpected("numeric operand", other.kind())),
        }
    }

    /// A numeric rhs sized to the lhs dims; a public scalar replicates.
    fn rhs_raws(&self, reg: Register, dims: (usize, usize)) -> Result<Matrix<i64>> {
        match self.slot(reg)? {
            Slot::PublicScalar(v) => {
                let raw = self.encode_scalar(*v)?;
                Matrix::new(dims.0, dims.1, vec![raw; dims.0 * dims.1])
            }
            _ => self.numeric_raws(reg),
        }
    }

    fn index(&self, reg: Register) -> Result<i64> {
        match self.slot(reg)? {
            Slot::PublicIndex(v) => Ok(*v),
            other => Err(unexpected("public index", other.kind())),
        }
    }

    fn check_same_dims(op: Opcode, a_dims: (usize, usize), b_dims: (usize, usize)) -> Result<()> {
        if a_dims != b_dims {
            return Err(EngineError::Dimension {
                context: format!(
                    "{op}: operand dims {}x{} vs {}x{}",
                    a_dims.0, a_dims.1, b_dims.0, b_dims.1
                ),
            });
        }
        Ok(())
    }

    fn vector_binop(
        &mut self,
        op: Opcode,
        regs: &[Register],
        f: fn(&FixedVector, &FixedVector) -> secretnum_fixed_point::Result<FixedVector>,
    ) -> Result<()> {
        let a = self.share_numeric(regs[0])?;
        let b = self.rhs_raws(regs[1], (a.rows(), a.cols()))?;
        Self::check_same_dims(op, (a.rows(), a.cols()), (b.rows(), b.cols()))?;
        let (rows, cols) = (a.rows(), a.cols());
        let scale = self.config.scale;
        let out = f(
            &FixedVector::from_raw(a.into_data(), scale),
            &FixedVector::from_raw(b.into_data(), scale),
        )?;
        self.store(regs[2], Slot::ShareNumeric(Matrix::new(rows, cols, out.data)?))
    }

    fn raw_binop<F: Fn(i64, i64) -> Result<i64>>(
        &mut self,
        op: Opcode,
        regs: &[Register],
        f: F,
    ) -> Result<()> {
        let a = self.share_numeric(regs[0])?;
        let b = self.rhs_raws(regs[1], (a.rows(), a.cols()))?;
        Self::check_same_dims(op, (a.rows(), a.cols()), (b.rows(), b.cols()))?;
        let mut data = Vec::with_capacity(a.len());
        for (&x, &y) in a.data().iter().zip(b.data()) {
            data.push(f(x, y)?);
        }
        let out = Matrix::new(a.rows(), a.cols(), data)?;
        self.store(regs[2], Slot::ShareNumeric(out))
    }

    fn compare(&mut self, op: Opcode, regs: &[Register], f: fn(i64, i64) -> bool) -> Result<()> {
        let a = self.share_numeric(regs[0])?;
        let b = self.rhs_raws(regs[1], (a.rows(), a.cols()))?;
        Self::check_same_dims(op, (a.rows(), a.cols()), (b.rows(), b.cols()))?;
        let data = a
            .data()
            .iter()
            .zip(b.data())
            .map(|(&x, &y)| f(x, y))
            .collect();
        let out = Matrix::new(a.rows(), a.cols(), data)?;
        self.store(regs[2], Slot::ShareBoolean(out))
    }

    fn logical_binop(&mut self, op: Opcode, regs: &[Register], f: fn(bool, bool) -> bool) -> Result<()> {
        let a = self.share_boolean(regs[0])?;
        let b = self.share_boolean(regs[1])?;
        Self::check_same_dims(op, (a.rows(), a.cols()), (b.rows(), b.cols()))?;
        let data = a
            .data()
            .iter()
            .zip(b.data())
            .map(|(&x, &y)| f(x, y))
            .collect();
        let out = Matrix::new(a.rows(), a.cols(), data)?;
        self.store(regs[2], Slot::ShareBoolean(out))
    }

    fn exec_reveal(&mut self, regs: &[Register]) -> Result<()> {
        let plain = match self.slot(regs[0])? {
            Slot::ShareNumeric(m) => PlainMatrix::Numeric(self.decode(m)),
            Slot::ShareBoolean(m) => PlainMatrix::Boolean(m.clone()),
            other => return Err(unexpected("reveal source", other.kind())),
        };
        // The plaintext is staged for the target's private buffer; read-back
        // still gates on ownership.
        match (self.slots.get_mut(&regs[1].raw()), plain) {
            (Some(Slot::PrivateNumeric { data, .. }), PlainMatrix::Numeric(m)) => {
                *data = Some(m);
                Ok(())
            }
            (Some(Slot::PrivateBoolean { data, .. }), PlainMatrix::Boolean(m)) => {
                *data = Some(m);
                Ok(())
            }
            (None, _) => Err(EngineError::DeadRegister(regs[1])),
            (Some(slot), _) => Err(unexpected("reveal target", slot.kind())),
        }
    }

    fn exec_share(&mut self, regs: &[Register]) -> Result<()> {
        let out = match self.slot(regs[0])? {
            Slot::PrivateNumeric { data: Some(m), .. } => Slot::ShareNumeric(self.encode(m)?),
            Slot::PrivateBoolean { data: Some(m), .. } => Slot::ShareBoolean(m.clone()),
            Slot::PrivateNumeric { data: None, .. } | Slot::PrivateBoolean { data: None, .. } => {
                return Err(EngineError::UnsupportedOperation {
                    opcode: "share",
                    detail: "reference engine requires the providing party's plaintext in-process"
                        .into(),
                })
            }
            other => return Err(unexpected("share source", other.kind())),
        };
        self.store(regs[1], out)
    }

    fn exec_multiplexer(&mut self, regs: &[Register]) -> Result<()> {
        let cond = self.share_boolean(regs[0])?;
        let on_false = self.share_numeric(regs[1])?;
        let on_true = self.share_numeric(regs[2])?;
        Self::check_same_dims(
            Opcode::Multiplexer,
            (cond.rows(), cond.cols()),
            (on_true.rows(), on_true.cols()),
        )?;
        Self::check_same_dims(
            Opcode::Multiplexer,
            (cond.rows(), cond.cols()),
            (on_false.rows(), on_false.cols()),
        )?;
        let data = cond
            .data()
            .iter()
            .zip(on_true.data().iter().zip(on_false.data()))
            .map(|(&c, (&t, &f))| if c { t } else { f })
            .collect();
        let out = Matrix::new(cond.rows(), cond.cols(), data)?;
        self.store(regs[3], Slot::ShareNumeric(out))
    }

    fn exec_argmax_and_max(&mut self, regs: &[Register]) -> Result<()> {
        let src = self.share_numeric(regs[0])?;
        if src.rows() == 0 || src.cols() == 0 {
            return Err(EngineError::Dimension {
                context: "argmax_and_max of an empty matrix".into(),
            });
        }
        let mut idx = Vec::with_capacity(src.cols());
        let mut val = Vec::with_capacity(src.cols());
        for c in 0..src.cols() {
            let mut best_row = 0usize;
            let mut best = src.get(0, c);
            for r in 1..src.rows() {
                if src.get(r, c) > best {
                    best = src.get(r, c);
                    best_row = r;
                }
            }
            idx.push(self.encode_scalar(best_row as f64)?);
            val.push(best);
        }
        let cols = src.cols();
        self.store(regs[1], Slot::ShareNumeric(Matrix::new(1, cols, idx)?))?;
        self.store(regs[2], Slot::ShareNumeric(Matrix::new(1, cols, val)?))
    }

    fn exec_quick_sort(&mut self, regs: &[Register]) -> Result<()> {
        if regs.len() == 1 {
            // In-place flat sort; the fixed encoding is monotone so sorting
            // raws sorts values.
            let m = self.share_numeric(regs[0])?;
            let (rows, cols) = (m.rows(), m.cols());
            let mut data = m.into_data();
            data.sort_unstable();
            self.store(regs[0], Slot::ShareNumeric(Matrix::new(rows, cols, data)?))
        } else {
            let src = self.share_numeric(regs[0])?;
            let key = self.index(regs[1])?;
            if key < 0 || key as usize >= src.cols() {
                return Err(EngineError::Dimension {
                    context: format!("sort key column {key} out of {} columns", src.cols()),
                });
            }
            let key = key as usize;
            let mut order: Vec<usize> = (0..src.rows()).collect();
            order.sort_by_key(|&r| src.get(r, key));
            let mut data = Vec::with_capacity(src.len());
            for &r in &order {
                for c in 0..src.cols() {
                    data.push(src.get(r, c));
                }
            }
            let out = Matrix::new(src.rows(), src.cols(), data)?;
            self.store(regs[2], Slot::ShareNumeric(out))
        }
    }

    fn exec_reshape(&mut self, regs: &[Register], resize: bool) -> Result<()> {
        let rows = self.index(regs[1])?;
        let cols = self.index(regs[2])?;
        if rows < 0 || cols < 0 {
            return Err(EngineError::Dimension {
                context: format!("target dims {rows}x{cols} must be non-negative"),
            });
        }
        let (rows, cols) = (rows as usize, cols as usize);
        let out = match self.slot(regs[0])? {
            Slot::ShareNumeric(m) => Slot::ShareNumeric(if resize {
                m.resized(rows, cols, 0)
            } else {
                m.reshaped(rows, cols)?
            }),
            Slot::ShareBoolean(m) => Slot::ShareBoolean(if resize {
                m.resized(rows, cols, false)
            } else {
                m.reshaped(rows, cols)?
            }),
            other => return Err(unexpected("reshape source", other.kind())),
        };
        self.store(regs[3], out)
    }

    fn exec_transpose(&mut self, regs: &[Register]) -> Result<()> {
        let out = match self.slot(regs[0])? {
            Slot::ShareNumeric(m) => Slot::ShareNumeric(m.transposed()),
            Slot::ShareBoolean(m) => Slot::ShareBoolean(m.transposed()),
            other => return Err(unexpected("transpose source", other.kind())),
        };
        self.store(regs[1], out)
    }

    fn exec_mat_mul(&mut self, regs: &[Register]) -> Result<()> {
        let a = self.decode(&self.share_numeric(regs[0])?);
        let b = self.decode(&self.numeric_raws(regs[1])?);
        if a.cols() != b.rows() {
            return Err(EngineError::Dimension {
                context: format!(
                    "mat_mul: {}x{} @ {}x{}",
                    a.rows(),
                    a.cols(),
                    b.rows(),
                    b.cols()
                ),
            });
        }
        let mut data = Vec::with_capacity(a.rows() * b.cols());
        for r in 0..a.rows() {
            for c in 0..b.cols() {
                let mut acc = 0.0;
                for k in 0..a.cols() {
                    acc += a.get(r, k) * b.get(k, c);
                }
                data.push(acc);
            }
        }
        let out = self.encode(&Matrix::new(a.rows(), b.cols(), data)?)?;
        self.store(regs[2], Slot::ShareNumeric(out))
    }

    fn block_params(&self, regs: &[Register], offset: usize) -> Result<(usize, usize, usize, usize)> {
        let vals: Vec<i64> = (0..4)
            .map(|i| self.index(regs[offset + i]))
            .collect::<Result<_>>()?;
        if vals.iter().any(|&v| v < 0) {
            return Err(EngineError::Dimension {
                context: format!("negative block parameter in {vals:?}"),
            });
        }
        Ok((
            vals[0] as usize,
            vals[1] as usize,
            vals[2] as usize,
            vals[3] as usize,
        ))
    }

    fn check_block(
        op: Opcode,
        dims: (usize, usize),
        (rs, cs, rn, cn): (usize, usize, usize, usize),
    ) -> Result<()> {
        if rs + rn > dims.0 || cs + cn > dims.1 {
            return Err(EngineError::Dimension {
                context: format!(
                    "{op}: block ({rs},{cs})+({rn},{cn}) exceeds {}x{}",
                    dims.0, dims.1
                ),
            });
        }
        Ok(())
    }

    fn exec_set_item(&mut self, regs: &[Register]) -> Result<()> {
        let block = self.block_params(regs, 2)?;
        let (rs, cs, rn, cn) = block;
        enum Value {
            Numeric(Matrix<i64>),
            Boolean(Matrix<bool>),
        }
        let value = match self.slot(regs[0])? {
            Slot::ShareNumeric(m) => Value::Numeric(m.clone()),
            Slot::ShareBoolean(m) => Value::Boolean(m.clone()),
            other => return Err(unexpected("set_item value", other.kind())),
        };
        let value_len = match &value {
            Value::Numeric(m) => m.len(),
            Value::Boolean(m) => m.len(),
        };
        if value_len != rn * cn {
            return Err(EngineError::Dimension {
                context: format!("set_item: value has {value_len} elements, block needs {}", rn * cn),
            });
        }
        match (self.slots.get_mut(&regs[1].raw()), value) {
            (Some(Slot::ShareNumeric(dst)), Value::Numeric(v)) => {
                Self::check_block(Opcode::SetItem, (dst.rows(), dst.cols()), block)?;
                for i in 0..rn {
                    for j in 0..cn {
                        dst.set(rs + i, cs + j, v.data()[i * cn + j]);
                    }
                }
                Ok(())
            }
            (Some(Slot::ShareBoolean(dst)), Value::Boolean(v)) => {
                Self::check_block(Opcode::SetItem, (dst.rows(), dst.cols()), block)?;
                for i in 0..rn {
                    for j in 0..cn {
                        dst.set(rs + i, cs + j, v.data()[i * cn + j]);
                    }
                }
                Ok(())
            }
            (None, _) => Err(EngineError::DeadRegister(regs[1])),
            (Some(slot), _) => Err(unexpected("set_item target", slot.kind())),
        }
    }

    fn exec_get_item(&mut self, regs: &[Register]) -> Result<()> {
        let block = self.block_params(regs, 1)?;
        let (rs, cs, rn, cn) = block;
        let out = match self.slot(regs[0])? {
            Slot::ShareNumeric(m) => {
                Self::check_block(Opcode::GetItem, (m.rows(), m.cols()), block)?;
                Slot::ShareNumeric(m.block(rs, cs, rn, cn))
            }
            Slot::ShareBoolean(m) => {
                Self::check_block(Opcode::GetItem, (m.rows(), m.cols()), block)?;
                Slot::ShareBoolean(m.block(rs, cs, rn, cn))
            }
            other => return Err(unexpected("get_item source", other.kind())),
        };
        self.store(regs[5], out)
    }

    fn exec_stack(&mut self, op: Opcode, regs: &[Register]) -> Result<()> {
        let a = self.share_numeric(regs[0])?;
        let b = self.share_numeric(regs[1])?;
        let out = if op == Opcode::VStack {
            if a.cols() != b.cols() {
                return Err(EngineError::Dimension {
                    context: format!("vstack: {} vs {} columns", a.cols(), b.cols()),
                });
            }
            let mut data = a.data().to_vec();
            data.extend_from_slice(b.data());
            Matrix::new(a.rows() + b.rows(), a.cols(), data)?
        } else {
            if a.rows() != b.rows() {
                return Err(EngineError::Dimension {
                    context: format!("hstack: {} vs {} rows", a.rows(), b.rows()),
                });
            }
            let mut data = Vec::with_capacity(a.len() + b.len());
            for r in 0..a.rows() {
                for c in 0..a.cols() {
                    data.push(a.get(r, c));
                }
                for c in 0..b.cols() {
                    data.push(b.get(r, c));
                }
            }
            Matrix::new(a.rows(), a.cols() + b.cols(), data)?
        };
        self.store(regs[2], Slot::ShareNumeric(out))
    }

    fn exec_groupby(&mut self, op: Opcode, regs: &[Register]) -> Result<()> {
        let x = self.share_numeric(regs[0])?;
        let enc = self.decode(&self.share_numeric(regs[1])?);
        if x.rows() != enc.rows() {
            return Err(EngineError::Dimension {
                context: format!("{op}: {} data rows vs {} encoding rows", x.rows(), enc.rows()),
            });
        }
        let (cols, groups) = (x.cols(), enc.cols());
        let mut data = Vec::with_capacity(cols * groups);
        for c in 0..cols {
            for g in 0..groups {
                let members = (0..x.rows()).filter(|&r| enc.get(r, g) > 0.5);
                let raw = match op {
                    Opcode::GroupbySum => {
                        members.fold(0i64, |acc, r| acc.wrapping_add(x.get(r, c)))
                    }
                    Opcode::GroupbyCount => {
                        self.encode_scalar(members.count() as f64)?
                    }
                    Opcode::GroupbyMax => members.map(|r| x.get(r, c)).max().unwrap_or(0),
                    Opcode::GroupbyMin => members.map(|r| x.get(r, c)).min().unwrap_or(0),
                    _ => unreachable!("not a groupby opcode"),
                };
                data.push(raw);
            }
        }
        let out = Matrix::new(cols, groups, data)?;
        self.store(regs[2], Slot::ShareNumeric(out))
    }
}

impl Engine for LocalEngine {
    fn party_id(&self) -> PartyId {
        self.party
    }

    fn allocate(
        &mut self,
        kind: OperandKind,
        seed: Seed,
        owner: Option<PartyId>,
    ) -> Result<Register> {
        // Exactly the private kinds carry an owner.
        if owner.is_some() != (kind.visibility() == Visibility::Private) {
            return Err(EngineError::UnsupportedOperation {
                opcode: "allocate",
                detail: format!("kind {kind} with owner {owner:?}"),
            });
        }
        let slot = match (kind, seed, owner) {
            (OperandKind::PrivateNumeric, Seed::Numeric(m), Some(owner)) => {
                Slot::PrivateNumeric { owner, data: Some(m) }
            }
            (OperandKind::PrivateNumeric, Seed::Empty, Some(owner)) => {
                Slot::PrivateNumeric { owner, data: None }
            }
            (OperandKind::PrivateBoolean, Seed::Boolean(m), Some(owner)) => {
                Slot::PrivateBoolean { owner, data: Some(m) }
            }
            (OperandKind::PrivateBoolean, Seed::Empty, Some(owner)) => {
                Slot::PrivateBoolean { owner, data: None }
            }
            (OperandKind::ShareNumeric, Seed::RawShare(m), None) => Slot::ShareNumeric(m),
            (OperandKind::ShareNumeric, Seed::Empty, None) => {
                Slot::ShareNumeric(Matrix::new(0, 0, Vec::new())?)
            }
            (OperandKind::ShareBoolean, Seed::RawShare(m), None) => {
                Slot::ShareBoolean(m.map(|v| v != 0))
            }
            (OperandKind::ShareBoolean, Seed::Empty, None) => {
                Slot::ShareBoolean(Matrix::new(0, 0, Vec::new())?)
            }
            (OperandKind::PublicNumeric, Seed::Numeric(m), None) => Slot::PublicNumeric(m),
            (OperandKind::PublicBoolean, Seed::Boolean(m), None) => Slot::PublicBoolean(m),
            (OperandKind::PublicScalar, Seed::Scalar(v), None) => Slot::PublicScalar(v),
            (OperandKind::PublicIndex, Seed::Index(v), None) => Slot::PublicIndex(v),
            (kind, seed, owner) => {
                return Err(EngineError::UnsupportedOperation {
                    opcode: "allocate",
                    detail: format!(
                        "kind {kind} with {} seed and owner {owner:?}",
                        seed_name(&seed)
                    ),
                })
            }
        };
        let reg = self.insert(slot);
        debug!(register = %reg, kind = %kind, "allocate");
        Ok(reg)
    }

    fn execute(&mut self, opcode: Opcode, kinds: &[OperandKind], regs: &[Register]) -> Result<()> {
        opcode.validate_kinds(kinds)?;
        if kinds.len() != regs.len() {
            return Err(EngineError::UnsupportedOperation {
                opcode: opcode.name(),
                detail: format!("{} kinds declared for {} registers", kinds.len(), regs.len()),
            });
        }
        for (&reg, &kind) in regs.iter().zip(kinds) {
            let actual = self.slot(reg)?.kind();
            if actual != kind {
                return Err(EngineError::UnsupportedOperation {
                    opcode: opcode.name(),
                    detail: format!("register {reg} declared {kind} but holds {actual}"),
                });
            }
        }
        trace!(opcode = %opcode, registers = ?regs, "execute");

        let scale = self.config.scale;
        match opcode {
            Opcode::Add => self.vector_binop(opcode, regs, FixedVector::add),
            Opcode::Sub => self.vector_binop(opcode, regs, FixedVector::sub),
            Opcode::Mul => self.raw_binop(opcode, regs, move |a, b| {
                Ok(Fixed::from_raw(a, scale)?.mul(Fixed::from_raw(b, scale)?)?.raw)
            }),
            Opcode::Div => {
                let factor = (1u64 << scale) as f64;
                self.raw_binop(opcode, regs, move |a, b| {
                    let q = (a as f64 / factor) / (b as f64 / factor);
                    Ok(Fixed::from_f64(q, scale)?.raw)
                })
            }
            Opcode::Lt => self.compare(opcode, regs, |a, b| a < b),
            Opcode::Gt => self.compare(opcode, regs, |a, b| a > b),
            Opcode::Ge => self.compare(opcode, regs, |a, b| a >= b),
            Opcode::Eq => self.compare(opcode, regs, |a, b| a == b),
            Opcode::Not => {
                let m = self.share_boolean(regs[0])?;
                self.store(regs[1], Slot::ShareBoolean(m.map(|v| !v)))
            }
            Opcode::And => self.logical_binop(opcode, regs, |a, b| a & b),
            Opcode::Or => self.logical_binop(opcode, regs, |a, b| a | b),
            Opcode::Xor => self.logical_binop(opcode, regs, |a, b| a ^ b),
            Opcode::Reveal => self.exec_reveal(regs),
            Opcode::Share => self.exec_share(regs),
            Opcode::Multiplexer => self.exec_multiplexer(regs),
            Opcode::ArgmaxAndMax => self.exec_argmax_and_max(regs),
            Opcode::QuickSort => self.exec_quick_sort(regs),
            Opcode::Reshape => self.exec_reshape(regs, false),
            Opcode::Resize => self.exec_reshape(regs, true),
            Opcode::Transpose => self.exec_transpose(regs),
            Opcode::MatMul => self.exec_mat_mul(regs),
            Opcode::SetItem => self.exec_set_item(regs),
            Opcode::GetItem => self.exec_get_item(regs),
            Opcode::VStack | Opcode::HStack => self.exec_stack(opcode, regs),
            Opcode::GroupbySum | Opcode::GroupbyCount | Opcode::GroupbyMax | Opcode::GroupbyMin => {
                self.exec_groupby(opcode, regs)
            }
        }
    }

    fn read_back(&mut self, reg: Register) -> Result<PlainMatrix> {
        match self.slot(reg)? {
            Slot::PrivateNumeric { owner, data } => {
                if *owner != self.party {
                    return Err(EngineError::NotOwner {
                        local: self.party,
                        owner: *owner,
                    });
                }
                data.clone().map(PlainMatrix::Numeric).ok_or_else(empty_private)
            }
            Slot::PrivateBoolean { owner, data } => {
                if *owner != self.party {
                    return Err(EngineError::NotOwner {
                        local: self.party,
                        owner: *owner,
                    });
                }
                data.clone().map(PlainMatrix::Boolean).ok_or_else(empty_private)
            }
            other => Err(unexpected("read_back", other.kind())),
        }
    }

    fn export_share(&mut self, reg: Register) -> Result<Matrix<i64>> {
        match self.slot(reg)? {
            Slot::ShareNumeric(m) => Ok(m.clone()),
            Slot::ShareBoolean(m) => Ok(m.map(|v| if v { 1i64 } else { 0 })),
            other => Err(unexpected("export_share", other.kind())),
        }
    }

    fn release(&mut self, reg: Register) -> Result<()> {
        let slot = self
            .slots
            .remove(&reg.raw())
            .ok_or(EngineError::DeadRegister(reg))?;
        // Share material is zeroized before the backing store is freed.
        match slot {
            Slot::ShareNumeric(m) => {
                let mut data = m.into_data();
                data.zeroize();
            }
            Slot::ShareBoolean(m) => {
                let mut data = m.into_data();
                data.zeroize();
            }
            _ => {}
        }
        debug!(register = %reg, "release");
        Ok(())
    }
}

fn seed_name(seed: &Seed) -> &'static str {
    match seed {
        Seed::Empty => "empty",
        Seed::Numeric(_) => "numeric",
        Seed::Boolean(_) => "boolean",
        Seed::RawShare(_) => "raw-share",
        Seed::Scalar(_) => "scalar",
        Seed::Index(_) => "index",
    }
}

fn unexpected(context: &'static str, got: OperandKind) -> EngineError {
    EngineError::UnsupportedOperation {
        opcode: context,
        detail: format!("unexpected operand kind {got}"),
    }
}

fn empty_private() -> EngineError {
    EngineError::UnsupportedOperation {
        opcode: "read_back",
        detail: "private buffer holds no plaintext".into(),
    }
}
