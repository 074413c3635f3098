//! The six-stage keyed hash.
//!
//! Each stage computes `a = op2(op1(a, c1), op3(a, c3))` with every
//! intermediate reduced to 32 bits. [`hash_word`] is the behavioral
//! definition used by the reference oracle; [`HashPipeline`] lowers the same
//! stages to scalar or vector slots.

use crate::common::BuildError;
use crate::core::units::alu::Alu;
use crate::isa::{AluOp, ScratchAddr, Slot, Word};

use super::builder::KernelBuilder;

/// One hash stage: `a = op2(op1(a, val1), op3(a, val3))`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashStage {
    /// Operator applied with `val1`.
    pub op1: AluOp,
    /// First stage constant.
    pub val1: Word,
    /// Operator combining both halves.
    pub op2: AluOp,
    /// Operator applied with `val3`.
    pub op3: AluOp,
    /// Second stage constant (a shift count in every stage).
    pub val3: Word,
}

const fn stage(op1: AluOp, val1: Word, op2: AluOp, op3: AluOp, val3: Word) -> HashStage {
    HashStage {
        op1,
        val1,
        op2,
        op3,
        val3,
    }
}

/// The hash stages in application order.
pub const HASH_STAGES: [HashStage; 6] = [
    stage(AluOp::Add, 0x7ED55D16, AluOp::Add, AluOp::Shl, 12),
    stage(AluOp::Xor, 0xC761C23C, AluOp::Xor, AluOp::Shr, 19),
    stage(AluOp::Add, 0x165667B1, AluOp::Add, AluOp::Shl, 5),
    stage(AluOp::Add, 0xD3A2646C, AluOp::Xor, AluOp::Shl, 9),
    stage(AluOp::Add, 0xFD7046C5, AluOp::Add, AluOp::Shl, 3),
    stage(AluOp::Xor, 0xB55A4F09, AluOp::Xor, AluOp::Shr, 16),
];

/// Applies a non-dividing stage operator.
#[inline]
fn apply(op: AluOp, a: Word, b: Word) -> Word {
    // Stage operators never divide, so the ALU always yields a value.
    Alu::execute(op, a, b).unwrap_or_default()
}

/// Hashes one word.
///
/// # Examples
///
/// ```
/// use vliwsim_core::compiler::hash::hash_word;
///
/// assert_eq!(hash_word(0), hash_word(0));
/// assert_ne!(hash_word(1), hash_word(2));
/// ```
pub fn hash_word(mut a: Word) -> Word {
    for s in &HASH_STAGES {
        let lhs = apply(s.op1, a, s.val1);
        let rhs = apply(s.op3, a, s.val3);
        a = apply(s.op2, lhs, rhs);
    }
    a
}

/// Scratch cells holding the stage constants, scalar or broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashPipeline {
    consts: Vec<(ScratchAddr, ScratchAddr)>,
    vector: bool,
}

impl HashPipeline {
    /// Loads the stage constants into pooled scalar cells.
    ///
    /// # Errors
    ///
    /// [`BuildError::ScratchOverflow`] if the constants do not fit.
    pub fn scalar(kb: &mut KernelBuilder) -> Result<Self, BuildError> {
        let mut consts = Vec::with_capacity(HASH_STAGES.len());
        for s in &HASH_STAGES {
            consts.push((kb.scratch_const(s.val1, None)?, kb.scratch_const(s.val3, None)?));
        }
        Ok(Self {
            consts,
            vector: false,
        })
    }

    /// Loads the stage constants into pooled vector cells.
    ///
    /// # Errors
    ///
    /// [`BuildError::ScratchOverflow`] if the constants do not fit.
    pub fn vector(kb: &mut KernelBuilder) -> Result<Self, BuildError> {
        let mut consts = Vec::with_capacity(HASH_STAGES.len());
        for s in &HASH_STAGES {
            consts.push((kb.vector_const(s.val1)?, kb.vector_const(s.val3)?));
        }
        Ok(Self {
            consts,
            vector: true,
        })
    }

    /// Whether the pipeline emits vector slots.
    pub const fn is_vector(&self) -> bool {
        self.vector
    }

    /// Slots hashing `val` in place.
    ///
    /// # Arguments
    ///
    /// * `val` - Cell (or first lane) holding the value to hash.
    /// * `tmp1`, `tmp2` - Temporaries of the same width as `val`.
    pub fn emit(&self, val: ScratchAddr, tmp1: ScratchAddr, tmp2: ScratchAddr) -> Vec<Slot> {
        let op: fn(AluOp, ScratchAddr, ScratchAddr, ScratchAddr) -> Slot =
            if self.vector { Slot::valu } else { Slot::alu };
        HASH_STAGES
            .iter()
            .zip(&self.consts)
            .flat_map(|(s, &(c1, c3))| {
                [
                    op(s.op1, tmp1, val, c1),
                    op(s.op3, tmp2, val, c3),
                    op(s.op2, val, tmp1, tmp2),
                ]
            })
            .collect()
    }
}
