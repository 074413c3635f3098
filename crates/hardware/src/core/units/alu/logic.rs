//! ALU logical and comparison operations.
//!
//! Comparisons are unsigned and produce 0 or 1.

use crate::isa::{AluOp, Word};

/// Executes a logical or comparison operation.
///
/// Returns `0` for non-logic opcodes.
pub fn execute(op: AluOp, a: Word, b: Word) -> Word {
    match op {
        AluOp::Xor => a ^ b,
        AluOp::And => a & b,
        AluOp::Or => a | b,
        AluOp::Lt => (a < b) as Word,
        AluOp::Eq => (a == b) as Word,
        _ => 0,
    }
}
