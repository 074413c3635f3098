//! ALU arithmetic operations.
//!
//! Add, subtract and multiply wrap modulo 2^32. Floor division, ceiling
//! division and modulo treat both operands as unsigned and fault on a zero
//! divisor; the caller turns the fault into an execution error.

use crate::isa::{AluOp, Word};

/// Executes an arithmetic operation.
///
/// # Returns
///
/// `None` for a zero divisor, otherwise the wrapped result. Returns
/// `Some(0)` for non-arithmetic opcodes.
pub fn execute(op: AluOp, a: Word, b: Word) -> Option<Word> {
    match op {
        AluOp::Add => Some(a.wrapping_add(b)),
        AluOp::Sub => Some(a.wrapping_sub(b)),
        AluOp::Mul => Some(a.wrapping_mul(b)),
        AluOp::Div => a.checked_div(b),
        AluOp::CDiv => {
            if b == 0 {
                None
            } else {
                // Widen so a + b - 1 cannot overflow.
                Some(((u64::from(a) + u64::from(b) - 1) / u64::from(b)) as Word)
            }
        }
        AluOp::Mod => a.checked_rem(b),
        _ => Some(0),
    }
}
