//! ALU shift operations.
//!
//! Shifts are logical. Counts are unsigned words; a count of 32 or more
//! shifts every bit out and yields 0, the same result as shifting an
//! unbounded integer and reducing modulo 2^32.

use crate::isa::{AluOp, Word};

/// Executes a shift operation.
///
/// Returns `0` for non-shift opcodes.
pub fn execute(op: AluOp, a: Word, b: Word) -> Word {
    match op {
        AluOp::Shl => a.checked_shl(b).unwrap_or(0),
        AluOp::Shr => a.checked_shr(b).unwrap_or(0),
        _ => 0,
    }
}
