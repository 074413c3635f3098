//! Arithmetic Logic Unit (ALU).
//!
//! This module implements the 32-bit integer ALU shared by `alu` slots and,
//! lane by lane, by `valu` slots. Every result is reduced modulo 2^32.
//!
//! Operations are organized into submodules by category:
//! - [`arithmetic`]: Add, Sub, Mul, Div, CDiv, Mod
//! - [`logic`]:      Xor, And, Or, Lt, Eq
//! - [`shifts`]:     Shl, Shr

/// Integer arithmetic operations (add, subtract, multiply, divide, modulo).
pub mod arithmetic;

/// Bitwise logical and comparison operations (xor, and, or, lt, eq).
pub mod logic;

/// Shift operations (shl, shr).
pub mod shifts;

use crate::isa::{AluOp, Word};

/// Arithmetic Logic Unit for 32-bit word operations.
#[derive(Debug)]
pub struct Alu;

impl Alu {
    /// Executes an ALU operation.
    ///
    /// # Arguments
    ///
    /// * `op` - The operator to apply.
    /// * `a`  - Left operand.
    /// * `b`  - Right operand (also the shift count).
    ///
    /// # Returns
    ///
    /// The wrapped 32-bit result, or `None` when a dividing operator
    /// (`//`, `cdiv`, `%`) receives a zero divisor.
    ///
    /// # Examples
    ///
    /// ```
    /// use vliwsim_core::core::units::alu::Alu;
    /// use vliwsim_core::isa::AluOp;
    ///
    /// assert_eq!(Alu::execute(AluOp::Add, u32::MAX, 1), Some(0));
    /// assert_eq!(Alu::execute(AluOp::CDiv, 7, 2), Some(4));
    /// assert_eq!(Alu::execute(AluOp::Lt, 3, 9), Some(1));
    /// assert_eq!(Alu::execute(AluOp::Shl, 1, 32), Some(0));
    /// assert_eq!(Alu::execute(AluOp::Mod, 5, 0), None);
    /// ```
    #[inline]
    pub fn execute(op: AluOp, a: Word, b: Word) -> Option<Word> {
        match op {
            AluOp::Add | AluOp::Sub | AluOp::Mul | AluOp::Div | AluOp::CDiv | AluOp::Mod => {
                arithmetic::execute(op, a, b)
            }
            AluOp::Xor | AluOp::And | AluOp::Or | AluOp::Lt | AluOp::Eq => {
                Some(logic::execute(op, a, b))
            }
            AluOp::Shl | AluOp::Shr => Some(shifts::execute(op, a, b)),
        }
    }
}
