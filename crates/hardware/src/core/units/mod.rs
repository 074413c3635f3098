//! Execution units.
//!
//! This module contains the functional units shared by the scalar and vector
//! engines. The integer ALU is the only unit with data-path logic; loads,
//! stores and control flow are handled directly by the machine's dispatch.

/// Arithmetic Logic Unit for 32-bit word operations.
pub mod alu;
