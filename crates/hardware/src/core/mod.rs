//! Core processor state.
//!
//! This module contains the per-core architectural state (scratch memory,
//! program counter, run state, trace buffer) and the execution units the
//! machine dispatches slots to.

/// Per-core architectural state.
pub mod cpu;

/// Execution units (ALU).
pub mod units;

pub use self::cpu::{Core, CoreState};
