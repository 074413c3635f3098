//! Common types and constants used throughout the simulator and kernel builder.
//!
//! This module provides the building blocks shared by every component:
//! 1. **Constants:** Vector width, machine defaults, and the memory-image header layout.
//! 2. **Error Handling:** Typed errors for ISA validation, kernel building, execution,
//!    tracing, and oracle checks.

/// Machine-wide constants.
pub mod constants;

/// Error types.
pub mod error;

pub use constants::{N_CORES, SCRATCH_SIZE, VLEN};
pub use error::{BuildError, CheckError, CheckedArray, ExecError, IsaError, TraceError};
