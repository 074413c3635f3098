//! # Compiler Unit Tests
//!
//! Kernel builder primitives and the workload kernels.


/// Workload kernels verified round by round against the oracle.
pub mod kernel;
