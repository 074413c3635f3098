//! Kernel builder ("mini-compiler").
//!
//! This module emits programs for the machine. It provides:
//! 1. **Scratch:** Bump allocation of scratch words with a debug-name map.
//! 2. **Builder:** Constant pools, bundle emission, labels and counted loops.
//! 3. **Scheduler:** Sequential and dependency-aware bundle packing.
//! 4. **Hash:** The six-stage hash, behaviorally and as scalar/vector slots.
//! 5. **Kernels:** The counting test and the scalar and vector workload kernels.

/// Kernel builder primitives.
pub mod builder;

/// The six-stage hash.
pub mod hash;

/// Workload kernels.
pub mod kernel;

/// Bundle packing.
pub mod scheduler;

/// Scratch allocation and debug info.
pub mod scratch;

pub use builder::{KernelBuilder, LOOP_EPILOGUE_LEN, LOOP_PROLOGUE_LEN};
pub use hash::{HASH_STAGES, HashPipeline, HashStage, hash_word};
pub use scratch::{DebugInfo, ScratchAllocator, ScratchSymbol};
