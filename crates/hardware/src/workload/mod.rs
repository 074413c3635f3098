//! Workload generation, reference oracle and verification.
//!
//! This module provides everything on the data side of a kernel run:
//! 1. **Generation:** Seeded random trees and input batches.
//! 2. **Image:** The memory layout a kernel reads and writes.
//! 3. **Reference:** Behavioral implementations producing ground truth.
//! 4. **Check:** Round-by-round comparison of the machine with the oracle.

/// Round-by-round verification.
pub mod check;

/// Memory image layout.
pub mod image;

/// Reference oracle.
pub mod reference;

/// Tree and input generation.
pub mod tree;

pub use check::verify_rounds;
pub use image::{Layout, build_mem_image};
pub use reference::{RoundStates, reference_kernel};
pub use tree::{Input, Tree, generate};
