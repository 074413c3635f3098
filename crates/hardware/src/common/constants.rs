//! Global Machine Constants.
//!
//! This module defines machine-wide constants used across the simulator. It includes:
//! 1. **Vector Constants:** The fixed SIMD width shared by every vector slot.
//! 2. **Machine Constants:** Default core count and per-core scratch capacity.
//! 3. **Memory Image Constants:** Word offsets of the workload header in main memory.
//! 4. **Arithmetic Constants:** The word mask every result is reduced by.

/// Number of lanes in every vector operand (`vload`, `vstore`, `valu`, `vselect`).
pub const VLEN: usize = 8;

/// Default number of lockstep cores in a machine.
pub const N_CORES: usize = 4;

/// Default per-core scratch capacity in 32-bit words.
pub const SCRATCH_SIZE: usize = 1536;

/// Mask applied to every arithmetic result before it is stored.
pub const WORD_MASK: u64 = 0xFFFF_FFFF;

/// Header word holding the number of rounds to run.
pub const HDR_ROUNDS: usize = 0;

/// Header word holding the number of tree nodes.
pub const HDR_N_NODES: usize = 1;

/// Header word holding the number of lanes in the input batch.
pub const HDR_BATCH_SIZE: usize = 2;

/// Header word holding the tree height.
pub const HDR_FOREST_HEIGHT: usize = 3;

/// Header word holding the base address of the tree-values array.
pub const HDR_FOREST_VALUES: usize = 4;

/// Header word holding the base address of the lane-indices array.
pub const HDR_INP_INDICES: usize = 5;

/// Header word holding the base address of the lane-values array.
pub const HDR_INP_VALUES: usize = 6;

/// Header word holding the first address past the three workload arrays.
pub const HDR_EXTRA_ROOM: usize = 7;

/// Number of header words; the tree-values array starts here.
pub const HEADER_WORDS: usize = 8;

/// Upper bound (exclusive) of randomly generated node and lane values (2^30).
pub const VALUE_LIMIT: u32 = 1 << 30;
