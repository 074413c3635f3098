//! Multicore VLIW/SIMD machine simulator and kernel builder library.
//!
//! This crate implements a deterministic, cycle-level simulator with the following:
//! 1. **ISA:** Five engines (alu, valu, load, store, flow) with fixed issue widths,
//!    8-lane vector slots and a closed opcode set per engine.
//! 2. **Core:** Per-core scratch memory, program counter, run state and trace buffer.
//! 3. **Simulation:** Lockstep stepping of cores over shared memory with two-phase
//!    bundle commit, pause/resume, statistics and optional slot tracing.
//! 4. **Compiler:** Scratch allocation, constant pools, bundle packing, counted loops
//!    and the scalar and vectorized workload kernels.
//! 5. **Workload:** Seeded tree/input generation, the memory image, a reference
//!    oracle and round-by-round verification.

/// Common types and constants (vector width, header layout, errors).
pub mod common;
/// Machine, kernel and workload configuration.
pub mod config;
/// Compiler primitives and workload kernels.
pub mod compiler;
/// Core state and execution units.
pub mod core;
/// Instruction set (engines, opcodes, slots, bundles, disassembly).
pub mod isa;
/// Machine simulation, commit and tracing.
pub mod sim;
/// Simulation statistics collection and reporting.
pub mod stats;
/// Workload generation, memory image, reference oracle and verification.
pub mod workload;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// Kernel builder; emits programs for the machine.
pub use crate::compiler::KernelBuilder;
/// The multicore machine; construct with `Machine::new`.
pub use crate::sim::Machine;
