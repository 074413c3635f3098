//! Error definitions.
//!
//! This module defines every failure the simulator and kernel builder can report. It provides:
//! 1. **ISA Errors:** Unknown opcodes and bundles that overflow an engine's issue width.
//! 2. **Build Errors:** Fatal configuration problems detected while emitting a program.
//! 3. **Execution Errors:** Faults raised while a core steps a bundle.
//! 4. **Trace and Check Errors:** Sink I/O failures and simulator/oracle mismatches.

use thiserror::Error;

use crate::isa::Engine;

/// Errors in the static shape of slots and bundles.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum IsaError {
    /// An operator or opcode name that is not part of the instruction set.
    #[error("unknown opcode `{0}`")]
    UnknownOpcode(String),

    /// A bundle issues more slots on one engine than the engine accepts per cycle.
    #[error("{engine} engine issues {count} slots, limit is {limit}")]
    SlotLimitExceeded {
        /// Engine whose width was exceeded.
        engine: Engine,
        /// Number of slots the bundle tried to issue.
        count: usize,
        /// Per-cycle issue width of the engine.
        limit: usize,
    },
}

/// Fatal errors raised while building a kernel.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BuildError {
    /// A scratch allocation would run past the end of scratch memory.
    #[error("out of scratch space: requested {requested} words with {used} of {capacity} in use")]
    ScratchOverflow {
        /// Words requested by the failing allocation.
        requested: usize,
        /// Words already allocated.
        used: usize,
        /// Total scratch capacity.
        capacity: usize,
    },

    /// The batch cannot be split evenly into vector-wide chunks per core.
    #[error("batch size {batch_size} is not a multiple of {granule} (VLEN x cores)")]
    InvalidBatch {
        /// Requested batch size.
        batch_size: usize,
        /// Required divisor.
        granule: usize,
    },

    /// A bundle violated an ISA constraint.
    #[error(transparent)]
    Isa(#[from] IsaError),
}

/// Faults raised while a core executes a bundle.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ExecError {
    /// Integer division, ceiling division or modulo with a zero divisor.
    #[error("division by zero on core {core} at pc {pc}")]
    DivisionByZero {
        /// Faulting core.
        core: usize,
        /// Index of the faulting bundle.
        pc: usize,
    },

    /// A load or store addressed a word outside main memory.
    #[error("memory address {addr:#x} out of bounds on core {core} at pc {pc}")]
    MemoryOutOfBounds {
        /// Faulting core.
        core: usize,
        /// Index of the faulting bundle.
        pc: usize,
        /// Offending word address.
        addr: usize,
    },

    /// A slot referenced a scratch word past the end of scratch memory.
    #[error("scratch address {addr} out of bounds on core {core} at pc {pc}")]
    ScratchOutOfBounds {
        /// Faulting core.
        core: usize,
        /// Index of the faulting bundle.
        pc: usize,
        /// Offending scratch address.
        addr: usize,
    },

    /// A bundle reached the machine without passing issue-width validation.
    #[error("malformed bundle at pc {pc}: {source}")]
    MalformedBundle {
        /// Index of the offending bundle.
        pc: usize,
        /// Underlying ISA violation.
        source: IsaError,
    },
}

/// Failures of a trace sink.
#[derive(Debug, Error)]
pub enum TraceError {
    /// The underlying writer failed.
    #[error("trace I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// An event could not be serialized.
    #[error("trace serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Which workload array a round check compares.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CheckedArray {
    /// Per-lane 32-bit values.
    Values,
    /// Per-lane tree indices.
    Indices,
}

impl std::fmt::Display for CheckedArray {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Values => f.write_str("values"),
            Self::Indices => f.write_str("indices"),
        }
    }
}

/// Errors from running a compiled kernel against the reference oracle.
#[derive(Debug, Error)]
pub enum CheckError {
    /// The simulator faulted.
    #[error(transparent)]
    Exec(#[from] ExecError),

    /// The memory image header does not describe arrays that fit in memory.
    #[error("malformed memory image header")]
    MalformedImage,

    /// The simulator disagreed with the oracle after a round.
    #[error("incorrect {array} on round {round}: lane {lane} is {actual:#010x}, expected {expected:#010x}")]
    Mismatch {
        /// Round index (0 is the initial state).
        round: usize,
        /// Array that differs.
        array: CheckedArray,
        /// First differing lane.
        lane: usize,
        /// Simulator value.
        actual: u32,
        /// Oracle value.
        expected: u32,
    },
}
