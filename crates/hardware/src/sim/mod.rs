//! Machine simulation.
//!
//! This module steps compiled programs on the multicore machine. It provides:
//! 1. **Machine:** Lockstep scheduling of cores and the `run()` / pause protocol.
//! 2. **Execution:** Per-engine slot executors behind one dispatch function.
//! 3. **Commit:** Buffered bundle effects applied after every slot is evaluated.
//! 4. **Tracing:** A sink interface for executed slots and a Chrome trace writer.

/// Two-phase bundle commit.
pub mod commit;

/// Per-engine slot executors.
pub mod execute;

/// The multicore machine.
pub mod machine;

/// Execution trace sinks.
pub mod trace;

pub use commit::{ControlEffect, StagedWrites, StepView};
pub use machine::Machine;
pub use trace::{ChromeTraceWriter, TraceEvent, TraceSink};
