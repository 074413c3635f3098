//! Core Definition.
//!
//! This module defines the `Core` structure, the container for one core's
//! architectural state. It holds:
//! 1. **Scratch Memory:** A fixed-size array of 32-bit words serving as registers,
//!    constants, and a manually managed cache.
//! 2. **Control State:** The program counter and the run state.
//! 3. **Trace Buffer:** Words recorded by `trace_write` slots.

use serde::Serialize;

use crate::isa::{ScratchAddr, Word};

/// Run state of a core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CoreState {
    /// Fetching and executing bundles.
    Running,
    /// Suspended by a `pause` slot until the next `run()`.
    Paused,
    /// Halted, or ran off the end of the program. Never resumes.
    Stopped,
}

/// One lockstep core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Core {
    /// Core index; also the value written by `coreid`.
    pub id: usize,
    /// Scratch memory.
    pub scratch: Vec<Word>,
    /// Words appended by `trace_write`.
    pub trace_buf: Vec<Word>,
    /// Index of the next bundle to fetch.
    pub pc: usize,
    /// Current run state.
    pub state: CoreState,
}

impl Core {
    /// Creates a running core with zeroed scratch memory and `pc = 0`.
    ///
    /// # Arguments
    ///
    /// * `id` - Core index.
    /// * `scratch_size` - Scratch capacity in words.
    pub fn new(id: usize, scratch_size: usize) -> Self {
        Self {
            id,
            scratch: vec![0; scratch_size],
            trace_buf: Vec::new(),
            pc: 0,
            state: CoreState::Running,
        }
    }

    /// Whether the core will step this cycle.
    #[inline]
    pub fn is_running(&self) -> bool {
        self.state == CoreState::Running
    }

    /// Moves a paused core back to running. Stopped cores stay stopped.
    pub fn resume(&mut self) {
        if self.state == CoreState::Paused {
            self.state = CoreState::Running;
        }
    }

    /// Reads `len` scratch words starting at `base`, or `None` if out of range.
    pub fn scratch_slice(&self, base: ScratchAddr, len: usize) -> Option<&[Word]> {
        self.scratch.get(base..base.checked_add(len)?)
    }
}
