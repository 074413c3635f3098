//! Two-phase bundle commit.
//!
//! Every slot of a bundle reads through a [`StepView`], a read-only snapshot
//! of the stepping core's scratch and of main memory as they were before the
//! bundle. Effects go into a [`StagedWrites`] buffer and are applied in one
//! pass once every slot has been evaluated: scratch writes, then memory
//! writes, then the trace buffer and control effect. Slot order inside a
//! bundle therefore never changes what a slot reads.

use crate::common::{ExecError, VLEN};
use crate::core::{Core, CoreState};
use crate::isa::{ScratchAddr, Word};

/// Read-only view of the state a bundle executes against.
#[derive(Debug, Clone, Copy)]
pub struct StepView<'a> {
    /// Id of the stepping core.
    pub core_id: usize,
    /// Index of the bundle being executed.
    pub pc: usize,
    /// Program counter after fetch (`pc + 1`); relative jumps are based on it.
    pub next_pc: usize,
    /// The core's scratch memory before the bundle.
    pub scratch: &'a [Word],
    /// Main memory before the bundle.
    pub mem: &'a [Word],
}

impl StepView<'_> {
    /// Reads one scratch word.
    ///
    /// # Errors
    ///
    /// [`ExecError::ScratchOutOfBounds`] if `addr` is past the end of scratch.
    #[inline]
    pub fn read(&self, addr: ScratchAddr) -> Result<Word, ExecError> {
        self.scratch
            .get(addr)
            .copied()
            .ok_or(ExecError::ScratchOutOfBounds {
                core: self.core_id,
                pc: self.pc,
                addr,
            })
    }

    /// Reads `VLEN` contiguous scratch words starting at `base`.
    ///
    /// # Errors
    ///
    /// [`ExecError::ScratchOutOfBounds`] if any lane is past the end of scratch.
    pub fn read_vec(&self, base: ScratchAddr) -> Result<[Word; VLEN], ExecError> {
        let mut lanes = [0; VLEN];
        for (i, lane) in lanes.iter_mut().enumerate() {
            *lane = self.read(base + i)?;
        }
        Ok(lanes)
    }

    /// Reads one word of main memory.
    ///
    /// # Errors
    ///
    /// [`ExecError::MemoryOutOfBounds`] if `addr` is past the end of memory.
    #[inline]
    pub fn load(&self, addr: usize) -> Result<Word, ExecError> {
        self.mem
            .get(addr)
            .copied()
            .ok_or(ExecError::MemoryOutOfBounds {
                core: self.core_id,
                pc: self.pc,
                addr,
            })
    }
}

/// Control-flow outcome of a bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEffect {
    /// Continue at the given bundle index.
    Jump(usize),
    /// Stop the core permanently.
    Halt,
    /// Suspend the core until the next `run()`.
    Pause,
}

/// Effects of one bundle, buffered until every slot has been evaluated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StagedWrites {
    scratch: Vec<(ScratchAddr, Word)>,
    mem: Vec<(usize, Word)>,
    trace: Vec<Word>,
    control: Option<ControlEffect>,
}

impl StagedWrites {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Discards all buffered effects, keeping allocations.
    pub fn clear(&mut self) {
        self.scratch.clear();
        self.mem.clear();
        self.trace.clear();
        self.control = None;
    }

    /// Buffers a scratch write.
    #[inline]
    pub fn write_scratch(&mut self, addr: ScratchAddr, value: Word) {
        self.scratch.push((addr, value));
    }

    /// Buffers a main-memory write.
    #[inline]
    pub fn write_mem(&mut self, addr: usize, value: Word) {
        self.mem.push((addr, value));
    }

    /// Buffers a trace-buffer append.
    pub fn record_trace(&mut self, value: Word) {
        self.trace.push(value);
    }

    /// Sets the bundle's control effect; a later effect replaces an earlier one.
    pub fn set_control(&mut self, effect: ControlEffect) {
        self.control = Some(effect);
    }

    /// Buffered scratch writes in issue order.
    pub fn scratch_writes(&self) -> &[(ScratchAddr, Word)] {
        &self.scratch
    }

    /// Buffered memory writes in issue order.
    pub fn mem_writes(&self) -> &[(usize, Word)] {
        &self.mem
    }

    /// Buffered control effect.
    pub const fn control(&self) -> Option<ControlEffect> {
        self.control
    }

    /// Applies the buffered effects to `core` and `mem`.
    ///
    /// Every address is checked before anything is written, so a failing
    /// commit leaves both the core and memory untouched. Writes to the same
    /// address resolve in issue order (last writer wins).
    ///
    /// # Errors
    ///
    /// [`ExecError::ScratchOutOfBounds`] or [`ExecError::MemoryOutOfBounds`]
    /// for the first write that lands outside its array.
    pub fn commit(&self, core: &mut Core, mem: &mut [Word], pc: usize) -> Result<(), ExecError> {
        if let Some(&(addr, _)) = self.scratch.iter().find(|(a, _)| *a >= core.scratch.len()) {
            return Err(ExecError::ScratchOutOfBounds {
                core: core.id,
                pc,
                addr,
            });
        }
        if let Some(&(addr, _)) = self.mem.iter().find(|(a, _)| *a >= mem.len()) {
            return Err(ExecError::MemoryOutOfBounds {
                core: core.id,
                pc,
                addr,
            });
        }

        for &(addr, value) in &self.scratch {
            core.scratch[addr] = value;
        }
        for &(addr, value) in &self.mem {
            mem[addr] = value;
        }
        core.trace_buf.extend_from_slice(&self.trace);

        match self.control {
            Some(ControlEffect::Jump(target)) => core.pc = target,
            Some(ControlEffect::Halt) => core.state = CoreState::Stopped,
            Some(ControlEffect::Pause) => core.state = CoreState::Paused,
            None => {}
        }
        Ok(())
    }
}
