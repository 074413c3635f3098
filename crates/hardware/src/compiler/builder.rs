//! Kernel builder primitives.
//!
//! The [`KernelBuilder`] accumulates a program and owns the resources a
//! kernel consumes while it is emitted:
//! 1. **Scratch:** A bump allocator with optional debug names.
//! 2. **Constant pools:** One scalar cell per distinct literal, one vector per
//!    distinct broadcast literal; each is loaded once, on first request.
//! 3. **Packing:** Straight-line slot lists become bundles through the
//!    sequential or list-scheduling packer.
//! 4. **Loops:** Counted loops with a fixed three-bundle prologue and a
//!    one-bundle back edge.

use std::collections::HashMap;

use tracing::debug;

use crate::common::{BuildError, VLEN};
use crate::config::KernelConfig;
use crate::isa::{AluOp, Bundle, Program, ScratchAddr, Slot, Word};

use super::scheduler;
use super::scratch::{DebugInfo, ScratchAllocator};

/// Bundles in a loop prologue: increment, compare, exit branch.
pub const LOOP_PROLOGUE_LEN: usize = 3;

/// Bundles in a loop epilogue: the back edge.
pub const LOOP_EPILOGUE_LEN: usize = 1;

/// Emits programs for the machine.
#[derive(Debug, Clone)]
pub struct KernelBuilder {
    config: KernelConfig,
    instrs: Program,
    scratch: ScratchAllocator,
    const_map: HashMap<Word, ScratchAddr>,
    vconst_map: HashMap<Word, ScratchAddr>,
    labels: HashMap<String, usize>,
}

impl Default for KernelBuilder {
    fn default() -> Self {
        Self::new(KernelConfig::default())
    }
}

impl KernelBuilder {
    /// Creates an empty builder.
    pub fn new(config: KernelConfig) -> Self {
        Self {
            config,
            instrs: Vec::new(),
            scratch: ScratchAllocator::new(config.scratch_size),
            const_map: HashMap::new(),
            vconst_map: HashMap::new(),
            labels: HashMap::new(),
        }
    }

    /// Builder parameters.
    pub const fn config(&self) -> &KernelConfig {
        &self.config
    }

    /// Bundles emitted so far.
    pub fn program(&self) -> &[Bundle] {
        &self.instrs
    }

    /// Consumes the builder and returns the program.
    pub fn into_program(self) -> Program {
        self.instrs
    }

    /// Index the next emitted bundle will have.
    pub fn pc(&self) -> usize {
        self.instrs.len()
    }

    /// Scratch names of every named allocation.
    pub const fn debug_info(&self) -> &DebugInfo {
        self.scratch.debug_info()
    }

    /// The scratch allocator.
    pub const fn scratch(&self) -> &ScratchAllocator {
        &self.scratch
    }

    /// Records the current program counter under `name`.
    pub fn label(&mut self, name: impl Into<String>) {
        let _ = self.labels.insert(name.into(), self.pc());
    }

    /// Bundle index recorded for `name`.
    pub fn label_addr(&self, name: &str) -> Option<usize> {
        self.labels.get(name).copied()
    }

    /// Reserves `len` scratch words.
    ///
    /// # Errors
    ///
    /// [`BuildError::ScratchOverflow`] when scratch is exhausted.
    pub fn alloc_scratch(&mut self, name: Option<&str>, len: usize) -> Result<ScratchAddr, BuildError> {
        self.scratch.alloc(name, len)
    }

    /// Cell holding `value`, loading it with a `const` slot on first request.
    ///
    /// The load is emitted at the current position, so a constant first
    /// requested inside conditional code is only valid on paths through it.
    ///
    /// # Errors
    ///
    /// [`BuildError::ScratchOverflow`] when scratch is exhausted.
    pub fn scratch_const(&mut self, value: Word, name: Option<&str>) -> Result<ScratchAddr, BuildError> {
        if let Some(&addr) = self.const_map.get(&value) {
            return Ok(addr);
        }
        let addr = self.scratch.alloc(name, 1)?;
        self.add(Slot::constant(addr, value));
        let _ = self.const_map.insert(value, addr);
        Ok(addr)
    }

    /// `VLEN` cells holding `value` in every lane, broadcast on first request.
    ///
    /// # Errors
    ///
    /// [`BuildError::ScratchOverflow`] when scratch is exhausted.
    pub fn vector_const(&mut self, value: Word) -> Result<ScratchAddr, BuildError> {
        if let Some(&addr) = self.vconst_map.get(&value) {
            return Ok(addr);
        }
        let scalar = self.scratch_const(value, None)?;
        let addr = self.scratch.alloc(Some(&format!("v_const_{value:#x}")), VLEN)?;
        self.add(Slot::vbroadcast(addr, scalar));
        let _ = self.vconst_map.insert(value, addr);
        Ok(addr)
    }

    /// Appends a single-slot bundle.
    pub fn add(&mut self, slot: Slot) {
        self.instrs.push(Bundle::from(slot));
    }

    /// Appends already-built bundles.
    pub fn extend(&mut self, bundles: impl IntoIterator<Item = Bundle>) {
        self.instrs.extend(bundles);
    }

    /// Packs `slots` into bundles without emitting them.
    ///
    /// # Arguments
    ///
    /// * `slots` - Straight-line slots in program order.
    /// * `vliw` - Use the list scheduler instead of one slot per bundle.
    ///
    /// # Errors
    ///
    /// [`BuildError::Isa`] if a produced bundle overflows an engine.
    pub fn build(slots: Vec<Slot>, vliw: bool) -> Result<Vec<Bundle>, BuildError> {
        if vliw {
            Ok(scheduler::list_schedule(slots)?)
        } else {
            Ok(scheduler::sequential(slots))
        }
    }

    /// Packs `slots` with the configured strategy and appends them.
    ///
    /// # Errors
    ///
    /// See [`KernelBuilder::build`].
    pub fn emit(&mut self, slots: Vec<Slot>) -> Result<(), BuildError> {
        let bundles = Self::build(slots, self.config.vliw)?;
        self.extend(bundles);
        Ok(())
    }

    /// Emits a counted loop whose body runs `scratch[limit]` times.
    ///
    /// Layout, with `start` the index of the first prologue bundle:
    ///
    /// ```text
    ///   ^    iter, iter, iter      ; reset, before start
    /// start:
    ///   +    iter, one, iter
    ///   <    cond, limit, iter     ; exit once iter > limit
    ///   cond_jump cond, @end
    ///   <body>
    ///   jump @start
    /// end:
    /// ```
    ///
    /// Inside the body `iter` holds the 1-based iteration number. The body
    /// may emit bundles freely, including nested loops; its length is known
    /// once `body` returns, and the exit target is patched then.
    ///
    /// `scratch[limit]` must be below `u32::MAX`: at that limit `iter` wraps
    /// to 0 before the exit test can fire and the loop never ends.
    ///
    /// # Errors
    ///
    /// Scratch exhaustion, or any error returned by `body`.
    pub fn for_loop<F>(&mut self, iter: ScratchAddr, limit: ScratchAddr, body: F) -> Result<(), BuildError>
    where
        F: FnOnce(&mut Self) -> Result<(), BuildError>,
    {
        let cond = self.alloc_scratch(None, 1)?;
        let one = self.scratch_const(1, None)?;
        self.add(Slot::alu(AluOp::Xor, iter, iter, iter));

        let start = self.pc();
        self.add(Slot::alu(AluOp::Add, iter, one, iter));
        self.add(Slot::alu(AluOp::Lt, cond, limit, iter));
        let exit = self.pc();
        self.add(Slot::cond_jump(cond, usize::MAX));

        body(self)?;

        self.add(Slot::jump(start));
        let end = self.pc();
        self.instrs[exit] = Bundle::from(Slot::cond_jump(cond, end));
        debug!(start, end, body = end - start - LOOP_PROLOGUE_LEN - LOOP_EPILOGUE_LEN, "loop emitted");
        Ok(())
    }

    /// Emits a counted loop around prebuilt body bundles.
    ///
    /// # Errors
    ///
    /// See [`KernelBuilder::for_loop`].
    pub fn for_loop_bundles(
        &mut self,
        iter: ScratchAddr,
        limit: ScratchAddr,
        body: Vec<Bundle>,
    ) -> Result<(), BuildError> {
        self.for_loop(iter, limit, |kb| {
            kb.extend(body);
            Ok(())
        })
    }
}
