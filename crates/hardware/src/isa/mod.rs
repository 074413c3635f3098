//! Instruction Set Architecture (ISA) definitions.
//!
//! This module defines the closed instruction set of the VLIW/SIMD machine. It includes:
//! 1. **Engines:** The five executing engines and their per-cycle issue widths.
//! 2. **Opcodes:** Binary operators shared by the scalar and vector ALUs.
//! 3. **Slots:** One enum per engine with the operand shapes it accepts.
//! 4. **Bundles:** Per-engine slot lists issued together in one cycle.
//! 5. **Disassembly:** Textual rendering of slots and bundles.

/// Slot and bundle disassembly.
pub mod disasm;

/// Engine identifiers and issue widths.
pub mod engine;

/// Instruction bundles and programs.
pub mod instruction;

/// ALU operator opcodes.
pub mod opcodes;

/// Per-engine slot shapes and their scratch/memory footprints.
pub mod slot;

pub use engine::{Engine, MAX_SLOTS_PER_BUNDLE};
pub use instruction::{Bundle, Program};
pub use opcodes::AluOp;
pub use slot::{
    AluSlot, DebugSlot, FlowSlot, LoadSlot, MemAccess, ScratchAddr, Slot, StoreSlot, ValuSlot,
    Word,
};
