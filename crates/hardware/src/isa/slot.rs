//! Slot definitions for every engine.
//!
//! A slot is one operation issued on one engine. Each engine has a closed set
//! of slot shapes, modeled here as one enum per engine. Every operand is a
//! scratch address except immediates (`const` values and jump targets).
//!
//! Besides the shapes themselves this module answers the questions the kernel
//! scheduler needs: which scratch words a slot reads and writes, whether it
//! touches main memory, and whether it transfers control.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use super::engine::Engine;
use super::opcodes::AluOp;
use crate::common::VLEN;

/// Index of a word in a core's scratch memory.
pub type ScratchAddr = usize;

/// A 32-bit machine word.
pub type Word = u32;

/// Scalar ALU slot: `dest = op(scratch[a], scratch[b])`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AluSlot {
    /// Operator.
    pub op: AluOp,
    /// Destination scratch address.
    pub dest: ScratchAddr,
    /// Left operand address.
    pub a: ScratchAddr,
    /// Right operand address.
    pub b: ScratchAddr,
}

/// Vector ALU slot. Vector operands name the first of `VLEN` contiguous words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValuSlot {
    /// Replicate `scratch[src]` into `dest..dest + VLEN`.
    Vbroadcast {
        /// First destination word.
        dest: ScratchAddr,
        /// Scalar source.
        src: ScratchAddr,
    },
    /// Apply an ALU operator lane by lane.
    Lanewise(AluSlot),
}

/// Load engine slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadSlot {
    /// `dest = mem[scratch[addr]]`.
    Load {
        /// Destination scratch address.
        dest: ScratchAddr,
        /// Scratch word holding the memory address.
        addr: ScratchAddr,
    },
    /// `dest + offset = mem[scratch[addr + offset]]`: one lane of a gather.
    LoadOffset {
        /// First word of the destination vector.
        dest: ScratchAddr,
        /// First word of the address vector.
        addr: ScratchAddr,
        /// Lane to load.
        offset: usize,
    },
    /// `dest..dest + VLEN = mem[scratch[addr]..scratch[addr] + VLEN]`.
    Vload {
        /// First destination word.
        dest: ScratchAddr,
        /// Scratch word holding the memory address.
        addr: ScratchAddr,
    },
    /// `dest = value`, no memory access.
    Const {
        /// Destination scratch address.
        dest: ScratchAddr,
        /// Immediate value.
        value: Word,
    },
}

/// Store engine slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreSlot {
    /// `mem[scratch[addr]] = scratch[src]`.
    Store {
        /// Scratch word holding the memory address.
        addr: ScratchAddr,
        /// Source scratch address.
        src: ScratchAddr,
    },
    /// `mem[scratch[addr]..+VLEN] = scratch[src..src + VLEN]`.
    Vstore {
        /// Scratch word holding the memory address.
        addr: ScratchAddr,
        /// First source word.
        src: ScratchAddr,
    },
}

/// Flow engine slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowSlot {
    /// `dest = scratch[cond] != 0 ? scratch[a] : scratch[b]`.
    Select {
        /// Destination.
        dest: ScratchAddr,
        /// Condition word.
        cond: ScratchAddr,
        /// Value when true.
        a: ScratchAddr,
        /// Value when false.
        b: ScratchAddr,
    },
    /// Lane-wise [`FlowSlot::Select`] over `VLEN` words.
    Vselect {
        /// First destination word.
        dest: ScratchAddr,
        /// First condition word.
        cond: ScratchAddr,
        /// First true-value word.
        a: ScratchAddr,
        /// First false-value word.
        b: ScratchAddr,
    },
    /// Stop this core permanently.
    Halt,
    /// Suspend this core until the next `run()` when pausing is enabled.
    Pause,
    /// Append `scratch[src]` to this core's trace buffer.
    TraceWrite {
        /// Word to record.
        src: ScratchAddr,
    },
    /// Jump to an absolute bundle index when `scratch[cond] != 0`.
    CondJump {
        /// Condition word.
        cond: ScratchAddr,
        /// Absolute target.
        target: usize,
    },
    /// Jump relative to the next bundle when `scratch[cond] != 0`.
    CondJumpRel {
        /// Condition word.
        cond: ScratchAddr,
        /// Signed distance from the already-advanced program counter.
        offset: i64,
    },
    /// Unconditional absolute jump.
    Jump {
        /// Absolute target.
        target: usize,
    },
    /// Jump to the bundle index held in `scratch[addr]`.
    JumpIndirect {
        /// Scratch word holding the target.
        addr: ScratchAddr,
    },
    /// `dest = core id`.
    CoreId {
        /// Destination.
        dest: ScratchAddr,
    },
}

/// Annotation carried alongside a bundle and never executed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebugSlot {
    /// Free-form comment.
    Comment(String),
}

/// How a slot touches main memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemAccess {
    /// No main-memory access.
    None,
    /// Reads main memory.
    Read,
    /// Writes main memory.
    Write,
}

/// A slot tagged with the engine that issues it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    /// Scalar ALU slot.
    Alu(AluSlot),
    /// Vector ALU slot.
    Valu(ValuSlot),
    /// Load slot.
    Load(LoadSlot),
    /// Store slot.
    Store(StoreSlot),
    /// Flow slot.
    Flow(FlowSlot),
    /// Non-executing annotation.
    Debug(DebugSlot),
}

/// Range of `VLEN` words starting at `base`.
#[inline]
const fn vector(base: ScratchAddr) -> Range<ScratchAddr> {
    base..base + VLEN
}

/// Range holding the single word `addr`.
#[inline]
const fn word(addr: ScratchAddr) -> Range<ScratchAddr> {
    addr..addr + 1
}

impl Slot {
    /// `dest = op(a, b)` on the scalar ALU.
    pub const fn alu(op: AluOp, dest: ScratchAddr, a: ScratchAddr, b: ScratchAddr) -> Self {
        Self::Alu(AluSlot { op, dest, a, b })
    }

    /// Lane-wise `dest = op(a, b)` on the vector ALU.
    pub const fn valu(op: AluOp, dest: ScratchAddr, a: ScratchAddr, b: ScratchAddr) -> Self {
        Self::Valu(ValuSlot::Lanewise(AluSlot { op, dest, a, b }))
    }

    /// Broadcast a scalar across a vector.
    pub const fn vbroadcast(dest: ScratchAddr, src: ScratchAddr) -> Self {
        Self::Valu(ValuSlot::Vbroadcast { dest, src })
    }

    /// Scalar load through an address word.
    pub const fn load(dest: ScratchAddr, addr: ScratchAddr) -> Self {
        Self::Load(LoadSlot::Load { dest, addr })
    }

    /// One lane of a gather.
    pub const fn load_offset(dest: ScratchAddr, addr: ScratchAddr, offset: usize) -> Self {
        Self::Load(LoadSlot::LoadOffset { dest, addr, offset })
    }

    /// Contiguous vector load.
    pub const fn vload(dest: ScratchAddr, addr: ScratchAddr) -> Self {
        Self::Load(LoadSlot::Vload { dest, addr })
    }

    /// Immediate load.
    pub const fn constant(dest: ScratchAddr, value: Word) -> Self {
        Self::Load(LoadSlot::Const { dest, value })
    }

    /// Scalar store through an address word.
    pub const fn store(addr: ScratchAddr, src: ScratchAddr) -> Self {
        Self::Store(StoreSlot::Store { addr, src })
    }

    /// Contiguous vector store.
    pub const fn vstore(addr: ScratchAddr, src: ScratchAddr) -> Self {
        Self::Store(StoreSlot::Vstore { addr, src })
    }

    /// Scalar select.
    pub const fn select(dest: ScratchAddr, cond: ScratchAddr, a: ScratchAddr, b: ScratchAddr) -> Self {
        Self::Flow(FlowSlot::Select { dest, cond, a, b })
    }

    /// Lane-wise select.
    pub const fn vselect(dest: ScratchAddr, cond: ScratchAddr, a: ScratchAddr, b: ScratchAddr) -> Self {
        Self::Flow(FlowSlot::Vselect { dest, cond, a, b })
    }

    /// Stop the core.
    pub const fn halt() -> Self {
        Self::Flow(FlowSlot::Halt)
    }

    /// Pause the core.
    pub const fn pause() -> Self {
        Self::Flow(FlowSlot::Pause)
    }

    /// Record a word in the core's trace buffer.
    pub const fn trace_write(src: ScratchAddr) -> Self {
        Self::Flow(FlowSlot::TraceWrite { src })
    }

    /// Absolute conditional jump.
    pub const fn cond_jump(cond: ScratchAddr, target: usize) -> Self {
        Self::Flow(FlowSlot::CondJump { cond, target })
    }

    /// Relative conditional jump.
    pub const fn cond_jump_rel(cond: ScratchAddr, offset: i64) -> Self {
        Self::Flow(FlowSlot::CondJumpRel { cond, offset })
    }

    /// Absolute jump.
    pub const fn jump(target: usize) -> Self {
        Self::Flow(FlowSlot::Jump { target })
    }

    /// Jump through a scratch word.
    pub const fn jump_indirect(addr: ScratchAddr) -> Self {
        Self::Flow(FlowSlot::JumpIndirect { addr })
    }

    /// Write the core id.
    pub const fn coreid(dest: ScratchAddr) -> Self {
        Self::Flow(FlowSlot::CoreId { dest })
    }

    /// Non-executing comment.
    pub fn comment(text: impl Into<String>) -> Self {
        Self::Debug(DebugSlot::Comment(text.into()))
    }

    /// Engine that issues this slot, or `None` for debug annotations.
    pub const fn engine(&self) -> Option<Engine> {
        match self {
            Self::Alu(_) => Some(Engine::Alu),
            Self::Valu(_) => Some(Engine::Valu),
            Self::Load(_) => Some(Engine::Load),
            Self::Store(_) => Some(Engine::Store),
            Self::Flow(_) => Some(Engine::Flow),
            Self::Debug(_) => None,
        }
    }

    /// Scratch ranges this slot reads.
    pub fn scratch_reads(&self) -> Vec<Range<ScratchAddr>> {
        match self {
            Self::Alu(s) => vec![word(s.a), word(s.b)],
            Self::Valu(ValuSlot::Vbroadcast { src, .. }) => vec![word(*src)],
            Self::Valu(ValuSlot::Lanewise(s)) => vec![vector(s.a), vector(s.b)],
            Self::Load(LoadSlot::Load { addr, .. } | LoadSlot::Vload { addr, .. }) => {
                vec![word(*addr)]
            }
            Self::Load(LoadSlot::LoadOffset { addr, offset, .. }) => vec![word(addr + offset)],
            Self::Load(LoadSlot::Const { .. }) | Self::Debug(_) => Vec::new(),
            Self::Store(StoreSlot::Store { addr, src }) => vec![word(*addr), word(*src)],
            Self::Store(StoreSlot::Vstore { addr, src }) => vec![word(*addr), vector(*src)],
            Self::Flow(f) => match *f {
                FlowSlot::Select { cond, a, b, .. } => vec![word(cond), word(a), word(b)],
                FlowSlot::Vselect { cond, a, b, .. } => vec![vector(cond), vector(a), vector(b)],
                FlowSlot::TraceWrite { src } => vec![word(src)],
                FlowSlot::CondJump { cond, .. } | FlowSlot::CondJumpRel { cond, .. } => {
                    vec![word(cond)]
                }
                FlowSlot::JumpIndirect { addr } => vec![word(addr)],
                FlowSlot::Halt | FlowSlot::Pause | FlowSlot::Jump { .. } | FlowSlot::CoreId { .. } => {
                    Vec::new()
                }
            },
        }
    }

    /// Scratch ranges this slot writes.
    pub fn scratch_writes(&self) -> Vec<Range<ScratchAddr>> {
        match self {
            Self::Alu(s) => vec![word(s.dest)],
            Self::Valu(ValuSlot::Vbroadcast { dest, .. } | ValuSlot::Lanewise(AluSlot { dest, .. })) => {
                vec![vector(*dest)]
            }
            Self::Load(LoadSlot::Load { dest, .. } | LoadSlot::Const { dest, .. }) => {
                vec![word(*dest)]
            }
            Self::Load(LoadSlot::LoadOffset { dest, offset, .. }) => vec![word(dest + offset)],
            Self::Load(LoadSlot::Vload { dest, .. }) => vec![vector(*dest)],
            Self::Flow(FlowSlot::Select { dest, .. } | FlowSlot::CoreId { dest }) => {
                vec![word(*dest)]
            }
            Self::Flow(FlowSlot::Vselect { dest, .. }) => vec![vector(*dest)],
            Self::Store(_) | Self::Flow(_) | Self::Debug(_) => Vec::new(),
        }
    }

    /// How this slot touches main memory.
    pub const fn memory_access(&self) -> MemAccess {
        match self {
            Self::Load(LoadSlot::Const { .. }) => MemAccess::None,
            Self::Load(_) => MemAccess::Read,
            Self::Store(_) => MemAccess::Write,
            _ => MemAccess::None,
        }
    }

    /// Whether the slot transfers control or has an order-sensitive side effect.
    pub const fn is_barrier(&self) -> bool {
        matches!(
            self,
            Self::Flow(
                FlowSlot::Halt
                    | FlowSlot::Pause
                    | FlowSlot::TraceWrite { .. }
                    | FlowSlot::CondJump { .. }
                    | FlowSlot::CondJumpRel { .. }
                    | FlowSlot::Jump { .. }
                    | FlowSlot::JumpIndirect { .. }
            )
        )
    }
}
