//! Slot and bundle disassembly.
//!
//! Renders slots as `mnemonic operand, operand, ...` with scratch addresses in
//! decimal and immediates as written. Bundles render as `{engine: [slot; ...] ...}`.
//! Used by step logging and as trace event names.

use std::fmt;

use super::instruction::Bundle;
use super::slot::{AluSlot, DebugSlot, FlowSlot, LoadSlot, Slot, StoreSlot, ValuSlot};

impl ValuSlot {
    /// Mnemonic of this slot.
    pub const fn mnemonic(&self) -> &'static str {
        match self {
            Self::Vbroadcast { .. } => "vbroadcast",
            Self::Lanewise(s) => s.op.symbol(),
        }
    }
}

impl LoadSlot {
    /// Mnemonic of this slot.
    pub const fn mnemonic(&self) -> &'static str {
        match self {
            Self::Load { .. } => "load",
            Self::LoadOffset { .. } => "load_offset",
            Self::Vload { .. } => "vload",
            Self::Const { .. } => "const",
        }
    }
}

impl StoreSlot {
    /// Mnemonic of this slot.
    pub const fn mnemonic(&self) -> &'static str {
        match self {
            Self::Store { .. } => "store",
            Self::Vstore { .. } => "vstore",
        }
    }
}

impl FlowSlot {
    /// Mnemonic of this slot.
    pub const fn mnemonic(&self) -> &'static str {
        match self {
            Self::Select { .. } => "select",
            Self::Vselect { .. } => "vselect",
            Self::Halt => "halt",
            Self::Pause => "pause",
            Self::TraceWrite { .. } => "trace_write",
            Self::CondJump { .. } => "cond_jump",
            Self::CondJumpRel { .. } => "cond_jump_rel",
            Self::Jump { .. } => "jump",
            Self::JumpIndirect { .. } => "jump_indirect",
            Self::CoreId { .. } => "coreid",
        }
    }
}

impl Slot {
    /// Mnemonic of this slot: the operator symbol for ALU slots, the opcode name otherwise.
    pub const fn mnemonic(&self) -> &'static str {
        match self {
            Self::Alu(s) => s.op.symbol(),
            Self::Valu(s) => s.mnemonic(),
            Self::Load(s) => s.mnemonic(),
            Self::Store(s) => s.mnemonic(),
            Self::Flow(s) => s.mnemonic(),
            Self::Debug(_) => "comment",
        }
    }
}

impl fmt::Display for AluSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}, {}, {}", self.op, self.dest, self.a, self.b)
    }
}

impl fmt::Display for ValuSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vbroadcast { dest, src } => write!(f, "vbroadcast {dest}, {src}"),
            Self::Lanewise(s) => fmt::Display::fmt(s, f),
        }
    }
}

impl fmt::Display for LoadSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load { dest, addr } | Self::Vload { dest, addr } => {
                write!(f, "{} {dest}, {addr}", self.mnemonic())
            }
            Self::LoadOffset { dest, addr, offset } => {
                write!(f, "load_offset {dest}, {addr}, {offset}")
            }
            Self::Const { dest, value } => write!(f, "const {dest}, {value:#x}"),
        }
    }
}

impl fmt::Display for StoreSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Store { addr, src } | Self::Vstore { addr, src } => {
                write!(f, "{} {addr}, {src}", self.mnemonic())
            }
        }
    }
}

impl fmt::Display for FlowSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = self.mnemonic();
        match self {
            Self::Select { dest, cond, a, b } | Self::Vselect { dest, cond, a, b } => {
                write!(f, "{m} {dest}, {cond}, {a}, {b}")
            }
            Self::Halt | Self::Pause => f.write_str(m),
            Self::TraceWrite { src } => write!(f, "{m} {src}"),
            Self::CondJump { cond, target } => write!(f, "{m} {cond}, @{target}"),
            Self::CondJumpRel { cond, offset } => write!(f, "{m} {cond}, {offset:+}"),
            Self::Jump { target } => write!(f, "{m} @{target}"),
            Self::JumpIndirect { addr } => write!(f, "{m} {addr}"),
            Self::CoreId { dest } => write!(f, "{m} {dest}"),
        }
    }
}

impl fmt::Display for DebugSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Comment(text) => write!(f, "# {text}"),
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Alu(s) => fmt::Display::fmt(s, f),
            Self::Valu(s) => fmt::Display::fmt(s, f),
            Self::Load(s) => fmt::Display::fmt(s, f),
            Self::Store(s) => fmt::Display::fmt(s, f),
            Self::Flow(s) => fmt::Display::fmt(s, f),
            Self::Debug(s) => fmt::Display::fmt(s, f),
        }
    }
}

/// Writes `name: [a; b]` for a non-empty engine list.
fn write_engine<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    name: &str,
    slots: &[T],
    first: &mut bool,
) -> fmt::Result {
    if slots.is_empty() {
        return Ok(());
    }
    if !*first {
        f.write_str(" ")?;
    }
    *first = false;
    write!(f, "{name}: [")?;
    for (i, slot) in slots.iter().enumerate() {
        if i > 0 {
            f.write_str("; ")?;
        }
        write!(f, "{slot}")?;
    }
    f.write_str("]")
}

impl fmt::Display for Bundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        f.write_str("{")?;
        write_engine(f, "alu", &self.alu, &mut first)?;
        write_engine(f, "valu", &self.valu, &mut first)?;
        write_engine(f, "load", &self.load, &mut first)?;
        write_engine(f, "store", &self.store, &mut first)?;
        write_engine(f, "flow", &self.flow, &mut first)?;
        write_engine(f, "debug", &self.debug, &mut first)?;
        f.write_str("}")
    }
}
