//! Slot execution.
//!
//! Each engine has one executor that evaluates a slot against a [`StepView`]
//! and records its effects in [`StagedWrites`]. [`execute_bundle`] is the
//! dispatch table: it walks the engines in commit order (alu, valu, load,
//! store, flow), so when two slots of one bundle write the same address the
//! later engine, then the later slot, wins.

use crate::common::{ExecError, VLEN};
use crate::core::units::alu::Alu;
use crate::isa::{AluOp, AluSlot, Bundle, FlowSlot, LoadSlot, StoreSlot, ValuSlot, Word};

use super::commit::{ControlEffect, StagedWrites, StepView};

/// Executes every slot of `bundle` into `staged`.
///
/// # Arguments
///
/// * `bundle` - The fetched bundle; debug annotations are skipped.
/// * `view` - State before the bundle.
/// * `staged` - Receives the bundle's effects.
/// * `enable_pause` - Whether `pause` suspends the core.
///
/// # Errors
///
/// Faults from any slot; effects staged before the fault are left in `staged`
/// and must not be committed.
pub fn execute_bundle(
    bundle: &Bundle,
    view: &StepView<'_>,
    staged: &mut StagedWrites,
    enable_pause: bool,
) -> Result<(), ExecError> {
    for slot in &bundle.alu {
        execute_alu(slot, view, staged)?;
    }
    for slot in &bundle.valu {
        execute_valu(slot, view, staged)?;
    }
    for slot in &bundle.load {
        execute_load(slot, view, staged)?;
    }
    for slot in &bundle.store {
        execute_store(slot, view, staged)?;
    }
    for slot in &bundle.flow {
        execute_flow(slot, view, staged, enable_pause)?;
    }
    Ok(())
}

/// Applies `op`, turning a zero divisor into a fault.
#[inline]
fn apply(op: AluOp, a: Word, b: Word, view: &StepView<'_>) -> Result<Word, ExecError> {
    Alu::execute(op, a, b).ok_or(ExecError::DivisionByZero {
        core: view.core_id,
        pc: view.pc,
    })
}

/// Scalar ALU slot.
pub fn execute_alu(
    slot: &AluSlot,
    view: &StepView<'_>,
    staged: &mut StagedWrites,
) -> Result<(), ExecError> {
    let a = view.read(slot.a)?;
    let b = view.read(slot.b)?;
    staged.write_scratch(slot.dest, apply(slot.op, a, b, view)?);
    Ok(())
}

/// Vector ALU slot: broadcast, or the scalar operator applied lane by lane.
pub fn execute_valu(
    slot: &ValuSlot,
    view: &StepView<'_>,
    staged: &mut StagedWrites,
) -> Result<(), ExecError> {
    match *slot {
        ValuSlot::Vbroadcast { dest, src } => {
            let value = view.read(src)?;
            for i in 0..VLEN {
                staged.write_scratch(dest + i, value);
            }
        }
        ValuSlot::Lanewise(AluSlot { op, dest, a, b }) => {
            let lhs = view.read_vec(a)?;
            let rhs = view.read_vec(b)?;
            for i in 0..VLEN {
                staged.write_scratch(dest + i, apply(op, lhs[i], rhs[i], view)?);
            }
        }
    }
    Ok(())
}

/// Load engine slot.
pub fn execute_load(
    slot: &LoadSlot,
    view: &StepView<'_>,
    staged: &mut StagedWrites,
) -> Result<(), ExecError> {
    match *slot {
        LoadSlot::Load { dest, addr } => {
            let addr = view.read(addr)? as usize;
            staged.write_scratch(dest, view.load(addr)?);
        }
        LoadSlot::LoadOffset { dest, addr, offset } => {
            let addr = view.read(addr + offset)? as usize;
            staged.write_scratch(dest + offset, view.load(addr)?);
        }
        LoadSlot::Vload { dest, addr } => {
            let base = view.read(addr)? as usize;
            for i in 0..VLEN {
                staged.write_scratch(dest + i, view.load(base + i)?);
            }
        }
        LoadSlot::Const { dest, value } => staged.write_scratch(dest, value),
    }
    Ok(())
}

/// Store engine slot. Addresses are bounds-checked when the bundle commits.
pub fn execute_store(
    slot: &StoreSlot,
    view: &StepView<'_>,
    staged: &mut StagedWrites,
) -> Result<(), ExecError> {
    match *slot {
        StoreSlot::Store { addr, src } => {
            let addr = view.read(addr)? as usize;
            staged.write_mem(addr, view.read(src)?);
        }
        StoreSlot::Vstore { addr, src } => {
            let base = view.read(addr)? as usize;
            let lanes = view.read_vec(src)?;
            for (i, value) in lanes.into_iter().enumerate() {
                staged.write_mem(base + i, value);
            }
        }
    }
    Ok(())
}

/// Flow engine slot.
pub fn execute_flow(
    slot: &FlowSlot,
    view: &StepView<'_>,
    staged: &mut StagedWrites,
    enable_pause: bool,
) -> Result<(), ExecError> {
    match *slot {
        FlowSlot::Select { dest, cond, a, b } => {
            let chosen = if view.read(cond)? != 0 { a } else { b };
            staged.write_scratch(dest, view.read(chosen)?);
        }
        FlowSlot::Vselect { dest, cond, a, b } => {
            let cond = view.read_vec(cond)?;
            let a = view.read_vec(a)?;
            let b = view.read_vec(b)?;
            for i in 0..VLEN {
                staged.write_scratch(dest + i, if cond[i] != 0 { a[i] } else { b[i] });
            }
        }
        FlowSlot::Halt => staged.set_control(ControlEffect::Halt),
        FlowSlot::Pause => {
            if enable_pause {
                staged.set_control(ControlEffect::Pause);
            }
        }
        FlowSlot::TraceWrite { src } => staged.record_trace(view.read(src)?),
        FlowSlot::CondJump { cond, target } => {
            if view.read(cond)? != 0 {
                staged.set_control(ControlEffect::Jump(target));
            }
        }
        FlowSlot::CondJumpRel { cond, offset } => {
            if view.read(cond)? != 0 {
                let target = view.next_pc as i64 + offset;
                // A target before the program start stops the core.
                let effect = usize::try_from(target).map_or(ControlEffect::Halt, ControlEffect::Jump);
                staged.set_control(effect);
            }
        }
        FlowSlot::Jump { target } => staged.set_control(ControlEffect::Jump(target)),
        FlowSlot::JumpIndirect { addr } => {
            staged.set_control(ControlEffect::Jump(view.read(addr)? as usize));
        }
        FlowSlot::CoreId { dest } => staged.write_scratch(dest, view.core_id as Word),
    }
    Ok(())
}
