//! # Machine Tests
//!
//! Cycle accounting, two-phase commit within a bundle, the order in which
//! cores observe each other's memory writes, control flow and pause/resume.

use pretty_assertions::assert_eq;
use vliwsim_core::common::{ExecError, SCRATCH_SIZE};
use vliwsim_core::core::CoreState;
use vliwsim_core::isa::{AluOp, Slot};

use crate::common::harness::{TestContext, bundle_of, program_of};

#[test]
fn test_halt_stops_the_core() {
    let mut ctx = TestContext::from_slots(vec![Slot::constant(0, 1), Slot::halt()], 4);
    let _ = ctx.run_ok();
    assert_eq!(ctx.machine.cores[0].state, CoreState::Stopped);
    assert_eq!(ctx.cycle(), 2);
    assert!(ctx.machine.all_stopped());
}

#[test]
fn test_running_off_the_end_stops_after_one_more_cycle() {
    let mut ctx = TestContext::from_slots(vec![Slot::constant(0, 1)], 4);
    let _ = ctx.run_ok();
    assert_eq!(ctx.scratch(0, 0), 1);
    assert_eq!(ctx.machine.cores[0].state, CoreState::Stopped);
    assert_eq!(ctx.cycle(), 2);
}

#[test]
fn test_empty_program_stops_immediately() {
    let mut ctx = TestContext::from_slots(Vec::new(), 0);
    let _ = ctx.run_ok();
    assert_eq!(ctx.cycle(), 1);
    assert_eq!(ctx.machine.stats.bundles, 0);
}

#[test]
fn test_slots_in_a_bundle_read_pre_bundle_scratch() {
    let program = vec![
        bundle_of(vec![Slot::constant(0, 1), Slot::constant(1, 2)]),
        // Swap through the zero cell at 2.
        bundle_of(vec![
            Slot::alu(AluOp::Add, 0, 1, 2),
            Slot::alu(AluOp::Add, 1, 0, 2),
        ]),
        bundle_of(vec![Slot::halt()]),
    ];
    let mut ctx = TestContext::new(program, vec![0; 4]);
    let _ = ctx.run_ok();
    assert_eq!((ctx.scratch(0, 0), ctx.scratch(0, 1)), (2, 1));
}

#[test]
fn test_load_in_a_bundle_reads_pre_bundle_memory() {
    let program = vec![
        bundle_of(vec![Slot::constant(3, 5), Slot::constant(4, 42)]),
        bundle_of(vec![Slot::store(3, 4), Slot::load(6, 3)]),
        bundle_of(vec![Slot::halt()]),
    ];
    let mut mem = vec![0; 8];
    mem[5] = 9;
    let mut ctx = TestContext::new(program, mem);
    let _ = ctx.run_ok();
    assert_eq!(ctx.scratch(0, 6), 9);
    assert_eq!(ctx.mem(5), 42);
}

#[test]
fn test_later_writer_in_a_bundle_wins() {
    // A vbroadcast and a load write the same cell; load commits after valu.
    let program = vec![
        bundle_of(vec![Slot::constant(0, 7)]),
        bundle_of(vec![Slot::vbroadcast(8, 0), Slot::constant(8, 99)]),
        bundle_of(vec![Slot::halt()]),
    ];
    let mut ctx = TestContext::new(program, vec![0; 4]);
    let _ = ctx.run_ok();
    assert_eq!(ctx.scratch_vec(0, 8, 8), vec![99, 7, 7, 7, 7, 7, 7, 7]);
}

#[test]
fn test_lower_core_writes_are_visible_to_higher_cores_in_the_same_cycle() {
    let mut program = program_of(vec![
        Slot::coreid(0),
        Slot::constant(1, 5),
        Slot::constant(2, 100),
        Slot::alu(AluOp::Add, 2, 2, 0),
    ]);
    program.push(bundle_of(vec![Slot::store(1, 2), Slot::load(3, 1)]));
    program.push(bundle_of(vec![Slot::halt()]));

    let mut ctx = TestContext::with_cores(2, program, vec![0; 8]);
    let _ = ctx.run_ok();
    // Core 0 ran its bundle first and saw the old word.
    assert_eq!(ctx.scratch(0, 3), 0);
    // Core 1 saw core 0's store from the same cycle.
    assert_eq!(ctx.scratch(1, 3), 100);
    assert_eq!(ctx.mem(5), 101);
    assert_eq!(ctx.cycle(), 6);
}

#[test]
fn test_highest_core_wins_same_cycle_store_to_one_word() {
    // Every core stores its id to word 5 in the same cycle.
    let mut program = program_of(vec![Slot::coreid(0), Slot::constant(1, 5)]);
    program.push(bundle_of(vec![Slot::store(1, 0)]));
    program.push(bundle_of(vec![Slot::halt()]));

    let mut ctx = TestContext::with_cores(4, program, vec![0; 8]);
    let _ = ctx.run_ok();
    assert_eq!(ctx.mem(5), 3);
    assert_eq!(ctx.cycle(), 4);
}

#[test]
fn test_later_store_in_a_bundle_wins() {
    let mut program = program_of(vec![
        Slot::constant(0, 5),
        Slot::constant(1, 7),
        Slot::constant(2, 8),
    ]);
    program.push(bundle_of(vec![Slot::store(0, 1), Slot::store(0, 2)]));
    program.push(bundle_of(vec![Slot::halt()]));

    let mut ctx = TestContext::new(program, vec![0; 8]);
    let _ = ctx.run_ok();
    assert_eq!(ctx.mem(5), 8);
}

#[test]
fn test_coreid_reports_each_core() {
    let mut ctx = TestContext::with_cores(4, program_of(vec![Slot::coreid(9), Slot::halt()]), vec![]);
    let _ = ctx.run_ok();
    let ids: Vec<_> = (0..4).map(|c| ctx.scratch(c, 9)).collect();
    assert_eq!(ids, vec![0, 1, 2, 3]);
}

#[test]
fn test_halted_core_does_not_stop_the_others() {
    // Core 0 jumps straight to a halt; core 1 keeps going.
    let program = program_of(vec![
        Slot::coreid(0),
        Slot::alu(AluOp::Eq, 1, 0, 2),
        Slot::cond_jump_rel(1, 3),
        Slot::constant(4, 1),
        Slot::constant(5, 1),
        Slot::halt(),
        Slot::halt(),
    ]);
    let mut ctx = TestContext::with_cores(2, program, vec![]);
    let _ = ctx.run_ok();
    assert_eq!((ctx.scratch(0, 4), ctx.scratch(0, 5)), (0, 0));
    assert_eq!((ctx.scratch(1, 4), ctx.scratch(1, 5)), (1, 1));
    assert_eq!(ctx.machine.stats.bundles_per_core, vec![4, 6]);
    assert!(ctx.machine.all_stopped());
    assert_eq!(ctx.cycle(), 6);
}

#[test]
fn test_cond_jump_rel_is_relative_to_the_next_bundle() {
    let mut ctx = TestContext::from_slots(
        vec![
            Slot::constant(0, 1),
            Slot::cond_jump_rel(0, 1),
            Slot::constant(1, 99),
            Slot::constant(2, 5),
            Slot::halt(),
        ],
        0,
    );
    let _ = ctx.run_ok();
    assert_eq!((ctx.scratch(0, 1), ctx.scratch(0, 2)), (0, 5));
}

#[test]
fn test_cond_jump_rel_before_the_program_halts() {
    let mut ctx = TestContext::from_slots(
        vec![
            Slot::constant(0, 1),
            Slot::cond_jump_rel(0, -10),
            Slot::constant(1, 99),
        ],
        0,
    );
    let _ = ctx.run_ok();
    assert_eq!(ctx.scratch(0, 1), 0);
    assert_eq!(ctx.machine.cores[0].state, CoreState::Stopped);
    assert_eq!(ctx.cycle(), 2);
}

#[test]
fn test_untaken_cond_jump_falls_through() {
    let mut ctx = TestContext::from_slots(
        vec![Slot::cond_jump(0, 3), Slot::constant(1, 99), Slot::halt(), Slot::halt()],
        0,
    );
    let _ = ctx.run_ok();
    assert_eq!(ctx.scratch(0, 1), 99);
}

#[test]
fn test_jump_indirect_reads_its_target_from_scratch() {
    let mut ctx = TestContext::from_slots(
        vec![
            Slot::constant(0, 3),
            Slot::jump_indirect(0),
            Slot::constant(1, 99),
            Slot::halt(),
        ],
        0,
    );
    let _ = ctx.run_ok();
    assert_eq!(ctx.scratch(0, 1), 0);
    assert_eq!(ctx.cycle(), 3);
}

#[test]
fn test_select_and_vselect() {
    let mut slots = vec![
        Slot::constant(0, 1),
        Slot::constant(1, 10),
        Slot::constant(2, 20),
        Slot::select(3, 0, 1, 2),
        Slot::select(4, 5, 1, 2),
    ];
    // Odd lanes of the condition vector are set.
    for lane in 0..8 {
        slots.push(Slot::constant(8 + lane, (lane % 2) as u32));
        slots.push(Slot::constant(16 + lane, 100 + lane as u32));
        slots.push(Slot::constant(24 + lane, 200 + lane as u32));
    }
    slots.push(Slot::vselect(32, 8, 16, 24));
    let mut ctx = TestContext::from_slots(slots, 0);
    let _ = ctx.run_ok();
    assert_eq!((ctx.scratch(0, 3), ctx.scratch(0, 4)), (10, 20));
    assert_eq!(
        ctx.scratch_vec(0, 32, 8),
        vec![200, 101, 202, 103, 204, 105, 206, 107]
    );
}

#[test]
fn test_vector_memory_and_gather() {
    let mut mem: Vec<u32> = (0..32).map(|i| i * 10).collect();
    mem[0] = 8;
    let mut slots = vec![Slot::constant(0, 0), Slot::load(1, 0), Slot::vload(8, 1)];
    // Gather mem[8 + 2 * lane] through per-lane addresses.
    for lane in 0..8 {
        slots.push(Slot::constant(16 + lane, 8 + 2 * lane as u32));
    }
    slots.extend((0..8).map(|lane| Slot::load_offset(24, 16, lane)));
    slots.push(Slot::constant(2, 24));
    slots.push(Slot::vstore(2, 8));
    let mut ctx = TestContext::from_slots(slots, 0);
    ctx.machine.mem = mem;
    let _ = ctx.run_ok();
    assert_eq!(ctx.scratch_vec(0, 8, 8), vec![80, 90, 100, 110, 120, 130, 140, 150]);
    assert_eq!(
        ctx.scratch_vec(0, 24, 8),
        vec![80, 100, 120, 140, 160, 180, 200, 220]
    );
    assert_eq!(&ctx.machine.mem[24..32], &[80, 90, 100, 110, 120, 130, 140, 150]);
}

#[test]
fn test_trace_write_fills_the_trace_buffer() {
    let mut ctx = TestContext::from_slots(
        vec![
            Slot::constant(0, 3),
            Slot::trace_write(0),
            Slot::constant(0, 4),
            Slot::trace_write(0),
        ],
        0,
    );
    let _ = ctx.run_ok();
    assert_eq!(ctx.machine.cores[0].trace_buf, vec![3, 4]);
}

#[test]
fn test_pause_returns_and_run_resumes() {
    let mut ctx = TestContext::from_slots(
        vec![
            Slot::constant(0, 1),
            Slot::pause(),
            Slot::constant(1, 2),
            Slot::pause(),
            Slot::constant(2, 3),
            Slot::halt(),
        ],
        0,
    );

    let _ = ctx.run_ok();
    assert_eq!(ctx.machine.cores[0].state, CoreState::Paused);
    assert_eq!((ctx.scratch(0, 0), ctx.scratch(0, 1)), (1, 0));
    assert_eq!(ctx.cycle(), 2);

    let _ = ctx.run_ok();
    assert_eq!((ctx.scratch(0, 1), ctx.scratch(0, 2)), (2, 0));
    assert_eq!(ctx.cycle(), 4);

    let _ = ctx.run_ok();
    assert_eq!(ctx.scratch(0, 2), 3);
    assert_eq!(ctx.machine.cores[0].state, CoreState::Stopped);
    assert_eq!(ctx.cycle(), 6);

    // Nothing left to run.
    let _ = ctx.run_ok();
    assert_eq!(ctx.cycle(), 6);
}

#[test]
fn test_disabled_pause_is_a_no_op() {
    let mut ctx = TestContext::from_slots(
        vec![
            Slot::constant(0, 1),
            Slot::pause(),
            Slot::constant(1, 2),
            Slot::halt(),
        ],
        0,
    );
    ctx.machine.enable_pause = false;
    let _ = ctx.run_ok();
    assert_eq!(ctx.scratch(0, 1), 2);
    assert_eq!(ctx.machine.cores[0].state, CoreState::Stopped);
    assert_eq!(ctx.cycle(), 4);
}

#[test]
fn test_out_of_bounds_accesses_fault() {
    let mut ctx = TestContext::from_slots(vec![Slot::constant(0, 100), Slot::load(1, 0)], 4);
    assert_eq!(
        ctx.run(),
        Err(ExecError::MemoryOutOfBounds {
            core: 0,
            pc: 1,
            addr: 100,
        })
    );

    let mut ctx = TestContext::from_slots(vec![Slot::constant(0, 4), Slot::store(0, 0)], 4);
    assert_eq!(
        ctx.run(),
        Err(ExecError::MemoryOutOfBounds {
            core: 0,
            pc: 1,
            addr: 4,
        })
    );

    let mut ctx = TestContext::from_slots(vec![Slot::alu(AluOp::Add, SCRATCH_SIZE, 0, 0)], 0);
    assert_eq!(
        ctx.run(),
        Err(ExecError::ScratchOutOfBounds {
            core: 0,
            pc: 0,
            addr: SCRATCH_SIZE,
        })
    );
}

#[test]
fn test_out_of_bounds_commit_leaves_state_untouched() {
    // The in-bounds write shares a bundle with the faulting one.
    let program = vec![
        bundle_of(vec![Slot::constant(0, 4), Slot::constant(1, 2)]),
        bundle_of(vec![Slot::store(0, 1), Slot::store(1, 1)]),
    ];
    let mut ctx = TestContext::new(program, vec![0; 4]);
    assert!(ctx.run().is_err());
    assert_eq!(ctx.machine.mem, vec![0; 4]);
}

#[test]
fn test_execution_is_deterministic() {
    let program = program_of(vec![
        Slot::coreid(0),
        Slot::constant(1, 3),
        Slot::alu(AluOp::Mul, 2, 0, 1),
        Slot::store(0, 2),
        Slot::load(3, 1),
        Slot::halt(),
    ]);
    let run = || {
        let mut ctx = TestContext::with_cores(4, program.clone(), vec![0; 8]);
        let _ = ctx.run_ok();
        (
            ctx.machine.mem.clone(),
            ctx.machine.cores.clone(),
            ctx.cycle(),
        )
    };
    assert_eq!(run(), run());
}
