//! # Statistics Tests
//!
//! Cycle, bundle and per-engine slot accounting.

use pretty_assertions::assert_eq;
use vliwsim_core::isa::{AluOp, Engine, Slot};
use vliwsim_core::stats::SimStats;

use crate::common::harness::{TestContext, bundle_of};

#[test]
fn test_stats_count_bundles_and_slots() {
    let program = vec![
        bundle_of(vec![Slot::constant(0, 1), Slot::constant(1, 2), Slot::comment("x")]),
        bundle_of(vec![
            Slot::alu(AluOp::Add, 2, 0, 1),
            Slot::alu(AluOp::Sub, 3, 0, 1),
            Slot::valu(AluOp::Xor, 8, 8, 8),
        ]),
        bundle_of(vec![Slot::halt()]),
    ];
    let mut ctx = TestContext::with_cores(2, program, vec![0; 4]);
    let _ = ctx.run_ok();
    let stats = &ctx.machine.stats;

    assert_eq!(stats.cycles, 3);
    assert_eq!(stats.bundles, 6);
    assert_eq!(stats.bundles_per_core, vec![3, 3]);
    assert_eq!(stats.slots_on(Engine::Load), 4);
    assert_eq!(stats.slots_on(Engine::Alu), 4);
    assert_eq!(stats.slots_on(Engine::Valu), 2);
    assert_eq!(stats.slots_on(Engine::Store), 0);
    assert_eq!(stats.slots_on(Engine::Flow), 2);
    assert_eq!(stats.total_slots(), 12);
    // 2 flow slots over 6 one-wide bundles.
    assert!((stats.utilization(Engine::Flow) - 1.0 / 3.0).abs() < 1e-9);
}

#[test]
fn test_stats_accumulate_across_runs() {
    let mut ctx = TestContext::from_slots(
        vec![Slot::constant(0, 1), Slot::pause(), Slot::halt()],
        0,
    );
    let _ = ctx.run_ok();
    assert_eq!((ctx.machine.stats.cycles, ctx.machine.stats.bundles), (2, 2));
    let _ = ctx.run_ok();
    assert_eq!((ctx.machine.stats.cycles, ctx.machine.stats.bundles), (3, 3));
}

#[test]
fn test_empty_stats() {
    let stats = SimStats::default();
    assert_eq!(stats.total_slots(), 0);
    assert!(stats.utilization(Engine::Alu).abs() < f64::EPSILON);
    assert!(stats.bundles_per_core.is_empty());
}

#[test]
fn test_stats_serialize_without_timing() {
    let stats = SimStats::new(2);
    let json = serde_json::to_value(&stats).unwrap();
    assert_eq!(json["bundles_per_core"], serde_json::json!([0, 0]));
    assert_eq!(json["slots"].as_array().map(Vec::len), Some(5));
    assert!(json.get("start_time").is_none());
}
