//! Simulation statistics collection and reporting.
//!
//! This module tracks performance metrics for the VLIW simulator. It provides:
//! 1. **Cycles:** Machine cycles elapsed across every `run()` call.
//! 2. **Bundles:** Bundles executed in total and per core.
//! 3. **Slot mix:** Executed slots per engine and their utilization of the issue width.

use std::time::Instant;

use serde::Serialize;

use crate::isa::{Bundle, Engine};

/// Simulation statistics structure tracking execution metrics.
#[derive(Clone, Debug, Serialize)]
pub struct SimStats {
    #[serde(skip)]
    start_time: Instant,
    /// Total machine cycles elapsed.
    pub cycles: u64,
    /// Number of bundles executed by all cores.
    pub bundles: u64,
    /// Executed slots per engine, indexed by [`Engine::index`].
    pub slots: [u64; Engine::ALL.len()],
    /// Bundles executed per core.
    pub bundles_per_core: Vec<u64>,
}

impl SimStats {
    /// Creates zeroed statistics for `n_cores` cores.
    pub fn new(n_cores: usize) -> Self {
        Self {
            start_time: Instant::now(),
            cycles: 0,
            bundles: 0,
            slots: [0; Engine::ALL.len()],
            bundles_per_core: vec![0; n_cores],
        }
    }

    /// Accounts one bundle executed by `core`.
    pub fn record_bundle(&mut self, core: usize, bundle: &Bundle) {
        self.bundles += 1;
        if let Some(count) = self.bundles_per_core.get_mut(core) {
            *count += 1;
        }
        for engine in Engine::ALL {
            self.slots[engine.index()] += bundle.len(engine) as u64;
        }
    }

    /// Executed slots on `engine`.
    pub const fn slots_on(&self, engine: Engine) -> u64 {
        self.slots[engine.index()]
    }

    /// Total executed slots over all engines.
    pub fn total_slots(&self) -> u64 {
        self.slots.iter().sum()
    }

    /// Fraction of `engine`'s issue width that executed bundles used.
    pub fn utilization(&self, engine: Engine) -> f64 {
        if self.bundles == 0 {
            return 0.0;
        }
        self.slots_on(engine) as f64 / (self.bundles * engine.slot_limit() as u64) as f64
    }

    /// Prints all statistics to stdout.
    pub fn print(&self) {
        let seconds = self.start_time.elapsed().as_secs_f64();
        let cyc = self.cycles.max(1);
        let slots_per_cycle = self.total_slots() as f64 / cyc as f64;

        println!("\n==========================================================");
        println!("VLIW MACHINE SIMULATION STATISTICS");
        println!("==========================================================");
        println!("host_seconds             {seconds:.4} s");
        println!("sim_cycles               {}", self.cycles);
        println!("sim_bundles              {}", self.bundles);
        println!("sim_slots                {}", self.total_slots());
        println!("sim_slots_per_cycle      {slots_per_cycle:.4}");
        println!("----------------------------------------------------------");
        println!("SLOT MIX");
        for engine in Engine::ALL {
            println!(
                "  slots.{:<16} {} ({:.2}% of width)",
                engine.name(),
                self.slots_on(engine),
                self.utilization(engine) * 100.0
            );
        }
        println!("----------------------------------------------------------");
        println!("CORES");
        for (core, count) in self.bundles_per_core.iter().enumerate() {
            println!("  core{core}.bundles         {count}");
        }
        println!("==========================================================");
    }
}

impl Default for SimStats {
    /// Returns zeroed statistics with no per-core counters.
    fn default() -> Self {
        Self::new(0)
    }
}
