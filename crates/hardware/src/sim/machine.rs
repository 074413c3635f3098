//! Machine: the lockstep multicore simulator.
//!
//! The machine owns the cores, main memory, the program and the optional
//! trace sink. It performs the following:
//! 1. **Scheduling:** Each cycle steps every running core once, in core order.
//! 2. **Execution:** Fetches, validates and executes one bundle per core step,
//!    committing its effects only after every slot has been evaluated.
//! 3. **Pausing:** `run()` returns when no core is running; the next call
//!    resumes paused cores and continues from the same state.

use std::fmt;

use tracing::{debug, trace, warn};

use crate::common::{ExecError, TraceError};
use crate::config::MachineConfig;
use crate::core::{Core, CoreState};
use crate::isa::{Bundle, Program, Word};
use crate::stats::SimStats;

use super::commit::{StagedWrites, StepView};
use super::execute::execute_bundle;
use super::trace::{TraceEvent, TraceSink};

/// A multicore VLIW/SIMD machine.
pub struct Machine {
    /// Cores in stepping order.
    pub cores: Vec<Core>,
    /// Main memory, shared by every core.
    pub mem: Vec<Word>,
    /// Global cycle counter; counts every pass over the cores.
    pub cycle: u64,
    /// Whether `pause` suspends a core.
    pub enable_pause: bool,
    /// Execution statistics.
    pub stats: SimStats,
    program: Program,
    staged: StagedWrites,
    trace: Option<Box<dyn TraceSink>>,
    trace_error: Option<TraceError>,
}

impl fmt::Debug for Machine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Machine")
            .field("cores", &self.cores.len())
            .field("mem_words", &self.mem.len())
            .field("program_len", &self.program.len())
            .field("cycle", &self.cycle)
            .field("enable_pause", &self.enable_pause)
            .field("tracing", &self.trace.is_some())
            .finish_non_exhaustive()
    }
}

impl Machine {
    /// Creates a machine with zeroed scratch on every core, all cores running at `pc = 0`.
    ///
    /// # Arguments
    ///
    /// * `mem` - Initial main memory; the machine works on its own copy.
    /// * `program` - Bundles shared by every core.
    /// * `config` - Core count, scratch size and pause policy.
    pub fn new(mem: Vec<Word>, program: Program, config: &MachineConfig) -> Self {
        let cores = (0..config.n_cores)
            .map(|id| Core::new(id, config.scratch_size))
            .collect();
        Self {
            cores,
            mem,
            cycle: 0,
            enable_pause: config.enable_pause,
            stats: SimStats::new(config.n_cores),
            program,
            staged: StagedWrites::new(),
            trace: None,
            trace_error: None,
        }
    }

    /// Installs a sink that receives every executed slot.
    #[must_use]
    pub fn with_trace_sink(mut self, sink: Box<dyn TraceSink>) -> Self {
        self.trace = Some(sink);
        self
    }

    /// The program every core executes.
    pub fn program(&self) -> &[Bundle] {
        &self.program
    }

    /// Whether any core is still running.
    pub fn any_running(&self) -> bool {
        self.cores.iter().any(Core::is_running)
    }

    /// Whether every core has stopped for good.
    pub fn all_stopped(&self) -> bool {
        self.cores.iter().all(|c| c.state == CoreState::Stopped)
    }

    /// Runs until no core is running.
    ///
    /// Paused cores are resumed first. Each pass over the cores is one cycle;
    /// a running core whose program counter is past the end of the program
    /// stops without executing anything.
    ///
    /// # Errors
    ///
    /// The first [`ExecError`] raised by any core. The faulting bundle's
    /// effects are discarded and the machine should not be run again.
    pub fn run(&mut self) -> Result<(), ExecError> {
        for core in &mut self.cores {
            core.resume();
        }
        let start = self.cycle;
        while self.any_running() {
            for idx in 0..self.cores.len() {
                self.step_core(idx)?;
            }
            self.cycle += 1;
        }
        self.stats.cycles = self.cycle;
        debug!(
            cycles = self.cycle - start,
            total = self.cycle,
            stopped = self.all_stopped(),
            "run returned"
        );
        Ok(())
    }

    /// Steps core `idx` once if it is running.
    fn step_core(&mut self, idx: usize) -> Result<(), ExecError> {
        let Self {
            cores,
            mem,
            cycle,
            enable_pause,
            stats,
            program,
            staged,
            trace: sink,
            trace_error,
        } = self;
        let core = &mut cores[idx];
        if !core.is_running() {
            return Ok(());
        }
        let pc = core.pc;
        let Some(bundle) = program.get(pc) else {
            core.state = CoreState::Stopped;
            debug!(core = idx, pc, "ran off the end of the program");
            return Ok(());
        };
        core.pc += 1;
        bundle
            .validate()
            .map_err(|source| ExecError::MalformedBundle { pc, source })?;
        trace!(core = idx, pc, cycle = *cycle, bundle = %bundle, "step");

        let failed = sink.as_mut().and_then(|out| {
            bundle
                .slots()
                .try_for_each(|(engine, slot_index, slot)| {
                    out.record(&TraceEvent {
                        core: idx,
                        engine,
                        slot_index,
                        cycle: *cycle,
                        pc,
                        slot,
                    })
                })
                .err()
        });
        if let Some(e) = failed {
            warn!(error = %e, "trace sink failed; tracing disabled");
            *trace_error = Some(e);
            *sink = None;
        }

        staged.clear();
        let view = StepView {
            core_id: idx,
            pc,
            next_pc: core.pc,
            scratch: &core.scratch,
            mem: mem.as_slice(),
        };
        execute_bundle(bundle, &view, staged, *enable_pause)?;
        staged.commit(core, mem, pc)?;
        stats.record_bundle(idx, bundle);
        Ok(())
    }

    /// Finishes the trace sink, if any, and reports any error it raised while running.
    ///
    /// # Errors
    ///
    /// The first [`TraceError`] raised during execution, or one from finishing.
    pub fn finish_trace(&mut self) -> Result<(), TraceError> {
        if let Some(e) = self.trace_error.take() {
            return Err(e);
        }
        match self.trace.as_mut() {
            Some(sink) => sink.finish(),
            None => Ok(()),
        }
    }
}
