//! Execution tracing.
//!
//! The machine reports every executed slot to an optional [`TraceSink`]. The
//! bundled [`ChromeTraceWriter`] renders events in the Chrome Trace Event
//! Format, loadable in Perfetto or `chrome://tracing`:
//! 1. **Processes:** One per core, named `Core <id>`.
//! 2. **Threads:** One per engine slot position, named `<engine>-<i>`.
//! 3. **Events:** One complete (`"X"`) event per executed slot, one cycle long,
//!    named by the slot mnemonic with the disassembled slot in `args.slot`.

use std::io::Write;

use serde_json::json;

use crate::common::TraceError;
use crate::isa::{Engine, MAX_SLOTS_PER_BUNDLE, Slot};

/// One executed slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEvent {
    /// Core that executed the slot.
    pub core: usize,
    /// Engine that issued the slot.
    pub engine: Engine,
    /// Position of the slot within its engine's list.
    pub slot_index: usize,
    /// Machine cycle the slot executed in.
    pub cycle: u64,
    /// Program counter of the bundle.
    pub pc: usize,
    /// The slot itself.
    pub slot: Slot,
}

/// Consumer of per-slot execution events.
pub trait TraceSink {
    /// Records one executed slot.
    ///
    /// # Errors
    ///
    /// Returns an error if the event cannot be written.
    fn record(&mut self, event: &TraceEvent) -> Result<(), TraceError>;

    /// Flushes and closes the trace. Events recorded afterwards are unspecified.
    ///
    /// # Errors
    ///
    /// Returns an error if the trace cannot be finalized.
    fn finish(&mut self) -> Result<(), TraceError>;
}

/// Thread id of an engine slot position on a core.
///
/// Ids start at 1 and are unique across cores, with every core owning
/// `MAX_SLOTS_PER_BUNDLE` consecutive ids.
pub fn thread_id(core: usize, engine: Engine, slot_index: usize) -> usize {
    let engine_base: usize = Engine::ALL
        .iter()
        .take_while(|&&e| e != engine)
        .map(|e| e.slot_limit())
        .sum();
    1 + core * MAX_SLOTS_PER_BUNDLE + engine_base + slot_index
}

/// Writes a Chrome Trace Event Format JSON array.
#[derive(Debug)]
pub struct ChromeTraceWriter<W: Write> {
    out: W,
    first: bool,
    finished: bool,
}

impl<W: Write> ChromeTraceWriter<W> {
    /// Opens the trace array and writes the process and thread names for `n_cores` cores.
    ///
    /// # Errors
    ///
    /// Returns [`TraceError::Io`] if the writer fails.
    pub fn new(mut out: W, n_cores: usize) -> Result<Self, TraceError> {
        out.write_all(b"[")?;
        let mut first = true;
        for core in 0..n_cores {
            let process = json!({
                "name": "process_name",
                "ph": "M",
                "pid": core,
                "tid": 0,
                "args": { "name": format!("Core {core}") },
            });
            write_entry(&mut out, &process, &mut first)?;
            for engine in Engine::ALL {
                for i in 0..engine.slot_limit() {
                    let thread = json!({
                        "name": "thread_name",
                        "ph": "M",
                        "pid": core,
                        "tid": thread_id(core, engine, i),
                        "args": { "name": format!("{engine}-{i}") },
                    });
                    write_entry(&mut out, &thread, &mut first)?;
                }
            }
        }
        Ok(Self {
            out,
            first,
            finished: false,
        })
    }

    /// Consumes the writer and returns the underlying output.
    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Writes one array element, preceded by a separator unless it is the first.
fn write_entry<W: Write>(
    out: &mut W,
    value: &serde_json::Value,
    first: &mut bool,
) -> Result<(), TraceError> {
    if !*first {
        out.write_all(b",\n")?;
    }
    *first = false;
    serde_json::to_writer(&mut *out, value)?;
    Ok(())
}

impl<W: Write> TraceSink for ChromeTraceWriter<W> {
    fn record(&mut self, event: &TraceEvent) -> Result<(), TraceError> {
        let entry = json!({
            "name": event.slot.mnemonic(),
            "cat": "op",
            "ph": "X",
            "pid": event.core,
            "tid": thread_id(event.core, event.engine, event.slot_index),
            "ts": event.cycle,
            "dur": 1,
            "args": { "slot": event.slot.to_string(), "pc": event.pc },
        });
        write_entry(&mut self.out, &entry, &mut self.first)
    }

    fn finish(&mut self) -> Result<(), TraceError> {
        if !self.finished {
            self.out.write_all(b"]\n")?;
            self.out.flush()?;
            self.finished = true;
        }
        Ok(())
    }
}
