//! Bundle packing.
//!
//! Turns a straight-line list of slots into bundles. Two strategies exist:
//! 1. **Sequential:** One slot per bundle, in order.
//! 2. **List scheduling:** Each slot goes into the earliest bundle that keeps
//!    every dependency on earlier slots and has a free slot on its engine.
//!
//! Dependencies are tracked per scratch word and for main memory as a whole.
//! Because every slot reads the state from before its bundle, a reader and a
//! later writer of the same word may share a bundle, while a writer and a
//! later reader may not.

use std::collections::HashMap;

use crate::common::IsaError;
use crate::isa::{Bundle, MemAccess, ScratchAddr, Slot};

/// Packs `slots` one per bundle.
pub fn sequential(slots: Vec<Slot>) -> Vec<Bundle> {
    slots.into_iter().map(Bundle::from).collect()
}

/// Packs `slots` with a dependency-aware greedy list scheduler.
///
/// The result executes exactly like [`sequential`] on the same slots:
/// - a slot reading a word is placed after the bundle of its last writer;
/// - a slot writing a word is placed after its last writer and no earlier
///   than its last reader;
/// - loads follow the last store, stores follow the last store and come no
///   earlier than the last load;
/// - control transfers and trace writes share a bundle only with earlier
///   slots, never with later ones.
///
/// Debug annotations ride along in the bundle of the preceding slot.
///
/// # Errors
///
/// Never fails for well-formed input; the error path guards the engine
/// capacity invariant of every produced bundle.
pub fn list_schedule(slots: Vec<Slot>) -> Result<Vec<Bundle>, IsaError> {
    let mut packer = Packer::default();
    for slot in slots {
        packer.place(slot)?;
    }
    Ok(packer.bundles)
}

/// Scheduling state.
#[derive(Debug, Default)]
struct Packer {
    bundles: Vec<Bundle>,
    last_write: HashMap<ScratchAddr, usize>,
    last_read: HashMap<ScratchAddr, usize>,
    last_load: Option<usize>,
    last_store: Option<usize>,
    last_barrier: Option<usize>,
    last_placed: Option<usize>,
}

/// Index one past `bundle`, i.e. the first bundle strictly after it.
#[inline]
fn after(bundle: Option<usize>) -> usize {
    bundle.map_or(0, |b| b + 1)
}

impl Packer {
    /// Earliest bundle `slot` may occupy.
    fn earliest(&self, slot: &Slot) -> usize {
        let mut earliest = after(self.last_barrier);

        for addr in slot.scratch_reads().into_iter().flatten() {
            earliest = earliest.max(after(self.last_write.get(&addr).copied()));
        }
        for addr in slot.scratch_writes().into_iter().flatten() {
            earliest = earliest.max(after(self.last_write.get(&addr).copied()));
            earliest = earliest.max(self.last_read.get(&addr).copied().unwrap_or(0));
        }

        match slot.memory_access() {
            MemAccess::Read => earliest = earliest.max(after(self.last_store)),
            MemAccess::Write => {
                earliest = earliest.max(after(self.last_store));
                earliest = earliest.max(self.last_load.unwrap_or(0));
            }
            MemAccess::None => {}
        }

        if slot.is_barrier() {
            earliest = earliest.max(self.last_placed.unwrap_or(0));
        }
        earliest
    }

    /// Places one slot and records what it touched.
    fn place(&mut self, slot: Slot) -> Result<(), IsaError> {
        let Some(engine) = slot.engine() else {
            let at = self.last_placed.unwrap_or(0);
            if self.bundles.is_empty() {
                self.bundles.push(Bundle::new());
            }
            return self.bundles[at].push(slot);
        };

        let mut at = self.earliest(&slot);
        while at < self.bundles.len() && !self.bundles[at].has_room(engine) {
            at += 1;
        }
        if at >= self.bundles.len() {
            self.bundles.resize_with(at + 1, Bundle::new);
        }

        for addr in slot.scratch_reads().into_iter().flatten() {
            let entry = self.last_read.entry(addr).or_insert(at);
            *entry = (*entry).max(at);
        }
        for addr in slot.scratch_writes().into_iter().flatten() {
            let _ = self.last_write.insert(addr, at);
        }
        match slot.memory_access() {
            MemAccess::Read => self.last_load = Some(self.last_load.map_or(at, |l| l.max(at))),
            MemAccess::Write => self.last_store = Some(at),
            MemAccess::None => {}
        }
        if slot.is_barrier() {
            self.last_barrier = Some(at);
        }
        self.last_placed = Some(self.last_placed.map_or(at, |p| p.max(at)));

        self.bundles[at].push(slot)
    }
}
