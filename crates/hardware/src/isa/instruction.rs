//! Instruction bundles and programs.
//!
//! A bundle is one cycle's worth of slots, grouped by engine. Slots within a
//! bundle are issued together and observe the state from before the bundle.
//! The number of slots per engine is bounded by [`Engine::slot_limit`]; the
//! builder rejects overflowing bundles and the machine re-checks every bundle
//! it fetches.

use serde::{Deserialize, Serialize};

use super::engine::Engine;
use super::slot::{AluSlot, DebugSlot, FlowSlot, LoadSlot, Slot, StoreSlot, ValuSlot};
use crate::common::IsaError;

/// One VLIW instruction: per-engine slot lists issued in the same cycle.
///
/// Serializes as a map from engine name to slot list; empty engines are omitted.
/// Unknown engine names are rejected on deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Bundle {
    /// Scalar ALU slots.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alu: Vec<AluSlot>,
    /// Vector ALU slots.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub valu: Vec<ValuSlot>,
    /// Load slots.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub load: Vec<LoadSlot>,
    /// Store slots.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub store: Vec<StoreSlot>,
    /// Flow slots.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flow: Vec<FlowSlot>,
    /// Annotations; never executed.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub debug: Vec<DebugSlot>,
}

/// An ordered list of bundles; program counters index into it.
pub type Program = Vec<Bundle>;

impl Bundle {
    /// Creates an empty bundle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a bundle from slots, failing if any engine overflows.
    ///
    /// # Errors
    ///
    /// Returns [`IsaError::SlotLimitExceeded`] when an engine receives more
    /// slots than its issue width.
    pub fn from_slots(slots: impl IntoIterator<Item = Slot>) -> Result<Self, IsaError> {
        let mut bundle = Self::new();
        for slot in slots {
            bundle.push(slot)?;
        }
        Ok(bundle)
    }

    /// Number of slots issued on `engine`.
    pub fn len(&self, engine: Engine) -> usize {
        match engine {
            Engine::Alu => self.alu.len(),
            Engine::Valu => self.valu.len(),
            Engine::Load => self.load.len(),
            Engine::Store => self.store.len(),
            Engine::Flow => self.flow.len(),
        }
    }

    /// Whether `engine` can accept another slot.
    #[inline]
    pub fn has_room(&self, engine: Engine) -> bool {
        self.len(engine) < engine.slot_limit()
    }

    /// Total number of executing slots.
    pub fn slot_count(&self) -> usize {
        Engine::ALL.iter().map(|&e| self.len(e)).sum()
    }

    /// Whether the bundle carries no executing slots.
    pub fn is_empty(&self) -> bool {
        self.slot_count() == 0
    }

    /// Appends a slot to its engine's list.
    ///
    /// # Errors
    ///
    /// Returns [`IsaError::SlotLimitExceeded`] if the engine is already full.
    pub fn push(&mut self, slot: Slot) -> Result<(), IsaError> {
        if let Some(engine) = slot.engine() {
            if !self.has_room(engine) {
                return Err(IsaError::SlotLimitExceeded {
                    engine,
                    count: self.len(engine) + 1,
                    limit: engine.slot_limit(),
                });
            }
        }
        match slot {
            Slot::Alu(s) => self.alu.push(s),
            Slot::Valu(s) => self.valu.push(s),
            Slot::Load(s) => self.load.push(s),
            Slot::Store(s) => self.store.push(s),
            Slot::Flow(s) => self.flow.push(s),
            Slot::Debug(s) => self.debug.push(s),
        }
        Ok(())
    }

    /// Checks every engine against its issue width.
    ///
    /// # Errors
    ///
    /// Returns the first [`IsaError::SlotLimitExceeded`] found.
    pub fn validate(&self) -> Result<(), IsaError> {
        for engine in Engine::ALL {
            let count = self.len(engine);
            if count > engine.slot_limit() {
                return Err(IsaError::SlotLimitExceeded {
                    engine,
                    count,
                    limit: engine.slot_limit(),
                });
            }
        }
        Ok(())
    }

    /// Executing slots in commit order (alu, valu, load, store, flow), each
    /// tagged with its engine and its index within that engine.
    pub fn slots(&self) -> impl Iterator<Item = (Engine, usize, Slot)> + '_ {
        let tag = |engine: Engine| move |(i, slot): (usize, Slot)| (engine, i, slot);
        let alu = self.alu.iter().map(|s| Slot::Alu(*s)).enumerate().map(tag(Engine::Alu));
        let valu = self.valu.iter().map(|s| Slot::Valu(*s)).enumerate().map(tag(Engine::Valu));
        let load = self.load.iter().map(|s| Slot::Load(*s)).enumerate().map(tag(Engine::Load));
        let store = self.store.iter().map(|s| Slot::Store(*s)).enumerate().map(tag(Engine::Store));
        let flow = self.flow.iter().map(|s| Slot::Flow(*s)).enumerate().map(tag(Engine::Flow));
        alu.chain(valu).chain(load).chain(store).chain(flow)
    }
}

impl From<Slot> for Bundle {
    /// A bundle holding a single slot. One slot never overflows an engine.
    fn from(slot: Slot) -> Self {
        let mut bundle = Self::new();
        match slot {
            Slot::Alu(s) => bundle.alu.push(s),
            Slot::Valu(s) => bundle.valu.push(s),
            Slot::Load(s) => bundle.load.push(s),
            Slot::Store(s) => bundle.store.push(s),
            Slot::Flow(s) => bundle.flow.push(s),
            Slot::Debug(s) => bundle.debug.push(s),
        }
        bundle
    }
}
