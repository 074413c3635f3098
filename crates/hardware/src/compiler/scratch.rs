//! Scratch memory allocation.
//!
//! Scratch space is handed out by a bump allocator that never frees. Named
//! allocations are recorded in a [`DebugInfo`] map for listings and external
//! tooling; execution never consults it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::common::BuildError;
use crate::isa::ScratchAddr;

/// A named scratch region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScratchSymbol {
    /// Name given at allocation time.
    pub name: String,
    /// Length in words.
    pub len: usize,
}

/// Scratch address to name map produced by a kernel build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugInfo {
    /// Named regions keyed by their first address.
    pub scratch_map: BTreeMap<ScratchAddr, ScratchSymbol>,
}

impl DebugInfo {
    /// Finds the named region containing `addr`, with the offset of `addr` inside it.
    pub fn lookup(&self, addr: ScratchAddr) -> Option<(&ScratchSymbol, usize)> {
        let (&base, symbol) = self.scratch_map.range(..=addr).next_back()?;
        let offset = addr - base;
        (offset < symbol.len).then_some((symbol, offset))
    }

    /// Renders `addr` as `name` or `name+offset`, falling back to the number.
    pub fn describe(&self, addr: ScratchAddr) -> String {
        match self.lookup(addr) {
            Some((symbol, 0)) => symbol.name.clone(),
            Some((symbol, offset)) => format!("{}+{offset}", symbol.name),
            None => addr.to_string(),
        }
    }
}

/// Bump allocator over a fixed scratch capacity.
#[derive(Debug, Clone)]
pub struct ScratchAllocator {
    capacity: usize,
    next: ScratchAddr,
    names: BTreeMap<String, ScratchAddr>,
    debug: DebugInfo,
}

impl ScratchAllocator {
    /// Creates an allocator over `capacity` words.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            next: 0,
            names: BTreeMap::new(),
            debug: DebugInfo::default(),
        }
    }

    /// Reserves `len` contiguous words.
    ///
    /// # Arguments
    ///
    /// * `name` - Optional debug name; recorded with the region's length.
    /// * `len` - Number of words.
    ///
    /// # Returns
    ///
    /// The first address of the region.
    ///
    /// # Errors
    ///
    /// [`BuildError::ScratchOverflow`] if the region does not fit. The
    /// allocator is left unchanged.
    pub fn alloc(&mut self, name: Option<&str>, len: usize) -> Result<ScratchAddr, BuildError> {
        let end = self
            .next
            .checked_add(len)
            .filter(|&end| end <= self.capacity)
            .ok_or(BuildError::ScratchOverflow {
                requested: len,
                used: self.next,
                capacity: self.capacity,
            })?;
        let addr = self.next;
        self.next = end;
        if let Some(name) = name {
            let _ = self.names.insert(name.to_owned(), addr);
            let _ = self.debug.scratch_map.insert(
                addr,
                ScratchSymbol {
                    name: name.to_owned(),
                    len,
                },
            );
        }
        Ok(addr)
    }

    /// Address of the most recent allocation named `name`.
    pub fn get(&self, name: &str) -> Option<ScratchAddr> {
        self.names.get(name).copied()
    }

    /// Words allocated so far.
    pub const fn used(&self) -> usize {
        self.next
    }

    /// Total capacity in words.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Words still available.
    pub const fn remaining(&self) -> usize {
        self.capacity - self.next
    }

    /// Debug map of every named allocation.
    pub const fn debug_info(&self) -> &DebugInfo {
        &self.debug
    }
}
