//! Reference oracle.
//!
//! Two behavioral implementations of the traversal, independent of the ISA:
//! 1. **Structured:** [`reference_kernel`] updates an [`Input`] in place.
//! 2. **Flat memory:** [`RoundStates`] walks a memory image and yields the
//!    full memory after every round, starting with the initial image.
//!
//! Each round, every lane hashes its value XORed with the value of its
//! current node, then steps to the left child on an even hash and the right
//! child on an odd one, wrapping to the root past the last node.

use crate::compiler::hash::hash_word;
use crate::isa::Word;

use super::image::Layout;
use super::tree::{Input, Tree};

/// Runs every round of `input` over `tree`.
pub fn reference_kernel(tree: &Tree, input: &mut Input) {
    for _ in 0..input.rounds {
        for (idx, val) in input.indices.iter_mut().zip(input.values.iter_mut()) {
            let node = tree.values.get(*idx as usize).copied().unwrap_or(0);
            *val = hash_word(*val ^ node);
            *idx = tree.next_index(*idx as usize, *val) as Word;
        }
    }
}

/// Lazy sequence of memory states, one per round boundary.
///
/// Yields `rounds + 1` states: the initial image, then the image after each
/// round. Clone it before iterating to replay the sequence from the start.
#[derive(Debug, Clone)]
pub struct RoundStates {
    mem: Vec<Word>,
    layout: Layout,
    next_round: usize,
}

impl RoundStates {
    /// Starts a sequence over a copy of `mem`, or `None` if its header is malformed.
    pub fn new(mem: &[Word]) -> Option<Self> {
        let layout = Layout::read(mem)?;
        Some(Self {
            mem: mem.to_vec(),
            layout,
            next_round: 0,
        })
    }

    /// The decoded header.
    pub const fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Applies one round to the owned memory.
    fn step(&mut self) {
        let l = self.layout;
        for lane in 0..l.batch_size {
            let idx = self.mem[l.inp_indices_p + lane] as usize;
            let val = self.mem[l.inp_values_p + lane];
            // Indices outside the tree read node value 0.
            let node = if idx < l.n_nodes {
                self.mem[l.forest_values_p + idx]
            } else {
                0
            };
            let val = hash_word(val ^ node);
            let next = 2 * idx + if val % 2 == 0 { 1 } else { 2 };
            self.mem[l.inp_values_p + lane] = val;
            self.mem[l.inp_indices_p + lane] = if next >= l.n_nodes { 0 } else { next as Word };
        }
    }
}

impl Iterator for RoundStates {
    type Item = Vec<Word>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_round > self.layout.rounds {
            return None;
        }
        if self.next_round > 0 {
            self.step();
        }
        self.next_round += 1;
        Some(self.mem.clone())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.layout.rounds + 1).saturating_sub(self.next_round);
        (left, Some(left))
    }
}

impl ExactSizeIterator for RoundStates {}
