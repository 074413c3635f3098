//! Memory image layout.
//!
//! Main memory starts with an eight-word header followed by the tree values,
//! the lane indices and the lane values, then zeroed scratch room:
//!
//! ```text
//! [0] rounds          [4] tree-values base
//! [1] node count      [5] indices base
//! [2] batch size      [6] values base
//! [3] tree height     [7] first free address
//! ```

use crate::common::VLEN;
use crate::common::constants::{
    HDR_BATCH_SIZE, HDR_EXTRA_ROOM, HDR_FOREST_HEIGHT, HDR_FOREST_VALUES, HDR_INP_INDICES,
    HDR_INP_VALUES, HDR_N_NODES, HDR_ROUNDS, HEADER_WORDS,
};
use crate::isa::Word;

use super::tree::{Input, Tree};

/// Zeroed words reserved past the values array for a kernel of this shape.
fn extra_room(n_nodes: usize, batch_size: usize) -> usize {
    n_nodes + batch_size * 2 + VLEN * 2 + 32
}

/// Lays out `tree` and `input` as a memory image.
pub fn build_mem_image(tree: &Tree, input: &Input) -> Vec<Word> {
    let n_nodes = tree.n_nodes();
    let batch = input.batch_size();
    let forest_values_p = HEADER_WORDS;
    let inp_indices_p = forest_values_p + n_nodes;
    let inp_values_p = inp_indices_p + batch;
    let free = inp_values_p + batch;

    let mut mem = vec![0; free + extra_room(n_nodes, batch)];
    mem[HDR_ROUNDS] = input.rounds as Word;
    mem[HDR_N_NODES] = n_nodes as Word;
    mem[HDR_BATCH_SIZE] = batch as Word;
    mem[HDR_FOREST_HEIGHT] = tree.height as Word;
    mem[HDR_FOREST_VALUES] = forest_values_p as Word;
    mem[HDR_INP_INDICES] = inp_indices_p as Word;
    mem[HDR_INP_VALUES] = inp_values_p as Word;
    mem[HDR_EXTRA_ROOM] = free as Word;

    mem[forest_values_p..inp_indices_p].copy_from_slice(&tree.values);
    mem[inp_indices_p..inp_values_p].copy_from_slice(&input.indices);
    mem[inp_values_p..free].copy_from_slice(&input.values);
    mem
}

/// Decoded memory header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    /// Number of rounds.
    pub rounds: usize,
    /// Number of tree nodes.
    pub n_nodes: usize,
    /// Number of lanes.
    pub batch_size: usize,
    /// Tree height.
    pub forest_height: usize,
    /// Base of the tree values.
    pub forest_values_p: usize,
    /// Base of the lane indices.
    pub inp_indices_p: usize,
    /// Base of the lane values.
    pub inp_values_p: usize,
    /// First address past the three arrays.
    pub extra_room: usize,
}

impl Layout {
    /// Reads the header of `mem`, or `None` if the header or any array it
    /// describes does not fit in `mem`. A round count of `Word::MAX` is also
    /// rejected; the kernels' round loop cannot terminate on it.
    pub fn read(mem: &[Word]) -> Option<Self> {
        let header = mem.get(..HEADER_WORDS)?;
        let at = |i: usize| header[i] as usize;
        let layout = Self {
            rounds: at(HDR_ROUNDS),
            n_nodes: at(HDR_N_NODES),
            batch_size: at(HDR_BATCH_SIZE),
            forest_height: at(HDR_FOREST_HEIGHT),
            forest_values_p: at(HDR_FOREST_VALUES),
            inp_indices_p: at(HDR_INP_INDICES),
            inp_values_p: at(HDR_INP_VALUES),
            extra_room: at(HDR_EXTRA_ROOM),
        };
        let fits = |base: usize, len: usize| base.checked_add(len).is_some_and(|end| end <= mem.len());
        (header[HDR_ROUNDS] < Word::MAX
            && fits(layout.forest_values_p, layout.n_nodes)
            && fits(layout.inp_indices_p, layout.batch_size)
            && fits(layout.inp_values_p, layout.batch_size))
        .then_some(layout)
    }

    /// The tree values in `mem`; empty if `mem` is too short.
    pub fn forest<'a>(&self, mem: &'a [Word]) -> &'a [Word] {
        mem.get(self.forest_values_p..self.forest_values_p + self.n_nodes).unwrap_or_default()
    }

    /// The lane indices in `mem`.
    pub fn indices<'a>(&self, mem: &'a [Word]) -> &'a [Word] {
        mem.get(self.inp_indices_p..self.inp_indices_p + self.batch_size).unwrap_or_default()
    }

    /// The lane values in `mem`.
    pub fn values<'a>(&self, mem: &'a [Word]) -> &'a [Word] {
        mem.get(self.inp_values_p..self.inp_values_p + self.batch_size).unwrap_or_default()
    }
}
