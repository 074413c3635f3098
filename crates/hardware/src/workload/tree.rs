//! Tree and input batch generation.
//!
//! The tree is a perfect binary tree stored as a flat array: node `i` has
//! children `2i + 1` and `2i + 2`. Node values and initial lane values are
//! drawn uniformly below 2^30; every lane starts at the root.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::common::constants::VALUE_LIMIT;
use crate::config::WorkloadConfig;
use crate::isa::Word;

/// A perfect binary tree of `2^(height+1) - 1` node values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tree {
    /// Height; a single root has height 0.
    pub height: usize,
    /// Node values in level order.
    pub values: Vec<Word>,
}

impl Tree {
    /// Number of nodes in a tree of `height`.
    pub const fn node_count(height: usize) -> usize {
        (1 << (height + 1)) - 1
    }

    /// Generates a tree with random node values.
    pub fn generate<R: Rng + ?Sized>(height: usize, rng: &mut R) -> Self {
        let values = (0..Self::node_count(height))
            .map(|_| rng.gen_range(0..VALUE_LIMIT))
            .collect();
        Self { height, values }
    }

    /// Number of nodes.
    pub fn n_nodes(&self) -> usize {
        self.values.len()
    }

    /// Child index taken from `idx` for a hashed lane value, wrapping to the
    /// root once it reaches the node count.
    #[inline]
    pub fn next_index(&self, idx: usize, hashed: Word) -> usize {
        let next = 2 * idx + if hashed % 2 == 0 { 1 } else { 2 };
        if next >= self.n_nodes() { 0 } else { next }
    }
}

/// A batch of traversal lanes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Input {
    /// Current node index per lane.
    pub indices: Vec<Word>,
    /// Current value per lane.
    pub values: Vec<Word>,
    /// Number of rounds to run.
    pub rounds: usize,
}

impl Input {
    /// Generates `batch_size` lanes at the root with random values.
    pub fn generate<R: Rng + ?Sized>(batch_size: usize, rounds: usize, rng: &mut R) -> Self {
        Self {
            indices: vec![0; batch_size],
            values: (0..batch_size).map(|_| rng.gen_range(0..VALUE_LIMIT)).collect(),
            rounds,
        }
    }

    /// Number of lanes.
    pub fn batch_size(&self) -> usize {
        self.indices.len()
    }
}

/// Generates the tree and input batch for `config`; the seed fully determines both.
///
/// # Examples
///
/// ```
/// use vliwsim_core::config::WorkloadConfig;
/// use vliwsim_core::workload::generate;
///
/// let config = WorkloadConfig { forest_height: 2, rounds: 1, batch_size: 32, seed: 7 };
/// let (tree, input) = generate(&config);
/// assert_eq!(tree.n_nodes(), 7);
/// assert_eq!(input.batch_size(), 32);
/// assert_eq!(generate(&config), (tree, input));
/// ```
pub fn generate(config: &WorkloadConfig) -> (Tree, Input) {
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let tree = Tree::generate(config.forest_height, &mut rng);
    let input = Input::generate(config.batch_size, config.rounds, &mut rng);
    (tree, input)
}
