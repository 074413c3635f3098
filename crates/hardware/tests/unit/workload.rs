//! # Workload Tests
//!
//! Seeded generation, the memory image layout and agreement between the two
//! forms of the reference oracle.

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;
use vliwsim_core::common::constants::{HEADER_WORDS, VALUE_LIMIT};
use vliwsim_core::config::WorkloadConfig;
use vliwsim_core::workload::{Input, Layout, RoundStates, Tree, build_mem_image, generate, reference_kernel};

fn config(forest_height: usize, rounds: usize, batch_size: usize, seed: u64) -> WorkloadConfig {
    WorkloadConfig {
        forest_height,
        rounds,
        batch_size,
        seed,
    }
}

#[rstest]
#[case(0, 1)]
#[case(1, 3)]
#[case(2, 7)]
#[case(10, 2047)]
fn test_node_count(#[case] height: usize, #[case] nodes: usize) {
    assert_eq!(Tree::node_count(height), nodes);
}

#[test]
fn test_generation_is_seeded() {
    let a = generate(&config(3, 2, 16, 7));
    assert_eq!(generate(&config(3, 2, 16, 7)), a);
    assert_ne!(generate(&config(3, 2, 16, 8)), a);

    let (tree, input) = a;
    assert_eq!(tree.n_nodes(), 15);
    assert!(tree.values.iter().all(|&v| v < VALUE_LIMIT));
    assert!(input.values.iter().all(|&v| v < VALUE_LIMIT));
    assert_eq!(input.indices, vec![0; 16]);
    assert_eq!(input.rounds, 2);
}

#[rstest]
#[case::left_on_even(0, 4, 1)]
#[case::right_on_odd(0, 5, 2)]
#[case::deepest_right(2, 1, 6)]
#[case::past_the_leaves(3, 0, 0)]
#[case::past_the_last_leaf(6, 1, 0)]
fn test_next_index(#[case] idx: usize, #[case] hashed: u32, #[case] next: usize) {
    let tree = Tree {
        height: 2,
        values: vec![0; 7],
    };
    assert_eq!(tree.next_index(idx, hashed), next);
}

#[test]
fn test_memory_image_layout() {
    let tree = Tree {
        height: 1,
        values: vec![10, 11, 12],
    };
    let input = Input {
        indices: vec![0, 1, 2, 0],
        values: vec![20, 21, 22, 23],
        rounds: 5,
    };
    let mem = build_mem_image(&tree, &input);
    assert_eq!(&mem[..HEADER_WORDS], &[5, 3, 4, 1, 8, 11, 15, 19]);
    assert_eq!(&mem[8..19], &[10, 11, 12, 0, 1, 2, 0, 20, 21, 22, 23]);
    // Zeroed room past the arrays.
    assert!(mem.len() > 19);
    assert!(mem[19..].iter().all(|&w| w == 0));

    let layout = Layout::read(&mem).unwrap();
    assert_eq!(
        layout,
        Layout {
            rounds: 5,
            n_nodes: 3,
            batch_size: 4,
            forest_height: 1,
            forest_values_p: 8,
            inp_indices_p: 11,
            inp_values_p: 15,
            extra_room: 19,
        }
    );
    assert_eq!(layout.forest(&mem), &tree.values[..]);
    assert_eq!(layout.indices(&mem), &input.indices[..]);
    assert_eq!(layout.values(&mem), &input.values[..]);
}

#[test]
fn test_truncated_image_has_no_layout() {
    let (tree, input) = generate(&config(2, 1, 8, 1));
    let mem = build_mem_image(&tree, &input);
    let layout = Layout::read(&mem).unwrap();
    assert!(Layout::read(&mem[..HEADER_WORDS - 1]).is_none());
    assert!(Layout::read(&mem[..layout.inp_values_p + 3]).is_none());
    assert!(RoundStates::new(&mem[..4]).is_none());
}

#[test]
fn test_unbounded_round_count_is_rejected() {
    let (tree, input) = generate(&config(2, 1, 8, 1));
    let mut mem = build_mem_image(&tree, &input);
    mem[0] = u32::MAX - 1;
    assert!(Layout::read(&mem).is_some());
    mem[0] = u32::MAX;
    assert!(Layout::read(&mem).is_none());
    assert!(RoundStates::new(&mem).is_none());
}

#[test]
fn test_round_states_start_from_the_image() {
    let (tree, input) = generate(&config(2, 3, 8, 1));
    let mem = build_mem_image(&tree, &input);
    let states = RoundStates::new(&mem).unwrap();
    assert_eq!(states.len(), 4);
    let all: Vec<_> = states.clone().collect();
    assert_eq!(all.len(), 4);
    assert_eq!(all[0], mem);
    // Only the lane arrays change.
    let layout = *states.layout();
    for state in &all {
        assert_eq!(layout.forest(state), layout.forest(&mem));
        assert_eq!(&state[..HEADER_WORDS], &mem[..HEADER_WORDS]);
    }
    assert_ne!(all[1], all[0]);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_oracles_agree(
        height in 0usize..6,
        rounds in 0usize..6,
        batch in 1usize..24,
        seed in any::<u64>(),
    ) {
        let (tree, mut input) = generate(&config(height, rounds, batch, seed));
        let mem = build_mem_image(&tree, &input);
        reference_kernel(&tree, &mut input);

        let states = RoundStates::new(&mem).unwrap();
        let layout = *states.layout();
        prop_assert_eq!(states.len(), rounds + 1);
        let last = states.last().unwrap();
        prop_assert_eq!(layout.values(&last), &input.values[..]);
        prop_assert_eq!(layout.indices(&last), &input.indices[..]);
        prop_assert!(input.indices.iter().all(|&i| (i as usize) < tree.n_nodes()));
    }
}
