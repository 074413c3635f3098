//! # Workload Kernel Tests
//!
//! Builds the vector and scalar kernels, runs them round by round on the
//! machine and checks every round against the reference oracle.

use pretty_assertions::assert_eq;
use rstest::rstest;
use vliwsim_core::common::{BuildError, CheckError, CheckedArray, SCRATCH_SIZE};
use vliwsim_core::config::{KernelConfig, MachineConfig, WorkloadConfig};
use vliwsim_core::isa::Slot;
use vliwsim_core::workload::{build_mem_image, generate, verify_rounds};
use vliwsim_core::{KernelBuilder, Machine};

use crate::common::harness::{init_tracing, program_of};

#[derive(Debug, Clone, Copy)]
enum Kernel {
    Vector,
    Scalar,
}

fn workload(forest_height: usize, rounds: usize, batch_size: usize) -> WorkloadConfig {
    WorkloadConfig {
        forest_height,
        rounds,
        batch_size,
        seed: 123,
    }
}

/// Builds `kernel` for `config`, runs it against the oracle and returns the cycle count.
fn run_workload(
    config: &WorkloadConfig,
    n_cores: usize,
    vliw: bool,
    kernel: Kernel,
) -> Result<u64, CheckError> {
    init_tracing();
    let (tree, input) = generate(config);
    let mem = build_mem_image(&tree, &input);
    let mut kb = KernelBuilder::new(KernelConfig {
        n_cores,
        scratch_size: SCRATCH_SIZE,
        vliw,
    });
    let built = match kernel {
        Kernel::Vector => kb.build_kernel(tree.height, tree.n_nodes(), input.batch_size()),
        Kernel::Scalar => kb.build_kernel_scalar(tree.height, tree.n_nodes(), input.batch_size()),
    };
    built.unwrap();
    let machine_config = MachineConfig {
        n_cores,
        ..MachineConfig::default()
    };
    let mut machine = Machine::new(mem.clone(), kb.into_program(), &machine_config);
    verify_rounds(&mut machine, &mem)
}

#[test]
fn test_height_two_single_round_on_four_cores() {
    let cycles = run_workload(&workload(2, 1, 32), 4, true, Kernel::Vector).unwrap();
    assert!(cycles > 0);
}

#[rstest]
#[case::vector_packed(3, 3, 64, 4, true, Kernel::Vector)]
#[case::vector_unpacked(3, 2, 32, 2, false, Kernel::Vector)]
#[case::vector_one_core(4, 5, 16, 1, true, Kernel::Vector)]
#[case::vector_zero_rounds(2, 0, 32, 4, true, Kernel::Vector)]
#[case::scalar_packed(3, 2, 16, 4, true, Kernel::Scalar)]
#[case::scalar_unpacked(2, 2, 8, 1, false, Kernel::Scalar)]
#[case::scalar_odd_batch(2, 3, 5, 2, true, Kernel::Scalar)]
fn test_every_round_matches_the_oracle(
    #[case] height: usize,
    #[case] rounds: usize,
    #[case] batch: usize,
    #[case] n_cores: usize,
    #[case] vliw: bool,
    #[case] kernel: Kernel,
) {
    run_workload(&workload(height, rounds, batch), n_cores, vliw, kernel).unwrap();
}

#[rstest]
#[case::single_node(0)]
#[case::three_nodes(1)]
fn test_indices_wrap_to_the_root(#[case] height: usize) {
    // Enough rounds that every lane runs past the leaves several times.
    let config = workload(height, 2 * height + 6, 16);
    run_workload(&config, 2, true, Kernel::Vector).unwrap();
    run_workload(&config, 2, true, Kernel::Scalar).unwrap();
}

#[test]
fn test_default_workload_verifies() {
    let config = WorkloadConfig::default();
    let cycles = run_workload(&config, MachineConfig::default().n_cores, true, Kernel::Vector).unwrap();
    assert!(cycles > 0);
}

#[test]
fn test_packing_and_vectorizing_save_cycles() {
    let config = workload(3, 2, 32);
    let packed = run_workload(&config, 4, true, Kernel::Vector).unwrap();
    let unpacked = run_workload(&config, 4, false, Kernel::Vector).unwrap();
    let scalar = run_workload(&config, 4, true, Kernel::Scalar).unwrap();
    assert!(packed < unpacked, "packed {packed} vs unpacked {unpacked}");
    assert!(packed < scalar, "vector {packed} vs scalar {scalar}");
}

#[test]
fn test_cycle_counts_are_reproducible() {
    let config = workload(3, 2, 32);
    assert_eq!(
        run_workload(&config, 4, true, Kernel::Vector).unwrap(),
        run_workload(&config, 4, true, Kernel::Vector).unwrap()
    );
}

#[rstest]
#[case(0, 32)]
#[case(20, 32)]
#[case(40, 32)]
fn test_vector_kernel_rejects_uneven_batches(#[case] batch_size: usize, #[case] granule: usize) {
    let mut kb = KernelBuilder::new(KernelConfig::default());
    assert_eq!(
        kb.build_kernel(2, 7, batch_size),
        Err(BuildError::InvalidBatch {
            batch_size,
            granule,
        })
    );
}

#[test]
fn test_default_kernel_fits_in_scratch() {
    let config = WorkloadConfig::default();
    let mut kb = KernelBuilder::new(KernelConfig::default());
    kb.build_kernel(config.forest_height, (1 << (config.forest_height + 1)) - 1, config.batch_size)
        .unwrap();
    assert!(kb.scratch().used() <= SCRATCH_SIZE);
    assert_eq!(kb.label_addr("rounds").map(|pc| pc < kb.pc()), Some(true));
}

#[test]
fn test_a_kernel_that_skips_work_is_caught() {
    let (tree, input) = generate(&workload(2, 1, 8));
    let mem = build_mem_image(&tree, &input);
    let program = program_of(vec![Slot::pause(), Slot::pause(), Slot::halt()]);
    let config = MachineConfig {
        n_cores: 1,
        ..MachineConfig::default()
    };
    let mut machine = Machine::new(mem.clone(), program, &config);
    let err = verify_rounds(&mut machine, &mem).unwrap_err();
    assert!(
        matches!(
            err,
            CheckError::Mismatch {
                round: 1,
                array: CheckedArray::Values,
                lane: 0,
                ..
            }
        ),
        "unexpected error: {err}"
    );
}

#[test]
fn test_malformed_image_is_rejected() {
    let config = MachineConfig {
        n_cores: 1,
        ..MachineConfig::default()
    };
    let mut machine = Machine::new(vec![0; 3], Vec::new(), &config);
    assert!(matches!(
        verify_rounds(&mut machine, &[0; 3]),
        Err(CheckError::MalformedImage)
    ));

    // A round count the kernel loop cannot reach.
    let (tree, input) = generate(&workload(1, 1, 8));
    let mut mem = build_mem_image(&tree, &input);
    mem[0] = u32::MAX;
    let mut machine = Machine::new(mem.clone(), Vec::new(), &config);
    assert!(matches!(
        verify_rounds(&mut machine, &mem),
        Err(CheckError::MalformedImage)
    ));
}
