//! Configuration system for the simulator and kernel builder.
//!
//! This module defines the configuration structures used to parameterize a run. It provides:
//! 1. **Defaults:** Baseline machine constants (core count, scratch size, workload shape).
//! 2. **Structures:** Machine, kernel-builder, and workload configuration, grouped under `Config`.
//!
//! Configuration is deserialized from JSON (every field optional) or built with `Config::default()`.

use serde::{Deserialize, Serialize};

use crate::common::{N_CORES, SCRATCH_SIZE};

/// Default configuration constants.
mod defaults {
    /// Pausing is honored unless disabled; kernels use it to expose per-round states.
    pub const ENABLE_PAUSE: bool = true;

    /// Packed bundles are emitted unless disabled.
    pub const VLIW: bool = true;

    /// Height of the generated tree (2^(h+1) - 1 nodes).
    pub const FOREST_HEIGHT: usize = 10;

    /// Number of traversal rounds.
    pub const ROUNDS: usize = 16;

    /// Number of lanes in the input batch.
    pub const BATCH_SIZE: usize = 256;

    /// Seed for workload generation.
    pub const SEED: u64 = 123;
}

/// Machine construction parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    /// Number of lockstep cores.
    pub n_cores: usize,
    /// Scratch capacity per core, in words.
    pub scratch_size: usize,
    /// Whether `pause` suspends a core (otherwise it is a no-op).
    pub enable_pause: bool,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            n_cores: N_CORES,
            scratch_size: SCRATCH_SIZE,
            enable_pause: defaults::ENABLE_PAUSE,
        }
    }
}

/// Kernel builder parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    /// Number of cores the kernel distributes lanes across.
    pub n_cores: usize,
    /// Scratch capacity the allocator may hand out.
    pub scratch_size: usize,
    /// Pack straight-line code into multi-slot bundles.
    pub vliw: bool,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            n_cores: N_CORES,
            scratch_size: SCRATCH_SIZE,
            vliw: defaults::VLIW,
        }
    }
}

impl From<&MachineConfig> for KernelConfig {
    /// A kernel configuration matching the machine it will run on.
    fn from(machine: &MachineConfig) -> Self {
        Self {
            n_cores: machine.n_cores,
            scratch_size: machine.scratch_size,
            vliw: defaults::VLIW,
        }
    }
}

/// Workload shape and seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkloadConfig {
    /// Tree height.
    pub forest_height: usize,
    /// Number of rounds.
    pub rounds: usize,
    /// Number of lanes.
    pub batch_size: usize,
    /// Random seed; fully determines the tree and the input batch.
    pub seed: u64,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            forest_height: defaults::FOREST_HEIGHT,
            rounds: defaults::ROUNDS,
            batch_size: defaults::BATCH_SIZE,
            seed: defaults::SEED,
        }
    }
}

/// Root configuration.
///
/// # Examples
///
/// ```
/// use vliwsim_core::Config;
///
/// let json = r#"{
///     "machine": { "n_cores": 2, "enable_pause": false },
///     "workload": { "forest_height": 3, "rounds": 2 }
/// }"#;
///
/// let config: Config = serde_json::from_str(json).unwrap();
/// assert_eq!(config.machine.n_cores, 2);
/// assert_eq!(config.machine.scratch_size, 1536);
/// assert!(!config.machine.enable_pause);
/// assert_eq!(config.workload.batch_size, 256);
/// assert!(config.kernel.vliw);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Machine parameters.
    pub machine: MachineConfig,
    /// Kernel builder parameters.
    pub kernel: KernelConfig,
    /// Workload parameters.
    pub workload: WorkloadConfig,
}
