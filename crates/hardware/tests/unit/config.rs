//! # Configuration Tests
//!
//! Defaults and JSON deserialization with missing fields.

use pretty_assertions::assert_eq;
use vliwsim_core::common::{N_CORES, SCRATCH_SIZE};
use vliwsim_core::config::{Config, KernelConfig, MachineConfig, WorkloadConfig};

#[test]
fn test_config_default() {
    let config = Config::default();
    assert_eq!(
        config.machine,
        MachineConfig {
            n_cores: N_CORES,
            scratch_size: SCRATCH_SIZE,
            enable_pause: true,
        }
    );
    assert_eq!(
        config.kernel,
        KernelConfig {
            n_cores: N_CORES,
            scratch_size: SCRATCH_SIZE,
            vliw: true,
        }
    );
    assert_eq!(
        config.workload,
        WorkloadConfig {
            forest_height: 10,
            rounds: 16,
            batch_size: 256,
            seed: 123,
        }
    );
}

#[test]
fn test_empty_json_is_the_default() {
    let config: Config = serde_json::from_str("{}").unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_partial_json_keeps_other_defaults() {
    let json = r#"{
        "machine": { "n_cores": 2, "enable_pause": false },
        "workload": { "seed": 9 }
    }"#;
    let config: Config = serde_json::from_str(json).unwrap();
    assert_eq!(config.machine.n_cores, 2);
    assert!(!config.machine.enable_pause);
    assert_eq!(config.machine.scratch_size, SCRATCH_SIZE);
    assert_eq!(config.workload.seed, 9);
    assert_eq!(config.workload.rounds, 16);
    assert_eq!(config.kernel, KernelConfig::default());
}

#[test]
fn test_config_json_round_trip() {
    let mut config = Config::default();
    config.kernel.vliw = false;
    config.workload.batch_size = 64;
    let text = serde_json::to_string(&config).unwrap();
    assert_eq!(serde_json::from_str::<Config>(&text).unwrap(), config);
}

#[test]
fn test_unknown_types_are_rejected() {
    assert!(serde_json::from_str::<Config>(r#"{"machine": {"n_cores": "four"}}"#).is_err());
}

#[test]
fn test_kernel_config_follows_the_machine() {
    let machine = MachineConfig {
        n_cores: 2,
        scratch_size: 512,
        enable_pause: true,
    };
    assert_eq!(
        KernelConfig::from(&machine),
        KernelConfig {
            n_cores: 2,
            scratch_size: 512,
            vliw: true,
        }
    );
}
