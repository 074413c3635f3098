//! VLIW/SIMD machine simulator CLI.
//!
//! This binary drives the simulator end to end. It performs:
//! 1. **Kernel run:** Generate a workload, build the scalar or vector kernel,
//!    run it round by round against the reference oracle, and report cycles.
//! 2. **Simple run:** Build and run the counting test program.
//!
//! Logging goes through `tracing`; set `RUST_LOG=vliwsim_core=debug` (or `trace`
//! for every bundle) to see it.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use vliwsim_core::config::{Config, KernelConfig};
use vliwsim_core::sim::ChromeTraceWriter;
use vliwsim_core::workload::{build_mem_image, generate, verify_rounds};
use vliwsim_core::{KernelBuilder, Machine};

#[derive(Parser, Debug)]
#[command(
    name = "sim",
    author,
    version,
    about = "Cycle-level simulator for a multicore VLIW/SIMD machine",
    long_about = "Build the tree-traversal kernel, run it on the simulated machine and check every round against the reference oracle.\n\nExamples:\n  sim run\n  sim run --height 3 --rounds 2 --batch 64 --trace trace.json\n  sim run --scalar --no-vliw\n  sim simple"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build, run and verify the workload kernel.
    Run {
        /// JSON configuration file; flags override its values.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Tree height.
        #[arg(long)]
        height: Option<usize>,

        /// Number of rounds.
        #[arg(long)]
        rounds: Option<usize>,

        /// Number of lanes.
        #[arg(long)]
        batch: Option<usize>,

        /// Workload seed.
        #[arg(long)]
        seed: Option<u64>,

        /// Number of cores.
        #[arg(long)]
        cores: Option<usize>,

        /// Use the scalar kernel instead of the vector kernel.
        #[arg(long)]
        scalar: bool,

        /// Emit one slot per bundle.
        #[arg(long)]
        no_vliw: bool,

        /// Write a Chrome trace of every executed slot.
        #[arg(long)]
        trace: Option<PathBuf>,

        /// Write the scratch debug map as JSON.
        #[arg(long)]
        debug_info: Option<PathBuf>,
    },

    /// Run the counting test program.
    Simple,
}

/// Options of the `run` subcommand.
#[derive(Debug)]
struct RunArgs {
    config: Config,
    scalar: bool,
    trace: Option<PathBuf>,
    debug_info: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run {
            config,
            height,
            rounds,
            batch,
            seed,
            cores,
            scalar,
            no_vliw,
            trace,
            debug_info,
        } => load_config(config.as_deref()).and_then(|mut config| {
            let w = &mut config.workload;
            w.forest_height = height.unwrap_or(w.forest_height);
            w.rounds = rounds.unwrap_or(w.rounds);
            w.batch_size = batch.unwrap_or(w.batch_size);
            w.seed = seed.unwrap_or(w.seed);
            config.machine.n_cores = cores.unwrap_or(config.machine.n_cores);
            config.kernel = KernelConfig {
                vliw: config.kernel.vliw && !no_vliw,
                ..KernelConfig::from(&config.machine)
            };
            cmd_run(RunArgs {
                config,
                scalar,
                trace,
                debug_info,
            })
        }),
        Commands::Simple => cmd_simple(),
    };

    if let Err(e) = result {
        eprintln!("\n[!] {e}");
        process::exit(1);
    }
}

/// Reads a JSON configuration file, or returns the defaults.
fn load_config(path: Option<&Path>) -> Result<Config, String> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let file = File::open(path).map_err(|e| format!("cannot open {}: {e}", path.display()))?;
    serde_json::from_reader(file).map_err(|e| format!("invalid config {}: {e}", path.display()))
}

/// Builds the kernel, runs it round by round and prints the cycle count.
fn cmd_run(args: RunArgs) -> Result<(), String> {
    let RunArgs {
        config,
        scalar,
        trace,
        debug_info,
    } = args;
    let w = config.workload;
    println!(
        "forest_height={}, rounds={}, batch_size={}, seed={}, cores={}",
        w.forest_height, w.rounds, w.batch_size, w.seed, config.machine.n_cores
    );

    let (tree, input) = generate(&w);
    let mem = build_mem_image(&tree, &input);

    let mut kb = KernelBuilder::new(config.kernel);
    let built = if scalar {
        kb.build_kernel_scalar(tree.height, tree.n_nodes(), input.batch_size())
    } else {
        kb.build_kernel(tree.height, tree.n_nodes(), input.batch_size())
    };
    built.map_err(|e| format!("kernel build failed: {e}"))?;
    println!(
        "[*] Kernel: {} bundles, {} scratch words",
        kb.pc(),
        kb.scratch().used()
    );

    if let Some(path) = debug_info {
        let file = File::create(&path).map_err(|e| format!("cannot create {}: {e}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), kb.debug_info())
            .map_err(|e| format!("cannot write debug info: {e}"))?;
    }

    let mut machine = Machine::new(mem.clone(), kb.into_program(), &config.machine);
    if let Some(path) = &trace {
        let file = File::create(path).map_err(|e| format!("cannot create {}: {e}", path.display()))?;
        let writer = ChromeTraceWriter::new(BufWriter::new(file), config.machine.n_cores)
            .map_err(|e| e.to_string())?;
        machine = machine.with_trace_sink(Box::new(writer));
    }

    let verified = verify_rounds(&mut machine, &mem);
    machine.finish_trace().map_err(|e| e.to_string())?;
    let cycles = verified.map_err(|e| e.to_string())?;

    println!("CYCLES: {cycles}");
    machine.stats.print();
    Ok(())
}

/// Runs the counting program on one core and prints the accumulator.
fn cmd_simple() -> Result<(), String> {
    let config = Config::default();
    let mut kb = KernelBuilder::new(KernelConfig {
        n_cores: 1,
        ..config.kernel
    });
    let accum = kb.build_simple_test().map_err(|e| e.to_string())?;

    let machine_config = vliwsim_core::config::MachineConfig {
        n_cores: 1,
        ..config.machine
    };
    let mut machine = Machine::new(vec![0; 10], kb.into_program(), &machine_config);
    machine.run().map_err(|e| e.to_string())?;

    println!("accum = {}", machine.cores[0].scratch[accum]);
    println!("CYCLES: {}", machine.cycle);
    Ok(())
}
