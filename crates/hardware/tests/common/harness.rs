use vliwsim_core::Machine;
use vliwsim_core::common::{ExecError, SCRATCH_SIZE};
use vliwsim_core::config::MachineConfig;
use vliwsim_core::isa::{Bundle, Program, ScratchAddr, Slot, Word};

/// Installs a test-friendly tracing subscriber once per test binary.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// One bundle per slot, in order.
pub fn program_of(slots: Vec<Slot>) -> Program {
    slots.into_iter().map(Bundle::from).collect()
}

/// Builds one bundle from several slots, panicking on overflow.
pub fn bundle_of(slots: Vec<Slot>) -> Bundle {
    Bundle::from_slots(slots).expect("bundle within slot limits")
}

#[derive(Debug)]
pub struct TestContext {
    pub machine: Machine,
}

impl TestContext {
    /// A single-core machine running `program` over `mem`.
    pub fn new(program: Program, mem: Vec<Word>) -> Self {
        Self::with_cores(1, program, mem)
    }

    /// A machine with `n_cores` cores sharing `program` and `mem`.
    pub fn with_cores(n_cores: usize, program: Program, mem: Vec<Word>) -> Self {
        init_tracing();
        let config = MachineConfig {
            n_cores,
            scratch_size: SCRATCH_SIZE,
            enable_pause: true,
        };
        Self {
            machine: Machine::new(mem, program, &config),
        }
    }

    /// A single-core machine with one bundle per slot and `mem_words` zeroed words.
    pub fn from_slots(slots: Vec<Slot>, mem_words: usize) -> Self {
        Self::new(program_of(slots), vec![0; mem_words])
    }

    pub fn run(&mut self) -> Result<(), ExecError> {
        self.machine.run()
    }

    /// Runs and panics on an execution fault.
    pub fn run_ok(&mut self) -> &mut Self {
        self.machine.run().expect("program runs without faults");
        self
    }

    pub fn scratch(&self, core: usize, addr: ScratchAddr) -> Word {
        self.machine.cores[core].scratch[addr]
    }

    pub fn scratch_vec(&self, core: usize, base: ScratchAddr, len: usize) -> Vec<Word> {
        self.machine.cores[core]
            .scratch_slice(base, len)
            .expect("scratch range in bounds")
            .to_vec()
    }

    pub fn mem(&self, addr: usize) -> Word {
        self.machine.mem[addr]
    }

    pub fn cycle(&self) -> u64 {
        self.machine.cycle
    }
}
