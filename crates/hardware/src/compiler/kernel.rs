//! Workload kernels.
//!
//! Three programs are built here:
//! 1. **Counting test:** A single loop incrementing an accumulator ten times.
//! 2. **Vector kernel:** Lanes split evenly across cores, processed `VLEN` at
//!    a time with vector loads, a gather through `load_offset`, and the
//!    vector hash.
//! 3. **Scalar kernel:** Core 0 walks every lane with scalar slots; the other
//!    cores halt immediately.
//!
//! Both workload kernels read their array bases and round count from the
//! memory header, `pause` once after setup and once after every round, and
//! halt at the end. A driver calling `run()` once per round therefore sees
//! the memory state after each round.

use tracing::debug;

use crate::common::constants::{HDR_FOREST_VALUES, HDR_INP_INDICES, HDR_INP_VALUES, HDR_ROUNDS};
use crate::common::{BuildError, VLEN};
use crate::isa::{AluOp, ScratchAddr, Slot, Word};

use super::builder::KernelBuilder;
use super::hash::HashPipeline;

/// Scratch cells holding the header words a kernel reads.
#[derive(Debug, Clone, Copy)]
struct Header {
    rounds: ScratchAddr,
    forest_values_p: ScratchAddr,
    inp_indices_p: ScratchAddr,
    inp_values_p: ScratchAddr,
}

impl KernelBuilder {
    /// Counts to ten: `scratch[accum]` ends at 10 on core 0.
    ///
    /// # Errors
    ///
    /// [`BuildError::ScratchOverflow`] on a very small scratch.
    pub fn build_simple_test(&mut self) -> Result<ScratchAddr, BuildError> {
        let one = self.scratch_const(1, None)?;
        let accum = self.alloc_scratch(Some("accum"), 1)?;
        let iter = self.alloc_scratch(Some("iter"), 1)?;
        let limit = self.alloc_scratch(Some("limit"), 1)?;
        self.add(Slot::constant(limit, 10));
        let body = Self::build(vec![Slot::alu(AluOp::Add, accum, accum, one)], self.config().vliw)?;
        self.for_loop_bundles(iter, limit, body)?;
        Ok(accum)
    }

    /// Loads the header words the kernels need.
    fn load_header(&mut self) -> Result<Header, BuildError> {
        let mut cells = [0; 4];
        let fields = [
            ("rounds", HDR_ROUNDS),
            ("forest_values_p", HDR_FOREST_VALUES),
            ("inp_indices_p", HDR_INP_INDICES),
            ("inp_values_p", HDR_INP_VALUES),
        ];
        let mut slots = Vec::with_capacity(fields.len());
        for (cell, (name, offset)) in cells.iter_mut().zip(fields) {
            *cell = self.alloc_scratch(Some(name), 1)?;
            let addr = self.scratch_const(offset as Word, None)?;
            slots.push(Slot::load(*cell, addr));
        }
        self.emit(slots)?;
        let [rounds, forest_values_p, inp_indices_p, inp_values_p] = cells;
        Ok(Header {
            rounds,
            forest_values_p,
            inp_indices_p,
            inp_values_p,
        })
    }

    /// Emits the vectorized multicore kernel.
    ///
    /// # Arguments
    ///
    /// * `forest_height` - Tree height, recorded in the program listing.
    /// * `n_nodes` - Number of tree nodes; indices wrap to 0 on reaching it.
    /// * `batch_size` - Number of lanes; must be a positive multiple of
    ///   `VLEN * n_cores`.
    ///
    /// # Errors
    ///
    /// [`BuildError::InvalidBatch`] for an unsplittable batch,
    /// [`BuildError::ScratchOverflow`] when scratch is exhausted.
    pub fn build_kernel(
        &mut self,
        forest_height: usize,
        n_nodes: usize,
        batch_size: usize,
    ) -> Result<(), BuildError> {
        let n_cores = self.config().n_cores;
        let granule = VLEN * n_cores;
        if batch_size == 0 || granule == 0 || batch_size % granule != 0 {
            return Err(BuildError::InvalidBatch {
                batch_size,
                granule,
            });
        }
        let lanes_per_core = batch_size / n_cores;
        let chunks = lanes_per_core / VLEN;
        self.add(Slot::comment(format!(
            "vector kernel: height {forest_height}, {n_nodes} nodes, {batch_size} lanes"
        )));

        let zero = self.scratch_const(0, None)?;
        let vlen = self.scratch_const(VLEN as Word, None)?;
        let header = self.load_header()?;

        // Each core owns a contiguous run of lanes.
        let core_id = self.alloc_scratch(Some("core_id"), 1)?;
        let core_base = self.alloc_scratch(Some("core_base"), 1)?;
        let idx_base = self.alloc_scratch(Some("idx_base"), 1)?;
        let val_base = self.alloc_scratch(Some("val_base"), 1)?;
        let lanes = self.scratch_const(lanes_per_core as Word, None)?;
        let n_chunks = self.scratch_const(chunks as Word, Some("n_chunks"))?;
        self.emit(vec![
            Slot::coreid(core_id),
            Slot::alu(AluOp::Mul, core_base, core_id, lanes),
            Slot::alu(AluOp::Add, idx_base, header.inp_indices_p, core_base),
            Slot::alu(AluOp::Add, val_base, header.inp_values_p, core_base),
        ])?;

        let v_one = self.vector_const(1)?;
        let v_two = self.vector_const(2)?;
        let v_n_nodes = self.vector_const(n_nodes as Word)?;
        let v_forest_p = self.alloc_scratch(Some("v_forest_p"), VLEN)?;
        self.add(Slot::vbroadcast(v_forest_p, header.forest_values_p));
        let hash = HashPipeline::vector(self)?;

        let v_idx = self.alloc_scratch(Some("v_idx"), VLEN)?;
        let v_val = self.alloc_scratch(Some("v_val"), VLEN)?;
        let v_addr = self.alloc_scratch(Some("v_addr"), VLEN)?;
        let v_node = self.alloc_scratch(Some("v_node"), VLEN)?;
        let v_t1 = self.alloc_scratch(Some("v_t1"), VLEN)?;
        let v_t2 = self.alloc_scratch(Some("v_t2"), VLEN)?;
        let idx_ptr = self.alloc_scratch(Some("idx_ptr"), 1)?;
        let val_ptr = self.alloc_scratch(Some("val_ptr"), 1)?;
        let round = self.alloc_scratch(Some("round"), 1)?;
        let chunk = self.alloc_scratch(Some("chunk"), 1)?;

        let mut body = vec![
            Slot::vload(v_idx, idx_ptr),
            Slot::vload(v_val, val_ptr),
            Slot::valu(AluOp::Add, v_addr, v_idx, v_forest_p),
        ];
        body.extend((0..VLEN).map(|lane| Slot::load_offset(v_node, v_addr, lane)));
        body.push(Slot::valu(AluOp::Xor, v_val, v_val, v_node));
        body.extend(hash.emit(v_val, v_t1, v_t2));
        body.extend([
            // idx = 2 * idx + (val % 2 + 1), then 0 once past the last node.
            Slot::valu(AluOp::Mod, v_t1, v_val, v_two),
            Slot::valu(AluOp::Add, v_t1, v_t1, v_one),
            Slot::valu(AluOp::Mul, v_idx, v_idx, v_two),
            Slot::valu(AluOp::Add, v_idx, v_idx, v_t1),
            Slot::valu(AluOp::Lt, v_t1, v_idx, v_n_nodes),
            Slot::valu(AluOp::Mul, v_idx, v_idx, v_t1),
            Slot::vstore(idx_ptr, v_idx),
            Slot::vstore(val_ptr, v_val),
            Slot::alu(AluOp::Add, idx_ptr, idx_ptr, vlen),
            Slot::alu(AluOp::Add, val_ptr, val_ptr, vlen),
        ]);
        let body = Self::build(body, self.config().vliw)?;

        self.add(Slot::pause());
        self.label("rounds");
        self.for_loop(round, header.rounds, |kb| {
            kb.emit(vec![
                Slot::alu(AluOp::Add, idx_ptr, idx_base, zero),
                Slot::alu(AluOp::Add, val_ptr, val_base, zero),
            ])?;
            kb.for_loop_bundles(chunk, n_chunks, body)?;
            kb.add(Slot::pause());
            Ok(())
        })?;
        self.add(Slot::halt());

        debug!(
            bundles = self.pc(),
            scratch = self.scratch().used(),
            lanes_per_core,
            "vector kernel built"
        );
        Ok(())
    }

    /// Emits the scalar baseline kernel; core 0 processes every lane.
    ///
    /// # Arguments
    ///
    /// * `forest_height` - Tree height, recorded in the program listing.
    /// * `n_nodes` - Number of tree nodes; indices wrap to 0 on reaching it.
    /// * `batch_size` - Number of lanes.
    ///
    /// # Errors
    ///
    /// [`BuildError::ScratchOverflow`] when scratch is exhausted.
    pub fn build_kernel_scalar(
        &mut self,
        forest_height: usize,
        n_nodes: usize,
        batch_size: usize,
    ) -> Result<(), BuildError> {
        self.add(Slot::comment(format!(
            "scalar kernel: height {forest_height}, {n_nodes} nodes, {batch_size} lanes"
        )));
        let zero = self.scratch_const(0, None)?;
        let one = self.scratch_const(1, None)?;
        let two = self.scratch_const(2, None)?;

        // Every core but 0 halts here.
        let core_id = self.alloc_scratch(Some("core_id"), 1)?;
        let is_first = self.alloc_scratch(Some("is_first"), 1)?;
        self.add(Slot::coreid(core_id));
        self.add(Slot::alu(AluOp::Eq, is_first, core_id, zero));
        self.add(Slot::cond_jump_rel(is_first, 1));
        self.add(Slot::halt());

        let header = self.load_header()?;
        let n_nodes_c = self.scratch_const(n_nodes as Word, Some("n_nodes"))?;
        let n_lanes = self.scratch_const(batch_size as Word, Some("n_lanes"))?;
        let hash = HashPipeline::scalar(self)?;

        let idx = self.alloc_scratch(Some("idx"), 1)?;
        let val = self.alloc_scratch(Some("val"), 1)?;
        let addr = self.alloc_scratch(Some("addr"), 1)?;
        let node = self.alloc_scratch(Some("node"), 1)?;
        let t1 = self.alloc_scratch(Some("t1"), 1)?;
        let t2 = self.alloc_scratch(Some("t2"), 1)?;
        let idx_ptr = self.alloc_scratch(Some("idx_ptr"), 1)?;
        let val_ptr = self.alloc_scratch(Some("val_ptr"), 1)?;
        let round = self.alloc_scratch(Some("round"), 1)?;
        let lane = self.alloc_scratch(Some("lane"), 1)?;

        let mut body = vec![
            Slot::load(idx, idx_ptr),
            Slot::load(val, val_ptr),
            Slot::alu(AluOp::Add, addr, header.forest_values_p, idx),
            Slot::load(node, addr),
            Slot::alu(AluOp::Xor, val, val, node),
        ];
        body.extend(hash.emit(val, t1, t2));
        body.extend([
            Slot::alu(AluOp::Mod, t1, val, two),
            Slot::alu(AluOp::Eq, t1, t1, zero),
            Slot::select(t1, t1, one, two),
            Slot::alu(AluOp::Mul, idx, idx, two),
            Slot::alu(AluOp::Add, idx, idx, t1),
            Slot::alu(AluOp::Lt, t1, idx, n_nodes_c),
            Slot::select(idx, t1, idx, zero),
            Slot::store(idx_ptr, idx),
            Slot::store(val_ptr, val),
            Slot::alu(AluOp::Add, idx_ptr, idx_ptr, one),
            Slot::alu(AluOp::Add, val_ptr, val_ptr, one),
        ]);
        let body = Self::build(body, self.config().vliw)?;

        self.add(Slot::pause());
        self.label("rounds");
        self.for_loop(round, header.rounds, |kb| {
            kb.emit(vec![
                Slot::alu(AluOp::Add, idx_ptr, header.inp_indices_p, zero),
                Slot::alu(AluOp::Add, val_ptr, header.inp_values_p, zero),
            ])?;
            kb.for_loop_bundles(lane, n_lanes, body)?;
            kb.add(Slot::pause());
            Ok(())
        })?;
        self.add(Slot::halt());

        debug!(bundles = self.pc(), scratch = self.scratch().used(), "scalar kernel built");
        Ok(())
    }
}
