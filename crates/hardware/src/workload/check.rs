//! Round-by-round verification against the reference oracle.

use tracing::debug;

use crate::common::{CheckError, CheckedArray};
use crate::isa::Word;
use crate::sim::Machine;

use super::image::Layout;
use super::reference::RoundStates;

/// First lane where `actual` and `expected` differ.
fn first_mismatch(actual: &[Word], expected: &[Word]) -> Option<(usize, Word, Word)> {
    actual
        .iter()
        .zip(expected)
        .enumerate()
        .find(|(_, (a, e))| a != e)
        .map(|(lane, (&a, &e))| (lane, a, e))
}

/// Compares the lane arrays of `mem` with the oracle state `expected`.
///
/// # Errors
///
/// [`CheckError::Mismatch`] naming the first differing lane, values first.
pub fn compare_round(
    round: usize,
    layout: &Layout,
    mem: &[Word],
    expected: &[Word],
) -> Result<(), CheckError> {
    let arrays = [
        (CheckedArray::Values, layout.values(mem), layout.values(expected)),
        (CheckedArray::Indices, layout.indices(mem), layout.indices(expected)),
    ];
    for (array, actual, expected) in arrays {
        if let Some((lane, actual, expected)) = first_mismatch(actual, expected) {
            return Err(CheckError::Mismatch {
                round,
                array,
                lane,
                actual,
                expected,
            });
        }
    }
    Ok(())
}

/// Runs `machine` once per oracle state and checks each resulting memory.
///
/// `image` is the initial memory the machine was built from. The kernel must
/// pause once before the first round and once after every round.
///
/// # Returns
///
/// The machine's cycle count after the final round.
///
/// # Errors
///
/// [`CheckError::MalformedImage`] for an unreadable header, [`CheckError::Exec`]
/// if the machine faults, [`CheckError::Mismatch`] on the first wrong lane.
pub fn verify_rounds(machine: &mut Machine, image: &[Word]) -> Result<u64, CheckError> {
    let states = RoundStates::new(image).ok_or(CheckError::MalformedImage)?;
    let layout = *states.layout();
    for (round, expected) in states.enumerate() {
        machine.run()?;
        compare_round(round, &layout, &machine.mem, &expected)?;
        debug!(round, cycle = machine.cycle, "round verified");
    }
    Ok(machine.cycle)
}
