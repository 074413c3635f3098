//! Execution engines and their issue widths.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A named execution unit that issues a fixed number of slots per cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    /// Scalar integer ALU.
    Alu,
    /// Vector ALU operating on `VLEN` contiguous words.
    Valu,
    /// Memory loads and immediate constants.
    Load,
    /// Memory stores.
    Store,
    /// Selects, control transfer, and core bookkeeping.
    Flow,
}

impl Engine {
    /// Every executing engine, in commit order.
    pub const ALL: [Self; 5] = [Self::Alu, Self::Valu, Self::Load, Self::Store, Self::Flow];

    /// Maximum number of slots this engine issues per bundle.
    #[inline]
    pub const fn slot_limit(self) -> usize {
        match self {
            Self::Alu => 12,
            Self::Valu => 6,
            Self::Load | Self::Store => 2,
            Self::Flow => 1,
        }
    }

    /// Lower-case engine name as used in program listings and traces.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Alu => "alu",
            Self::Valu => "valu",
            Self::Load => "load",
            Self::Store => "store",
            Self::Flow => "flow",
        }
    }

    /// Position of this engine in [`Engine::ALL`], used to index per-engine tables.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Sum of every engine's issue width: the most slots one bundle can hold.
pub const MAX_SLOTS_PER_BUNDLE: usize = total_slot_limit();

const fn total_slot_limit() -> usize {
    let mut total = 0;
    let mut i = 0;
    while i < Engine::ALL.len() {
        total += Engine::ALL[i].slot_limit();
        i += 1;
    }
    total
}
