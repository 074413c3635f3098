//! Binary operator opcodes shared by the scalar and vector ALUs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::common::IsaError;

/// Binary integer operator for `alu` slots and lane-wise `valu` slots.
///
/// Operators serialize by their symbolic name (`"+"`, `"cdiv"`, `"=="`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AluOp {
    /// Wrapping addition.
    #[serde(rename = "+")]
    Add,
    /// Wrapping subtraction.
    #[serde(rename = "-")]
    Sub,
    /// Wrapping multiplication.
    #[serde(rename = "*")]
    Mul,
    /// Floor division.
    #[serde(rename = "//")]
    Div,
    /// Ceiling division.
    #[serde(rename = "cdiv")]
    CDiv,
    /// Bitwise exclusive or.
    #[serde(rename = "^")]
    Xor,
    /// Bitwise and.
    #[serde(rename = "&")]
    And,
    /// Bitwise or.
    #[serde(rename = "|")]
    Or,
    /// Logical shift left.
    #[serde(rename = "<<")]
    Shl,
    /// Logical shift right.
    #[serde(rename = ">>")]
    Shr,
    /// Remainder.
    #[serde(rename = "%")]
    Mod,
    /// Unsigned less-than, producing 0 or 1.
    #[serde(rename = "<")]
    Lt,
    /// Equality, producing 0 or 1.
    #[serde(rename = "==")]
    Eq,
}

impl AluOp {
    /// Every operator, in table order.
    pub const ALL: [Self; 13] = [
        Self::Add,
        Self::Sub,
        Self::Mul,
        Self::Div,
        Self::CDiv,
        Self::Xor,
        Self::And,
        Self::Or,
        Self::Shl,
        Self::Shr,
        Self::Mod,
        Self::Lt,
        Self::Eq,
    ];

    /// Symbolic name of the operator.
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "//",
            Self::CDiv => "cdiv",
            Self::Xor => "^",
            Self::And => "&",
            Self::Or => "|",
            Self::Shl => "<<",
            Self::Shr => ">>",
            Self::Mod => "%",
            Self::Lt => "<",
            Self::Eq => "==",
        }
    }

    /// Whether the operator faults on a zero right-hand operand.
    pub const fn divides(self) -> bool {
        matches!(self, Self::Div | Self::CDiv | Self::Mod)
    }
}

impl FromStr for AluOp {
    type Err = IsaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.symbol() == s)
            .ok_or_else(|| IsaError::UnknownOpcode(s.to_string()))
    }
}

impl fmt::Display for AluOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
