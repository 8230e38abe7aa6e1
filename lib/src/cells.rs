//! Cells in the cellular automaton.

use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The state of a cell.
///
/// States are plain integers. Which integers are legal is decided by the
/// [`RuleSpec`](crate::rules::RuleSpec).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct State(pub i32);

impl Display for State {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for State {
    fn from(state: i32) -> Self {
        State(state)
    }
}

/// The coordinates of a cell.
///
/// `(x-coordinate, y-coordinate)`, both 0-indexed.
/// `x` is the column and `y` is the row.
pub type Coord = (usize, usize);

/// The 3×3 block around a cell, in row-major order.
///
/// Index [`SELF_SLOT`] is the cell itself. `None` marks a position outside
/// the world.
pub type Window = [Option<State>; 9];

/// The index of the cell itself in a [`Window`].
pub const SELF_SLOT: usize = 4;

/// One border of the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Edge {
    /// The first row.
    North,
    /// The last column.
    East,
    /// The last row.
    South,
    /// The first column.
    West,
}

impl FromStr for Edge {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "n" | "north" | "0" => Ok(Edge::North),
            "e" | "east" | "1" => Ok(Edge::East),
            "s" | "south" | "2" => Ok(Edge::South),
            "w" | "west" | "3" => Ok(Edge::West),
            _ => Err(String::from("invalid edge")),
        }
    }
}

impl Display for Edge {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let s = match self {
            Edge::North => "north",
            Edge::East => "east",
            Edge::South => "south",
            Edge::West => "west",
        };
        write!(f, "{}", s)
    }
}
