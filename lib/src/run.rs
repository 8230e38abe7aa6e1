//! Results of a run.

use crate::{
    cells::State,
    history::History,
    world::{Status, World},
};
use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A summary of a run.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RunResult {
    /// Number of steps.
    pub iterations: u64,

    /// Number of cells in each state at the end.
    pub final_occurrences: BTreeMap<State, usize>,

    /// `(width, height)`.
    pub dimensions: (usize, usize),

    /// The possible states, in the order of the rule file.
    pub possible_states: Vec<State>,

    pub history: History,

    /// Whether the world converged, that is, the last step changed no cell,
    /// rather than the run being cut off.
    pub ended_naturally: bool,
}

impl RunResult {
    pub(crate) fn new(world: &World, history: History) -> Self {
        let ended_naturally = world.status() == Status::Converged;
        RunResult {
            iterations: world.iteration(),
            final_occurrences: world.count_states(),
            dimensions: (world.width(), world.height()),
            possible_states: world.spec().possible_states().to_vec(),
            history,
            ended_naturally,
        }
    }

    /// Number of cells in `state` at the end.
    pub fn occurrences(&self, state: State) -> usize {
        self.final_occurrences.get(&state).copied().unwrap_or(0)
    }
}
