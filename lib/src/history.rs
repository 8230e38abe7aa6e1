//! Per-round bookkeeping of state changes.

use crate::cells::State;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How many cells entered and left one state in one round.
///
/// `left` is never positive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StateDelta {
    pub entered: i64,
    pub left: i64,
}

/// The changes in one round, one [`StateDelta`] per state.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Round {
    deltas: Vec<StateDelta>,
}

impl Round {
    fn new(states: usize) -> Self {
        Round {
            deltas: vec![StateDelta::default(); states],
        }
    }

    /// Deltas in the order of [`History::states`].
    pub fn deltas(&self) -> &[StateDelta] {
        &self.deltas
    }

    /// Number of cells that entered some state.
    pub fn entered_total(&self) -> i64 {
        self.deltas.iter().map(|d| d.entered).sum()
    }

    /// Number of cells that left some state, as a non-positive number.
    pub fn left_total(&self) -> i64 {
        self.deltas.iter().map(|d| d.left).sum()
    }
}

/// The history of a run.
///
/// Round 0 is the initialization. Round `n` is the `n`-th step.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct History {
    /// Possible states, sorted ascending.
    ///
    /// The position of a state in this vector is its index in each round.
    states: Vec<State>,
    rounds: Vec<Round>,
}

impl History {
    pub fn new(states: &[State]) -> Self {
        let mut history = History::default();
        history.initialize(states);
        history
    }

    /// Sets the states to track and clears all rounds.
    pub fn initialize(&mut self, states: &[State]) {
        self.states = states.to_vec();
        self.states.sort_unstable();
        self.states.dedup();
        self.rounds.clear();
    }

    /// Records that a cell went from `before` to `after` in `round`.
    ///
    /// `before` is `None` when the cell had no state yet.
    /// Unchanged cells only make sure the round exists.
    /// States that are not tracked are ignored.
    ///
    /// Rounds must be reported in non-decreasing order.
    pub fn state_changed(&mut self, round: usize, before: Option<State>, after: State) {
        debug_assert!(round + 1 >= self.rounds.len(), "round {} reported late", round);
        while self.rounds.len() <= round {
            self.rounds.push(Round::new(self.states.len()));
        }
        if before == Some(after) {
            return;
        }
        let record = &mut self.rounds[round];
        if let Some(i) = before.and_then(|before| self.states.binary_search(&before).ok()) {
            record.deltas[i].left -= 1;
        }
        if let Ok(i) = self.states.binary_search(&after) {
            record.deltas[i].entered += 1;
        }
    }

    /// Number of changes in each round.
    ///
    /// For round 0 this is the number of initialized cells.
    pub fn changes_count(&self) -> Vec<u64> {
        self.rounds
            .iter()
            .map(|round| round.entered_total() as u64)
            .collect()
    }

    /// Tracked states, sorted ascending.
    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    pub fn round(&self, round: usize) -> Option<&Round> {
        self.rounds.get(round)
    }

    /// The delta of `state` in `round`.
    pub fn delta(&self, round: usize, state: State) -> Option<StateDelta> {
        let i = self.states.binary_search(&state).ok()?;
        self.rounds.get(round).map(|r| r.deltas[i])
    }

    pub fn len(&self) -> usize {
        self.rounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }
}
