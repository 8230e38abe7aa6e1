//! Transition rules.
//!
//! A rule file looks like this:
//!
//! ```text
//! 0,1,2           // possible states: burned, fire, tree
//! 0,0.05,0.95     // initial probabilities
//! 3               // number of rules
//! 1 -> 0          // fire burns out
//! min 1: 1: 2 -> 1
//! default -> x
//! ```
//!
//! See [`RuleSpec::parse`] for the full grammar.

mod expr;
mod parse;

pub use expr::{BinOp, Expr};
pub use parse::DEFAULT_PROBABILITY_TOLERANCE;

use crate::{
    cells::{State, Window, SELF_SLOT},
    error::EvalError,
};
use std::fmt::{self, Display, Formatter};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How a neighbor count is compared with the threshold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Comparison {
    /// `min`: count ≥ threshold.
    AtLeast,
    /// `max`: count ≤ threshold.
    AtMost,
    /// `is`: count = threshold.
    IsExact,
}

impl Comparison {
    /// The keyword in the rule file.
    pub fn keyword(self) -> &'static str {
        match self {
            Comparison::AtLeast => "min",
            Comparison::AtMost => "max",
            Comparison::IsExact => "is",
        }
    }

    pub fn holds(self, count: u32, threshold: u32) -> bool {
        match self {
            Comparison::AtLeast => count >= threshold,
            Comparison::AtMost => count <= threshold,
            Comparison::IsExact => count == threshold,
        }
    }
}

/// `from -> to`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SimpleRule {
    pub from: State,
    pub to: State,
}

/// A rule conditioned on the number of neighbors in some state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NeighborRule {
    pub comparison: Comparison,
    pub threshold: u32,
    /// The state of the neighbors being counted.
    pub neighbor: State,
    /// The state the cell must currently be in.
    ///
    /// `None` means any state.
    pub from: Option<State>,
    pub to: State,
}

impl NeighborRule {
    fn applies(&self, current: State, window: &Window) -> bool {
        self.from.map_or(true, |from| from == current)
            && self
                .comparison
                .holds(count_neighbors(window, self.neighbor), self.threshold)
    }
}

/// Number of the 8 surrounding cells with the given state.
///
/// The cell itself and positions outside the world are never counted.
pub fn count_neighbors(window: &Window, state: State) -> u32 {
    window
        .iter()
        .enumerate()
        .filter(|&(i, s)| i != SELF_SLOT && *s == Some(state))
        .count() as u32
}

/// A parsed rule file.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RuleSpec {
    pub(crate) possible_states: Vec<State>,
    pub(crate) state_probabilities: Vec<f64>,
    pub(crate) simple_rules: Vec<SimpleRule>,
    pub(crate) neighbor_rules: Vec<NeighborRule>,
    pub(crate) default_rule: Expr,
}

impl RuleSpec {
    /// The legal states, in file order.
    pub fn possible_states(&self) -> &[State] {
        &self.possible_states
    }

    /// Initial probabilities, aligned with [`possible_states`](Self::possible_states).
    pub fn state_probabilities(&self) -> &[f64] {
        &self.state_probabilities
    }

    pub fn simple_rules(&self) -> &[SimpleRule] {
        &self.simple_rules
    }

    pub fn neighbor_rules(&self) -> &[NeighborRule] {
        &self.neighbor_rules
    }

    pub fn default_rule(&self) -> &Expr {
        &self.default_rule
    }

    /// Whether `state` is one of the possible states.
    pub fn is_possible(&self, state: State) -> bool {
        self.possible_states.contains(&state)
    }

    /// The state of a cell in the next generation.
    ///
    /// Simple rules are tried first, then neighbor rules, both in file
    /// order. If none matches, the default rule is evaluated.
    /// The self slot of the window is ignored.
    pub fn next_state(&self, current: State, window: &Window) -> Result<State, EvalError> {
        if let Some(rule) = self.simple_rules.iter().find(|r| r.from == current) {
            return Ok(rule.to);
        }
        if let Some(rule) = self
            .neighbor_rules
            .iter()
            .find(|r| r.applies(current, window))
        {
            return Ok(rule.to);
        }
        self.default_rule.eval_state(current)
    }
}

/// Writes the rule file back.
///
/// Simple and neighbor rules keep their relative order, followed by the
/// default rule. Parsing the output gives an equal `RuleSpec`.
impl Display for RuleSpec {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let states: Vec<String> = self.possible_states.iter().map(State::to_string).collect();
        writeln!(f, "{}", states.join(","))?;
        let probabilities: Vec<String> = self
            .state_probabilities
            .iter()
            .map(f64::to_string)
            .collect();
        writeln!(f, "{}", probabilities.join(","))?;
        writeln!(
            f,
            "{}",
            self.simple_rules.len() + self.neighbor_rules.len() + 1
        )?;
        for rule in &self.simple_rules {
            writeln!(f, "{} -> {}", rule.from, rule.to)?;
        }
        for rule in &self.neighbor_rules {
            write!(
                f,
                "{} {}: {}",
                rule.comparison.keyword(),
                rule.threshold,
                rule.neighbor
            )?;
            if let Some(from) = rule.from {
                write!(f, ": {}", from)?;
            }
            writeln!(f, " -> {}", rule.to)?;
        }
        writeln!(f, "default -> {}", self.default_rule)
    }
}
