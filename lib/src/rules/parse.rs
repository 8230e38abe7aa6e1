//! Parsing rule files.

use super::{Comparison, Expr, NeighborRule, RuleSpec, SimpleRule};
use crate::{cells::State, error::ParseError};
use log::trace;
use std::{collections::HashSet, str::FromStr};

/// How far the sum of the probabilities may be from 1.
///
/// This is unusually loose, so that hand-written probabilities
/// like `0.33,0.33,0.33` are accepted.
pub const DEFAULT_PROBABILITY_TOLERANCE: f64 = 0.1;

const COMMENT: &str = "//";
const ARROW: &str = "->";

/// Line indices of the fixed header.
const STATES_LINE: usize = 0;
const PROBABILITIES_LINE: usize = 1;
const COUNT_LINE: usize = 2;
const FIRST_RULE_LINE: usize = 3;

/// Lines of the rule file, with comments stripped.
struct Lines<'a> {
    lines: Vec<&'a str>,
}

impl<'a> Lines<'a> {
    fn new(text: &'a str) -> Self {
        let lines = text
            .split('\n')
            .map(|line| {
                let line = line.strip_suffix('\r').unwrap_or(line);
                match line.find(COMMENT) {
                    Some(i) => line[..i].trim(),
                    None => line.trim(),
                }
            })
            .collect();
        Lines { lines }
    }

    /// The line at `index`, which is 0-based.
    fn get(&self, index: usize) -> Result<&'a str, ParseError> {
        self.lines
            .get(index)
            .copied()
            .ok_or(ParseError::MissingLine { line: index + 1 })
    }
}

fn parse_number<T: FromStr>(text: &str, line: usize, field: &'static str) -> Result<T, ParseError> {
    let text = text.trim();
    text.parse().map_err(|_| ParseError::MalformedNumber {
        line,
        field,
        text: text.to_string(),
    })
}

fn parse_states(text: &str, line: usize) -> Result<Vec<State>, ParseError> {
    let mut seen = HashSet::new();
    let mut states = Vec::new();
    for field in text.split(',') {
        let state = State(parse_number(field, line, "state")?);
        if !seen.insert(state) {
            return Err(ParseError::DuplicateState { line, state });
        }
        states.push(state);
    }
    Ok(states)
}

fn parse_probabilities(text: &str, line: usize) -> Result<Vec<f64>, ParseError> {
    text.split(',')
        .map(|field| {
            let value: f64 = parse_number(field, line, "probability")?;
            if value.is_finite() && value >= 0.0 {
                Ok(value)
            } else {
                Err(ParseError::NegativeProbability { line, value })
            }
        })
        .collect()
}

/// A single rule line.
enum RuleLine {
    Simple(SimpleRule),
    Neighbor(NeighborRule),
    Default(Expr),
}

/// Parses one rule line. `text` is already lower-cased.
fn parse_rule(text: &str, line: usize) -> Result<RuleLine, ParseError> {
    let (lhs, rhs) = text
        .split_once(ARROW)
        .ok_or(ParseError::UnrecognizedRuleSyntax { line })?;
    let (lhs, rhs) = (lhs.trim(), rhs.trim());

    if lhs == "default" {
        let expr = Expr::parse(rhs)
            .map_err(|source| ParseError::InvalidExpression { line, source })?;
        return Ok(RuleLine::Default(expr));
    }

    if let Ok(from) = lhs.parse() {
        let to = State(parse_number(rhs, line, "to state")?);
        return Ok(RuleLine::Simple(SimpleRule {
            from: State(from),
            to,
        }));
    }

    let (keyword, condition) = lhs
        .split_once(char::is_whitespace)
        .ok_or(ParseError::UnrecognizedRuleSyntax { line })?;
    let comparison = match keyword {
        "min" => Comparison::AtLeast,
        "max" => Comparison::AtMost,
        "is" => Comparison::IsExact,
        _ => return Err(ParseError::UnrecognizedRuleSyntax { line }),
    };

    let fields: Vec<&str> = condition.split(':').collect();
    let (threshold, neighbor, from) = match fields.as_slice() {
        [threshold, neighbor] => (threshold, neighbor, None),
        [threshold, neighbor, from] => (threshold, neighbor, Some(from)),
        _ => return Err(ParseError::UnrecognizedRuleSyntax { line }),
    };
    let threshold = parse_number(threshold, line, "threshold")?;
    let neighbor = State(parse_number(neighbor, line, "neighbor state")?);
    let from = match from {
        Some(from) => Some(State(parse_number(from, line, "from state")?)),
        None => None,
    };
    let to = State(parse_number(rhs, line, "to state")?);

    Ok(RuleLine::Neighbor(NeighborRule {
        comparison,
        threshold,
        neighbor,
        from,
        to,
    }))
}

impl RuleSpec {
    /// Parses a rule file with the [default tolerance](DEFAULT_PROBABILITY_TOLERANCE)
    /// for the probability sum.
    ///
    /// The file consists of:
    ///
    /// 1. comma-separated possible states;
    /// 2. comma-separated probabilities, one for each state;
    /// 3. the number of rules `N`;
    /// 4. `N` rule lines.
    ///
    /// A rule line is one of:
    ///
    /// * `<from> -> <to>`;
    /// * `min <t>: <n> -> <to>`, `max <t>: <n> -> <to>`, `is <t>: <n> -> <to>`,
    ///   which compare the number of neighbors in state `<n>` with `<t>`;
    /// * `min <t>: <n>: <from> -> <to>` and so on, which only apply to cells
    ///   in state `<from>`;
    /// * `default -> <expr>`, where `x` in `<expr>` is the current state.
    ///
    /// `//` starts a comment. Keywords are case-insensitive.
    /// Anything after the last rule is ignored.
    ///
    /// A neighbor rule without `<from>` also matches cells that are already
    /// in `<to>` or have moved past it. In a forest fire, `min 1: 1 -> 1`
    /// sets burned cells next to a fire alight again, so the fire oscillates
    /// instead of burning out; `min 1: 1: 2 -> 1` only ignites trees.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        Self::parse_with_tolerance(text, DEFAULT_PROBABILITY_TOLERANCE)
    }

    /// Parses a rule file, requiring the probabilities to sum to
    /// 1 ± `tolerance`.
    pub fn parse_with_tolerance(text: &str, tolerance: f64) -> Result<Self, ParseError> {
        let lines = Lines::new(text);

        let possible_states = parse_states(lines.get(STATES_LINE)?, STATES_LINE + 1)?;
        let state_probabilities =
            parse_probabilities(lines.get(PROBABILITIES_LINE)?, PROBABILITIES_LINE + 1)?;
        if state_probabilities.len() != possible_states.len() {
            return Err(ParseError::ProbabilityLengthMismatch {
                states: possible_states.len(),
                probabilities: state_probabilities.len(),
            });
        }
        let sum: f64 = state_probabilities.iter().sum();
        if (sum - 1.0).abs() > tolerance {
            return Err(ParseError::ProbabilitySumOutOfTolerance { sum, tolerance });
        }

        let count_text = lines.get(COUNT_LINE)?;
        let count: usize = parse_number(count_text, COUNT_LINE + 1, "rule count")?;
        let end = FIRST_RULE_LINE
            .checked_add(count)
            .ok_or_else(|| ParseError::MalformedNumber {
                line: COUNT_LINE + 1,
                field: "rule count",
                text: count_text.to_string(),
            })?;

        let mut simple_rules = Vec::new();
        let mut neighbor_rules = Vec::new();
        let mut default_rule = None;
        for index in FIRST_RULE_LINE..end {
            let line = index + 1;
            let text = lines.get(index)?.to_lowercase();
            match parse_rule(&text, line)? {
                RuleLine::Simple(rule) => simple_rules.push(rule),
                RuleLine::Neighbor(rule) => neighbor_rules.push(rule),
                RuleLine::Default(expr) => {
                    if default_rule.is_some() {
                        return Err(ParseError::DuplicateDefaultRule { line });
                    }
                    default_rule = Some(expr);
                }
            }
        }
        let default_rule = default_rule.ok_or(ParseError::MissingDefaultRule)?;

        trace!(
            "parsed {} states, {} simple rules, {} neighbor rules",
            possible_states.len(),
            simple_rules.len(),
            neighbor_rules.len()
        );

        Ok(RuleSpec {
            possible_states,
            state_probabilities,
            simple_rules,
            neighbor_rules,
            default_rule,
        })
    }
}

impl FromStr for RuleSpec {
    type Err = ParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        RuleSpec::parse(input)
    }
}
