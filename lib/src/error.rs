//! All kinds of errors in this crate.

use crate::cells::{Coord, State};
use displaydoc::Display;
use thiserror::Error;

/// Errors when parsing the default-rule expression.
#[derive(Clone, Debug, PartialEq, Eq, Display, Error)]
pub enum ExprError {
    /// Unexpected character {0:?}.
    UnexpectedChar(char),
    /// Unexpected end of expression.
    UnexpectedEnd,
    /// Unexpected token {0}.
    UnexpectedToken(String),
    /// Unknown variable {0:?}. The only variable is `x`.
    UnknownVariable(String),
    /// Invalid integer literal {0:?}.
    InvalidNumber(String),
}

/// Errors when evaluating the default-rule expression.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, Error)]
pub enum EvalError {
    /// Division by zero in the default rule.
    DivisionByZero,
    /// Integer overflow in the default rule.
    Overflow,
}

/// Errors when parsing a rule file.
///
/// Line numbers are 1-based.
#[derive(Clone, Debug, PartialEq, Display, Error)]
pub enum ParseError {
    /// Line {line}: the rule text ends here.
    MissingLine { line: usize },
    /// Line {line}: malformed {field} {text:?}.
    MalformedNumber {
        line: usize,
        field: &'static str,
        text: String,
    },
    /// Line {line}: state {state} is listed twice.
    DuplicateState { line: usize, state: State },
    /// Line {line}: probability {value} is not a non-negative number.
    NegativeProbability { line: usize, value: f64 },
    /// There are {states} states but {probabilities} probabilities.
    ProbabilityLengthMismatch { states: usize, probabilities: usize },
    /// Probabilities sum to {sum}, which is not within {tolerance} of 1.
    ProbabilitySumOutOfTolerance { sum: f64, tolerance: f64 },
    /// Line {line}: unrecognized rule syntax.
    UnrecognizedRuleSyntax { line: usize },
    /// Line {line}: invalid default expression: {source}
    InvalidExpression {
        line: usize,
        #[source]
        source: ExprError,
    },
    /// Line {line}: there is already a default rule.
    DuplicateDefaultRule { line: usize },
    /// The rules don't have a default case.
    MissingDefaultRule,
}

/// All kinds of errors in this crate.
#[derive(Clone, Debug, PartialEq, Display, Error)]
pub enum Error {
    /// Invalid rules: {0}
    ParseError(#[from] ParseError),
    /// Evaluation failed: {0}
    EvalError(#[from] EvalError),
    /// Width and height should be positive.
    NonPositiveError,
    /// The state probabilities don't describe a distribution.
    DegenerateDistribution,
    /// Draw {0} is outside the cumulative table.
    SampleOutOfRange(f64),
    /// The world has not been randomized yet.
    NotInitialized,
    /// An edge can only be seeded once, after randomizing and before the first step.
    SeedNotAllowed,
    /// Cell at {0:?} does not exist.
    CellOutOfBounds(Coord),
    /// Cell at {0:?} has invalid state: {1}.
    InvalidState(Coord, State),
}
