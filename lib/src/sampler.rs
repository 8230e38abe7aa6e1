//! Choosing initial states by inverse-CDF sampling.

use crate::{cells::State, error::Error};

/// A cumulative distribution over the possible states.
///
/// The table is normalized by the total probability, and its last entry
/// is exactly `1.0`. So every draw in `[0, 1)` maps to a state, even when
/// the probabilities only sum to 1 within the parse tolerance.
#[derive(Clone, Debug, PartialEq)]
pub struct Sampler {
    cumulative: Vec<f64>,
}

impl Sampler {
    /// Builds the cumulative table from the probabilities, in order.
    pub fn new(probabilities: &[f64]) -> Result<Self, Error> {
        let total: f64 = probabilities.iter().sum();
        if !(total.is_finite() && total > 0.0) {
            return Err(Error::DegenerateDistribution);
        }

        let mut sum = 0.0;
        let mut cumulative: Vec<f64> = probabilities
            .iter()
            .map(|p| {
                sum += p;
                sum / total
            })
            .collect();
        if let Some(last) = cumulative.last_mut() {
            *last = 1.0;
        }
        Ok(Sampler { cumulative })
    }

    /// The cumulative table.
    pub fn cumulative(&self) -> &[f64] {
        &self.cumulative
    }

    /// Maps a uniform draw in `[0, 1)` to a state.
    ///
    /// Returns the state at the first index whose cumulative value is
    /// not less than `draw`.
    pub fn sample(&self, states: &[State], draw: f64) -> Result<State, Error> {
        self.cumulative
            .iter()
            .position(|&c| c >= draw)
            .and_then(|i| states.get(i).copied())
            .ok_or(Error::SampleOutOfRange(draw))
    }
}
