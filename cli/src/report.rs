//! Printing the results.

use rulecell_lib::{RunResult, State};
use std::{
    collections::BTreeSet,
    fmt::{self, Display, Formatter},
};

/// The report of a single run.
pub(crate) struct Single<'a>(pub(crate) &'a RunResult);

impl Display for Single<'_> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let result = self.0;
        let (width, height) = result.dimensions;
        writeln!(f, "Dimensions: {}x{}", width, height)?;
        writeln!(f, "Iterations: {}", result.iterations)?;
        writeln!(f, "Cells at the end:")?;
        for (state, count) in &result.final_occurrences {
            writeln!(f, "State {}:\t{}", state, count)?;
        }
        write!(f, "Ended naturally: {}", result.ended_naturally)
    }
}

/// Statistics of the final count of one state over many runs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct StateStats {
    pub(crate) sum: usize,
    pub(crate) average: f64,
    pub(crate) median: f64,
}

impl StateStats {
    /// `None` if there are no counts.
    fn new(mut counts: Vec<usize>) -> Option<Self> {
        let n = counts.len();
        if n == 0 {
            return None;
        }
        counts.sort_unstable();
        let sum: usize = counts.iter().sum();
        let median = if n % 2 == 0 {
            (counts[n / 2 - 1] + counts[n / 2]) as f64 / 2.0
        } else {
            counts[n / 2] as f64
        };
        Some(StateStats {
            sum,
            average: sum as f64 / n as f64,
            median,
        })
    }
}

/// The aggregate report of many runs.
pub(crate) struct Summary<'a>(pub(crate) &'a [RunResult]);

impl Summary<'_> {
    /// Every state that occurs in some run, ascending.
    fn states(&self) -> BTreeSet<State> {
        self.0
            .iter()
            .flat_map(|result| result.final_occurrences.keys().copied())
            .collect()
    }

    pub(crate) fn stats(&self, state: State) -> Option<StateStats> {
        StateStats::new(self.0.iter().map(|r| r.occurrences(state)).collect())
    }

    pub(crate) fn ended_naturally(&self) -> usize {
        self.0.iter().filter(|r| r.ended_naturally).count()
    }
}

impl Display for Summary<'_> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let runs = self.0.len();
        writeln!(f, "Simulations run: {}", runs)?;
        writeln!(f, "Cells in each state at the end:")?;
        writeln!(f, "State\tSum\tAvg\tMed")?;
        for state in self.states() {
            if let Some(stats) = self.stats(state) {
                writeln!(
                    f,
                    "{}\t{}\t{:.2}\t{}",
                    state, stats.sum, stats.average, stats.median
                )?;
            }
        }
        let ended = self.ended_naturally();
        let percent = if runs == 0 {
            0.0
        } else {
            ended as f64 / runs as f64 * 100.0
        };
        write!(f, "Ended naturally: {}\nWhich is {:.2}%", ended, percent)
    }
}
