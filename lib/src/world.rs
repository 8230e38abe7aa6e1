//! The world.

use crate::{
    cells::{Coord, Edge, State, Window},
    config::Config,
    error::Error,
    history::History,
    rules::RuleSpec,
    run::RunResult,
    sampler::Sampler,
};
use log::{debug, info, warn};
use rand::Rng;
use std::{collections::BTreeMap, fmt::Write, mem};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The lifecycle of a world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Status {
    /// No cell has a state yet.
    Uninitialized,
    /// Every cell has an initial state. No step has run.
    Randomized,
    /// At least one step has run, and the last one changed some cell.
    Running,
    /// The last step changed nothing. Further steps are no-ops.
    Converged,
}

/// The world.
///
/// A fixed-size grid of cells, updated synchronously: each step computes
/// all the next states from the current generation into a scratch buffer,
/// then swaps the buffers.
#[derive(Clone, Debug)]
pub struct World {
    width: usize,
    height: usize,

    /// The rules of the cellular automaton.
    spec: RuleSpec,

    /// Cumulative distribution of the initial states.
    sampler: Sampler,

    /// The current generation, row by row.
    cells: Vec<State>,

    /// The next generation during a step.
    scratch: Vec<State>,

    history: History,

    /// Number of steps applied.
    iteration: u64,

    status: Status,

    /// Whether an edge has been seeded.
    seeded: bool,

    /// Whether a step fails when a rule produces a state
    /// that is not one of the possible states.
    strict_states: bool,
}

impl World {
    /// Creates a new uninitialized world.
    pub fn new(width: usize, height: usize, spec: RuleSpec) -> Result<Self, Error> {
        if width == 0 || height == 0 {
            return Err(Error::NonPositiveError);
        }
        let sampler = Sampler::new(spec.state_probabilities())?;
        let history = History::new(spec.possible_states());
        let size = width * height;
        Ok(World {
            width,
            height,
            spec,
            sampler,
            cells: vec![State::default(); size],
            scratch: vec![State::default(); size],
            history,
            iteration: 0,
            status: Status::Uninitialized,
            seeded: false,
            strict_states: false,
        })
    }

    /// Creates a new uninitialized world from the configuration.
    pub fn with_config(config: &Config, spec: RuleSpec) -> Result<Self, Error> {
        let mut world = World::new(config.width, config.height, spec)?;
        world.strict_states = config.strict_states;
        Ok(world)
    }

    /// Sets whether a step fails on states outside the possible states.
    pub fn set_strict_states(&mut self, strict_states: bool) {
        self.strict_states = strict_states;
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn spec(&self) -> &RuleSpec {
        &self.spec
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// Number of steps so far.
    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    fn index(&self, (x, y): Coord) -> Result<usize, Error> {
        if x < self.width && y < self.height {
            Ok(y * self.width + x)
        } else {
            Err(Error::CellOutOfBounds((x, y)))
        }
    }

    /// Gets the state of a cell.
    ///
    /// Returns `None` if the world is not randomized yet.
    pub fn get_cell(&self, coord: Coord) -> Result<Option<State>, Error> {
        let i = self.index(coord)?;
        if self.status == Status::Uninitialized {
            Ok(None)
        } else {
            Ok(Some(self.cells[i]))
        }
    }

    /// Assigns every cell a state drawn from the initial probabilities.
    ///
    /// The assignments are recorded as round 0 of the history.
    /// Randomizing again starts the run over.
    pub fn randomize<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), Error> {
        self.history.initialize(self.spec.possible_states());
        self.iteration = 0;
        self.seeded = false;
        for i in 0..self.cells.len() {
            let draw: f64 = rng.gen();
            let state = self.sampler.sample(self.spec.possible_states(), draw)?;
            self.cells[i] = state;
            self.history.state_changed(0, None, state);
        }
        self.status = Status::Randomized;
        info!("randomized a {}x{} world", self.width, self.height);
        Ok(())
    }

    fn check_setup(&self, coord: Coord, state: State) -> Result<(), Error> {
        if self.status != Status::Randomized {
            return Err(Error::SeedNotAllowed);
        }
        if self.strict_states && !self.spec.is_possible(state) {
            return Err(Error::InvalidState(coord, state));
        }
        Ok(())
    }

    /// Forces one edge of the world to `state`.
    ///
    /// Can only be done once, after randomizing and before the first step.
    /// The rules are not involved, and the history is not changed.
    pub fn seed_edge(&mut self, edge: Edge, state: State) -> Result<(), Error> {
        let (width, height) = (self.width, self.height);
        let (first, step, count) = match edge {
            Edge::North => ((0, 0), (1, 0), width),
            Edge::South => ((0, height - 1), (1, 0), width),
            Edge::West => ((0, 0), (0, 1), height),
            Edge::East => ((width - 1, 0), (0, 1), height),
        };
        self.check_setup(first, state)?;
        if self.seeded {
            return Err(Error::SeedNotAllowed);
        }
        for k in 0..count {
            let i = self.index((first.0 + k * step.0, first.1 + k * step.1))?;
            self.cells[i] = state;
        }
        self.seeded = true;
        debug!("seeded the {} edge with state {}", edge, state);
        Ok(())
    }

    /// Sets the state of a single cell, for setting up a scenario.
    ///
    /// Like [`seed_edge`](Self::seed_edge), it is only allowed after
    /// randomizing and before the first step, and is not recorded.
    pub fn set_cell(&mut self, coord: Coord, state: State) -> Result<(), Error> {
        let i = self.index(coord)?;
        self.check_setup(coord, state)?;
        self.cells[i] = state;
        Ok(())
    }

    /// The 3×3 block around `(x, y)`.
    ///
    /// Positions outside the world are `None`.
    fn window(&self, x: usize, y: usize) -> Window {
        let mut window = [None; 9];
        for j in 0..3 {
            let Some(ny) = (y + j).checked_sub(1).filter(|&ny| ny < self.height) else {
                continue;
            };
            for i in 0..3 {
                let Some(nx) = (x + i).checked_sub(1).filter(|&nx| nx < self.width) else {
                    continue;
                };
                window[j * 3 + i] = Some(self.cells[ny * self.width + nx]);
            }
        }
        window
    }

    /// Computes the next generation.
    ///
    /// Returns the number of cells that changed. Once a step changes
    /// nothing, the world is converged and further steps return `0`
    /// without doing anything.
    ///
    /// If a rule fails, the step is abandoned and the world is unchanged.
    pub fn step(&mut self) -> Result<usize, Error> {
        match self.status {
            Status::Uninitialized => return Err(Error::NotInitialized),
            Status::Converged => return Ok(0),
            Status::Randomized | Status::Running => (),
        }

        let mut foreign = 0;
        for y in 0..self.height {
            for x in 0..self.width {
                let i = y * self.width + x;
                let next = self.spec.next_state(self.cells[i], &self.window(x, y))?;
                if !self.spec.is_possible(next) {
                    if self.strict_states {
                        return Err(Error::InvalidState((x, y), next));
                    }
                    foreign += 1;
                }
                self.scratch[i] = next;
            }
        }
        if foreign > 0 {
            warn!(
                "{} cells entered states outside the possible states",
                foreign
            );
        }

        let round = self.iteration as usize + 1;
        let mut changed = 0;
        for (&before, &after) in self.cells.iter().zip(&self.scratch) {
            self.history.state_changed(round, Some(before), after);
            if before != after {
                changed += 1;
            }
        }
        mem::swap(&mut self.cells, &mut self.scratch);
        self.iteration += 1;

        debug!("round {}: {} cells changed", round, changed);
        if changed == 0 {
            self.status = Status::Converged;
            info!("converged after {} iterations", self.iteration);
        } else {
            self.status = Status::Running;
        }
        Ok(changed)
    }

    /// Steps until the world converges, or `max_iterations` steps have run.
    pub fn run(&mut self, max_iterations: Option<u64>) -> Result<RunResult, Error> {
        while self.status != Status::Converged
            && max_iterations.map_or(true, |max| self.iteration < max)
        {
            self.step()?;
        }
        Ok(self.snapshot())
    }

    /// Number of cells in each state.
    ///
    /// Every possible state is present. States produced by the rules
    /// outside the possible states are counted too.
    pub fn count_states(&self) -> BTreeMap<State, usize> {
        let mut counts: BTreeMap<State, usize> = self
            .spec
            .possible_states()
            .iter()
            .map(|&state| (state, 0))
            .collect();
        if self.status != Status::Uninitialized {
            for &state in &self.cells {
                *counts.entry(state).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Summarizes the run so far.
    pub fn snapshot(&self) -> RunResult {
        RunResult::new(self, self.history.clone())
    }

    /// Summarizes the run, consuming the world.
    pub fn into_result(mut self) -> RunResult {
        let history = mem::take(&mut self.history);
        RunResult::new(&self, history)
    }

    /// Displays the world, one row per line,
    /// with the states separated by spaces.
    ///
    /// Cells are shown as `-` before the world is randomized.
    pub fn display(&self) -> String {
        let mut str = String::new();
        for (y, row) in self.cells.chunks(self.width).enumerate() {
            if y > 0 {
                str.push('\n');
            }
            for (x, state) in row.iter().enumerate() {
                if x > 0 {
                    str.push(' ');
                }
                if self.status == Status::Uninitialized {
                    str.push('-');
                } else {
                    write!(str, "{}", state).unwrap();
                }
            }
        }
        str
    }
}
