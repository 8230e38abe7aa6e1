//! Run configuration.

use crate::{
    cells::{Edge, State},
    error::Error,
    rules::RuleSpec,
    run::RunResult,
    world::World,
};
use educe::Educe;
use log::info;
use rand::{rngs::StdRng, SeedableRng};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An edge to force into some state before the first step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EdgeSeed {
    pub edge: Edge,
    pub state: State,
}

/// Run configuration.
///
/// The worlds will be generated from this configuration.
#[derive(Clone, Debug, Educe, PartialEq)]
#[educe(Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    /// Width.
    #[educe(Default = 16)]
    pub width: usize,

    /// Height.
    #[educe(Default = 16)]
    pub height: usize,

    /// Number of runs for [`run_all`](Self::run_all).
    #[educe(Default = 1)]
    pub runs: usize,

    /// A run is cut off after this many steps.
    ///
    /// `None` means that it only stops when the world converges.
    pub max_iterations: Option<u64>,

    /// The random seed of the first run.
    ///
    /// The `i`-th run uses `seed + i`.
    /// `None` means that the seeds are chosen from the system entropy.
    pub seed: Option<u64>,

    /// An edge to seed before the first step.
    pub edge: Option<EdgeSeed>,

    /// How far the probabilities in the rule file may sum from 1.
    #[educe(Default = 0.1)]
    pub probability_tolerance: f64,

    /// Whether a step fails when a rule produces a state
    /// that is not one of the possible states.
    pub strict_states: bool,
}

impl Config {
    /// Sets up a new configuration with given size.
    pub fn new(width: usize, height: usize) -> Self {
        Config {
            width,
            height,
            ..Config::default()
        }
    }

    /// Sets the number of runs.
    pub fn set_runs(mut self, runs: usize) -> Self {
        self.runs = runs;
        self
    }

    /// Sets the maximal number of steps.
    pub fn set_max_iterations<T: Into<Option<u64>>>(mut self, max_iterations: T) -> Self {
        self.max_iterations = max_iterations.into();
        self
    }

    /// Sets the random seed.
    pub fn set_seed<T: Into<Option<u64>>>(mut self, seed: T) -> Self {
        self.seed = seed.into();
        self
    }

    /// Sets the edge to seed.
    pub fn set_edge<T: Into<Option<EdgeSeed>>>(mut self, edge: T) -> Self {
        self.edge = edge.into();
        self
    }

    /// Sets the tolerance of the probability sum.
    pub fn set_probability_tolerance(mut self, probability_tolerance: f64) -> Self {
        self.probability_tolerance = probability_tolerance;
        self
    }

    /// Sets whether states outside the possible states are an error.
    pub fn set_strict_states(mut self, strict_states: bool) -> Self {
        self.strict_states = strict_states;
        self
    }

    /// Parses a rule file with the configured tolerance.
    pub fn parse_rules(&self, text: &str) -> Result<RuleSpec, Error> {
        Ok(RuleSpec::parse_with_tolerance(
            text,
            self.probability_tolerance,
        )?)
    }

    /// Creates a new uninitialized world from the configuration.
    pub fn world(&self, spec: RuleSpec) -> Result<World, Error> {
        World::with_config(self, spec)
    }

    fn rng(&self, run: usize) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(run as u64)),
            None => StdRng::from_entropy(),
        }
    }

    /// The world of the `run`-th run (counting from 0), before its first step.
    ///
    /// It is randomized with the seed of that run, and the edge is seeded
    /// if there is one.
    pub fn world_for_run(&self, spec: &RuleSpec, run: usize) -> Result<World, Error> {
        let mut world = self.world(spec.clone())?;
        world.randomize(&mut self.rng(run))?;
        if let Some(EdgeSeed { edge, state }) = self.edge {
            world.seed_edge(edge, state)?;
        }
        Ok(world)
    }

    fn run_nth(&self, spec: &RuleSpec, run: usize) -> Result<RunResult, Error> {
        self.world_for_run(spec, run)?.run(self.max_iterations)
    }

    /// Performs a single run: randomizes a world, seeds the edge if any,
    /// and steps until it converges or is cut off.
    pub fn run(&self, spec: &RuleSpec) -> Result<RunResult, Error> {
        self.run_nth(spec, 0)
    }

    /// Performs [`runs`](#structfield.runs) independent runs.
    pub fn run_all(&self, spec: &RuleSpec) -> Result<Vec<RunResult>, Error> {
        (0..self.runs)
            .map(|run| {
                let result = self.run_nth(spec, run)?;
                info!(
                    "run {} finished after {} iterations",
                    run + 1,
                    result.iterations
                );
                Ok(result)
            })
            .collect()
    }
}
