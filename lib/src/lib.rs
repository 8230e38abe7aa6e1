//! A cellular automaton engine driven by a small rule language.
//!
//! ```
//! use rulecell_lib::{Config, RuleSpec};
//!
//! let spec: RuleSpec = "0,1\n0.5,0.5\n2\n1 -> 0\ndefault -> x\n".parse()?;
//! let result = Config::new(8, 8).set_seed(1).run(&spec)?;
//! assert!(result.ended_naturally);
//! # Ok::<(), rulecell_lib::Error>(())
//! ```

mod cells;
mod config;
mod error;
mod history;
pub mod rules;
mod run;
mod sampler;
mod world;

pub use cells::{Coord, Edge, State, Window, SELF_SLOT};
pub use config::{Config, EdgeSeed};
pub use error::{Error, EvalError, ExprError, ParseError};
pub use history::{History, Round, StateDelta};
pub use rules::RuleSpec;
pub use run::RunResult;
pub use sampler::Sampler;
pub use world::{Status, World};
