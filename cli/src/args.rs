//! Parsing command-line arguments.

use anyhow::{bail, Context, Result};
use clap::{
    crate_authors, crate_description, crate_name, crate_version, value_parser, Arg, ArgAction,
    ArgMatches, Command,
};
use rulecell_lib::{Config, Edge, EdgeSeed, State};
use std::{
    fs,
    path::{Path, PathBuf},
};

fn positive(s: &str) -> Result<usize, String> {
    match s.parse() {
        Ok(0) | Err(_) => Err(String::from("must be a positive integer")),
        Ok(n) => Ok(n),
    }
}

/// A struct to store the parse results.
pub(crate) struct Args {
    pub(crate) rules: PathBuf,
    pub(crate) config: Config,
    pub(crate) draw: bool,
    pub(crate) json: bool,
    pub(crate) verbosity: u8,
}

fn command() -> Command {
    Command::new(crate_name!())
        .version(crate_version!())
        .author(crate_authors!())
        .about(crate_description!())
        .long_about(
            "Runs a cellular automaton described by a rule file\n\
             \n\
             The rule file lists the possible states, their initial probabilities, \
             the number of rules, and then the rules themselves:\n\
             \n\
             0,1,2\n\
             0,0.05,0.95\n\
             3\n\
             1 -> 0\n\
             min 1: 1: 2 -> 1\n\
             default -> x\n\
             \n\
             A run stops when a step changes nothing, or after --max-iterations steps.\n",
        )
        .arg(
            Arg::new("RULES")
                .help("Path of the rule file")
                .required(true)
                .index(1)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("X")
                .help("Width of the world")
                .long_help("Width of the world\n\
                     Optional with --config, which then gives the default.\n")
                .required_unless_present("CONFIG")
                .index(2)
                .value_parser(positive),
        )
        .arg(
            Arg::new("Y")
                .help("Height of the world")
                .long_help("Height of the world\n\
                     Optional with --config, which then gives the default.\n")
                .required_unless_present("CONFIG")
                .index(3)
                .value_parser(positive),
        )
        .arg(
            Arg::new("RUNS")
                .help("Number of independent runs")
                .short('n')
                .long("runs")
                .value_parser(positive),
        )
        .arg(
            Arg::new("MAX")
                .help("Cut a run off after this many steps")
                .short('m')
                .long("max-iterations")
                .value_parser(value_parser!(u64)),
        )
        .arg(
            Arg::new("SEED")
                .help("Random seed of the first run")
                .long_help(
                    "Random seed of the first run\n\
                     The i-th run is seeded with SEED + i. \
                     Without a seed the runs are not reproducible.\n",
                )
                .short('s')
                .long("seed")
                .value_parser(value_parser!(u64)),
        )
        .arg(
            Arg::new("EDGE")
                .help("Edge to seed before the first step")
                .long_help(
                    "Edge to seed before the first step\n\
                     One of n, e, s, w (or north, east, south, west, or 0, 1, 2, 3).\n",
                )
                .short('e')
                .long("edge")
                .requires("EDGESTATE")
                .value_parser(str::parse::<Edge>),
        )
        .arg(
            Arg::new("EDGESTATE")
                .help("State of the seeded edge")
                .long("edge-state")
                .requires("EDGE")
                .allow_negative_numbers(true)
                .value_parser(value_parser!(i32)),
        )
        .arg(
            Arg::new("TOLERANCE")
                .help("How far the probabilities may sum from 1")
                .long("tolerance")
                .value_parser(value_parser!(f64)),
        )
        .arg(
            Arg::new("STRICT")
                .help("Fail when a rule produces a state that is not a possible state")
                .long("strict")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("DRAW")
                .help("Print the world after each step")
                .short('d')
                .long("draw")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("JSON")
                .help("Print the results as JSON")
                .long("json")
                .conflicts_with("DRAW")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("CONFIG")
                .help("Load the configuration from a TOML, YAML or JSON file")
                .long_help(
                    "Load the configuration from a TOML, YAML or JSON file\n\
                     The format is chosen by the file extension. \
                     Options on the command line override the file.\n",
                )
                .short('c')
                .long("config")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("VERBOSE")
                .help("Log more, can be repeated")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count),
        )
}

/// Parses a [`Config`] in the format given by a file extension.
fn parse_config(text: &str, extension: &str) -> Result<Config> {
    let config = match extension.to_ascii_lowercase().as_str() {
        "toml" => toml::from_str(text).context("invalid TOML config")?,
        "yaml" | "yml" => serde_yaml::from_str(text).context("invalid YAML config")?,
        "json" => serde_json::from_str(text).context("invalid JSON config")?,
        _ => bail!(
            "unknown config format {:?}, expected toml, yaml or json",
            extension
        ),
    };
    Ok(config)
}

/// Reads a [`Config`] from a file.
fn load_config(path: &Path) -> Result<Config> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("cannot read config file {}", path.display()))?;
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    parse_config(&text, extension).with_context(|| format!("in {}", path.display()))
}

impl Args {
    /// Parses the command-line arguments.
    ///
    /// Exits on invalid arguments, like clap does.
    pub(crate) fn parse() -> Result<Self> {
        Args::from_matches(&command().get_matches())
    }

    fn from_matches(matches: &ArgMatches) -> Result<Self> {
        let mut config = match matches.get_one::<PathBuf>("CONFIG") {
            Some(path) => load_config(path)?,
            None => Config::default(),
        };

        if let Some(&width) = matches.get_one::<usize>("X") {
            config.width = width;
        }
        if let Some(&height) = matches.get_one::<usize>("Y") {
            config.height = height;
        }
        if let Some(&runs) = matches.get_one::<usize>("RUNS") {
            config = config.set_runs(runs);
        }
        if let Some(&max) = matches.get_one::<u64>("MAX") {
            config = config.set_max_iterations(max);
        }
        if let Some(&seed) = matches.get_one::<u64>("SEED") {
            config = config.set_seed(seed);
        }
        if let (Some(&edge), Some(&state)) = (
            matches.get_one::<Edge>("EDGE"),
            matches.get_one::<i32>("EDGESTATE"),
        ) {
            config = config.set_edge(EdgeSeed {
                edge,
                state: State(state),
            });
        }
        if let Some(&tolerance) = matches.get_one::<f64>("TOLERANCE") {
            config = config.set_probability_tolerance(tolerance);
        }
        if matches.get_flag("STRICT") {
            config = config.set_strict_states(true);
        }

        let rules = matches
            .get_one::<PathBuf>("RULES")
            .cloned()
            .context("no rule file")?;

        Ok(Args {
            rules,
            config,
            draw: matches.get_flag("DRAW"),
            json: matches.get_flag("JSON"),
            verbosity: matches.get_count("VERBOSE"),
        })
    }
}
