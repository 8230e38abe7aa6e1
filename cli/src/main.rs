mod args;
mod logging;
mod report;

use anyhow::{Context, Result};
use args::Args;
use report::{Single, Summary};
use rulecell_lib::{Config, RuleSpec, RunResult, Status};
use std::fs;
use tracing::info;

/// Runs one world to the end, printing it after each step.
fn run_drawn(config: &Config, spec: &RuleSpec, run: usize) -> Result<RunResult> {
    let mut world = config.world_for_run(spec, run)?;
    println!("Run {}, initial world:\n{}\n", run + 1, world.display());
    while world.status() != Status::Converged
        && config
            .max_iterations
            .map_or(true, |max| world.iteration() < max)
    {
        let changed = world.step()?;
        println!(
            "Round {}, {} cells changed:\n{}\n",
            world.iteration(),
            changed,
            world.display()
        );
    }
    Ok(world.into_result())
}

fn main() -> Result<()> {
    let args = Args::parse()?;
    logging::init(args.verbosity)?;

    let text = fs::read_to_string(&args.rules)
        .with_context(|| format!("cannot read rule file {}", args.rules.display()))?;
    let spec = args
        .config
        .parse_rules(&text)
        .with_context(|| format!("invalid rule file {}", args.rules.display()))?;
    info!(
        "loaded {} states and {} rules from {}",
        spec.possible_states().len(),
        spec.simple_rules().len() + spec.neighbor_rules().len() + 1,
        args.rules.display()
    );

    let config = &args.config;
    let results = if args.draw {
        (0..config.runs)
            .map(|run| run_drawn(config, &spec, run))
            .collect::<Result<Vec<_>>>()?
    } else {
        config.run_all(&spec).context("simulation failed")?
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else if let [result] = results.as_slice() {
        println!("{}", Single(result));
    } else {
        println!("{}", Summary(&results));
    }
    Ok(())
}
