use rand::{rngs::StdRng, SeedableRng};
use rulecell_lib::{Config, Edge, Error, EvalError, RuleSpec, State, Status, World};

fn randomized(width: usize, height: usize, rules: &str) -> Result<World, Error> {
    let spec = RuleSpec::parse(rules)?;
    let mut world = World::new(width, height, spec)?;
    world.randomize(&mut StdRng::seed_from_u64(42))?;
    Ok(world)
}

const FOREST: &str = "\
0,1,2           // burned, fire, tree
0,0,1
3
1 -> 0
min 1: 1: 2 -> 1
default -> x
";

#[test]
fn all_zeros_converge_immediately() -> Result<(), Error> {
    let mut world = randomized(3, 3, "0,1\n1.0,0.0\n2\n0 -> 0\ndefault -> x\n")?;
    for y in 0..3 {
        for x in 0..3 {
            assert_eq!(world.get_cell((x, y))?, Some(State(0)));
        }
    }
    assert_eq!(world.step()?, 0);
    assert_eq!(world.status(), Status::Converged);
    assert_eq!(world.iteration(), 1);
    assert!(world.snapshot().ended_naturally);
    Ok(())
}

#[test]
fn forest_fire() -> Result<(), Error> {
    let mut world = randomized(5, 5, FOREST)?;
    world.set_cell((2, 2), State(1))?;
    assert_eq!(world.step()?, 9);
    for y in 0..5 {
        for x in 0..5 {
            let expected = match (x, y) {
                (2, 2) => State(0),
                (1..=3, 1..=3) => State(1),
                _ => State(2),
            };
            assert_eq!(world.get_cell((x, y))?, Some(expected), "{:?}", (x, y));
        }
    }
    assert_eq!(world.status(), Status::Running);

    let result = world.run(None)?;
    assert!(result.ended_naturally);
    assert_eq!(result.occurrences(State(1)), 0);
    assert_eq!(result.occurrences(State(2)), 0);
    assert_eq!(result.occurrences(State(0)), 25);
    Ok(())
}

#[test]
fn border_has_no_phantom_neighbors() -> Result<(), Error> {
    // Any cell next to a 0 becomes 0. The world is all 1s.
    let mut world = randomized(4, 3, "0,1\n0,1\n2\nmin 1: 0 -> 0\ndefault -> x\n")?;
    assert_eq!(world.step()?, 0);
    assert_eq!(world.status(), Status::Converged);
    assert_eq!(world.count_states()[&State(1)], 12);
    Ok(())
}

#[test]
fn corner_counts_three_neighbors() -> Result<(), Error> {
    let mut world = randomized(3, 3, "0,1\n0,1\n2\nis 3: 1: 1 -> 0\ndefault -> x\n")?;
    assert_eq!(world.step()?, 4);
    assert_eq!(
        world.display(),
        "0 1 0\n\
         1 1 1\n\
         0 1 0"
    );
    Ok(())
}

#[test]
fn convergence_is_terminal() -> Result<(), Error> {
    let mut world = randomized(6, 4, "0,1,2\n0.3,0.3,0.4\n2\n2 -> 1\ndefault -> 0\n")?;
    while world.step()? > 0 {}
    assert_eq!(world.status(), Status::Converged);
    let before = world.display();
    let iteration = world.iteration();
    let rounds = world.history().len();
    for _ in 0..3 {
        assert_eq!(world.step()?, 0);
    }
    assert_eq!(world.display(), before);
    assert_eq!(world.iteration(), iteration);
    assert_eq!(world.history().len(), rounds);
    Ok(())
}

#[test]
fn cut_off_run() -> Result<(), Error> {
    let mut world = randomized(3, 3, "0,1\n0.5,0.5\n3\n0 -> 1\n1 -> 0\ndefault -> x\n")?;
    let result = world.run(Some(5))?;
    assert_eq!(result.iterations, 5);
    assert!(!result.ended_naturally);
    assert_eq!(world.status(), Status::Running);
    Ok(())
}

#[test]
fn step_before_randomize() -> Result<(), Error> {
    let spec = RuleSpec::parse("0,1\n0.5,0.5\n1\ndefault -> x\n")?;
    let mut world = World::new(2, 2, spec)?;
    assert_eq!(world.status(), Status::Uninitialized);
    assert_eq!(world.get_cell((0, 0))?, None);
    assert_eq!(world.display(), "- -\n- -");
    assert_eq!(world.step(), Err(Error::NotInitialized));
    Ok(())
}

#[test]
fn empty_world() -> Result<(), Error> {
    let spec = RuleSpec::parse("0,1\n0.5,0.5\n1\ndefault -> x\n")?;
    assert!(matches!(
        World::new(0, 3, spec),
        Err(Error::NonPositiveError)
    ));
    Ok(())
}

#[test]
fn failed_step_changes_nothing() -> Result<(), Error> {
    let mut world = randomized(3, 3, "0,1\n0.5,0.5\n1\ndefault -> x / 0\n")?;
    let before = world.display();
    assert_eq!(
        world.step(),
        Err(Error::EvalError(EvalError::DivisionByZero))
    );
    assert_eq!(world.display(), before);
    assert_eq!(world.iteration(), 0);
    assert_eq!(world.history().len(), 1);
    assert_eq!(world.status(), Status::Randomized);
    Ok(())
}

#[test]
fn strict_states() -> Result<(), Error> {
    let rules = "0,1\n1,0\n1\ndefault -> x + 5\n";

    let mut world = randomized(2, 2, rules)?;
    assert_eq!(world.step()?, 4);
    let result = world.snapshot();
    assert_eq!(result.occurrences(State(5)), 4);
    assert_eq!(result.final_occurrences[&State(0)], 0);

    let mut world = randomized(2, 2, rules)?;
    world.set_strict_states(true);
    assert_eq!(world.step(), Err(Error::InvalidState((0, 0), State(5))));
    Ok(())
}

#[test]
fn cut_off_into_foreign_states() -> Result<(), Error> {
    let mut world = randomized(2, 2, "0,1\n1,0\n1\ndefault -> x + 5\n")?;
    let result = world.run(Some(1))?;
    assert_eq!(world.status(), Status::Running);
    assert_eq!(result.iterations, 1);
    assert_eq!(result.occurrences(State(5)), 4);
    assert!(!result.ended_naturally);
    assert!(!world.into_result().ended_naturally);
    Ok(())
}

#[test]
fn two_field_forest_oscillates() -> Result<(), Error> {
    // Without a from state, burned cells next to a fire ignite again.
    let rules = "0,1,2\n0,0,1\n3\n1 -> 0\nmin 1: 1 -> 1\ndefault -> x\n";
    let mut world = randomized(5, 5, rules)?;
    world.set_cell((2, 2), State(1))?;
    assert_eq!(world.step()?, 9);
    assert_eq!(
        world.display(),
        "2 2 2 2 2\n\
         2 1 1 1 2\n\
         2 1 0 1 2\n\
         2 1 1 1 2\n\
         2 2 2 2 2"
    );
    assert_eq!(world.step()?, 25);
    assert_eq!(world.get_cell((2, 2))?, Some(State(1)));

    let result = world.run(Some(200))?;
    assert_eq!(result.iterations, 200);
    assert!(!result.ended_naturally);
    assert_eq!(world.status(), Status::Running);
    Ok(())
}

#[test]
fn seed_edge() -> Result<(), Error> {
    let mut world = randomized(4, 3, "0,1\n1,0\n1\ndefault -> x\n")?;
    world.seed_edge(Edge::East, State(1))?;
    assert_eq!(
        world.display(),
        "0 0 0 1\n\
         0 0 0 1\n\
         0 0 0 1"
    );
    assert_eq!(
        world.seed_edge(Edge::North, State(1)),
        Err(Error::SeedNotAllowed)
    );

    let mut world = randomized(4, 3, "0,1\n1,0\n1\ndefault -> x\n")?;
    world.seed_edge(Edge::South, State(1))?;
    assert_eq!(world.count_states()[&State(1)], 4);
    world.step()?;
    assert_eq!(world.set_cell((0, 0), State(1)), Err(Error::SeedNotAllowed));
    Ok(())
}

#[test]
fn out_of_bounds() -> Result<(), Error> {
    let world = randomized(2, 2, "0,1\n1,0\n1\ndefault -> x\n")?;
    assert_eq!(world.get_cell((2, 0)), Err(Error::CellOutOfBounds((2, 0))));
    Ok(())
}

#[test]
fn randomize_again_starts_over() -> Result<(), Error> {
    let mut world = randomized(3, 3, "0,1\n0.5,0.5\n2\n1 -> 0\ndefault -> x\n")?;
    world.run(None)?;
    world.randomize(&mut StdRng::seed_from_u64(7))?;
    assert_eq!(world.status(), Status::Randomized);
    assert_eq!(world.iteration(), 0);
    assert_eq!(world.history().len(), 1);
    Ok(())
}

#[test]
fn seeded_runs_are_reproducible() -> Result<(), Error> {
    let config = Config::new(12, 12).set_seed(2024).set_runs(3);
    let spec = config.parse_rules("0,1,2\n0.1,0.1,0.8\n3\n1 -> 0\nmin 1: 1: 2 -> 1\ndefault -> x\n")?;
    let first = config.run_all(&spec)?;
    let second = config.run_all(&spec)?;
    assert_eq!(first.len(), 3);
    assert_eq!(first, second);
    for result in &first {
        assert!(result.ended_naturally);
        assert_eq!(result.dimensions, (12, 12));
        assert_eq!(result.final_occurrences.values().sum::<usize>(), 144);
        assert_eq!(result.occurrences(State(1)), 0);
    }
    Ok(())
}

#[test]
fn config_seeds_edge() -> Result<(), Error> {
    let config = Config::new(5, 5)
        .set_seed(1)
        .set_edge(rulecell_lib::EdgeSeed {
            edge: Edge::West,
            state: State(1),
        });
    let spec = config.parse_rules("0,1,2\n0,0,1\n3\n1 -> 0\nmin 1: 1: 2 -> 1\ndefault -> x\n")?;
    let result = config.run(&spec)?;
    assert!(result.ended_naturally);
    assert_eq!(result.occurrences(State(0)), 25);
    // The fire moves one column per step, then the last column burns out.
    assert_eq!(result.iterations, 6);
    Ok(())
}
