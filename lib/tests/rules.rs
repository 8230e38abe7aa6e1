use rand::{rngs::StdRng, SeedableRng};
use rulecell_lib::{
    rules::count_neighbors, Error, EvalError, History, RuleSpec, Sampler, State, StateDelta,
    Window, World, SELF_SLOT,
};

fn window(states: [i32; 9]) -> Window {
    states.map(|s| if s < 0 { None } else { Some(State(s)) })
}

#[test]
fn self_is_not_a_neighbor() -> Result<(), Error> {
    let spec = RuleSpec::parse("0,1,2\n0.5,0.5,0\n2\nmin 1: 1 -> 2\ndefault -> x\n")?;
    let lonely = window([-1, -1, -1, -1, 1, -1, -1, -1, -1]);
    assert_eq!(count_neighbors(&lonely, State(1)), 0);
    assert_eq!(spec.next_state(State(1), &lonely)?, State(1));

    let mut crowded = window([1; 9]);
    crowded[SELF_SLOT] = Some(State(0));
    assert_eq!(count_neighbors(&crowded, State(1)), 8);
    assert_eq!(count_neighbors(&crowded, State(0)), 0);
    assert_eq!(spec.next_state(State(0), &crowded)?, State(2));
    Ok(())
}

#[test]
fn rule_precedence() -> Result<(), Error> {
    let spec = RuleSpec::parse(
        "0,1,2\n0.5,0.5,0\n4\nmin 0: 0 -> 2\n1 -> 0\nmin 0: 1 -> 1\ndefault -> 7\n",
    )?;
    let cells = window([0; 9]);
    // Simple rules come first, even when written after a neighbor rule.
    assert_eq!(spec.next_state(State(1), &cells)?, State(0));
    // The first matching neighbor rule wins.
    assert_eq!(spec.next_state(State(2), &cells)?, State(2));
    Ok(())
}

#[test]
fn comparisons() -> Result<(), Error> {
    let spec = RuleSpec::parse(
        "0,1\n0.5,0.5\n4\nis 2: 1: 0 -> 1\nmax 1: 1: 1 -> 0\nmin 3: 0: 0 -> 1\ndefault -> x\n",
    )?;
    let two = window([1, 1, 0, -1, 0, -1, 0, 0, -1]);
    assert_eq!(spec.next_state(State(0), &two)?, State(1));
    assert_eq!(spec.next_state(State(1), &two)?, State(1));

    let one = window([1, 0, 0, 0, 1, -1, -1, -1, -1]);
    assert_eq!(spec.next_state(State(1), &one)?, State(0));
    assert_eq!(spec.next_state(State(0), &one)?, State(1));

    let none = window([-1; 9]);
    assert_eq!(spec.next_state(State(0), &none)?, State(0));
    assert_eq!(spec.next_state(State(1), &none)?, State(0));
    Ok(())
}

#[test]
fn default_rule() -> Result<(), Error> {
    let cells = window([-1; 9]);
    let spec = RuleSpec::parse("0,1\n0.5,0.5\n1\ndefault -> x * 2 - 1\n")?;
    assert_eq!(spec.next_state(State(3), &cells)?, State(5));
    assert_eq!(spec.next_state(State(-3), &cells)?, State(-7));

    let spec = RuleSpec::parse("0,1\n0.5,0.5\n1\ndefault -> x * 2147483647\n")?;
    assert_eq!(spec.next_state(State(1), &cells)?, State(i32::MAX));
    assert_eq!(spec.next_state(State(2), &cells), Err(EvalError::Overflow));

    let spec = RuleSpec::parse("0,1\n0.5,0.5\n1\ndefault -> 1 / x\n")?;
    assert_eq!(spec.next_state(State(0), &cells), Err(EvalError::DivisionByZero));
    Ok(())
}

#[test]
fn history_records_changes() {
    let mut history = History::new(&[State(2), State(0), State(1)]);
    assert_eq!(history.states(), &[State(0), State(1), State(2)]);
    assert!(history.is_empty());

    history.state_changed(0, None, State(2));
    history.state_changed(0, None, State(2));
    history.state_changed(0, None, State(0));
    assert_eq!(history.changes_count(), vec![3]);
    assert_eq!(
        history.delta(0, State(2)),
        Some(StateDelta {
            entered: 2,
            left: 0,
        })
    );

    history.state_changed(1, Some(State(2)), State(1));
    history.state_changed(1, Some(State(0)), State(0));
    // Untracked states are ignored.
    history.state_changed(1, Some(State(0)), State(9));
    assert_eq!(history.len(), 2);
    assert_eq!(
        history.delta(1, State(1)),
        Some(StateDelta {
            entered: 1,
            left: 0,
        })
    );
    assert_eq!(
        history.delta(1, State(2)),
        Some(StateDelta {
            entered: 0,
            left: -1,
        })
    );
    assert_eq!(
        history.delta(1, State(0)),
        Some(StateDelta {
            entered: 0,
            left: -1,
        })
    );
    assert_eq!(history.delta(1, State(9)), None);
    assert_eq!(history.delta(2, State(0)), None);

    // A round where nothing changes still counts.
    history.state_changed(2, Some(State(1)), State(1));
    assert_eq!(history.changes_count(), vec![3, 1, 0]);
}

#[test]
fn history_is_balanced() -> Result<(), Error> {
    let spec = RuleSpec::parse(
        "0,1,2\n0.1,0.2,0.7\n3\n1 -> 0\nmin 1: 1: 2 -> 1\ndefault -> x\n",
    )?;
    let mut world = World::new(10, 7, spec)?;
    world.randomize(&mut StdRng::seed_from_u64(5))?;
    let result = world.run(None)?;
    let history = &result.history;
    assert_eq!(history.len() as u64, result.iterations + 1);

    let initial = history.round(0).ok_or(Error::NotInitialized)?;
    assert_eq!(initial.entered_total(), 70);
    assert_eq!(initial.left_total(), 0);
    for round in &history.rounds()[1..] {
        assert_eq!(round.entered_total() + round.left_total(), 0);
    }

    for (i, &state) in history.states().iter().enumerate() {
        let net: i64 = history
            .rounds()
            .iter()
            .map(|round| round.deltas()[i].entered + round.deltas()[i].left)
            .sum();
        assert_eq!(net, result.occurrences(state) as i64);
    }
    assert_eq!(history.changes_count().last(), Some(&0));
    Ok(())
}

#[test]
fn sampler() -> Result<(), Error> {
    let states = [State(0), State(1), State(2)];
    let sampler = Sampler::new(&[0.2, 0.3, 0.5])?;
    let expected = [0.2, 0.5, 1.0];
    for (c, e) in sampler.cumulative().iter().zip(expected) {
        assert!((c - e).abs() < 1e-12);
    }
    assert_eq!(sampler.cumulative()[2], 1.0);

    assert_eq!(sampler.sample(&states, 0.0)?, State(0));
    assert_eq!(sampler.sample(&states, 0.1)?, State(0));
    assert_eq!(sampler.sample(&states, 0.3)?, State(1));
    assert_eq!(sampler.sample(&states, 0.75)?, State(2));
    assert_eq!(sampler.sample(&states, 0.999_999)?, State(2));
    Ok(())
}

#[test]
fn sampler_normalizes() -> Result<(), Error> {
    let sampler = Sampler::new(&[0.5, 0.45])?;
    assert!((sampler.cumulative()[0] - 0.5 / 0.95).abs() < 1e-12);
    assert_eq!(sampler.cumulative()[1], 1.0);
    assert_eq!(sampler.sample(&[State(0), State(1)], 0.99)?, State(1));

    let sampler = Sampler::new(&[0.0, 1.0])?;
    assert_eq!(sampler.sample(&[State(0), State(1)], 0.5)?, State(1));
    Ok(())
}

#[test]
fn sampler_errors() -> Result<(), Error> {
    assert_eq!(Sampler::new(&[]), Err(Error::DegenerateDistribution));
    assert_eq!(Sampler::new(&[0.0, 0.0]), Err(Error::DegenerateDistribution));

    let states = [State(0), State(1)];
    let sampler = Sampler::new(&[0.5, 0.5])?;
    assert_eq!(
        sampler.sample(&states, 1.5),
        Err(Error::SampleOutOfRange(1.5))
    );
    assert!(matches!(
        sampler.sample(&states, f64::NAN),
        Err(Error::SampleOutOfRange(_))
    ));
    Ok(())
}
