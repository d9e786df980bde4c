use std::time::Duration;

use indexmap::IndexMap;

use tableausat::formula::{Formula, parse_formula};
use tableausat::generate::{alternating, and_chain, backtrack_ladder};
use tableausat::store::{BindingStore, ConsList};
use tableausat::tableau::{Goals, Outcome, SolveError, SolveOptions, Tableau, solve, solve_goals};

fn v(name: &str) -> String {
    name.to_string()
}

fn model_of(outcome: &Outcome<String>) -> IndexMap<String, bool> {
    outcome
        .assignment()
        .expect("expected a model")
        .as_map()
        .clone()
}

fn map(pairs: &[(&str, bool)]) -> IndexMap<String, bool> {
    pairs.iter().map(|&(k, b)| (k.to_string(), b)).collect()
}

#[test]
fn repeated_literal_is_satisfiable() {
    let f = Formula::and(Formula::pos(v("a")), Formula::pos(v("a")));
    assert_eq!(model_of(&solve(&f)), map(&[("a", true)]));
}

#[test]
fn complementary_literals_are_unsat() {
    let f = Formula::and(Formula::pos(v("x")), Formula::neg(v("x")));
    assert_eq!(solve(&f), Outcome::Unsatisfiable);
}

#[test]
fn left_branch_of_or_wins_when_consistent() {
    // (a || !b) && b
    let f = Formula::and(
        Formula::or(Formula::pos(v("a")), Formula::neg(v("b"))),
        Formula::pos(v("b")),
    );
    let model = model_of(&solve(&f));
    assert_eq!(model, map(&[("a", true), ("b", true)]));
}

#[test]
fn first_satisfiable_disjunct_is_reported() {
    // (!x && y) || (x && y)
    let f = Formula::or(
        Formula::and(Formula::neg(v("x")), Formula::pos(v("y"))),
        Formula::and(Formula::pos(v("x")), Formula::pos(v("y"))),
    );
    assert_eq!(model_of(&solve(&f)), map(&[("x", false), ("y", true)]));
}

#[test]
fn right_branch_starts_from_pre_branch_store() {
    // the left branch binds a=true before closing on b; the right branch
    // must not see that binding
    let f = parse_formula("(a && b && !b) || !a").expect("parse");
    assert_eq!(model_of(&solve(&f)), map(&[("a", false)]));
}

#[test]
fn tail_goals_are_checked_against_each_branch() {
    // left disjunct a conflicts with the later !a, so the right one is used
    let f = parse_formula("(a || c) && !a").expect("parse");
    assert_eq!(model_of(&solve(&f)), map(&[("c", true), ("a", false)]));
}

#[test]
fn unmentioned_branch_variables_stay_unbound() {
    let f = parse_formula("a || (b && c)").expect("parse");
    let outcome = solve(&f);
    let model = outcome.assignment().expect("sat");
    assert!(model.contains(&v("a")));
    assert!(!model.contains(&v("b")));
    assert!(!model.contains(&v("c")));
}

#[test]
fn original_curated_cases() {
    let sat = ["(a || !b) && b", "(x || !y) && (!y || z)"];
    for src in sat {
        let f = parse_formula(src).expect("parse");
        assert!(solve(&f).is_sat(), "expected sat: {}", f);
    }
    let f = parse_formula("x && !x").expect("parse");
    assert!(!solve(&f).is_sat(), "expected unsat: {}", f);
}

#[test]
fn solving_twice_gives_identical_result() {
    let f = parse_formula("(a || b) && (!a || c) && (!c || !b)").expect("parse");
    let first = solve(&f);
    let second = solve(&f);
    assert_eq!(first, second);
    let order1 = model_of(&first).into_iter().collect::<Vec<_>>();
    let order2 = model_of(&second).into_iter().collect::<Vec<_>>();
    assert_eq!(order1, order2);
    assert_eq!(order1, vec![(v("a"), true), (v("c"), true), (v("b"), false)]);
}

#[test]
fn deep_nesting_terminates() {
    let f = alternating(20);
    assert_eq!(f.depth(), 21);
    let outcome = solve(&f);
    assert!(outcome.is_sat());
    assert!(outcome.assignment().expect("sat").get(&v("x1")));

    let chain = and_chain(20);
    let model = model_of(&solve(&chain));
    assert_eq!(model.len(), 20);
    assert!(model.values().all(|&b| b));
}

#[test]
fn exhaustive_backtracking_still_closes() {
    let f = backtrack_ladder(8);
    let mut tableau = Tableau::new(SolveOptions::default());
    let outcome = tableau.solve(&f).expect("unbounded");
    assert_eq!(outcome, Outcome::Unsatisfiable);
    let stats = tableau.stats();
    // every one of the 2^8 leaves reaches the z && !z conflict
    assert_eq!(stats.conflicts, 256);
    assert_eq!(stats.branches, 255);
}

#[test]
fn depth_limit_aborts_instead_of_reporting_unsat() {
    let f = and_chain(30);
    let mut tableau = Tableau::new(SolveOptions {
        max_depth: Some(10),
        timeout: None,
    });
    let err = tableau.solve(&f).expect_err("limit");
    assert_eq!(err, SolveError::DepthLimit { limit: 10 });
    assert_eq!(tableau.stats().max_depth, 11);
}

#[test]
fn zero_timeout_aborts_immediately() {
    let f = backtrack_ladder(4);
    let mut tableau = Tableau::new(SolveOptions {
        max_depth: None,
        timeout: Some(Duration::ZERO),
    });
    match tableau.solve(&f) {
        Err(SolveError::Timeout { .. }) => {}
        other => panic!("expected timeout, got {:?}", other),
    }
    assert_eq!(tableau.stats().steps, 1);
}

#[test]
fn generous_limits_match_unbounded_result() {
    let f = parse_formula("(p && (!q || r)) || q").expect("parse");
    let mut tableau = Tableau::new(SolveOptions {
        max_depth: Some(64),
        timeout: Some(Duration::from_secs(5)),
    });
    let bounded = tableau.solve(&f).expect("within limits");
    assert_eq!(bounded, solve(&f));
    assert_eq!(model_of(&bounded), map(&[("p", true), ("q", false)]));
}

#[test]
fn solve_goals_respects_seeded_store() {
    let f = parse_formula("a || b").expect("parse");
    let goals: Goals<'_, String> = ConsList::singleton(&f);
    let seeded = BindingStore::new().add(v("a"), false);
    let done = solve_goals(&goals, &seeded).expect("sat");
    assert!(!done.get(&v("a")));
    assert!(done.get(&v("b")));

    let empty: Goals<'_, String> = ConsList::new();
    let same = solve_goals(&empty, &seeded).expect("nothing to do");
    assert_eq!(same.len(), 1);
}
