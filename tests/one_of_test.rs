//! # Union strategy tests
//!
//! Ported from Hypothesis's `test_one_of.py`: emptiness, filtered and
//! flatmapped branches, single-strategy identity, the literal-arguments
//! error message, and the all-one-branch corner case that uniform branch
//! selection can never reach.

use conjecture_strategies::{
    assert_all_examples, assert_no_examples, find_any, integers, integers_from, just, lists, one_of,
    one_of_args, InvalidArgument, OneOfArg, SearchConfig, SearchOutcome, Strategy, StrategySearch,
};

#[test]
fn test_one_of_empty() {
    let e: Strategy<i64> = conjecture_strategies::one_of!();
    assert!(e.is_empty());
    assert_eq!(assert_no_examples(&e), Ok(()));
}

#[test]
fn test_one_of_filtered() {
    let s = one_of(vec![integers().filter(|&i| i != 0)]);
    assert_eq!(assert_all_examples(&s, |&i| i != 0), Ok(()));

    let outer = one_of(vec![integers()]).filter(|&i| i != 0);
    assert_eq!(assert_all_examples(&outer, |&i| i != 0), Ok(()));
}

#[test]
fn test_one_of_flatmapped() {
    let s = one_of(vec![just(100).flatmap(integers_from)]);
    assert_eq!(assert_all_examples(&s, |&i| i >= 100), Ok(()));
}

#[test]
fn test_one_of_single_strategy_is_noop() {
    let s = integers();
    assert!(conjecture_strategies::one_of!(s.clone()).ptr_eq(&s));
    assert!(one_of(vec![s.clone()]).ptr_eq(&s));
}

#[test]
fn test_one_of_without_strategies_suggests_sampled_from() {
    let err = one_of_args(vec![OneOfArg::Literal(1), OneOfArg::Literal(2), OneOfArg::Literal(3)])
        .unwrap_err();
    assert!(matches!(err, InvalidArgument::LiteralsInOneOf { .. }));
    assert!(err.to_string().contains("Did you mean st.sampled_from([1, 2, 3])?"));
}

#[test]
fn test_one_of_single_literal_suggests_sampled_from() {
    let err = one_of_args::<i64, _>(vec![OneOfArg::Literal(1)]).unwrap_err();
    assert!(err.to_string().contains("sampled_from([1])"));
}

#[test]
fn test_one_of_never_satisfied_filter_has_no_examples() {
    let s = one_of(vec![integers().filter(|_| false)]);
    assert!(!s.is_empty());
    assert_eq!(assert_no_examples(&s), Ok(()));
}

#[test]
fn test_one_of_extreme_corner_case() {
    // Drawing None 100 times in a row has probability 1/3^100 if each draw
    // picks a branch uniformly, but about 1/8 per trial with per-branch toggles.
    let test_size = 100;
    let target: Vec<Option<bool>> = vec![None; test_size];
    let element = conjecture_strategies::one_of!(just(Some(false)), just(None), just(Some(true)));
    let s = lists(element, test_size, Some(test_size)).unwrap();
    assert_eq!(find_any(&s, |xs| *xs == target), Ok(target.clone()));
}

#[test]
fn test_corner_case_is_found_well_inside_the_budget() {
    let target: Vec<Option<bool>> = vec![None; 100];
    let element = one_of(vec![just(Some(false)), just(None), just(Some(true))]);
    let s = lists(element, 100, Some(100)).unwrap();
    for seed in [0, 1_000, 77_777] {
        let mut search = StrategySearch::new(s.clone(), SearchConfig::for_find().with_seed(seed));
        assert_eq!(search.find(|xs| *xs == target), SearchOutcome::Found(target.clone()));
        assert!(search.stats().attempts < 500, "took {} attempts", search.stats().attempts);
    }
}

#[test]
fn test_every_branch_is_reachable_from_a_wide_union() {
    let branches: Vec<Strategy<u32>> = (0..12).map(just).collect();
    let s = one_of(branches);
    for n in 0..12 {
        assert_eq!(find_any(&s, |&x| x == n), Ok(n));
    }
}
