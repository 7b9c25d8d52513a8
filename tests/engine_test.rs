//! # Search engine test suite
//!
//! Budget accounting, configuration validation, replay, and seed-swept
//! invariants of the draw engine.

use conjecture_strategies::{
    assert_all_examples_with, assert_no_examples_matching, booleans, find_any_with, integers,
    integers_in, just, lists, minimal, nothing, one_of, sampled_from, ConjectureData, DrawConfig,
    Rejection, SearchConfig, SearchError, SearchOutcome, StrategySearch,
};
use proptest::prelude::*;
use std::sync::Arc;
use std::thread;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Test helper to create a small, deterministic configuration
fn minimal_config() -> SearchConfig {
    SearchConfig {
        max_examples: 50,
        max_filter_attempts: 3,
        max_choices: 1024,
        seed: 42,
        branch_disable_probability: 0.5,
    }
}

#[test]
fn test_search_is_deterministic_for_a_seed() {
    init_logging();
    let s = lists(integers(), 0, Some(10)).unwrap();
    let mut first = StrategySearch::new(s.clone(), minimal_config());
    let mut second = StrategySearch::new(s, minimal_config());
    assert_eq!(first.find(|xs| xs.len() > 3), second.find(|xs| xs.len() > 3));
    assert_eq!(first.stats(), second.stats());
}

#[test]
fn test_budget_is_respected() {
    init_logging();
    let mut search = StrategySearch::new(integers_in(0, 10).unwrap(), minimal_config());
    assert_eq!(search.find(|&x| x > 10), SearchOutcome::Exhausted);
    assert_eq!(search.stats().attempts, 50);
    assert_eq!(search.stats().valid, 50);
}

#[test]
fn test_overruns_are_counted_not_fatal() {
    let config = SearchConfig { max_choices: 5, ..minimal_config() };
    let s = lists(booleans(), 20, Some(20)).unwrap();
    let mut search = StrategySearch::new(s, config);
    assert_eq!(search.find(|_| true), SearchOutcome::Exhausted);
    assert_eq!(search.stats().overruns, 50);
}

#[test]
fn test_assert_no_examples_matching_finds_counterexample() {
    let result = assert_no_examples_matching(&integers_in(0, 3).unwrap(), |&x| x == 2, minimal_config());
    assert_eq!(result, Err(SearchError::CounterExample { value: "2".to_string() }));
}

#[test]
fn test_assert_all_examples_on_empty_strategy_is_unsatisfiable() {
    let result = assert_all_examples_with(&nothing::<i64>(), |_| true, minimal_config());
    assert_eq!(result, Err(SearchError::Unsatisfiable { attempts: 0 }));
}

#[test]
fn test_filter_exhaustion_is_unsatisfiable_not_a_crash() {
    let s = integers().filter(|_| false);
    assert_eq!(
        find_any_with(&s, |_| true, minimal_config()),
        Err(SearchError::Unsatisfiable { attempts: 50 })
    );
}

#[test]
fn test_minimal_picks_the_cheapest_example() {
    let s = lists(booleans(), 0, Some(5)).unwrap();
    assert_eq!(minimal(&s, |_| true), Ok(Vec::new()));
}

#[test]
fn test_found_example_replays_exactly() {
    let s = one_of(vec![
        lists(integers(), 1, Some(4)).unwrap(),
        just(vec![0, 0, 0]),
    ]);
    let mut search = StrategySearch::new(s, SearchConfig::for_find());
    let found = match search.find(|xs| xs.iter().map(|&x| i128::from(x)).sum::<i128>() > 100) {
        SearchOutcome::Found(value) => value,
        other => panic!("expected a value, got {:?}", other),
    };
    let choices = search.stats().last_choices.clone().unwrap();
    assert_eq!(search.replay(&choices), Ok(found));
    assert_eq!(search.replay(&choices[..choices.len() - 1]), Err(Rejection::Overrun));
}

#[test]
fn test_parallel_trials_share_one_strategy() {
    let s = Arc::new(one_of(vec![integers_in(0, 9).unwrap(), just(-1)]));
    let handles: Vec<_> = (0..4u64)
        .map(|worker| {
            let s = Arc::clone(&s);
            thread::spawn(move || {
                (0..100u64)
                    .map(|trial| {
                        let mut data = ConjectureData::new(worker * 1_000 + trial);
                        s.draw(&mut data).unwrap()
                    })
                    .collect::<Vec<i64>>()
            })
        })
        .collect();
    for handle in handles {
        let values = handle.join().unwrap();
        assert!(values.iter().all(|&x| (-1..=9).contains(&x)));
    }
}

proptest! {
    #[test]
    fn filtered_union_only_yields_accepted_values(seed in any::<u64>()) {
        let s = one_of(vec![integers().filter(|&i| i % 3 == 0), just(9)]);
        let mut data = ConjectureData::new(seed);
        if let Ok(value) = s.draw(&mut data) {
            prop_assert_eq!(value % 3, 0);
        }
    }

    #[test]
    fn flatmap_from_constant_stays_above_it(seed in any::<u64>(), base in -1000i64..1000) {
        let s = just(base).flatmap(conjecture_strategies::integers_from);
        let mut data = ConjectureData::new(seed);
        prop_assert!(s.draw(&mut data).unwrap() >= base);
    }

    #[test]
    fn replay_is_deterministic(seed in any::<u64>()) {
        let s = lists(sampled_from(vec!['x', 'y', 'z']).unwrap(), 0, Some(20)).unwrap();
        let mut data = ConjectureData::new(seed);
        if let Ok(value) = s.draw(&mut data) {
            let mut replay = ConjectureData::for_choices(&data.choice_values(), DrawConfig::default());
            prop_assert_eq!(s.draw(&mut replay), Ok(value));
        }
    }
}
