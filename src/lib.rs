//! # Conjecture Strategies
//!
//! Composable strategies and a bounded search engine for Hypothesis-style
//! property-based testing.
//!
//! Strategies are immutable trees built from combinators (`one_of`,
//! `filter`, `flatmap`, `map`, `just`, `sampled_from`) over primitive base
//! strategies. Every draw pulls its randomness from an explicitly passed
//! [`ConjectureData`], so any value can be reproduced from its seed or from
//! its recorded choice sequence.
//!
//! ```rust
//! use conjecture_strategies::{find_any, just, lists, one_of};
//!
//! let element = one_of(vec![just(Some(false)), just(None), just(Some(true))]);
//! let target = vec![None; 100];
//! let strategy = lists(element, 100, Some(100)).unwrap();
//! assert_eq!(find_any(&strategy, |xs| *xs == target).unwrap(), target);
//! ```

pub mod choice;
pub mod data;
pub mod distributions;
pub mod draw;
pub mod engine;
pub mod errors;
pub mod feature_flags;
pub mod primitives;
pub mod strategies;

// Re-export core types for easy access
pub use choice::{ChoiceNode, ChoiceType, ChoiceValue, Constraints};
pub use data::{ConjectureData, DrawConfig, DrawError, Status};
pub use draw::Rejection;
pub use engine::{
    assert_all_examples, assert_all_examples_with, assert_no_examples, assert_no_examples_matching,
    check_can_generate_examples, find_any, find_any_with, minimal, SearchConfig, SearchError,
    SearchOutcome, SearchStats, StrategySearch,
};
pub use errors::InvalidArgument;
pub use feature_flags::FeatureFlags;
pub use primitives::{booleans, integers, integers_from, integers_in, integers_up_to, lists};
pub use strategies::{
    filter, flatmap, just, nothing, one_of, one_of_args, sampled_from, OneOfArg, Primitive, Strategy,
    StrategyKind, Value,
};
