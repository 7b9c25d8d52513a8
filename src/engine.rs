//! StrategySearch - bounded randomized search over a strategy
//!
//! The search engine repeatedly draws from a strategy, one fresh
//! `ConjectureData` per trial, and evaluates a goal on every value produced.
//! Every search has a finite trial budget and terminates deterministically
//! once it is spent. Rejected draws (empty branches, exhausted filters,
//! overruns) count against the budget but never abort the search.
//!
//! The free functions at the bottom of this module are the entry points
//! test code uses: [`find_any`], [`assert_no_examples`],
//! [`assert_all_examples`], [`check_can_generate_examples`] and [`minimal`].

use crate::choice::ChoiceValue;
use crate::data::{ConjectureData, DrawConfig};
use crate::draw::Rejection;
use crate::strategies::{Strategy, Value};
use log::{debug, trace, warn};
use thiserror::Error;

/// Configuration for a search
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    /// Maximum number of trials (the search budget)
    pub max_examples: u32,

    /// How many times a filtered strategy redraws before the trial is rejected
    pub max_filter_attempts: u32,

    /// Maximum number of choices a single trial may make
    pub max_choices: usize,

    /// Base seed; trial `i` is seeded with `seed + i`
    pub seed: u64,

    /// Probability that a union branch is disabled for a trial
    pub branch_disable_probability: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        let draw = DrawConfig::default();
        Self {
            max_examples: 100,
            max_filter_attempts: draw.max_filter_attempts,
            max_choices: draw.max_choices,
            seed: 0,
            branch_disable_probability: draw.branch_disable_probability,
        }
    }
}

impl SearchConfig {
    /// Budget used by [`find_any`] and [`minimal`], where positive examples
    /// may be rare.
    pub fn for_find() -> Self {
        Self { max_examples: 10_000, ..Self::default() }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_max_examples(mut self, max_examples: u32) -> Self {
        self.max_examples = max_examples;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.max_examples == 0 {
            return Err("max_examples must be at least 1".to_string());
        }
        if self.max_filter_attempts == 0 {
            return Err("max_filter_attempts must be at least 1".to_string());
        }
        if self.max_choices == 0 {
            return Err("max_choices must be at least 1".to_string());
        }
        if !(0.0..1.0).contains(&self.branch_disable_probability) {
            return Err(format!(
                "branch_disable_probability={} must be in [0, 1)",
                self.branch_disable_probability
            ));
        }
        Ok(())
    }

    pub fn draw_config(&self) -> DrawConfig {
        DrawConfig {
            max_choices: self.max_choices,
            max_filter_attempts: self.max_filter_attempts,
            branch_disable_probability: self.branch_disable_probability,
        }
    }
}

/// Statistics about a search
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchStats {
    /// Trials started
    pub attempts: u32,

    /// Trials that produced a value
    pub valid: u32,

    /// Trials rejected because the strategy reached an empty domain
    pub rejected_empty: u32,

    /// Trials rejected by an exhausted filter
    pub rejected_filter: u32,

    /// Trials that ran out of choices
    pub overruns: u32,

    /// Trials rejected by the Random Source itself
    pub invalid: u32,

    /// Choices of the trial that ended the search, for replay
    pub last_choices: Option<Vec<ChoiceValue>>,
}

/// Result of a search
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome<T> {
    Found(T),
    Exhausted,
    InvalidConfiguration(String),
}

/// Failures reported to the caller of a search helper.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("Could not find any examples satisfying the condition in {attempts} attempts ({valid} valid)")]
    Exhausted { attempts: u32, valid: u32 },

    #[error("Unable to satisfy assumptions: no valid examples in {attempts} attempts")]
    Unsatisfiable { attempts: u32 },

    #[error("Expected no examples but found {value}")]
    CounterExample { value: String },

    #[error("Invalid search configuration: {0}")]
    InvalidConfiguration(String),
}

enum Verdict {
    Continue,
    Stop,
}

/// Bounded search over one strategy.
pub struct StrategySearch<T> {
    strategy: Strategy<T>,
    config: SearchConfig,
    stats: SearchStats,
}

impl<T: Value> StrategySearch<T> {
    pub fn new(strategy: Strategy<T>, config: SearchConfig) -> Self {
        Self { strategy, config, stats: SearchStats::default() }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Draw until `predicate` holds for a value or the budget runs out.
    pub fn find<F>(&mut self, predicate: F) -> SearchOutcome<T>
    where
        F: Fn(&T) -> bool,
    {
        let mut found = None;
        let result = self.run_trials(|value, data| {
            if predicate(&value) {
                data.mark_interesting();
                found = Some(value);
                Verdict::Stop
            } else {
                Verdict::Continue
            }
        });

        match (result, found) {
            (Err(message), _) => SearchOutcome::InvalidConfiguration(message),
            (Ok(()), Some(value)) => SearchOutcome::Found(value),
            (Ok(()), None) => SearchOutcome::Exhausted,
        }
    }

    /// Among all satisfying values in the budget, the one drawn with the
    /// fewest choices. Earliest wins ties.
    pub fn find_simplest<F>(&mut self, predicate: F) -> SearchOutcome<T>
    where
        F: Fn(&T) -> bool,
    {
        let mut best: Option<(usize, T, Vec<ChoiceValue>)> = None;
        let result = self.run_trials(|value, data| {
            if predicate(&value) && best.as_ref().map_or(true, |(size, _, _)| data.len() < *size) {
                best = Some((data.len(), value, data.choice_values()));
            }
            Verdict::Continue
        });

        if let Err(message) = result {
            return SearchOutcome::InvalidConfiguration(message);
        }
        match best {
            Some((_, value, choices)) => {
                self.stats.last_choices = Some(choices);
                SearchOutcome::Found(value)
            }
            None => SearchOutcome::Exhausted,
        }
    }

    /// Redraw the value recorded by `choices`.
    pub fn replay(&self, choices: &[ChoiceValue]) -> Result<T, Rejection> {
        let mut data = ConjectureData::for_choices(choices, self.config.draw_config());
        self.strategy.draw(&mut data)
    }

    fn run_trials<F>(&mut self, mut visit: F) -> Result<(), String>
    where
        F: FnMut(T, &mut ConjectureData) -> Verdict,
    {
        self.config.validate()?;
        self.stats = SearchStats::default();

        debug!(
            "Starting search over {:?} with budget {} (seed {})",
            self.strategy, self.config.max_examples, self.config.seed
        );

        if self.strategy.is_empty() {
            debug!("Strategy is empty, nothing to search");
            return Ok(());
        }

        let draw_config = self.config.draw_config();
        for trial in 0..self.config.max_examples {
            let seed = self.config.seed.wrapping_add(u64::from(trial));
            let mut data = ConjectureData::with_config(seed, draw_config.clone());
            self.stats.attempts += 1;

            match self.strategy.draw(&mut data) {
                Ok(value) => {
                    self.stats.valid += 1;
                    if let Verdict::Stop = visit(value, &mut data) {
                        self.stats.last_choices = Some(data.choice_values());
                        debug!("Search stopped at trial {} after {} valid draws", trial, self.stats.valid);
                        return Ok(());
                    }
                }
                Err(rejection) => {
                    trace!("Trial {} rejected: {}", trial, rejection);
                    match rejection {
                        Rejection::EmptyDomain => self.stats.rejected_empty += 1,
                        Rejection::FilterExhausted { .. } => self.stats.rejected_filter += 1,
                        Rejection::Overrun => self.stats.overruns += 1,
                        Rejection::Invalid(_) => self.stats.invalid += 1,
                    }
                }
            }
        }

        if self.stats.valid == 0 {
            warn!(
                "{:?} produced no valid examples in {} attempts",
                self.strategy, self.stats.attempts
            );
        }
        debug!("Search finished: {:?}", self.stats);
        Ok(())
    }
}

/// Find a value drawn from `strategy` that satisfies `predicate`.
pub fn find_any<T, F>(strategy: &Strategy<T>, predicate: F) -> Result<T, SearchError>
where
    T: Value,
    F: Fn(&T) -> bool,
{
    find_any_with(strategy, predicate, SearchConfig::for_find())
}

pub fn find_any_with<T, F>(strategy: &Strategy<T>, predicate: F, config: SearchConfig) -> Result<T, SearchError>
where
    T: Value,
    F: Fn(&T) -> bool,
{
    let mut search = StrategySearch::new(strategy.clone(), config);
    let outcome = search.find(predicate);
    into_found(outcome, search.stats())
}

/// Succeeds iff no value is drawn from `strategy` within the budget.
pub fn assert_no_examples<T: Value>(strategy: &Strategy<T>) -> Result<(), SearchError> {
    assert_no_examples_matching(strategy, |_| true, SearchConfig::default())
}

/// Succeeds iff no drawn value satisfies `condition` within the budget.
pub fn assert_no_examples_matching<T, F>(
    strategy: &Strategy<T>,
    condition: F,
    config: SearchConfig,
) -> Result<(), SearchError>
where
    T: Value,
    F: Fn(&T) -> bool,
{
    let mut search = StrategySearch::new(strategy.clone(), config);
    match search.find(condition) {
        SearchOutcome::Found(value) => Err(SearchError::CounterExample { value: format!("{:?}", value) }),
        SearchOutcome::Exhausted => Ok(()),
        SearchOutcome::InvalidConfiguration(message) => Err(SearchError::InvalidConfiguration(message)),
    }
}

/// Succeeds iff every value drawn within the budget satisfies `predicate`.
///
/// A strategy that never produces a value is unsatisfiable, not a pass.
pub fn assert_all_examples<T, F>(strategy: &Strategy<T>, predicate: F) -> Result<(), SearchError>
where
    T: Value,
    F: Fn(&T) -> bool,
{
    assert_all_examples_with(strategy, predicate, SearchConfig::default())
}

pub fn assert_all_examples_with<T, F>(
    strategy: &Strategy<T>,
    predicate: F,
    config: SearchConfig,
) -> Result<(), SearchError>
where
    T: Value,
    F: Fn(&T) -> bool,
{
    let mut search = StrategySearch::new(strategy.clone(), config);
    match search.find(|value| !predicate(value)) {
        SearchOutcome::Found(value) => Err(SearchError::CounterExample { value: format!("{:?}", value) }),
        SearchOutcome::Exhausted if search.stats().valid == 0 => {
            Err(SearchError::Unsatisfiable { attempts: search.stats().attempts })
        }
        SearchOutcome::Exhausted => Ok(()),
        SearchOutcome::InvalidConfiguration(message) => Err(SearchError::InvalidConfiguration(message)),
    }
}

/// Succeeds iff `strategy` can produce at least one value.
pub fn check_can_generate_examples<T: Value>(strategy: &Strategy<T>) -> Result<(), SearchError> {
    find_any_with(strategy, |_| true, SearchConfig::default()).map(|_| ())
}

/// The satisfying value with the fewest recorded choices within the budget.
pub fn minimal<T, F>(strategy: &Strategy<T>, predicate: F) -> Result<T, SearchError>
where
    T: Value,
    F: Fn(&T) -> bool,
{
    let mut search = StrategySearch::new(strategy.clone(), SearchConfig::for_find());
    let outcome = search.find_simplest(predicate);
    into_found(outcome, search.stats())
}

fn into_found<T>(outcome: SearchOutcome<T>, stats: &SearchStats) -> Result<T, SearchError> {
    match outcome {
        SearchOutcome::Found(value) => Ok(value),
        SearchOutcome::Exhausted if stats.valid == 0 => {
            Err(SearchError::Unsatisfiable { attempts: stats.attempts })
        }
        SearchOutcome::Exhausted => Err(SearchError::Exhausted { attempts: stats.attempts, valid: stats.valid }),
        SearchOutcome::InvalidConfiguration(message) => Err(SearchError::InvalidConfiguration(message)),
    }
}
