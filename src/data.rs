//! # ConjectureData: the Random Source
//!
//! `ConjectureData` is the single-owner cursor that every strategy draw pulls
//! its randomness from. It wraps a seeded ChaCha8 generator, records each
//! choice it hands out as a [`ChoiceNode`], and can replay a previously
//! recorded choice sequence so that a draw is reproducible bit-for-bit.
//!
//! ## Lifecycle
//!
//! One `ConjectureData` is created per trial and discarded afterwards. Draws
//! within a trial are strictly sequential (every draw method takes `&mut self`),
//! and two trials never share an instance. Running trials in parallel means
//! giving each one its own independently seeded `ConjectureData`.
//!
//! ## Budget
//!
//! A trial may make at most `max_choices` choices. Exceeding that marks the
//! data as [`Status::Overrun`] and every subsequent draw fails with
//! [`DrawError::Overrun`]; this is what bounds runaway recursive strategies.
//!
//! ## Union feature flags
//!
//! Union strategies decide once per trial which of their branches are
//! enabled (see [`crate::feature_flags`]). Those decisions are stored here,
//! keyed by the union's identity, because the strategy tree itself is
//! immutable and shared between trials.

use crate::choice::{BooleanConstraints, ChoiceNode, ChoiceValue, Constraints, IntegerConstraints};
use crate::feature_flags::FeatureFlags;
use log::trace;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;

/// Bit widths used for integers that are unbounded on at least one side,
/// with their relative weights. Small magnitudes are much more likely.
const INTEGER_SIZES: [(u32, u32); 4] = [(8, 4), (16, 8), (32, 1), (64, 1)];

/// Limits applied to a single trial.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawConfig {
    /// Maximum number of choices one trial may make before overrunning
    pub max_choices: usize,

    /// How many times a filtered strategy redraws before giving up
    pub max_filter_attempts: u32,

    /// Probability that any given union branch is disabled for a trial
    pub branch_disable_probability: f64,
}

impl Default for DrawConfig {
    fn default() -> Self {
        Self {
            max_choices: 8 * 1024,
            max_filter_attempts: 3,
            branch_disable_probability: 0.5,
        }
    }
}

/// Status of a trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Status {
    /// Ran out of choice budget (or replay prefix)
    Overrun = 0,
    /// A replayed choice did not fit the draw that consumed it
    Invalid = 1,
    /// Still drawing, or finished normally
    Valid = 2,
    /// Produced a value the search was looking for
    Interesting = 3,
}

impl Default for Status {
    fn default() -> Self {
        Status::Valid
    }
}

/// Failures of the Random Source itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawError {
    /// Attempted to draw from a frozen ConjectureData
    Frozen,
    /// Invalid range (min > max)
    InvalidRange,
    /// Invalid probability (not in [0, 1])
    InvalidProbability,
    /// Choice budget or replay prefix exhausted
    Overrun,
    /// Empty choice sequence provided to choice()
    EmptyChoice,
    /// Replayed choice has a different type than the draw requested
    TypeMismatch,
    /// Replayed choice is outside the constraints of the draw
    InvalidChoice,
}

impl std::fmt::Display for DrawError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DrawError::Frozen => write!(f, "Cannot draw from frozen ConjectureData"),
            DrawError::InvalidRange => write!(f, "Invalid range: min_value > max_value"),
            DrawError::InvalidProbability => write!(f, "Probability must be between 0.0 and 1.0"),
            DrawError::Overrun => write!(f, "Overran maximum number of choices"),
            DrawError::EmptyChoice => write!(f, "Cannot choose from empty sequence"),
            DrawError::TypeMismatch => write!(f, "Type mismatch during replay"),
            DrawError::InvalidChoice => write!(f, "Replayed choice violates draw constraints"),
        }
    }
}

impl std::error::Error for DrawError {}

/// Seeded, replayable source of choices for one trial.
#[derive(Debug)]
pub struct ConjectureData {
    rng: ChaCha8Rng,
    seed: u64,
    config: DrawConfig,
    choices: Vec<ChoiceNode>,
    prefix: Option<Vec<ChoiceValue>>,
    status: Status,
    frozen: bool,
    feature_flags: HashMap<u64, FeatureFlags>,
}

impl ConjectureData {
    /// Create a fresh Random Source with default limits.
    pub fn new(seed: u64) -> Self {
        Self::with_config(seed, DrawConfig::default())
    }

    pub fn with_config(seed: u64, config: DrawConfig) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
            config,
            choices: Vec::new(),
            prefix: None,
            status: Status::Valid,
            frozen: false,
            feature_flags: HashMap::new(),
        }
    }

    /// Create a Random Source that replays `choices` instead of generating.
    ///
    /// Running out of recorded choices is an overrun, so a replay can never
    /// silently fall back to fresh randomness.
    pub fn for_choices(choices: &[ChoiceValue], config: DrawConfig) -> Self {
        let mut data = Self::with_config(0, config);
        data.prefix = Some(choices.to_vec());
        data
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config(&self) -> &DrawConfig {
        &self.config
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_replay(&self) -> bool {
        self.prefix.is_some()
    }

    /// Number of choices made so far.
    pub fn len(&self) -> usize {
        self.choices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }

    pub fn choices(&self) -> &[ChoiceNode] {
        &self.choices
    }

    /// The recorded choice values, suitable for [`ConjectureData::for_choices`].
    pub fn choice_values(&self) -> Vec<ChoiceValue> {
        self.choices.iter().map(|node| node.value).collect()
    }

    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn mark_interesting(&mut self) {
        self.status = Status::Interesting;
        self.freeze();
    }

    fn mark_overrun(&mut self) {
        self.status = Status::Overrun;
        self.freeze();
    }

    fn mark_invalid(&mut self) {
        self.status = Status::Invalid;
        self.freeze();
    }

    /// Draw an integer in `[min_value, max_value]`; either bound may be absent.
    pub fn draw_integer(
        &mut self,
        min_value: Option<i128>,
        max_value: Option<i128>,
    ) -> Result<i128, DrawError> {
        self.check_can_draw()?;

        let constraints = IntegerConstraints::new(min_value, max_value);
        if !constraints.is_valid() {
            return Err(DrawError::InvalidRange);
        }
        let constraints = Constraints::Integer(constraints);

        let value = match self.next_replayed(&constraints)? {
            Some(ChoiceValue::Integer(value)) => value,
            Some(ChoiceValue::Boolean(_)) => {
                self.mark_invalid();
                return Err(DrawError::TypeMismatch);
            }
            None => self.generate_integer(min_value, max_value),
        };

        let forced = min_value.is_some() && min_value == max_value;
        self.record_choice(ChoiceValue::Integer(value), constraints, forced);
        Ok(value)
    }

    /// Draw a boolean that is `true` with probability `p`.
    pub fn draw_boolean(&mut self, p: f64) -> Result<bool, DrawError> {
        self.check_can_draw()?;

        let constraints = BooleanConstraints { p };
        if p.is_nan() || !constraints.is_valid() {
            return Err(DrawError::InvalidProbability);
        }
        let constraints = Constraints::Boolean(constraints);

        let value = match self.next_replayed(&constraints)? {
            Some(ChoiceValue::Boolean(value)) => value,
            Some(ChoiceValue::Integer(_)) => {
                self.mark_invalid();
                return Err(DrawError::TypeMismatch);
            }
            None if p == 0.0 => false,
            None if p == 1.0 => true,
            None => self.rng.gen::<f64>() < p,
        };

        self.record_choice(ChoiceValue::Boolean(value), constraints, p == 0.0 || p == 1.0);
        Ok(value)
    }

    /// Record a boolean whose value is already decided.
    ///
    /// Forced choices still occupy a slot in the sequence so replay stays
    /// aligned, but the replayed value is ignored.
    pub fn force_boolean(&mut self, value: bool) -> Result<bool, DrawError> {
        self.check_can_draw()?;
        let constraints = Constraints::Boolean(BooleanConstraints { p: if value { 1.0 } else { 0.0 } });
        let prefix_exhausted = self
            .prefix
            .as_ref()
            .map_or(false, |prefix| self.choices.len() >= prefix.len());
        if prefix_exhausted {
            self.mark_overrun();
            return Err(DrawError::Overrun);
        }
        self.record_choice(ChoiceValue::Boolean(value), constraints, true);
        Ok(value)
    }

    /// Pick an index in `0..n` uniformly.
    pub fn choice(&mut self, n: usize) -> Result<usize, DrawError> {
        if n == 0 {
            return Err(DrawError::EmptyChoice);
        }
        let bounds = IntegerConstraints::bounded(0, n as i128 - 1);
        let index = self.draw_integer(bounds.min_value, bounds.max_value)?;
        Ok(index as usize)
    }

    /// Feature flags already decided for the union identified by `id`.
    pub(crate) fn feature_flags(&self, id: u64) -> Option<&FeatureFlags> {
        self.feature_flags.get(&id)
    }

    pub(crate) fn set_feature_flags(&mut self, id: u64, flags: FeatureFlags) {
        self.feature_flags.insert(id, flags);
    }

    fn check_can_draw(&mut self) -> Result<(), DrawError> {
        if self.frozen {
            return Err(match self.status {
                Status::Overrun => DrawError::Overrun,
                _ => DrawError::Frozen,
            });
        }
        if self.choices.len() >= self.config.max_choices {
            trace!("Overrun after {} choices (seed {})", self.choices.len(), self.seed);
            self.mark_overrun();
            return Err(DrawError::Overrun);
        }
        Ok(())
    }

    /// Next value from the replay prefix, if replaying.
    fn next_replayed(&mut self, constraints: &Constraints) -> Result<Option<ChoiceValue>, DrawError> {
        let index = self.choices.len();
        let replayed = match &self.prefix {
            None => return Ok(None),
            Some(prefix) => prefix.get(index).copied(),
        };

        match replayed {
            None => {
                self.mark_overrun();
                Err(DrawError::Overrun)
            }
            Some(value) if value.choice_type() != constraints.choice_type() => Ok(Some(value)),
            Some(value) if !constraints.permits(&value) => {
                self.mark_invalid();
                Err(DrawError::InvalidChoice)
            }
            Some(value) => Ok(Some(value)),
        }
    }

    fn generate_integer(&mut self, min_value: Option<i128>, max_value: Option<i128>) -> i128 {
        match (min_value, max_value) {
            (Some(min), Some(max)) => self.rng.gen_range(min..=max),
            (Some(min), None) => min.saturating_add(self.unbounded_magnitude()),
            (None, Some(max)) => max.saturating_sub(self.unbounded_magnitude()),
            (None, None) => {
                let bits = self.draw_bit_width();
                let bound = 1i128 << (bits - 1);
                self.rng.gen_range(-bound..bound)
            }
        }
    }

    fn unbounded_magnitude(&mut self) -> i128 {
        let bits = self.draw_bit_width();
        self.rng.gen_range(0..(1i128 << (bits - 1)))
    }

    fn draw_bit_width(&mut self) -> u32 {
        let total: u32 = INTEGER_SIZES.iter().map(|(_, weight)| weight).sum();
        let mut pick = self.rng.gen_range(0..total);
        for (bits, weight) in INTEGER_SIZES {
            if pick < weight {
                return bits;
            }
            pick -= weight;
        }
        64
    }

    fn record_choice(&mut self, value: ChoiceValue, constraints: Constraints, was_forced: bool) {
        let index = self.choices.len();
        self.choices.push(ChoiceNode::new(value, constraints, was_forced, index));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_choices() {
        let mut a = ConjectureData::new(7);
        let mut b = ConjectureData::new(7);
        for _ in 0..50 {
            assert_eq!(a.draw_integer(None, None), b.draw_integer(None, None));
            assert_eq!(a.draw_boolean(0.3), b.draw_boolean(0.3));
        }
        assert_eq!(a.choice_values(), b.choice_values());
    }

    #[test]
    fn test_bounded_integers_stay_in_range() {
        let mut data = ConjectureData::new(1);
        for _ in 0..500 {
            let v = data.draw_integer(Some(-3), Some(3)).unwrap();
            assert!((-3..=3).contains(&v));
        }
    }

    #[test]
    fn test_half_bounded_integers_respect_the_bound() {
        let mut data = ConjectureData::new(2);
        for _ in 0..500 {
            assert!(data.draw_integer(Some(100), None).unwrap() >= 100);
            assert!(data.draw_integer(None, Some(-5)).unwrap() <= -5);
        }
    }

    #[test]
    fn test_unbounded_integers_fit_in_i64() {
        let mut data = ConjectureData::new(3);
        for _ in 0..2000 {
            let v = data.draw_integer(None, None).unwrap();
            assert!(v >= i64::MIN as i128 && v <= i64::MAX as i128);
        }
    }

    #[test]
    fn test_invalid_range_is_rejected() {
        let mut data = ConjectureData::new(0);
        assert_eq!(data.draw_integer(Some(5), Some(4)), Err(DrawError::InvalidRange));
        assert!(data.is_empty());
    }

    #[test]
    fn test_invalid_probability_is_rejected() {
        let mut data = ConjectureData::new(0);
        assert_eq!(data.draw_boolean(1.5), Err(DrawError::InvalidProbability));
        assert_eq!(data.draw_boolean(f64::NAN), Err(DrawError::InvalidProbability));
    }

    #[test]
    fn test_deterministic_probabilities_are_forced() {
        let mut data = ConjectureData::new(0);
        assert_eq!(data.draw_boolean(0.0), Ok(false));
        assert_eq!(data.draw_boolean(1.0), Ok(true));
        assert!(data.choices().iter().all(|node| node.was_forced));
    }

    #[test]
    fn test_overrun_after_max_choices() {
        let config = DrawConfig { max_choices: 3, ..DrawConfig::default() };
        let mut data = ConjectureData::with_config(0, config);
        for _ in 0..3 {
            data.draw_boolean(0.5).unwrap();
        }
        assert_eq!(data.draw_boolean(0.5), Err(DrawError::Overrun));
        assert_eq!(data.status(), Status::Overrun);
        assert_eq!(data.draw_integer(None, None), Err(DrawError::Overrun));
    }

    #[test]
    fn test_replay_reproduces_recorded_choices() {
        let mut original = ConjectureData::new(99);
        let drawn: Vec<i128> = (0..10).map(|_| original.draw_integer(Some(0), Some(1000)).unwrap()).collect();
        let flag = original.draw_boolean(0.5).unwrap();

        let mut replay = ConjectureData::for_choices(&original.choice_values(), DrawConfig::default());
        assert!(replay.is_replay());
        let replayed: Vec<i128> = (0..10).map(|_| replay.draw_integer(Some(0), Some(1000)).unwrap()).collect();
        assert_eq!(drawn, replayed);
        assert_eq!(replay.draw_boolean(0.5), Ok(flag));
    }

    #[test]
    fn test_replay_past_prefix_overruns() {
        let mut data = ConjectureData::for_choices(&[ChoiceValue::Boolean(true)], DrawConfig::default());
        assert_eq!(data.draw_boolean(0.5), Ok(true));
        assert_eq!(data.draw_boolean(0.5), Err(DrawError::Overrun));
        assert_eq!(data.status(), Status::Overrun);
    }

    #[test]
    fn test_replay_type_mismatch_is_invalid() {
        let mut data = ConjectureData::for_choices(&[ChoiceValue::Boolean(true)], DrawConfig::default());
        assert_eq!(data.draw_integer(Some(0), Some(3)), Err(DrawError::TypeMismatch));
        assert_eq!(data.status(), Status::Invalid);
    }

    #[test]
    fn test_replay_out_of_bounds_is_invalid() {
        let mut data = ConjectureData::for_choices(&[ChoiceValue::Integer(50)], DrawConfig::default());
        assert_eq!(data.draw_integer(Some(0), Some(3)), Err(DrawError::InvalidChoice));
        assert_eq!(data.status(), Status::Invalid);
    }

    #[test]
    fn test_choice_from_empty_sequence() {
        let mut data = ConjectureData::new(0);
        assert_eq!(data.choice(0), Err(DrawError::EmptyChoice));
        assert_eq!(data.choice(1), Ok(0));
    }

    #[test]
    fn test_frozen_data_refuses_draws() {
        let mut data = ConjectureData::new(0);
        data.mark_interesting();
        assert_eq!(data.status(), Status::Interesting);
        assert_eq!(data.draw_boolean(0.5), Err(DrawError::Frozen));
    }
}
