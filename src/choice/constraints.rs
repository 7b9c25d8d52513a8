//! Constraints attached to each recorded choice.
//!
//! A constraint describes the domain a choice was drawn from, so a replayed
//! value can be checked against it before it is handed back to a strategy.

use super::{ChoiceType, ChoiceValue};

/// Bounds for an integer choice. `None` means unbounded on that side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct IntegerConstraints {
    pub min_value: Option<i128>,
    pub max_value: Option<i128>,
}

impl IntegerConstraints {
    pub fn new(min_value: Option<i128>, max_value: Option<i128>) -> Self {
        Self { min_value, max_value }
    }

    pub fn bounded(min_value: i128, max_value: i128) -> Self {
        Self::new(Some(min_value), Some(max_value))
    }

    /// Whether `min_value <= max_value` when both are present.
    pub fn is_valid(&self) -> bool {
        match (self.min_value, self.max_value) {
            (Some(min), Some(max)) => min <= max,
            _ => true,
        }
    }

    pub fn permits(&self, value: i128) -> bool {
        self.min_value.map_or(true, |min| value >= min)
            && self.max_value.map_or(true, |max| value <= max)
    }
}

/// Probability of `true` for a boolean choice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BooleanConstraints {
    pub p: f64,
}

impl BooleanConstraints {
    pub fn is_valid(&self) -> bool {
        (0.0..=1.0).contains(&self.p)
    }

    /// p=0.0 only permits false and p=1.0 only permits true.
    pub fn permits(&self, value: bool) -> bool {
        if self.p <= 0.0 {
            !value
        } else if self.p >= 1.0 {
            value
        } else {
            true
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Constraints {
    Integer(IntegerConstraints),
    Boolean(BooleanConstraints),
}

impl Constraints {
    pub fn choice_type(&self) -> ChoiceType {
        match self {
            Constraints::Integer(_) => ChoiceType::Integer,
            Constraints::Boolean(_) => ChoiceType::Boolean,
        }
    }

    /// Check whether `value` could have been produced under these constraints.
    pub fn permits(&self, value: &ChoiceValue) -> bool {
        match (self, value) {
            (Constraints::Integer(c), ChoiceValue::Integer(v)) => c.permits(*v),
            (Constraints::Boolean(c), ChoiceValue::Boolean(v)) => c.permits(*v),
            _ => false,
        }
    }
}
