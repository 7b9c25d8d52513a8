//! Choice system for the strategy engine
//!
//! Every piece of randomness a strategy consumes flows through a typed choice
//! with associated constraints. Recording those choices is what makes a draw
//! replayable: feeding the same sequence back produces the same value.

mod constraints;
mod node;

pub use self::constraints::*;
pub use self::node::*;

use std::fmt;

/// Choice types that can be drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChoiceType {
    Integer,
    Boolean,
}

impl fmt::Display for ChoiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChoiceType::Integer => write!(f, "integer"),
            ChoiceType::Boolean => write!(f, "boolean"),
        }
    }
}

/// A single drawn value, tagged by its choice type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChoiceValue {
    Integer(i128),
    Boolean(bool),
}

impl ChoiceValue {
    pub fn choice_type(&self) -> ChoiceType {
        match self {
            ChoiceValue::Integer(_) => ChoiceType::Integer,
            ChoiceValue::Boolean(_) => ChoiceType::Boolean,
        }
    }
}

impl fmt::Display for ChoiceValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChoiceValue::Integer(i) => write!(f, "{}", i),
            ChoiceValue::Boolean(b) => write!(f, "{}", b),
        }
    }
}
