use super::{ChoiceType, ChoiceValue, Constraints};

/// A single recorded choice: what was drawn, under which constraints, and
/// where in the sequence it happened.
#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceNode {
    pub choice_type: ChoiceType,
    pub value: ChoiceValue,
    pub constraints: Constraints,
    pub was_forced: bool,
    pub index: usize,
}

impl ChoiceNode {
    pub fn new(value: ChoiceValue, constraints: Constraints, was_forced: bool, index: usize) -> Self {
        Self {
            choice_type: value.choice_type(),
            value,
            constraints,
            was_forced,
            index,
        }
    }
}
