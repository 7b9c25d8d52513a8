//! Base strategies: integers, booleans and lists.

use crate::data::ConjectureData;
use crate::distributions::Repeat;
use crate::draw::Rejection;
use crate::errors::InvalidArgument;
use crate::strategies::{Primitive, Strategy, Value};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntegersStrategy {
    min_value: Option<i64>,
    max_value: Option<i64>,
}

impl Primitive<i64> for IntegersStrategy {
    fn draw(&self, data: &mut ConjectureData) -> Result<i64, Rejection> {
        let value = data.draw_integer(self.min_value.map(i128::from), self.max_value.map(i128::from))?;
        // Half-bounded draws may land outside i64; the bound that exists still holds.
        Ok(value.clamp(i64::MIN as i128, i64::MAX as i128) as i64)
    }

    fn describe(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.min_value, self.max_value) {
            (None, None) => write!(f, "integers()"),
            (Some(min), None) => write!(f, "integers(min_value={})", min),
            (None, Some(max)) => write!(f, "integers(max_value={})", max),
            (Some(min), Some(max)) => write!(f, "integers(min_value={}, max_value={})", min, max),
        }
    }
}

/// Any `i64`, biased towards small magnitudes.
pub fn integers() -> Strategy<i64> {
    Strategy::from_primitive(IntegersStrategy { min_value: None, max_value: None })
}

/// Integers `>= min_value`.
pub fn integers_from(min_value: i64) -> Strategy<i64> {
    Strategy::from_primitive(IntegersStrategy { min_value: Some(min_value), max_value: None })
}

/// Integers `<= max_value`.
pub fn integers_up_to(max_value: i64) -> Strategy<i64> {
    Strategy::from_primitive(IntegersStrategy { min_value: None, max_value: Some(max_value) })
}

/// Integers in `[min_value, max_value]`, uniformly.
pub fn integers_in(min_value: i64, max_value: i64) -> Result<Strategy<i64>, InvalidArgument> {
    if min_value > max_value {
        return Err(InvalidArgument::InvalidRange { min: min_value, max: max_value });
    }
    Ok(Strategy::from_primitive(IntegersStrategy {
        min_value: Some(min_value),
        max_value: Some(max_value),
    }))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BooleansStrategy;

impl Primitive<bool> for BooleansStrategy {
    fn draw(&self, data: &mut ConjectureData) -> Result<bool, Rejection> {
        Ok(data.draw_boolean(0.5)?)
    }

    fn describe(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "booleans()")
    }
}

pub fn booleans() -> Strategy<bool> {
    Strategy::from_primitive(BooleansStrategy)
}

pub struct ListStrategy<T> {
    element: Strategy<T>,
    min_size: usize,
    max_size: Option<usize>,
}

impl<T: Value> ListStrategy<T> {
    fn average_size(&self) -> f64 {
        let min = self.min_size as f64;
        let open_ended = (min * 2.0).max(min + 5.0);
        match self.max_size {
            Some(max) => open_ended.min(0.5 * (min + max as f64)),
            None => open_ended,
        }
    }
}

impl<T: Value> Primitive<Vec<T>> for ListStrategy<T> {
    fn draw(&self, data: &mut ConjectureData) -> Result<Vec<T>, Rejection> {
        if self.element.is_empty() {
            return if self.min_size == 0 { Ok(Vec::new()) } else { Err(Rejection::EmptyDomain) };
        }
        // Every element occupies at least one slot of the choice budget.
        if self.min_size > data.config().max_choices {
            return Err(Rejection::Overrun);
        }

        let max_count = self.max_size.map_or(u64::MAX, |max| max as u64);
        let mut repeat = Repeat::new(self.min_size as u64, max_count, self.average_size());
        let mut values = Vec::with_capacity(self.min_size);
        while repeat.should_continue(data)? {
            values.push(self.element.draw(data)?);
        }
        Ok(values)
    }

    fn is_empty(&self) -> bool {
        self.min_size > 0 && self.element.is_empty()
    }

    fn describe(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lists({:?}, min_size={}", self.element, self.min_size)?;
        if let Some(max) = self.max_size {
            write!(f, ", max_size={}", max)?;
        }
        write!(f, ")")
    }
}

/// Lists of values drawn from `element`, with between `min_size` and
/// `max_size` elements (unbounded above if `None`).
pub fn lists<T: Value>(
    element: Strategy<T>,
    min_size: usize,
    max_size: Option<usize>,
) -> Result<Strategy<Vec<T>>, InvalidArgument> {
    if let Some(max_size) = max_size {
        if min_size > max_size {
            return Err(InvalidArgument::InvalidSize { min_size, max_size });
        }
    }
    Ok(Strategy::from_primitive(ListStrategy { element, min_size, max_size }))
}
