//! Draw engine: produce one value from a strategy, or a structured rejection.
//!
//! Rejections are ordinary return values. A filter that runs out of retries,
//! a union with nothing to draw from, or a trial that exhausts its choice
//! budget all come back as `Err(Rejection)` and are counted by the search
//! engine as an attempt that produced nothing.

use crate::data::{ConjectureData, DrawError};
use crate::feature_flags::FeatureFlags;
use crate::strategies::{Derived, FlatMap, Map, Predicate, Strategy, StrategyNode, Value};
use log::trace;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The strategy (or the branch reached) cannot produce any value
    EmptyDomain,
    /// A filter rejected every candidate within its retry bound
    FilterExhausted { attempts: u32 },
    /// The trial ran out of choices
    Overrun,
    /// The Random Source refused the draw, e.g. a misaligned replay
    Invalid(DrawError),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::EmptyDomain => write!(f, "Strategy cannot produce any value"),
            Rejection::FilterExhausted { attempts } => {
                write!(f, "Filter rejected {} consecutive draws", attempts)
            }
            Rejection::Overrun => write!(f, "Trial exceeded its choice budget"),
            Rejection::Invalid(err) => write!(f, "Invalid draw: {}", err),
        }
    }
}

impl std::error::Error for Rejection {}

impl From<DrawError> for Rejection {
    fn from(err: DrawError) -> Self {
        match err {
            DrawError::Overrun => Rejection::Overrun,
            other => Rejection::Invalid(other),
        }
    }
}

impl<T: Value> Strategy<T> {
    /// Draw one value, consuming choices from `data`.
    pub fn draw(&self, data: &mut ConjectureData) -> Result<T, Rejection> {
        match self.node() {
            StrategyNode::Just(value) => Ok(value.clone()),
            StrategyNode::SampledFrom(candidates) => {
                if candidates.is_empty() {
                    return Err(Rejection::EmptyDomain);
                }
                let index = data.choice(candidates.len())?;
                Ok(candidates[index].clone())
            }
            StrategyNode::Filtered { base, predicate } => draw_filtered(base, predicate, data),
            StrategyNode::Mapped(derived) | StrategyNode::FlatMapped(derived) => derived.draw(data),
            StrategyNode::OneOf { id, branches, .. } => draw_union(*id, branches, data),
            StrategyNode::Primitive(primitive) => primitive.draw(data),
        }
    }
}

fn draw_filtered<T: Value>(
    base: &Strategy<T>,
    predicate: &Predicate<T>,
    data: &mut ConjectureData,
) -> Result<T, Rejection> {
    let attempts = data.config().max_filter_attempts;
    for attempt in 1..=attempts {
        let value = base.draw(data)?;
        if predicate(&value) {
            return Ok(value);
        }
        trace!("Filter rejected {:?} (attempt {}/{})", value, attempt, attempts);
    }
    Err(Rejection::FilterExhausted { attempts })
}

/// Pick a branch and draw from it.
///
/// Empty branches are never picked. Among the rest, only branches enabled by
/// this trial's feature flags are candidates; if the flags leave none, every
/// non-empty branch is.
fn draw_union<T: Value>(
    id: u64,
    branches: &[Strategy<T>],
    data: &mut ConjectureData,
) -> Result<T, Rejection> {
    let live: Vec<usize> = (0..branches.len()).filter(|&i| !branches[i].is_empty()).collect();
    if live.is_empty() {
        return Err(Rejection::EmptyDomain);
    }

    if data.feature_flags(id).is_none() {
        let flags = FeatureFlags::draw(data, branches.len())?;
        trace!("Union {} enabled {}/{} branches", id, flags.enabled_count(), flags.len());
        data.set_feature_flags(id, flags);
    }
    let enabled: Vec<usize> = match data.feature_flags(id) {
        Some(flags) => live.iter().copied().filter(|&i| flags.is_enabled(i)).collect(),
        None => Vec::new(),
    };
    let candidates = if enabled.is_empty() { live } else { enabled };

    let index = if candidates.len() == 1 {
        candidates[0]
    } else {
        candidates[data.choice(candidates.len())?]
    };
    branches[index].draw(data)
}

impl<S: Value, T: Value> Derived<T> for Map<S, T> {
    fn draw(&self, data: &mut ConjectureData) -> Result<T, Rejection> {
        let value = self.base.draw(data)?;
        Ok((self.transform)(value))
    }

    fn base_is_empty(&self) -> bool {
        self.base.is_empty()
    }

    fn describe(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}.map(<function>)", self.base)
    }
}

impl<S: Value, T: Value> Derived<T> for FlatMap<S, T> {
    /// The intermediate value only selects the second strategy; it is not
    /// part of the result.
    fn draw(&self, data: &mut ConjectureData) -> Result<T, Rejection> {
        let value = self.base.draw(data)?;
        let next = (self.continuation)(value);
        next.draw(data)
    }

    fn base_is_empty(&self) -> bool {
        self.base.is_empty()
    }

    fn describe(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}.flatmap(<function>)", self.base)
    }
}
