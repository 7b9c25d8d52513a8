//! # Strategies and combinators
//!
//! A [`Strategy<T>`] is an immutable description of how to produce values of
//! type `T` from a [`ConjectureData`]. It holds a recipe, never a value: the
//! same strategy can be drawn from any number of times, by any number of
//! trials, including trials running on different threads.
//!
//! Strategies form a closed set of variants (see [`StrategyKind`]):
//!
//! - `Just`: always the same value, no randomness consumed
//! - `SampledFrom`: uniform choice among a fixed list of candidates
//! - `Filtered`: a base strategy plus a predicate, drawn by rejection sampling
//! - `Mapped`: a base strategy plus a pure transformation
//! - `FlatMapped`: a base strategy whose value selects a second strategy
//! - `OneOf`: a union delegating each draw to one of its branches
//! - `Primitive`: a base strategy such as [`crate::primitives::integers`]
//!
//! Children are held by shared handle, so trees are acyclic by construction
//! and cloning a `Strategy` is a reference-count bump. [`Strategy::ptr_eq`]
//! exposes that identity: `one_of` over a single strategy returns that very
//! handle.
//!
//! Drawing is implemented in [`crate::draw`].

use crate::data::ConjectureData;
use crate::draw::Rejection;
use crate::errors::InvalidArgument;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Bound satisfied by everything a strategy can produce.
///
/// Values must be printable so counterexamples can be reported, and
/// shareable so strategy trees can be used from several trials at once.
pub trait Value: Clone + fmt::Debug + Send + Sync + 'static {}

impl<T: Clone + fmt::Debug + Send + Sync + 'static> Value for T {}

pub type Predicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// Identity for union nodes, used to key per-trial feature flags.
static NEXT_UNION_ID: AtomicU64 = AtomicU64::new(0);

/// A base strategy defined outside the combinator tree.
pub trait Primitive<T>: Send + Sync {
    fn draw(&self, data: &mut ConjectureData) -> Result<T, Rejection>;

    /// Conservative: `true` only if the strategy can never produce a value.
    fn is_empty(&self) -> bool {
        false
    }

    fn describe(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;
}

/// Type-erased node whose base strategy produces a different type.
pub(crate) trait Derived<T>: Send + Sync {
    fn draw(&self, data: &mut ConjectureData) -> Result<T, Rejection>;
    fn base_is_empty(&self) -> bool;
    fn describe(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;
}

pub(crate) struct Map<S, T> {
    pub(crate) base: Strategy<S>,
    pub(crate) transform: Box<dyn Fn(S) -> T + Send + Sync>,
}

pub(crate) struct FlatMap<S, T> {
    pub(crate) base: Strategy<S>,
    pub(crate) continuation: Box<dyn Fn(S) -> Strategy<T> + Send + Sync>,
}

pub(crate) enum StrategyNode<T> {
    Just(T),
    SampledFrom(Vec<T>),
    Filtered { base: Strategy<T>, predicate: Predicate<T> },
    Mapped(Box<dyn Derived<T>>),
    FlatMapped(Box<dyn Derived<T>>),
    OneOf { id: u64, branches: Vec<Strategy<T>>, empty: bool },
    Primitive(Box<dyn Primitive<T>>),
}

/// Variant tag of a strategy node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    Just,
    SampledFrom,
    Filtered,
    Mapped,
    FlatMapped,
    OneOf,
    Primitive,
}

/// Shared handle to an immutable strategy tree.
pub struct Strategy<T> {
    node: Arc<StrategyNode<T>>,
}

impl<T> Clone for Strategy<T> {
    fn clone(&self) -> Self {
        Self { node: Arc::clone(&self.node) }
    }
}

impl<T> Strategy<T> {
    pub(crate) fn from_node(node: StrategyNode<T>) -> Self {
        Self { node: Arc::new(node) }
    }

    pub(crate) fn node(&self) -> &StrategyNode<T> {
        &self.node
    }

    /// Wrap a base strategy so it can take part in combinators.
    pub fn from_primitive<P>(primitive: P) -> Self
    where
        P: Primitive<T> + 'static,
    {
        Self::from_node(StrategyNode::Primitive(Box::new(primitive)))
    }

    pub fn kind(&self) -> StrategyKind {
        match self.node() {
            StrategyNode::Just(_) => StrategyKind::Just,
            StrategyNode::SampledFrom(_) => StrategyKind::SampledFrom,
            StrategyNode::Filtered { .. } => StrategyKind::Filtered,
            StrategyNode::Mapped(_) => StrategyKind::Mapped,
            StrategyNode::FlatMapped(_) => StrategyKind::FlatMapped,
            StrategyNode::OneOf { .. } => StrategyKind::OneOf,
            StrategyNode::Primitive(_) => StrategyKind::Primitive,
        }
    }

    /// True iff this strategy can never produce a value.
    ///
    /// Exact for empty unions; for everything else it is a conservative
    /// approximation propagated from children.
    pub fn is_empty(&self) -> bool {
        match self.node() {
            StrategyNode::Just(_) => false,
            StrategyNode::SampledFrom(candidates) => candidates.is_empty(),
            StrategyNode::Filtered { base, .. } => base.is_empty(),
            StrategyNode::Mapped(derived) | StrategyNode::FlatMapped(derived) => derived.base_is_empty(),
            StrategyNode::OneOf { empty, .. } => *empty,
            StrategyNode::Primitive(primitive) => primitive.is_empty(),
        }
    }

    /// Whether both handles point at the same strategy node.
    pub fn ptr_eq(&self, other: &Strategy<T>) -> bool {
        Arc::ptr_eq(&self.node, &other.node)
    }

    /// The flattened branches of a union; empty for any other variant.
    pub fn branches(&self) -> &[Strategy<T>] {
        match self.node() {
            StrategyNode::OneOf { branches, .. } => branches,
            _ => &[],
        }
    }
}

impl<T: Value> Strategy<T> {
    /// Keep only values satisfying `predicate`.
    pub fn filter<F>(&self, predicate: F) -> Strategy<T>
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Strategy::from_node(StrategyNode::Filtered {
            base: self.clone(),
            predicate: Arc::new(predicate),
        })
    }

    pub fn map<U, F>(&self, transform: F) -> Strategy<U>
    where
        U: Value,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        Strategy::from_node(StrategyNode::Mapped(Box::new(Map {
            base: self.clone(),
            transform: Box::new(transform),
        })))
    }

    /// Draw a value, build a new strategy from it, and draw from that.
    pub fn flatmap<U, F>(&self, continuation: F) -> Strategy<U>
    where
        U: Value,
        F: Fn(T) -> Strategy<U> + Send + Sync + 'static,
    {
        Strategy::from_node(StrategyNode::FlatMapped(Box::new(FlatMap {
            base: self.clone(),
            continuation: Box::new(continuation),
        })))
    }
}

impl<T: fmt::Debug> fmt::Debug for Strategy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.node() {
            StrategyNode::Just(value) => write!(f, "just({:?})", value),
            StrategyNode::SampledFrom(candidates) => write!(f, "sampled_from({:?})", candidates),
            StrategyNode::Filtered { base, .. } => write!(f, "{:?}.filter(<predicate>)", base),
            StrategyNode::Mapped(derived) | StrategyNode::FlatMapped(derived) => derived.describe(f),
            StrategyNode::OneOf { branches, .. } => {
                write!(f, "one_of(")?;
                for (i, branch) in branches.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{:?}", branch)?;
                }
                write!(f, ")")
            }
            StrategyNode::Primitive(primitive) => primitive.describe(f),
        }
    }
}

/// A strategy that always produces `value`.
pub fn just<T: Value>(value: T) -> Strategy<T> {
    Strategy::from_node(StrategyNode::Just(value))
}

/// Uniform choice among `candidates`, in order.
///
/// A single candidate collapses to [`just`].
pub fn sampled_from<T, I>(candidates: I) -> Result<Strategy<T>, InvalidArgument>
where
    T: Value,
    I: IntoIterator<Item = T>,
{
    let mut candidates: Vec<T> = candidates.into_iter().collect();
    match candidates.len() {
        0 => Err(InvalidArgument::EmptyCandidates),
        1 => match candidates.pop() {
            Some(value) => Ok(just(value)),
            None => Err(InvalidArgument::EmptyCandidates),
        },
        _ => Ok(Strategy::from_node(StrategyNode::SampledFrom(candidates))),
    }
}

/// The canonical empty strategy: a union with no branches.
pub fn nothing<T: Value>() -> Strategy<T> {
    union(Vec::new())
}

/// Union of `strategies`.
///
/// - no strategies: the empty strategy
/// - one strategy: that same strategy, not a copy
/// - otherwise: a union over the branches, with nested unions flattened
pub fn one_of<T, I>(strategies: I) -> Strategy<T>
where
    T: Value,
    I: IntoIterator<Item = Strategy<T>>,
{
    let mut strategies: Vec<Strategy<T>> = strategies.into_iter().collect();
    if strategies.len() == 1 {
        if let Some(only) = strategies.pop() {
            return only;
        }
    }

    let mut branches = Vec::with_capacity(strategies.len());
    for strategy in strategies {
        match strategy.node() {
            StrategyNode::OneOf { branches: nested, .. } => branches.extend(nested.iter().cloned()),
            _ => branches.push(strategy),
        }
    }
    union(branches)
}

fn union<T: Value>(branches: Vec<Strategy<T>>) -> Strategy<T> {
    let empty = branches.iter().all(Strategy::is_empty);
    Strategy::from_node(StrategyNode::OneOf {
        id: NEXT_UNION_ID.fetch_add(1, Ordering::Relaxed),
        branches,
        empty,
    })
}

/// An argument to [`one_of_args`]: either a strategy or a plain value passed
/// by mistake.
#[derive(Debug)]
pub enum OneOfArg<T> {
    Strategy(Strategy<T>),
    Literal(T),
}

impl<T> From<Strategy<T>> for OneOfArg<T> {
    fn from(strategy: Strategy<T>) -> Self {
        OneOfArg::Strategy(strategy)
    }
}

/// Checked form of [`one_of`] for callers assembling arguments dynamically.
///
/// If every argument is a plain value the error suggests the `sampled_from`
/// call that was probably intended, with the values in their original order.
pub fn one_of_args<T, I>(args: I) -> Result<Strategy<T>, InvalidArgument>
where
    T: Value,
    I: IntoIterator<Item = OneOfArg<T>>,
{
    let args: Vec<OneOfArg<T>> = args.into_iter().collect();
    let literal_count = args.iter().filter(|arg| matches!(arg, OneOfArg::Literal(_))).count();

    if literal_count == 0 {
        return Ok(one_of(args.into_iter().filter_map(|arg| match arg {
            OneOfArg::Strategy(strategy) => Some(strategy),
            OneOfArg::Literal(_) => None,
        })));
    }

    if literal_count == args.len() {
        let literals: Vec<T> = args
            .into_iter()
            .filter_map(|arg| match arg {
                OneOfArg::Literal(value) => Some(value),
                OneOfArg::Strategy(_) => None,
            })
            .collect();
        return Err(InvalidArgument::LiteralsInOneOf { suggestion: format!("{:?}", literals) });
    }

    let (position, repr) = args
        .iter()
        .enumerate()
        .find_map(|(position, arg)| match arg {
            OneOfArg::Literal(value) => Some((position, format!("{:?}", value))),
            OneOfArg::Strategy(_) => None,
        })
        .unwrap_or_default();
    Err(InvalidArgument::NotAStrategy { repr, position })
}

/// Free-function form of [`Strategy::filter`].
pub fn filter<T, F>(strategy: &Strategy<T>, predicate: F) -> Strategy<T>
where
    T: Value,
    F: Fn(&T) -> bool + Send + Sync + 'static,
{
    strategy.filter(predicate)
}

/// Free-function form of [`Strategy::flatmap`].
pub fn flatmap<T, U, F>(strategy: &Strategy<T>, continuation: F) -> Strategy<U>
where
    T: Value,
    U: Value,
    F: Fn(T) -> Strategy<U> + Send + Sync + 'static,
{
    strategy.flatmap(continuation)
}

/// Variadic union: `one_of!(a, b, c)` is `one_of(vec![a, b, c])`.
#[macro_export]
macro_rules! one_of {
    () => {
        $crate::strategies::one_of(::std::vec::Vec::new())
    };
    ($($strategy:expr),+ $(,)?) => {
        $crate::strategies::one_of(::std::vec![$($strategy),+])
    };
}
