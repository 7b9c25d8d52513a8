//! Invalid-usage errors raised while building strategies.
//!
//! These are detected at construction time, before anything is drawn, and
//! are never retried by the search engine.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidArgument {
    /// `one_of` was handed plain values where strategies belong.
    #[error(
        "Did you mean st.sampled_from({suggestion})?  st.one_of() is used to combine \
         strategies, but all of the arguments were of other types."
    )]
    LiteralsInOneOf { suggestion: String },

    /// A single non-strategy argument mixed in with strategies.
    #[error("Expected a strategy but got {repr} (argument {position} of one_of)")]
    NotAStrategy { repr: String, position: usize },

    #[error("Cannot sample from an empty collection of candidates")]
    EmptyCandidates,

    #[error("Cannot have min_value={min} > max_value={max}")]
    InvalidRange { min: i64, max: i64 },

    #[error("Cannot have min_size={min_size} > max_size={max_size}")]
    InvalidSize { min_size: usize, max_size: usize },
}
