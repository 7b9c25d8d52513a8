//! Per-trial branch enablement for union strategies.
//!
//! Picking one of N branches uniformly on every draw makes long runs that
//! stay inside a single branch astronomically unlikely: a list of 100 values
//! from a 3-way union is all one branch with probability 3^-100. Instead, the
//! first time a union is drawn from in a trial, each branch gets an
//! independent coin flip deciding whether it is enabled for the rest of that
//! trial ("swarm testing"). Later draws pick uniformly among the enabled
//! branches, so a trial where only one branch survives happens with
//! probability around 2^-N and then every draw lands in that branch.

use crate::data::{ConjectureData, DrawError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureFlags {
    enabled: Vec<bool>,
}

impl FeatureFlags {
    pub fn all_enabled(n: usize) -> Self {
        Self { enabled: vec![true; n] }
    }

    /// Decide which of `n` branches are enabled for the current trial.
    ///
    /// If every branch comes up disabled they are all re-enabled, so a union
    /// with at least one drawable branch can always produce a value.
    pub fn draw(data: &mut ConjectureData, n: usize) -> Result<Self, DrawError> {
        if n <= 1 {
            return Ok(Self::all_enabled(n));
        }

        let p_disabled = data.config().branch_disable_probability;
        let mut enabled = Vec::with_capacity(n);
        for _ in 0..n {
            enabled.push(!data.draw_boolean(p_disabled)?);
        }

        if !enabled.iter().any(|&on| on) {
            return Ok(Self::all_enabled(n));
        }
        Ok(Self { enabled })
    }

    pub fn len(&self) -> usize {
        self.enabled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.enabled.is_empty()
    }

    pub fn is_enabled(&self, index: usize) -> bool {
        self.enabled.get(index).copied().unwrap_or(false)
    }

    pub fn enabled_count(&self) -> usize {
        self.enabled.iter().filter(|&&on| on).count()
    }
}
