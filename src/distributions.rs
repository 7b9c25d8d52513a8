// General distribution functions and utilities.
// This module contains probability distributions and repetition
// control that are used across different strategies.

use crate::data::{ConjectureData, DrawError};

/// Biased coin. Probabilities of exactly 0 or 1 consume a forced choice.
pub fn weighted(data: &mut ConjectureData, probability: f64) -> Result<bool, DrawError> {
    data.draw_boolean(probability.clamp(0.0, 1.0))
}

/// Length control for collections: decides, one element at a time, whether
/// to keep going.
#[derive(Debug, Clone)]
pub struct Repeat {
    min_count: u64,
    max_count: u64,
    p_continue: f64,

    current_count: u64,
}

impl Repeat {
    pub fn new(min_count: u64, max_count: u64, expected_count: f64) -> Repeat {
        Repeat {
            min_count,
            max_count,
            p_continue: 1.0 - 1.0 / (1.0 + expected_count),
            current_count: 0,
        }
    }

    pub fn count(&self) -> u64 {
        self.current_count
    }

    /// Exact-length collections consume no randomness for their length.
    pub fn should_continue(&mut self, data: &mut ConjectureData) -> Result<bool, DrawError> {
        if self.min_count == self.max_count {
            if self.current_count < self.max_count {
                self.current_count += 1;
                return Ok(true);
            } else {
                return Ok(false);
            }
        } else if self.current_count < self.min_count {
            data.force_boolean(true)?;
            self.current_count += 1;
            return Ok(true);
        } else if self.current_count >= self.max_count {
            data.force_boolean(false)?;
            return Ok(false);
        }

        let result = weighted(data, self.p_continue)?;
        if result {
            self.current_count += 1;
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_to_completion(repeat: &mut Repeat, data: &mut ConjectureData) -> u64 {
        while repeat.should_continue(data).unwrap() {}
        repeat.count()
    }

    #[test]
    fn test_exact_count_consumes_no_choices() {
        let mut data = ConjectureData::new(0);
        let mut repeat = Repeat::new(100, 100, 100.0);
        assert_eq!(run_to_completion(&mut repeat, &mut data), 100);
        assert!(data.is_empty());
    }

    #[test]
    fn test_count_stays_within_bounds() {
        for seed in 0..200 {
            let mut data = ConjectureData::new(seed);
            let mut repeat = Repeat::new(2, 6, 4.0);
            let count = run_to_completion(&mut repeat, &mut data);
            assert!((2..=6).contains(&count), "count {} out of bounds", count);
        }
    }

    #[test]
    fn test_minimum_is_forced() {
        let mut data = ConjectureData::new(5);
        let mut repeat = Repeat::new(3, 10, 0.0);
        assert_eq!(run_to_completion(&mut repeat, &mut data), 3);
        assert!(data.choices()[..3].iter().all(|node| node.was_forced));
    }

    #[test]
    fn test_weighted_extremes() {
        let mut data = ConjectureData::new(0);
        assert_eq!(weighted(&mut data, 0.0), Ok(false));
        assert_eq!(weighted(&mut data, 1.0), Ok(true));
        assert_eq!(weighted(&mut data, 2.0), Ok(true));
    }
}
