#![forbid(unsafe_code)]

//! Stagger offsets: start delays for a cascade of items.
//!
//! The position wrapper uses [`stagger_offsets`] to space trail points along a
//! move so they appear one after another instead of all at once.
//!
//! # Invariants
//!
//! 1. `stagger_offsets(0, ..)` is empty.
//! 2. `offset[i] == i * delay` exactly (integer arithmetic, saturating).

use std::time::Duration;

/// Start offsets for `count` items spaced `delay` apart.
#[must_use]
pub fn stagger_offsets(count: usize, delay: Duration) -> Vec<Duration> {
    (0..count)
        .map(|i| delay.saturating_mul(u32::try_from(i).unwrap_or(u32::MAX)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS_30: Duration = Duration::from_millis(30);

    #[test]
    fn empty_and_single() {
        assert!(stagger_offsets(0, MS_30).is_empty());
        assert_eq!(stagger_offsets(1, MS_30), vec![Duration::ZERO]);
    }

    #[test]
    fn spacing_is_exact() {
        let offsets = stagger_offsets(5, MS_30);
        assert_eq!(
            offsets,
            vec![
                Duration::ZERO,
                Duration::from_millis(30),
                Duration::from_millis(60),
                Duration::from_millis(90),
                Duration::from_millis(120),
            ]
        );
    }

    #[test]
    fn zero_delay_collapses() {
        let offsets = stagger_offsets(4, Duration::ZERO);
        assert!(offsets.iter().all(|d| d.is_zero()));
    }

    #[test]
    fn huge_delay_saturates() {
        let offsets = stagger_offsets(3, Duration::MAX);
        assert_eq!(offsets[2], Duration::MAX);
    }
}
