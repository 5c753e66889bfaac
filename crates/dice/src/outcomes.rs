use serde::{Deserialize, Serialize};

/// Contiguous run of integer outcomes, mapped to positions `0..len`.
///
/// The sum of `n` dice always lands in `[n, 6n]`, so labels never need
/// a hash map: the index of an outcome is its distance from `first`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub struct OutcomeRange {
    first: u32,
    len: usize,
}

impl OutcomeRange {
    pub fn new(first: u32, len: usize) -> Self {
        Self { first, len }
    }

    /// All sums reachable with `dice` six-sided dice.
    pub fn for_dice(dice: u32) -> Self {
        Self::new(dice, 5 * dice as usize + 1)
    }

    pub fn len(&self) -> usize {
        self.len
    }
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn first(&self) -> u32 {
        self.first
    }

    /// Last outcome, or `None` for an empty range.
    pub fn last(&self) -> Option<u32> {
        self.len
            .checked_sub(1)
            .map(|offset| self.first + offset as u32)
    }

    pub fn contains(&self, x: u32) -> bool {
        self.index_of(x).is_some()
    }

    pub fn index_of(&self, x: u32) -> Option<usize> {
        let offset = x.checked_sub(self.first)? as usize;
        (offset < self.len).then_some(offset)
    }
    pub fn value_of(&self, i: usize) -> Option<u32> {
        (i < self.len).then(|| self.first + i as u32)
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.len).map(move |i| self.first + i as u32)
    }

    /// Sub-range covering positions `lo..=hi`.
    pub fn window(&self, lo: usize, hi: usize) -> Self {
        let hi = hi.min(self.len.saturating_sub(1));
        if self.is_empty() || lo > hi {
            return Self::new(self.first, 0);
        }
        Self::new(self.first + lo as u32, hi - lo + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_for_dice_spans_n_to_6n() {
        let range = OutcomeRange::for_dice(3);
        assert_eq!(range.len(), 16);
        assert_eq!(range.first(), 3);
        assert_eq!(range.last(), Some(18));
        assert_eq!(range.index_of(3), Some(0));
        assert_eq!(range.index_of(18), Some(15));
        assert_eq!(range.index_of(2), None);
        assert_eq!(range.index_of(19), None);
        assert_eq!(range.value_of(15), Some(18));
        assert_eq!(range.value_of(16), None);
    }

    #[test]
    fn test_window_is_inclusive() {
        let range = OutcomeRange::for_dice(2);
        let window = range.window(2, 5);
        assert_eq!(window.iter().collect::<Vec<_>>(), vec![4, 5, 6, 7]);
        assert!(range.window(5, 2).is_empty());
    }
}
