//! Fixed-capacity, score-ordered candidate set.

use arrayvec::ArrayVec;

use crate::placement_evaluator::Score;

/// Keeps the `N` best-scoring items seen so far, best first.
///
/// Insertion rule: while the beam has room every item is kept; once full,
/// a new item is kept only if it scores strictly higher than the worst
/// retained item, which is then evicted. Items with equal scores stay in
/// insertion order, so the earlier one wins ties.
///
/// # Example
///
/// ```
/// use stackbit_evaluator::{bounded_beam::BoundedBeam, placement_evaluator::Score};
///
/// let mut beam = BoundedBeam::<&str, 2>::new();
/// beam.insert(Score::new(1), "a");
/// beam.insert(Score::new(3), "b");
/// beam.insert(Score::new(2), "c");
///
/// let items: Vec<_> = beam.iter().map(|(_, item)| *item).collect();
/// assert_eq!(items, ["b", "c"]);
/// ```
#[derive(Debug, Clone)]
pub struct BoundedBeam<T, const N: usize> {
    entries: ArrayVec<(Score, T), N>,
}

impl<T, const N: usize> Default for BoundedBeam<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> BoundedBeam<T, N> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: ArrayVec::new(),
        }
    }

    /// Offers `item` to the beam. Returns whether it was retained.
    pub fn insert(&mut self, score: Score, item: T) -> bool {
        if self.entries.is_full() {
            match self.entries.last() {
                Some((worst, _)) if score > *worst => {
                    self.entries.pop();
                }
                _ => return false,
            }
        }
        let index = self.entries.partition_point(|(s, _)| *s >= score);
        self.entries.insert(index, (score, item));
        true
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Score of the lowest retained item.
    #[must_use]
    pub fn worst_score(&self) -> Option<Score> {
        self.entries.last().map(|(score, _)| *score)
    }

    /// Iterates best first.
    pub fn iter(&self) -> impl Iterator<Item = &(Score, T)> {
        self.entries.iter()
    }
}

impl<T, const N: usize> IntoIterator for BoundedBeam<T, N> {
    type Item = (Score, T);
    type IntoIter = arrayvec::IntoIter<(Score, T), N>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items<const N: usize>(beam: &BoundedBeam<u32, N>) -> Vec<u32> {
        beam.iter().map(|(_, item)| *item).collect()
    }

    #[test]
    fn test_keeps_best_in_descending_order() {
        let mut beam = BoundedBeam::<u32, 3>::new();
        for (i, score) in [5, 1, 9, 7, 3].into_iter().enumerate() {
            beam.insert(Score::new(score), u32::try_from(i).unwrap());
        }
        assert_eq!(beam.len(), 3);
        assert_eq!(items(&beam), [2, 3, 0]);
        assert_eq!(beam.worst_score(), Some(Score::new(5)));
    }

    #[test]
    fn test_equal_scores_keep_insertion_order() {
        let mut beam = BoundedBeam::<u32, 4>::new();
        beam.insert(Score::new(2), 0);
        beam.insert(Score::new(2), 1);
        beam.insert(Score::new(3), 2);
        beam.insert(Score::new(2), 3);
        assert_eq!(items(&beam), [2, 0, 1, 3]);
    }

    #[test]
    fn test_full_beam_rejects_ties_with_worst() {
        let mut beam = BoundedBeam::<u32, 2>::new();
        assert!(beam.insert(Score::new(4), 0));
        assert!(beam.insert(Score::new(1), 1));
        assert!(!beam.insert(Score::new(1), 2));
        assert!(!beam.insert(Score::new(0), 3));
        assert!(beam.insert(Score::new(2), 4));
        assert_eq!(items(&beam), [0, 4]);
    }

    #[test]
    fn test_zero_capacity_keeps_nothing() {
        let mut beam = BoundedBeam::<u32, 0>::new();
        assert!(!beam.insert(Score::new(10), 0));
        assert!(beam.is_empty());
        assert_eq!(beam.worst_score(), None);
    }

    #[test]
    fn test_into_iter_yields_best_first() {
        let mut beam = BoundedBeam::<u32, 3>::new();
        beam.insert(Score::new(-1), 0);
        beam.insert(Score::new(8), 1);
        let scores: Vec<_> = beam.into_iter().map(|(score, _)| score.value()).collect();
        assert_eq!(scores, [8, -1]);
    }
}
