use std::num::NonZeroUsize;

use crate::config::ConfigErr;

/// A worker's slice of every epoch: batch positions whose index is
/// congruent to `split` modulo `n_splits`.
///
/// Properties:
/// - For any position, exactly one of the `n_splits` workers selects it.
/// - The union over all splits covers the whole epoch.
/// - Pure function of `(position, n_splits, split)`, so independently
///   launched processes agree without communicating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShardSpec {
    split: usize,
    n_splits: NonZeroUsize,
}

impl ShardSpec {
    /// # Errors
    /// Returns `ConfigErr::SplitOutOfRange` unless `split < n_splits`.
    pub fn new(split: usize, n_splits: NonZeroUsize) -> Result<Self, ConfigErr> {
        if split >= n_splits.get() {
            return Err(ConfigErr::SplitOutOfRange { split, n_splits: n_splits.get() });
        }
        Ok(Self { split, n_splits })
    }

    /// Whether this worker trains the batch at `position`.
    #[inline]
    pub fn selects(self, position: usize) -> bool {
        position % self.n_splits.get() == self.split
    }

    #[inline]
    pub fn split(self) -> usize {
        self.split
    }

    #[inline]
    pub fn n_splits(self) -> usize {
        self.n_splits.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shard(split: usize, n_splits: usize) -> ShardSpec {
        ShardSpec::new(split, NonZeroUsize::new(n_splits).unwrap()).unwrap()
    }

    #[test]
    fn single_split_selects_everything() {
        let spec = shard(0, 1);
        assert!((0..100).all(|i| spec.selects(i)));
    }

    #[test]
    fn positions_are_covered_exactly_once() {
        let n = 4;
        let shards: Vec<_> = (0..n).map(|s| shard(s, n)).collect();

        for position in 0..100 {
            let owners = shards.iter().filter(|s| s.selects(position)).count();
            assert_eq!(owners, 1, "position {position}");
        }
    }

    #[test]
    fn four_way_split_of_100_positions_is_25_each() {
        for split in 0..4 {
            let picked = (0..100).filter(|&i| shard(split, 4).selects(i)).count();
            assert_eq!(picked, 25);
        }
    }

    #[test]
    fn split_out_of_range_is_rejected() {
        let err = ShardSpec::new(3, NonZeroUsize::new(3).unwrap()).unwrap_err();
        assert_eq!(err, ConfigErr::SplitOutOfRange { split: 3, n_splits: 3 });
    }
}
