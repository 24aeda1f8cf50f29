use std::num::NonZeroUsize;

use mlp_core::INPUT_WIDTH;
use ndarray::{Array2, ArrayView1};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use super::dataset::{Batch, InMemoryDataset};

/// Batch producer with a deterministic per-epoch shuffle.
///
/// Each epoch's order is a permutation derived from `(seed, epoch)` alone,
/// so independently launched workers enumerate identical batch positions
/// and the modulo shard stays disjoint across processes.
#[derive(Debug, Clone)]
pub struct DataLoader {
    dataset: InMemoryDataset,
    batch_size: NonZeroUsize,
    seed: u64,
    order: Vec<usize>,
    cursor: usize,
}

impl DataLoader {
    pub fn new(dataset: InMemoryDataset, batch_size: NonZeroUsize, seed: u64) -> Self {
        Self {
            dataset,
            batch_size,
            seed,
            order: Vec::new(),
            cursor: 0,
        }
    }

    /// Starts a fresh pass: reshuffles the sample order for `epoch` and
    /// rewinds the cursor. The loader yields nothing until first called.
    pub fn begin_epoch(&mut self, epoch: usize) {
        let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(epoch as u64));
        self.order = (0..self.dataset.len()).collect();
        self.order.shuffle(&mut rng);
        self.cursor = 0;
    }

    /// Returns the next owned batch of this pass, or `None` once the
    /// permutation is exhausted. The final batch may be short.
    pub fn next_batch(&mut self) -> Option<Batch> {
        if self.cursor >= self.order.len() {
            return None;
        }

        let end = (self.cursor + self.batch_size.get()).min(self.order.len());
        let picks = &self.order[self.cursor..end];

        let mut xs = Array2::zeros((picks.len(), INPUT_WIDTH));
        let mut ys = Vec::with_capacity(picks.len());
        for (row, &idx) in picks.iter().enumerate() {
            xs.row_mut(row).assign(&ArrayView1::from(self.dataset.image(idx)));
            ys.push(self.dataset.label(idx));
        }

        self.cursor = end;
        Some(Batch::new(xs, ys))
    }
}
