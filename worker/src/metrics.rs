/// Running counters for one training run.
#[derive(Debug, Default, Clone)]
pub struct TrainMetrics {
    /// Completed epochs.
    pub epochs: u64,

    /// Batches trained by this worker (skipped positions excluded).
    pub steps: u64,

    /// Batch positions that belonged to other shards.
    pub skipped: u64,

    /// Samples seen across all trained batches.
    pub samples: u64,

    loss_sum: f64,
}

impl TrainMetrics {
    #[inline]
    pub fn bump_epoch(&mut self) {
        self.epochs += 1;
    }

    #[inline]
    pub fn bump_skipped(&mut self) {
        self.skipped += 1;
    }

    #[inline]
    pub fn add_step(&mut self, samples: usize, loss: f32) {
        self.steps += 1;
        self.samples += samples as u64;
        self.loss_sum += f64::from(loss);
    }

    /// Mean loss over all trained batches, `0.0` if none were trained.
    pub fn mean_loss(&self) -> f64 {
        if self.steps == 0 {
            return 0.0;
        }
        self.loss_sum / self.steps as f64
    }
}
