use log::info;
use mlp_core::{Optimizer, TrainStep};

use crate::config::Config;
use crate::data::{Batch, DataLoader, ShardSpec};
use crate::error::{Result, WorkerErr};
use crate::metrics::TrainMetrics;
use crate::state::TrainState;

/// Drives the sharded training run.
///
/// Design:
/// - Keeps the flat parameter and gradient buffers in `TrainState`.
/// - Walks every epoch's batch positions in loader order; positions that
///   fail the shard check advance the position counter and nothing else.
/// - Delegates the math to the `TrainStep` and `Optimizer` seams, so the
///   sequencing here is testable with stubs.
pub struct TrainLoop<S, O> {
    epochs: usize,
    shard: ShardSpec,
    loader: DataLoader,
    state: TrainState,
    metrics: TrainMetrics,
    step: S,
    optimizer: O,
}

impl<S, O> TrainLoop<S, O> {
    pub fn new(cfg: &Config, loader: DataLoader, state: TrainState, step: S, optimizer: O) -> Self {
        Self {
            epochs: cfg.epochs,
            shard: cfg.shard,
            loader,
            state,
            metrics: TrainMetrics::default(),
            step,
            optimizer,
        }
    }
}

impl<S, O> TrainLoop<S, O>
where
    S: TrainStep,
    O: Optimizer,
{
    /// Runs every epoch to completion and returns the final state and the
    /// run counters. The caller owns persistence; no file is touched here.
    ///
    /// # Errors
    /// Propagates step and optimizer failures, and fails with
    /// `WorkerErr::Diverged` on a non-finite batch loss before the
    /// parameters are updated with its gradients.
    pub fn run(mut self) -> Result<(TrainState, TrainMetrics)> {
        for epoch in 1..=self.epochs {
            // Same seed, same epoch, same permutation in every worker.
            self.loader.begin_epoch(epoch);

            let mut epoch_steps = 0u64;
            let mut epoch_loss = 0.0f64;
            let mut position = 0usize;

            while let Some(batch) = self.loader.next_batch() {
                if !self.shard.selects(position) {
                    self.metrics.bump_skipped();
                    position += 1;
                    continue;
                }

                // 1) Fresh gradients for this batch.
                self.state.zero_grads();

                // 2) Forward, loss, backward through the step seam.
                let samples = batch.len();
                let Batch { xs, ys } = batch;
                let loss = self.step.step(&self.state.params, &mut self.state.grads, xs, &ys)?;
                if !loss.is_finite() {
                    return Err(WorkerErr::Diverged { epoch, batch: position, loss });
                }

                // 3) Fold the gradients into the parameters.
                self.optimizer.update_params(&mut self.state.params, &self.state.grads)?;

                self.metrics.add_step(samples, loss);
                epoch_steps += 1;
                epoch_loss += f64::from(loss);
                info!("Epoch: {epoch} | Batch: {position} | Loss: {loss}");

                position += 1;
            }

            self.metrics.bump_epoch();
            if epoch_steps == 0 {
                info!("Epoch {epoch} done | no batches in this shard");
            } else {
                let mean = epoch_loss / epoch_steps as f64;
                info!("Epoch {epoch} done | Trained batches: {epoch_steps} | Mean loss: {mean}");
            }
        }

        Ok((self.state, self.metrics))
    }
}
