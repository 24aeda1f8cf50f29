use std::num::NonZeroUsize;
use std::path::PathBuf;

use mlp_core::{GradientDescent, INPUT_WIDTH, MlpErr, Optimizer, TrainStep};
use ndarray::Array2;

use worker::data::{DataLoader, InMemoryDataset, ShardSpec};
use worker::{Config, TrainLoop, TrainState, WorkerErr};

const SEED: u64 = 7;

fn dataset(samples: usize) -> InMemoryDataset {
    let images = (0..samples)
        .flat_map(|i| vec![i as f32 / samples as f32; INPUT_WIDTH])
        .collect();
    let labels = (0..samples).map(|i| (i % 10) as u8).collect();
    InMemoryDataset::new(images, labels)
}

fn config(epochs: usize, split: usize, n_splits: usize, batch_size: usize) -> Config {
    Config {
        shard: ShardSpec::new(split, NonZeroUsize::new(n_splits).unwrap()).unwrap(),
        load_path: None,
        save_path: PathBuf::from("unused.safetensors"),
        epochs,
        batch_size: NonZeroUsize::new(batch_size).unwrap(),
        learning_rate: 0.5,
        seed: SEED,
        data_dir: String::from("data/"),
    }
}

fn loader(cfg: &Config, samples: usize) -> DataLoader {
    DataLoader::new(dataset(samples), cfg.batch_size, cfg.seed)
}

/// Reports a fixed loss and writes an all-ones gradient.
struct ConstStep {
    loss: f32,
}

impl TrainStep for ConstStep {
    fn step(
        &mut self,
        _params: &[f32],
        grads: &mut [f32],
        _xs: Array2<f32>,
        _ys: &[u8],
    ) -> mlp_core::Result<f32> {
        grads.fill(1.0);
        Ok(self.loss)
    }
}

struct FailingStep;

impl TrainStep for FailingStep {
    fn step(
        &mut self,
        _params: &[f32],
        _grads: &mut [f32],
        _xs: Array2<f32>,
        _ys: &[u8],
    ) -> mlp_core::Result<f32> {
        Err(MlpErr::InvalidInput("bad batch"))
    }
}

/// Fails the test if the loop ever reaches the update.
struct ForbiddenOptimizer;

impl Optimizer for ForbiddenOptimizer {
    fn update_params(&mut self, _params: &mut [f32], _grads: &[f32]) -> mlp_core::Result<()> {
        panic!("optimizer must not run for this scenario");
    }
}

#[test]
fn single_split_trains_every_batch() {
    // 10 samples at batch size 2 give 5 positions per epoch.
    let cfg = config(2, 0, 1, 2);
    let loop_ = TrainLoop::new(
        &cfg,
        loader(&cfg, 10),
        TrainState::new(vec![0.0; 4]),
        ConstStep { loss: 1.0 },
        GradientDescent::new(cfg.learning_rate),
    );

    let (state, metrics) = loop_.run().unwrap();

    assert_eq!(metrics.steps, 10);
    assert_eq!(metrics.skipped, 0);
    assert_eq!(metrics.epochs, 2);
    assert_eq!(metrics.samples, 20);

    // Ten all-ones gradients at lr 0.5 move every parameter by -5.
    assert_eq!(state.params, vec![-5.0; 4]);
}

#[test]
fn four_workers_partition_every_epoch() {
    // 10 samples at batch size 1 give 10 positions; modulo 4 they split 3/3/2/2.
    let expected_steps = [3u64, 3, 2, 2];

    let mut total = 0;
    for split in 0..4 {
        let cfg = config(1, split, 4, 1);
        let loop_ = TrainLoop::new(
            &cfg,
            loader(&cfg, 10),
            TrainState::new(vec![0.0; 4]),
            ConstStep { loss: 1.0 },
            GradientDescent::new(cfg.learning_rate),
        );

        let (_, metrics) = loop_.run().unwrap();
        assert_eq!(metrics.steps, expected_steps[split]);
        assert_eq!(metrics.skipped, 10 - expected_steps[split]);
        total += metrics.steps;
    }

    assert_eq!(total, 10);
}

#[test]
fn unselected_shard_changes_nothing() {
    // One batch position, owned by split 0; this worker is split 1.
    let cfg = config(3, 1, 2, 4);
    let loop_ = TrainLoop::new(
        &cfg,
        loader(&cfg, 4),
        TrainState::new(vec![3.0; 4]),
        ConstStep { loss: 1.0 },
        ForbiddenOptimizer,
    );

    let (state, metrics) = loop_.run().unwrap();

    assert_eq!(metrics.steps, 0);
    assert_eq!(metrics.skipped, 3);
    assert_eq!(metrics.epochs, 3);
    assert_eq!(state.params, vec![3.0; 4]);
}

#[test]
fn non_finite_loss_aborts_before_any_update() {
    let cfg = config(1, 0, 1, 2);
    let loop_ = TrainLoop::new(
        &cfg,
        loader(&cfg, 4),
        TrainState::new(vec![0.0; 4]),
        ConstStep { loss: f32::NAN },
        ForbiddenOptimizer,
    );

    match loop_.run().unwrap_err() {
        WorkerErr::Diverged { epoch, batch, loss } => {
            assert_eq!(epoch, 1);
            assert_eq!(batch, 0);
            assert!(loss.is_nan());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn step_failures_propagate() {
    let cfg = config(1, 0, 1, 2);
    let loop_ = TrainLoop::new(
        &cfg,
        loader(&cfg, 4),
        TrainState::new(vec![0.0; 4]),
        FailingStep,
        GradientDescent::new(cfg.learning_rate),
    );

    match loop_.run().unwrap_err() {
        WorkerErr::Train(e) => assert_eq!(e, MlpErr::InvalidInput("bad batch")),
        other => panic!("unexpected error: {other}"),
    }
}
