use std::{env, process};

use log::{error, info};
use mlp_core::{BackpropStep, GradientDescent, Mlp};
use worker::data::{DataLoader, InMemoryDataset};
use worker::{Config, TrainLoop, TrainState, checkpoint};

fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    if let Err(e) = run() {
        error!("{e}");
        process::exit(1);
    }
}

fn run() -> worker::Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let cfg = Config::from_env(&args)?;
    info!(
        "shard {} of {} | output {}",
        cfg.shard.split(),
        cfg.shard.n_splits(),
        cfg.save_path.display()
    );

    let layout = Mlp::param_layout();
    let params = match &cfg.load_path {
        Some(path) => {
            let params = checkpoint::load(path, &layout)?;
            info!("resumed {} parameters from {}", params.len(), path.display());
            params
        }
        None => Mlp::init_params(cfg.seed)?,
    };

    let dataset = InMemoryDataset::load_training(&cfg.data_dir)?;
    info!("loaded {} training samples from {}", dataset.len(), cfg.data_dir);

    let loader = DataLoader::new(dataset, cfg.batch_size, cfg.seed);
    let state = TrainState::new(params);
    let step = BackpropStep::new(Mlp::new(cfg.seed));
    let descent = GradientDescent::new(cfg.learning_rate);

    let (state, metrics) = TrainLoop::new(&cfg, loader, state, step, descent).run()?;

    checkpoint::save(&cfg.save_path, &layout, &state.params)?;
    info!(
        "saved checkpoint to {} | steps: {} | samples: {} | mean loss: {}",
        cfg.save_path.display(),
        metrics.steps,
        metrics.samples,
        metrics.mean_loss()
    );

    Ok(())
}
