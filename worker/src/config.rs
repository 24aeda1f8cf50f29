use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::str::FromStr;
use std::{env, error::Error, fmt};

use crate::data::ShardSpec;

/// Full passes over the training set per run.
pub const N_EPOCHS: usize = 10;
/// Samples per training batch.
pub const BATCH_SIZE: NonZeroUsize = NonZeroUsize::new(64).unwrap();
/// Step size of the gradient descent update.
pub const LEARNING_RATE: f32 = 0.01;
/// Seed for parameter init, epoch shuffling and dropout.
pub const DEFAULT_SEED: u64 = 42;
/// Directory holding the four MNIST idx files.
pub const DATA_DIR: &str = "data/";

pub const ENV_N_SPLITS: &str = "N_SPLITS";
pub const ENV_SPLIT: &str = "SPLIT";

/// Startup validation failures.
#[derive(Debug, PartialEq, Eq)]
pub enum ConfigErr {
    BadArgCount(usize),
    MissingEnv(&'static str),
    InvalidEnv { name: &'static str, value: String, expected: &'static str },
    SplitOutOfRange { split: usize, n_splits: usize },
}

impl fmt::Display for ConfigErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigErr::BadArgCount(got) => {
                write!(f, "expected <output> or <input> <output>, got {got} arguments")
            }
            ConfigErr::MissingEnv(name) => write!(f, "missing environment variable {name}"),
            ConfigErr::InvalidEnv { name, value, expected } => {
                write!(f, "{name} must be {expected}, got {value:?}")
            }
            ConfigErr::SplitOutOfRange { split, n_splits } => {
                write!(f, "SPLIT {split} out of range for N_SPLITS {n_splits}")
            }
        }
    }
}

impl Error for ConfigErr {}

/// Immutable run configuration, built once at startup and passed by
/// reference; nothing below `main` reads the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// This worker's slice of every epoch.
    pub shard: ShardSpec,
    /// Checkpoint to resume from, if any.
    pub load_path: Option<PathBuf>,
    /// Where the trained parameters are written.
    pub save_path: PathBuf,
    pub epochs: usize,
    pub batch_size: NonZeroUsize,
    pub learning_rate: f32,
    pub seed: u64,
    pub data_dir: String,
}

impl Config {
    /// Builds the configuration from `argv[1..]` and the process
    /// environment (`N_SPLITS`, `SPLIT`).
    ///
    /// # Errors
    /// Returns `ConfigErr` on a bad argument count or a missing, malformed
    /// or out-of-range environment value.
    pub fn from_env(args: &[String]) -> Result<Self, ConfigErr> {
        let n_splits = env::var(ENV_N_SPLITS).ok();
        let split = env::var(ENV_SPLIT).ok();
        Self::parse(args, n_splits.as_deref(), split.as_deref())
    }

    /// Pure half of [`Config::from_env`]: same validation, no ambient reads.
    pub fn parse(
        args: &[String],
        n_splits: Option<&str>,
        split: Option<&str>,
    ) -> Result<Self, ConfigErr> {
        let (load_path, save_path) = match args {
            [output] => (None, PathBuf::from(output)),
            [input, output] => (Some(PathBuf::from(input)), PathBuf::from(output)),
            _ => return Err(ConfigErr::BadArgCount(args.len())),
        };

        let n_splits: NonZeroUsize = parse_env(ENV_N_SPLITS, "a positive integer", n_splits)?;
        let split: usize = parse_env(ENV_SPLIT, "a non-negative integer", split)?;
        let shard = ShardSpec::new(split, n_splits)?;

        Ok(Self {
            shard,
            load_path,
            save_path,
            epochs: N_EPOCHS,
            batch_size: BATCH_SIZE,
            learning_rate: LEARNING_RATE,
            seed: DEFAULT_SEED,
            data_dir: DATA_DIR.to_string(),
        })
    }
}

fn parse_env<T: FromStr>(
    name: &'static str,
    expected: &'static str,
    value: Option<&str>,
) -> Result<T, ConfigErr> {
    let value = value.ok_or(ConfigErr::MissingEnv(name))?;
    value
        .trim()
        .parse()
        .map_err(|_| ConfigErr::InvalidEnv { name, value: value.to_string(), expected })
}
