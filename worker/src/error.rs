use std::{error::Error, fmt};

use mlp_core::MlpErr;

use crate::checkpoint::CheckpointErr;
use crate::config::ConfigErr;
use crate::data::DataErr;

/// The worker crate's result type.
pub type Result<T> = std::result::Result<T, WorkerErr>;

/// Everything that can abort a training run.
#[derive(Debug)]
pub enum WorkerErr {
    Config(ConfigErr),
    Data(DataErr),
    Checkpoint(CheckpointErr),
    Train(MlpErr),
    Diverged {
        epoch: usize,
        batch: usize,
        loss: f32,
    },
}

impl fmt::Display for WorkerErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerErr::Config(e) => write!(f, "invalid configuration: {e}"),
            WorkerErr::Data(e) => write!(f, "dataset error: {e}"),
            WorkerErr::Checkpoint(e) => write!(f, "checkpoint error: {e}"),
            WorkerErr::Train(e) => write!(f, "training error: {e}"),
            WorkerErr::Diverged { epoch, batch, loss } => {
                write!(f, "loss diverged to {loss} at epoch {epoch}, batch {batch}")
            }
        }
    }
}

impl Error for WorkerErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            WorkerErr::Config(e) => Some(e),
            WorkerErr::Data(e) => Some(e),
            WorkerErr::Checkpoint(e) => Some(e),
            WorkerErr::Train(e) => Some(e),
            WorkerErr::Diverged { .. } => None,
        }
    }
}

impl From<ConfigErr> for WorkerErr {
    fn from(value: ConfigErr) -> Self {
        Self::Config(value)
    }
}

impl From<DataErr> for WorkerErr {
    fn from(value: DataErr) -> Self {
        Self::Data(value)
    }
}

impl From<CheckpointErr> for WorkerErr {
    fn from(value: CheckpointErr) -> Self {
        Self::Checkpoint(value)
    }
}

impl From<MlpErr> for WorkerErr {
    fn from(value: MlpErr) -> Self {
        Self::Train(value)
    }
}
