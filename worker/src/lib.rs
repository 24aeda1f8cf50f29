pub mod checkpoint;
pub mod config;
pub mod data;
pub mod error;
pub mod loop_;
pub mod metrics;
pub mod state;

pub use config::Config;
pub use error::{Result, WorkerErr};
pub use loop_::TrainLoop;
pub use metrics::TrainMetrics;
pub use state::TrainState;
