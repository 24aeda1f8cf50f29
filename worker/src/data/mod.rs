pub mod dataloader;
pub mod dataset;
pub mod shard;

pub use dataloader::DataLoader;
pub use dataset::{Batch, DataErr, InMemoryDataset};
pub use shard::ShardSpec;
