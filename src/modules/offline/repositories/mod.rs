pub mod queue_store;

pub use queue_store::{JsonFileQueueStore, MemoryQueueStore, OfflineQueueStore};
