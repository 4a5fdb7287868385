pub mod models;
pub mod repositories;
pub mod services;

pub use models::{ActionPayload, DistributePayment, OfflineAction};
pub use repositories::{JsonFileQueueStore, MemoryQueueStore, OfflineQueueStore};
pub use services::{OfflineReplayAdapter, ReplayOutcome};
