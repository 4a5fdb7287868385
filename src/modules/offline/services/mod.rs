pub mod replay_adapter;

pub use replay_adapter::{OfflineReplayAdapter, ReplayOutcome};
