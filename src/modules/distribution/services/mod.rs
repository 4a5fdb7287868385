pub mod distribution_engine;
pub mod reconciliation_applier;

pub use distribution_engine::DistributionEngine;
pub use reconciliation_applier::{ReconciliationApplier, ReconciliationResult};
