pub mod models;
pub mod services;

pub use models::{DistributionMode, DistributionPreview, SaleDistributionItem};
pub use services::{DistributionEngine, ReconciliationApplier, ReconciliationResult};
