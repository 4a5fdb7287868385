pub mod models;
pub mod repositories;
pub mod services;

pub use models::{DistributionDetail, FailedUpdate, PaymentInput, PaymentRecord, PersistenceReport};
pub use repositories::{PaymentRecordRepository, PgPaymentRecordRepository};
pub use services::{PaymentOutcome, PaymentService};
