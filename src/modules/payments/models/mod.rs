pub mod payment_input;
pub mod payment_record;

pub use payment_input::{FailedUpdate, PaymentInput, PersistenceReport};
pub use payment_record::{DistributionDetail, PaymentRecord};
