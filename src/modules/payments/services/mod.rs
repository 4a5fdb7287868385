pub mod payment_service;

pub use payment_service::{PaymentOutcome, PaymentService};
