pub mod installment;
pub mod sale;

pub use installment::{Installment, InstallmentStatus, InstallmentUpdate};
pub use sale::{InstallmentBalance, SaleBalance, SaleGroup, SaleStatus};
