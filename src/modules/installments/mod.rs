pub mod models;
pub mod repositories;
pub mod services;

pub use models::{
    Installment, InstallmentBalance, InstallmentStatus, InstallmentUpdate, SaleBalance, SaleGroup,
    SaleStatus,
};
pub use repositories::{InstallmentRepository, PgInstallmentRepository};
pub use services::BalanceCalculator;
