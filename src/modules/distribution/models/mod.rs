pub mod sale_distribution;

pub use sale_distribution::{DistributionMode, DistributionPreview, SaleDistributionItem};
