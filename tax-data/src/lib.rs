mod sales;
mod snapshot;

pub use sales::{CapitalSaleLoader, SaleLoaderError, SaleRecord};
pub use snapshot::{DocumentFormat, ReturnDocument, SnapshotLoadError};
