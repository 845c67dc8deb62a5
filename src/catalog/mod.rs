pub mod record;
pub mod store;

pub use record::PillRecord;
pub use store::{Catalog, CatalogStore, DataLoadError, Snapshot};

#[cfg(test)]
pub use store::MockCatalog;
