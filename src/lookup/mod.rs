//! Pill lookup: matching criteria against the catalog and shaping the answer.

pub mod criteria;
pub mod result;
pub mod service;
pub mod view;

pub use criteria::LookupCriteria;
pub use result::LookupResult;
pub use service::{LookupService, RetryPolicy};
pub use view::{Column, ColumnKind, LinkCell, ShapingError, TableRow, TableView};
