//! # Pill Buddy
//!
//! A single-tool service that identifies pills by color, shape and optional
//! imprint from a fixed, in-memory catalog.
//!
//! ## Features
//!
//! - **Catalog**: JSON dataset loaded and validated once at startup
//! - **Lookup**: exact-match filtering with optional bounded retry
//! - **Dual responses**: raw records plus a table descriptor for renderers
//! - **Transports**: JSON-RPC over HTTP or stdio, with a matching client
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pill_buddy::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServiceConfig::default();
//!     let catalog = Arc::new(CatalogStore::load(&config.catalog_path)?);
//!
//!     let service = LookupService::new(catalog);
//!     let result = service.lookup(&LookupCriteria::new("brown", "round")).await;
//!
//!     for pill in result.records() {
//!         println!("{} ({})", pill.name, pill.url);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod lookup;
pub mod service;
pub mod tool;

// Re-exports for convenient usage
pub use catalog::{Catalog, CatalogStore, DataLoadError, PillRecord};
pub use config::{ConfigError, RetryConfig, ServiceConfig, ServiceMetadata};
pub use error::PillBuddyError;
pub use lookup::{LookupCriteria, LookupResult, LookupService, RetryPolicy, ShapingError};
pub use service::{ClientError, RpcHandler, ServiceClient, build_handler, build_registry};
pub use tool::{
    DynTool, ExecutionContext, PillBuddyTool, Tool, ToolDefinition, ToolError, ToolExecutor,
    ToolRegistry, ToolResponse, UiDescriptor, UiKind,
};

/// Prelude module with commonly used types.
pub mod prelude {
    pub use crate::catalog::{Catalog, CatalogStore, PillRecord};
    pub use crate::config::ServiceConfig;
    pub use crate::lookup::{LookupCriteria, LookupResult, LookupService, RetryPolicy};
    pub use crate::tool::{PillBuddyTool, Tool, ToolResponse};
    pub use std::sync::Arc;
}
