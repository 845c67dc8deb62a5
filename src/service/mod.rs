//! Hosting layer: exposes the registered tools over JSON-RPC.

pub mod client;
pub mod http;
pub mod rpc;
pub mod stdio;

pub use client::{ClientError, ServiceClient, ServiceClientBuilder};
pub use http::{bind, router, serve_http};
pub use rpc::{CallToolParams, RpcError, RpcHandler, RpcRequest, RpcResponse};
pub use stdio::{serve_lines, serve_stdio};

use std::sync::Arc;

use crate::catalog::Catalog;
use crate::config::ServiceConfig;
use crate::lookup::LookupService;
use crate::tool::{PillBuddyTool, ToolExecutor, ToolRegistry};

/// Builds the tool registry for `catalog`, applying the configured retry.
pub fn build_registry(config: &ServiceConfig, catalog: Arc<dyn Catalog>) -> ToolRegistry {
    let mut service = LookupService::new(catalog);
    if let Some(policy) = config.retry.policy() {
        service = service.with_retry(policy);
    }

    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(PillBuddyTool::new(service)));
    registry
}

/// Builds the JSON-RPC handler serving `catalog`.
pub fn build_handler(config: &ServiceConfig, catalog: Arc<dyn Catalog>) -> RpcHandler {
    let registry = build_registry(config, catalog);
    RpcHandler::new(
        ToolExecutor::new(Arc::new(registry)),
        config.metadata.clone(),
    )
}
