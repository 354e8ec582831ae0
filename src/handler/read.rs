use crate::config::HandlerConfig;
use crate::handler::{Handler, HandlerResponse, RequestContext, request_key};
use crate::store::Store;

use async_trait::async_trait;
use std::sync::Arc;

/// Fetches one item by key, or every item when no key is given.
///
/// A full read is an unbounded scan: all pages are collected and returned as one
/// JSON array. A missing item is answered with `{}` rather than a distinct status.
pub struct ReadHandler {
    config: HandlerConfig,
    store: Arc<dyn Store>,
}

impl ReadHandler {
    /// Build a handler for the configured table.
    pub fn new(config: HandlerConfig, store: Arc<dyn Store>) -> Self {
        Self { config, store }
    }

    /// [`crate::handler::EntryPoint`] for read.
    pub fn entry_point(config: HandlerConfig, store: Arc<dyn Store>) -> Arc<dyn Handler> {
        Arc::new(Self::new(config, store))
    }
}

#[async_trait]
impl Handler for ReadHandler {
    async fn handle(&self, context: RequestContext) -> HandlerResponse {
        let table = &self.config.table_name;
        let result = match request_key(&self.config, &context) {
            Some(key) => self
                .store
                .get_by_key(table, &key)
                .await
                .map(|output| HandlerResponse::json(&output)),
            None => self
                .store
                .scan_all(table)
                .await
                .map(|items| HandlerResponse::json(&items)),
        };
        result.unwrap_or_else(HandlerResponse::error)
    }
}
