use crate::config::HandlerConfig;
use crate::handler::{DEFAULT_BODY, Handler, HandlerResponse, RequestContext, request_key};
use crate::store::Store;

use async_trait::async_trait;
use std::sync::Arc;

/// Deletes the item named by the primary key query parameter.
pub struct DeleteHandler {
    config: HandlerConfig,
    store: Arc<dyn Store>,
}

impl DeleteHandler {
    /// Build a handler for the configured table.
    pub fn new(config: HandlerConfig, store: Arc<dyn Store>) -> Self {
        Self { config, store }
    }

    /// [`crate::handler::EntryPoint`] for delete.
    pub fn entry_point(config: HandlerConfig, store: Arc<dyn Store>) -> Arc<dyn Handler> {
        Arc::new(Self::new(config, store))
    }
}

#[async_trait]
impl Handler for DeleteHandler {
    async fn handle(&self, context: RequestContext) -> HandlerResponse {
        let Some(key) = request_key(&self.config, &context) else {
            return HandlerResponse::ok(DEFAULT_BODY);
        };
        match self.store.delete(&self.config.table_name, &key).await {
            Ok(output) => HandlerResponse::json(&output),
            Err(err) => HandlerResponse::error(err),
        }
    }
}
