use crate::common::value::Item;
use crate::config::HandlerConfig;
use crate::handler::{Handler, HandlerResponse, RequestContext};
use crate::store::Store;

use async_trait::async_trait;
use std::sync::Arc;

/// Inserts the request body as a new item, replacing any item with the same key.
///
/// No key is generated: the body must carry the primary key attribute itself.
pub struct CreateHandler {
    config: HandlerConfig,
    store: Arc<dyn Store>,
}

impl CreateHandler {
    /// Build a handler for the configured table.
    pub fn new(config: HandlerConfig, store: Arc<dyn Store>) -> Self {
        Self { config, store }
    }

    /// [`crate::handler::EntryPoint`] for create.
    pub fn entry_point(config: HandlerConfig, store: Arc<dyn Store>) -> Arc<dyn Handler> {
        Arc::new(Self::new(config, store))
    }
}

#[async_trait]
impl Handler for CreateHandler {
    async fn handle(&self, context: RequestContext) -> HandlerResponse {
        let Some(body) = context.body.filter(|body| !body.is_empty()) else {
            return HandlerResponse::error("Missing request body");
        };
        let item: Item = match serde_json::from_str(&body) {
            Ok(item) => item,
            Err(err) => return HandlerResponse::error(err),
        };
        match self.store.put(&self.config.table_name, item).await {
            Ok(output) => HandlerResponse::json(&output),
            Err(err) => HandlerResponse::error(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::definition::Operation;
    use crate::handler::{HandlerResponse, testing::*};
    use crate::store::Store;

    use axum::http::StatusCode;
    use rstest::rstest;
    use serde_json::json;

    #[tokio::test]
    async fn test_create_then_read_returns_created_item() {
        let store = store().await;
        let created = json!({"spaceId": "s1", "name": "Room A", "seats": 4, "tags": ["quiet"]});
        let response = handler(Operation::Create, store.clone())
            .handle(context(&[], Some(&created.to_string())))
            .await;
        assert_eq!(response, HandlerResponse::ok("{}"));

        let response = handler(Operation::Read, store)
            .handle(context(&[("spaceId", "s1")], None))
            .await;
        let body: serde_json::Value = serde_json::from_str(&response.body).unwrap();
        assert_eq!(body["Item"], created);
    }

    #[rstest]
    #[case::missing_body(None, "Missing request body")]
    #[case::empty_body(Some(""), "Missing request body")]
    #[case::not_an_object(Some("[1, 2]"), "invalid type: sequence, expected a map")]
    #[case::missing_key(
        Some(r#"{"name": "Room A"}"#),
        "One or more parameter values were invalid: Missing the key spaceId in the item"
    )]
    #[case::number_key(
        Some(r#"{"spaceId": 1}"#),
        "One or more parameter values were invalid: Type mismatch for key spaceId expected: S actual: N"
    )]
    #[tokio::test]
    async fn test_create_failure_is_reported_in_body(
        #[case] body: Option<&str>,
        #[case] expected: &str,
    ) {
        let store = store().await;
        let response = handler(Operation::Create, store.clone())
            .handle(context(&[], body))
            .await;
        assert_eq!(response.status, StatusCode::OK);
        assert!(response.body.starts_with(expected), "{}", response.body);
        assert!(store.scan_all(TABLE).await.unwrap().is_empty());
    }
}
