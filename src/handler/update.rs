use crate::common::value::Item;
use crate::config::HandlerConfig;
use crate::handler::{DEFAULT_BODY, Handler, HandlerResponse, RequestContext, request_key};
use crate::store::Store;

use async_trait::async_trait;
use std::sync::Arc;

/// Sets a single attribute of an existing item.
///
/// The item is named by the primary key query parameter and the body is a JSON
/// object whose first key, in document order, is the attribute to set. Requests
/// without a key or without a usable body change nothing and get [`DEFAULT_BODY`].
/// Updating an item that does not exist fails instead of creating it.
///
/// On success the body is `{"Attributes": {name: value}}`.
pub struct UpdateHandler {
    config: HandlerConfig,
    store: Arc<dyn Store>,
}

impl UpdateHandler {
    /// Build a handler for the configured table.
    pub fn new(config: HandlerConfig, store: Arc<dyn Store>) -> Self {
        Self { config, store }
    }

    /// [`crate::handler::EntryPoint`] for update.
    pub fn entry_point(config: HandlerConfig, store: Arc<dyn Store>) -> Arc<dyn Handler> {
        Arc::new(Self::new(config, store))
    }
}

#[async_trait]
impl Handler for UpdateHandler {
    async fn handle(&self, context: RequestContext) -> HandlerResponse {
        let Some(key) = request_key(&self.config, &context) else {
            return HandlerResponse::ok(DEFAULT_BODY);
        };
        let Some(body) = context.body else {
            return HandlerResponse::ok(DEFAULT_BODY);
        };
        let Ok(mut attributes) = serde_json::from_str::<Item>(&body) else {
            return HandlerResponse::ok(DEFAULT_BODY);
        };
        let Some((name, value)) = attributes.shift_remove_index(0) else {
            return HandlerResponse::ok(DEFAULT_BODY);
        };
        if !attributes.is_empty() {
            tracing::warn!(
                table = %self.config.table_name,
                attribute = %name,
                ignored = ?attributes.keys().collect::<Vec<_>>(),
                "update body has more than one attribute, only the first is applied"
            );
        }
        if name.is_empty() {
            return HandlerResponse::error("Attribute name must not be empty");
        }
        match self
            .store
            .update_attribute(&self.config.table_name, &key, &name, value)
            .await
        {
            Ok(output) => HandlerResponse::json(&output),
            Err(err) => HandlerResponse::error(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::common::value::Item;
    use crate::definition::Operation;
    use crate::handler::{DEFAULT_BODY, HandlerResponse, testing::*};
    use crate::store::Store;

    use rstest::rstest;
    use serde_json::json;

    fn item(value: serde_json::Value) -> Item {
        serde_json::from_value(value).unwrap()
    }

    async fn stored(store: &impl Store) -> Vec<Item> {
        store.scan_all(TABLE).await.unwrap()
    }

    #[rstest]
    #[case::string(json!("Room B"))]
    #[case::number(json!(12))]
    #[case::bool(json!(true))]
    #[case::null(json!(null))]
    #[case::nested(json!({"floor": 2, "wing": ["east"]}))]
    #[tokio::test]
    async fn test_update_sets_one_attribute(#[case] value: serde_json::Value) {
        let store = store().await;
        store
            .put(TABLE, item(json!({"spaceId": "s1", "name": "Room A", "seats": 4})))
            .await
            .unwrap();
        let body = json!({"name": value.clone()}).to_string();
        let response = handler(Operation::Update, store.clone())
            .handle(context(&[("spaceId", "s1")], Some(&body)))
            .await;
        let actual: serde_json::Value = serde_json::from_str(&response.body).unwrap();
        assert_eq!(actual, json!({"Attributes": {"name": value.clone()}}));
        assert_eq!(
            stored(store.as_ref()).await,
            vec![item(json!({"spaceId": "s1", "name": value, "seats": 4}))]
        );
    }

    #[rstest]
    #[case::missing_key(&[], Some(r#"{"name": "Room B"}"#))]
    #[case::other_parameter(&[("id", "s1")], Some(r#"{"name": "Room B"}"#))]
    #[case::missing_body(&[("spaceId", "s1")], None)]
    #[case::empty_body(&[("spaceId", "s1")], Some(""))]
    #[case::unparseable_body(&[("spaceId", "s1")], Some("{name"))]
    #[case::not_an_object(&[("spaceId", "s1")], Some(r#""Room B""#))]
    #[case::empty_object(&[("spaceId", "s1")], Some("{}"))]
    #[tokio::test]
    async fn test_update_without_target_is_a_no_op(
        #[case] query: &[(&str, &str)],
        #[case] body: Option<&str>,
    ) {
        let store = store().await;
        let original = item(json!({"spaceId": "s1", "name": "Room A"}));
        store.put(TABLE, original.clone()).await.unwrap();
        let response = handler(Operation::Update, store.clone())
            .handle(context(query, body))
            .await;
        assert_eq!(response, HandlerResponse::ok(DEFAULT_BODY));
        assert_eq!(stored(store.as_ref()).await, vec![original]);
    }

    #[tokio::test]
    async fn test_update_honors_first_key_in_document_order() {
        let store = store().await;
        store
            .put(TABLE, item(json!({"spaceId": "s1", "name": "Room A"})))
            .await
            .unwrap();
        let response = handler(Operation::Update, store.clone())
            .handle(context(
                &[("spaceId", "s1")],
                Some(r#"{"seats": 8, "name": "Room B", "location": "north"}"#),
            ))
            .await;
        let actual: serde_json::Value = serde_json::from_str(&response.body).unwrap();
        assert_eq!(actual, json!({"Attributes": {"seats": 8}}));
        assert_eq!(
            stored(store.as_ref()).await,
            vec![item(json!({"spaceId": "s1", "name": "Room A", "seats": 8}))]
        );
    }

    #[rstest]
    #[case::arbitrary_name("size (m2) #1", json!(30))]
    #[case::reserved_word("status", json!("open"))]
    #[case::dotted_name("a.b", json!("c"))]
    #[tokio::test]
    async fn test_update_escapes_attribute_name(
        #[case] name: &str,
        #[case] value: serde_json::Value,
    ) {
        let store = store().await;
        store.put(TABLE, item(json!({"spaceId": "s1"}))).await.unwrap();
        let body = json!({name: value.clone()}).to_string();
        let response = handler(Operation::Update, store.clone())
            .handle(context(&[("spaceId", "s1")], Some(&body)))
            .await;
        let actual: serde_json::Value = serde_json::from_str(&response.body).unwrap();
        assert_eq!(actual, json!({"Attributes": {name: value.clone()}}));
        assert_eq!(
            stored(store.as_ref()).await,
            vec![item(json!({"spaceId": "s1", name: value}))]
        );
    }

    #[rstest]
    #[case::missing_item(&[("spaceId", "s2")], r#"{"name": "Room B"}"#, "The conditional request failed")]
    #[case::empty_name(&[("spaceId", "s1")], r#"{"": "Room B"}"#, "Attribute name must not be empty")]
    #[case::key_attribute(
        &[("spaceId", "s1")],
        r#"{"spaceId": "s9"}"#,
        "One or more parameter values were invalid: Cannot update attribute spaceId. This attribute is part of the key"
    )]
    #[tokio::test]
    async fn test_update_failure_is_reported_in_body(
        #[case] query: &[(&str, &str)],
        #[case] body: &str,
        #[case] expected: &str,
    ) {
        let store = store().await;
        let original = item(json!({"spaceId": "s1", "name": "Room A"}));
        store.put(TABLE, original.clone()).await.unwrap();
        let response = handler(Operation::Update, store.clone())
            .handle(context(query, Some(body)))
            .await;
        assert_eq!(response, HandlerResponse::ok(expected));
        assert_eq!(stored(store.as_ref()).await, vec![original]);
    }
}
