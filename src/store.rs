//! Store interface consumed by the handlers and the platform.
//!
//! [`Store`] is the request-time data plane: every method performs exactly one
//! round trip against one table. [`StoreAdmin`] is the provisioning-time control
//! plane used to create and look up tables.

/// DynamoDB-backed store.
pub mod dynamodb;

/// In-process store with DynamoDB semantics.
pub mod memory;

use crate::common::{
    key::Key,
    value::{AttributeValue, Item},
};
use crate::error::StoreOperationError;

use async_trait::async_trait;
use serde::Serialize;

/// Schema of one table: the string partition key plus one global secondary index
/// per declared attribute, each named after its attribute.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct TableSchema {
    /// Table name.
    pub table_name: String,
    /// Partition key attribute name.
    pub primary_key: String,
    /// Indexed attribute names.
    pub secondary_indexes: Vec<String>,
}

/// Acknowledgement of a write.
///
/// Serializes with the store's field names; a plain put or delete serializes as `{}`.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct WriteOutput {
    /// Attributes returned by the write, if it asked for any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Item>,
}

/// Result of a single-item lookup; serializes as `{}` when nothing is stored.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetOutput {
    /// The stored item, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<Item>,
}

/// Item-level operations on existing tables.
#[async_trait]
pub trait Store: Send + Sync {
    /// Insert or replace an item.
    async fn put(&self, table: &str, item: Item) -> Result<WriteOutput, StoreOperationError>;

    /// Fetch one item by primary key.
    async fn get_by_key(
        &self,
        table: &str,
        key: &Key,
    ) -> Result<GetOutput, StoreOperationError>;

    /// Fetch every item in the table, unbounded.
    async fn scan_all(&self, table: &str) -> Result<Vec<Item>, StoreOperationError>;

    /// Set one attribute on an existing item and return the new value of just that
    /// attribute. Fails with [`StoreOperationError::ConditionalCheckFailed`] when the
    /// item does not exist.
    async fn update_attribute(
        &self,
        table: &str,
        key: &Key,
        name: &str,
        value: AttributeValue,
    ) -> Result<WriteOutput, StoreOperationError>;

    /// Delete one item; deleting a missing key succeeds.
    async fn delete(
        &self,
        table: &str,
        key: &Key,
    ) -> Result<WriteOutput, StoreOperationError>;
}

/// Table lifecycle operations.
#[async_trait]
pub trait StoreAdmin: Send + Sync {
    /// Create a table; fails with [`StoreOperationError::ResourceInUse`] if it exists.
    async fn create_table(&self, schema: &TableSchema) -> Result<(), StoreOperationError>;

    /// Describe an existing table, `None` if there is no such table.
    async fn describe_table(&self, table: &str) -> Result<Option<TableSchema>, StoreOperationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn test_empty_outputs_serialize_as_empty_objects() {
        assert_eq!(serde_json::to_value(WriteOutput::default()).unwrap(), json!({}));
        assert_eq!(serde_json::to_value(GetOutput::default()).unwrap(), json!({}));
    }

    #[test]
    fn test_outputs_use_store_field_names() {
        let attributes = Item::from([("name".to_string(), AttributeValue::from("Room B"))]);
        let output = WriteOutput {
            attributes: Some(attributes.clone()),
        };
        assert_eq!(
            serde_json::to_value(output).unwrap(),
            json!({"Attributes": {"name": "Room B"}})
        );
        let output = GetOutput {
            item: Some(attributes),
        };
        assert_eq!(
            serde_json::to_value(output).unwrap(),
            json!({"Item": {"name": "Room B"}})
        );
    }
}
