use crate::common::{
    key::Key,
    value::{AttributeValue, Item},
};
use crate::error::StoreOperationError;
use crate::store::{GetOutput, Store, StoreAdmin, TableSchema, WriteOutput};

use async_trait::async_trait;
use indexmap::IndexMap;
use std::collections;
use tokio::sync::RwLock;

#[derive(Debug)]
struct MemoryTable {
    schema: TableSchema,
    items: IndexMap<String, Item>,
}

impl MemoryTable {
    /// Resolve a request key to the stored key string.
    fn key<'a>(&self, key: &'a Key) -> Result<&'a str, StoreOperationError> {
        if key.name != self.schema.primary_key {
            return Err(StoreOperationError::Validation(
                "The provided key element does not match the schema".to_string(),
            ));
        }
        key_string(&self.schema.primary_key, &key.value)
    }

    fn check_indexes(&self, item: &Item) -> Result<(), StoreOperationError> {
        for index in &self.schema.secondary_indexes {
            if let Some(value) = item.get(index) {
                check_index_value(index, value)?;
            }
        }
        Ok(())
    }
}

fn key_string<'a>(name: &str, value: &'a AttributeValue) -> Result<&'a str, StoreOperationError> {
    match value {
        AttributeValue::String(value) if value.is_empty() => Err(StoreOperationError::Validation(
            format!("The AttributeValue for a key attribute cannot contain an empty string value. Key: {name}"),
        )),
        AttributeValue::String(value) => Ok(value),
        other => Err(StoreOperationError::Validation(format!(
            "Type mismatch for key {name} expected: S actual: {}",
            other.type_descriptor()
        ))),
    }
}

fn check_index_value(index: &str, value: &AttributeValue) -> Result<(), StoreOperationError> {
    match value {
        AttributeValue::String(value) if !value.is_empty() => Ok(()),
        AttributeValue::String(_) => Err(StoreOperationError::Validation(format!(
            "One or more parameter values are not valid. A value specified for a secondary index key is not supported. The AttributeValue for a key attribute cannot contain an empty string value. IndexName: {index}, IndexKey: {index}"
        ))),
        other => Err(StoreOperationError::Validation(format!(
            "Type mismatch for Index Key {index} Expected: S Actual: {} IndexName: {index}",
            other.type_descriptor()
        ))),
    }
}

/// [`Store`] keeping tables in process memory.
///
/// Mirrors the DynamoDB behaviors the handlers rely on: string partition keys,
/// replace-on-put, idempotent deletes, conditional updates of existing items only,
/// and the same validation messages. Scans return items in insertion order.
///
/// ```rust
/// use generic_table::store::{StoreAdmin, TableSchema, memory::MemoryStore};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryStore::default();
/// store
///     .create_table(&TableSchema {
///         table_name: "SpacesTable".to_string(),
///         primary_key: "spaceId".to_string(),
///         secondary_indexes: vec!["location".to_string()],
///     })
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<collections::HashMap<String, MemoryTable>>,
}

fn not_found(table: &str) -> StoreOperationError {
    StoreOperationError::ResourceNotFound(table.to_string())
}

#[async_trait]
impl Store for MemoryStore {
    #[tracing::instrument(name = "generic_table.put", skip(self, item), err)]
    async fn put(&self, table: &str, item: Item) -> Result<WriteOutput, StoreOperationError> {
        let mut tables = self.tables.write().await;
        let table = tables.get_mut(table).ok_or_else(|| not_found(table))?;
        let primary_key = &table.schema.primary_key;
        let value = item.get(primary_key).ok_or_else(|| {
            StoreOperationError::Validation(format!("Missing the key {primary_key} in the item"))
        })?;
        let key = key_string(primary_key, value)?.to_string();
        table.check_indexes(&item)?;
        table.items.insert(key, item);
        Ok(WriteOutput::default())
    }

    #[tracing::instrument(name = "generic_table.get", skip(self), err)]
    async fn get_by_key(
        &self,
        table: &str,
        key: &Key,
    ) -> Result<GetOutput, StoreOperationError> {
        let tables = self.tables.read().await;
        let table = tables.get(table).ok_or_else(|| not_found(table))?;
        let key = table.key(key)?;
        Ok(GetOutput {
            item: table.items.get(key).cloned(),
        })
    }

    #[tracing::instrument(name = "generic_table.scan", skip(self), err)]
    async fn scan_all(&self, table: &str) -> Result<Vec<Item>, StoreOperationError> {
        let tables = self.tables.read().await;
        let table = tables.get(table).ok_or_else(|| not_found(table))?;
        Ok(table.items.values().cloned().collect())
    }

    #[tracing::instrument(name = "generic_table.update", skip(self, value), err)]
    async fn update_attribute(
        &self,
        table: &str,
        key: &Key,
        name: &str,
        value: AttributeValue,
    ) -> Result<WriteOutput, StoreOperationError> {
        let mut tables = self.tables.write().await;
        let table = tables.get_mut(table).ok_or_else(|| not_found(table))?;
        let key = table.key(key)?;
        if name.is_empty() {
            return Err(StoreOperationError::Validation(
                "ExpressionAttributeNames contains invalid value: Empty attribute name".to_string(),
            ));
        }
        if name == table.schema.primary_key {
            return Err(StoreOperationError::Validation(format!(
                "Cannot update attribute {name}. This attribute is part of the key"
            )));
        }
        if table.schema.secondary_indexes.iter().any(|index| index == name) {
            check_index_value(name, &value)?;
        }
        let item = table
            .items
            .get_mut(key)
            .ok_or(StoreOperationError::ConditionalCheckFailed)?;
        item.insert(name.to_string(), value.clone());
        Ok(WriteOutput {
            attributes: Some(Item::from([(name.to_string(), value)])),
        })
    }

    #[tracing::instrument(name = "generic_table.delete", skip(self), err)]
    async fn delete(
        &self,
        table: &str,
        key: &Key,
    ) -> Result<WriteOutput, StoreOperationError> {
        let mut tables = self.tables.write().await;
        let table = tables.get_mut(table).ok_or_else(|| not_found(table))?;
        let key = table.key(key)?;
        table.items.shift_remove(key);
        Ok(WriteOutput::default())
    }
}

#[async_trait]
impl StoreAdmin for MemoryStore {
    #[tracing::instrument(name = "generic_table.create_table", skip(self), err)]
    async fn create_table(&self, schema: &TableSchema) -> Result<(), StoreOperationError> {
        let mut tables = self.tables.write().await;
        if tables.contains_key(&schema.table_name) {
            return Err(StoreOperationError::ResourceInUse(schema.table_name.clone()));
        }
        let table = MemoryTable {
            schema: schema.clone(),
            items: IndexMap::new(),
        };
        tables.insert(schema.table_name.clone(), table);
        Ok(())
    }

    async fn describe_table(&self, table: &str) -> Result<Option<TableSchema>, StoreOperationError> {
        let tables = self.tables.read().await;
        Ok(tables.get(table).map(|table| table.schema.clone()))
    }
}
