use crate::common::{
    condition,
    key::Key,
    value::{AttributeValue, Item},
};
use crate::error::StoreOperationError;
use crate::store::{GetOutput, Store, StoreAdmin, TableSchema, WriteOutput};
use crate::{read, write};

use async_trait::async_trait;
use aws_sdk_dynamodb::{Client, error::BuildError, types};

/// [`Store`] backed by DynamoDB.
///
/// ```rust,no_run
/// use aws_sdk_dynamodb::Client;
/// use generic_table::store::dynamodb::DynamoStore;
///
/// # fn example(client: Client) {
/// let store = DynamoStore::new(client).with_consistent_reads(false);
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct DynamoStore {
    client: Client,
    consistent_reads: bool,
}

impl DynamoStore {
    /// Wrap a configured client. Reads are strongly consistent by default.
    pub fn new(client: Client) -> Self {
        Self {
            client,
            consistent_reads: true,
        }
    }

    /// Toggle strongly consistent reads for gets and scans.
    pub fn with_consistent_reads(mut self, consistent_reads: bool) -> Self {
        self.consistent_reads = consistent_reads;
        self
    }

    fn read_args(&self, table: &str) -> read::common::ReadArgs {
        read::common::ReadArgs {
            consistent_read: Some(self.consistent_reads),
            table_name: table.to_string(),
        }
    }

    fn write_args(
        &self,
        table: &str,
        condition: Option<condition::Conditions>,
    ) -> write::common::WriteArgs {
        write::common::WriteArgs {
            condition,
            return_values: None,
            table_name: table.to_string(),
        }
    }
}

fn string_attribute(name: &str) -> Result<types::AttributeDefinition, BuildError> {
    types::AttributeDefinition::builder()
        .attribute_name(name)
        .attribute_type(types::ScalarAttributeType::S)
        .build()
}

fn hash_key(name: &str) -> Result<types::KeySchemaElement, BuildError> {
    types::KeySchemaElement::builder()
        .attribute_name(name)
        .key_type(types::KeyType::Hash)
        .build()
}

fn global_secondary_index(name: &str) -> Result<types::GlobalSecondaryIndex, BuildError> {
    let projection = types::Projection::builder()
        .projection_type(types::ProjectionType::All)
        .build();
    types::GlobalSecondaryIndex::builder()
        .index_name(name)
        .key_schema(hash_key(name)?)
        .projection(projection)
        .build()
}

#[async_trait]
impl Store for DynamoStore {
    #[tracing::instrument(name = "generic_table.put", skip(self, item), err)]
    async fn put(&self, table: &str, item: Item) -> Result<WriteOutput, StoreOperationError> {
        write::put_item::PutItem {
            item,
            write_args: self.write_args(table, None),
        }
        .send(&self.client)
        .await
    }

    #[tracing::instrument(name = "generic_table.get", skip(self), err)]
    async fn get_by_key(
        &self,
        table: &str,
        key: &Key,
    ) -> Result<GetOutput, StoreOperationError> {
        read::get_item::GetItem {
            key: key.clone(),
            read_args: self.read_args(table),
        }
        .send(&self.client)
        .await
    }

    #[tracing::instrument(name = "generic_table.scan", skip(self), err)]
    async fn scan_all(&self, table: &str) -> Result<Vec<Item>, StoreOperationError> {
        read::scan::Scan {
            read_args: self.read_args(table),
        }
        .send(&self.client)
        .await
    }

    #[tracing::instrument(name = "generic_table.update", skip(self, value), err)]
    async fn update_attribute(
        &self,
        table: &str,
        key: &Key,
        name: &str,
        value: AttributeValue,
    ) -> Result<WriteOutput, StoreOperationError> {
        let exists = condition::Conditions(vec![condition::Condition::Exists(key.name.clone())]);
        let mut write_args = self.write_args(table, Some(exists));
        write_args.return_values = Some(types::ReturnValue::UpdatedNew);
        write::update_item::UpdateItem {
            key: key.clone(),
            set: write::update_item::SetAttribute {
                name: name.to_string(),
                value,
            },
            write_args,
        }
        .send(&self.client)
        .await
    }

    #[tracing::instrument(name = "generic_table.delete", skip(self), err)]
    async fn delete(
        &self,
        table: &str,
        key: &Key,
    ) -> Result<WriteOutput, StoreOperationError> {
        write::delete_item::DeleteItem {
            key: key.clone(),
            write_args: self.write_args(table, None),
        }
        .send(&self.client)
        .await
    }
}

#[async_trait]
impl StoreAdmin for DynamoStore {
    #[tracing::instrument(name = "generic_table.create_table", skip(self), err)]
    async fn create_table(&self, schema: &TableSchema) -> Result<(), StoreOperationError> {
        let build = |err: BuildError| StoreOperationError::Service(err.to_string());
        let mut builder = self
            .client
            .create_table()
            .table_name(&schema.table_name)
            .billing_mode(types::BillingMode::PayPerRequest)
            .attribute_definitions(string_attribute(&schema.primary_key).map_err(build)?)
            .key_schema(hash_key(&schema.primary_key).map_err(build)?);
        for index in &schema.secondary_indexes {
            builder = builder
                .attribute_definitions(string_attribute(index).map_err(build)?)
                .global_secondary_indexes(global_secondary_index(index).map_err(build)?);
        }
        match builder.send().await {
            Ok(_) => Ok(()),
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(|err| err.is_resource_in_use_exception()) =>
            {
                Err(StoreOperationError::ResourceInUse(schema.table_name.clone()))
            }
            Err(err) => Err(err.into()),
        }
    }

    #[tracing::instrument(name = "generic_table.describe_table", skip(self), err)]
    async fn describe_table(&self, table: &str) -> Result<Option<TableSchema>, StoreOperationError> {
        let output = match self.client.describe_table().table_name(table).send().await {
            Ok(output) => output,
            Err(err) => {
                if err
                    .as_service_error()
                    .is_some_and(|err| err.is_resource_not_found_exception())
                {
                    return Ok(None);
                }
                return Err(err.into());
            }
        };
        let Some(description) = output.table else {
            return Ok(None);
        };
        let primary_key = description
            .key_schema()
            .iter()
            .find(|element| element.key_type() == &types::KeyType::Hash)
            .map(|element| element.attribute_name().to_string())
            .unwrap_or_default();
        let secondary_indexes = description
            .global_secondary_indexes()
            .iter()
            .filter_map(|index| index.index_name().map(ToString::to_string))
            .collect();
        let schema = TableSchema {
            table_name: table.to_string(),
            primary_key,
            secondary_indexes,
        };
        Ok(Some(schema))
    }
}
