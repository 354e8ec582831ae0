use crate::definition::ResourceDefinition;
use crate::error::ProvisioningError;
use crate::platform::{Platform, StoreHandle};
use crate::store::TableSchema;

use std::collections;

impl From<&ResourceDefinition> for TableSchema {
    fn from(definition: &ResourceDefinition) -> Self {
        Self {
            table_name: definition.name().to_string(),
            primary_key: definition.primary_key().to_string(),
            secondary_indexes: definition.secondary_indexes().to_vec(),
        }
    }
}

// Index declaration order is not part of a table's identity.
fn same_schema(existing: &TableSchema, requested: &TableSchema) -> bool {
    let indexes = |schema: &TableSchema| {
        schema
            .secondary_indexes
            .iter()
            .cloned()
            .collect::<collections::BTreeSet<_>>()
    };
    existing.primary_key == requested.primary_key && indexes(existing) == indexes(requested)
}

/// Creates the backing store of a resource.
///
/// Provisioning the same definition twice yields the existing store; a store with
/// the same name but another schema is a [`ProvisioningError::SchemaConflict`].
pub struct StoreProvisioner<'a> {
    platform: &'a dyn Platform,
}

impl<'a> StoreProvisioner<'a> {
    /// Provision stores on `platform`.
    pub fn new(platform: &'a dyn Platform) -> Self {
        Self { platform }
    }

    /// Create the store for `definition`, or return the one already created for it.
    pub async fn provision(
        &self,
        definition: &ResourceDefinition,
    ) -> Result<StoreHandle, ProvisioningError> {
        let schema = TableSchema::from(definition);
        match self.platform.find_store(definition.name()).await? {
            Some(existing) if same_schema(&existing.schema, &schema) => {
                tracing::debug!(table = %definition.name(), "store already provisioned");
                Ok(existing)
            }
            Some(existing) => Err(ProvisioningError::SchemaConflict {
                table: definition.name().to_string(),
                existing_primary_key: existing.schema.primary_key,
                existing_indexes: existing.schema.secondary_indexes,
            }),
            None => self.platform.create_store(schema).await,
        }
    }
}
