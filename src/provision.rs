//! Provisioning of a CRUD resource.
//!
//! A resource is provisioned in three steps, each one its own type:
//!
//! 1. [`StoreProvisioner`] creates the backing store,
//! 2. [`HandlerProvisioner`] registers one compute unit per enabled operation and
//!    grants it access to the store,
//! 3. [`RouteBinder`] exposes the compute units over HTTP.
//!
//! [`GenericTable::provision`] runs the first two steps.

/// Compute units and grants.
pub mod handlers;

/// HTTP route bindings.
pub mod routes;

/// Backing store creation.
pub mod store;

pub use handlers::{HandlerBinding, HandlerBindings, HandlerProvisioner};
pub use routes::RouteBinder;
pub use store::StoreProvisioner;

use crate::definition::{Operation, ResourceDefinition};
use crate::error::Error;
use crate::platform::{Platform, StoreHandle};

/// A provisioned resource: its store and one handler binding per enabled operation.
///
/// ```rust
/// use generic_table::definition::{Operation, ResourceArgs, ResourceDefinition};
/// use generic_table::platform::local::LocalPlatform;
/// use generic_table::provision::{GenericTable, RouteBinder};
/// use generic_table::store::memory::MemoryStore;
///
/// # async fn example() -> Result<(), generic_table::error::Error> {
/// let definition = ResourceDefinition::try_from(ResourceArgs {
///     name: "SpacesTable".to_string(),
///     primary_key: "spaceId".to_string(),
///     operations: Operation::ALL.into(),
///     secondary_indexes: vec!["location".to_string()],
/// })?;
/// let platform = LocalPlatform::new(MemoryStore::default());
/// let table = GenericTable::provision(&platform, definition).await?;
/// RouteBinder::new(&platform)
///     .bind_resource("/spaces", &table.bindings, false)
///     .await?;
/// let router = platform.router().await;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct GenericTable {
    /// The resource definition.
    pub definition: ResourceDefinition,
    /// The backing store.
    pub store: StoreHandle,
    /// Handler bindings, in provisioning order.
    pub bindings: HandlerBindings,
}

impl GenericTable {
    /// Provision the store and handlers of `definition` on `platform`.
    pub async fn provision(
        platform: &dyn Platform,
        definition: ResourceDefinition,
    ) -> Result<Self, Error> {
        let store = StoreProvisioner::new(platform).provision(&definition).await?;
        let bindings = HandlerProvisioner::new(platform)
            .provision(&definition, &store)
            .await?;
        tracing::info!(
            resource = %definition.name(),
            handlers = bindings.len(),
            "provisioned resource"
        );
        Ok(Self {
            definition,
            store,
            bindings,
        })
    }

    /// The binding of `operation`, if it is enabled.
    pub fn binding(&self, operation: Operation) -> Option<&HandlerBinding> {
        self.bindings.get(&operation)
    }
}
