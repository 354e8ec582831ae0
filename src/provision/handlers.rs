use crate::config::{self, HandlerConfig};
use crate::definition::{Operation, Permission, ResourceDefinition};
use crate::error::{ConfigurationError, Error, ProvisioningError};
use crate::handler::handler_spec;
use crate::platform::{ComputeHandle, Platform, StoreHandle};

use std::collections;

/// One operation of a resource wired to its compute unit and store.
#[derive(Clone, Debug, PartialEq)]
pub struct HandlerBinding {
    /// The operation served.
    pub operation: Operation,
    /// The resource name.
    pub resource: String,
    /// The compute unit serving the operation.
    pub compute: ComputeHandle,
    /// The store the compute unit is granted on.
    pub store: StoreHandle,
    /// The granted permission.
    pub permission: Permission,
}

/// Handler bindings of one resource, in provisioning order.
pub type HandlerBindings = collections::BTreeMap<Operation, HandlerBinding>;

/// Registers one compute unit per enabled operation and grants it the least
/// permission it needs on the resource's store.
pub struct HandlerProvisioner<'a> {
    platform: &'a dyn Platform,
}

impl<'a> HandlerProvisioner<'a> {
    /// Provision handlers on `platform`.
    pub fn new(platform: &'a dyn Platform) -> Self {
        Self { platform }
    }

    /// Provision the handlers of `definition` against `store`.
    ///
    /// Handler identities owned by another resource are rejected before anything is
    /// registered. Compute units already registered for this resource are reused and
    /// grants already held are not applied again. A platform failure aborts with
    /// [`ProvisioningError::Handlers`], listing the compute units registered by this
    /// call so the caller can remove them.
    pub async fn provision(
        &self,
        definition: &ResourceDefinition,
        store: &StoreHandle,
    ) -> Result<HandlerBindings, Error> {
        let environment = HandlerConfig {
            table_name: store.name().to_string(),
            primary_key: definition.primary_key().to_string(),
        }
        .to_environment();

        let mut existing = collections::HashMap::new();
        for operation in definition.operations() {
            let identity = definition.handler_identity(operation);
            let found = self
                .platform
                .find_compute(&identity)
                .await
                .map_err(|err| ProvisioningError::Handlers {
                    operation,
                    reason: err.to_string(),
                    registered: vec![],
                })?;
            if let Some(compute) = found {
                if compute.environment != environment {
                    let table = compute
                        .environment
                        .get(config::TABLE_NAME)
                        .cloned()
                        .unwrap_or_default();
                    return Err(ConfigurationError::DuplicateHandlerIdentity { identity, table }.into());
                }
                existing.insert(operation, compute);
            }
        }

        let mut registered = Vec::new();
        let mut bindings = HandlerBindings::new();
        for operation in definition.operations() {
            let spec = handler_spec(operation);
            let compute = match existing.remove(&operation) {
                Some(compute) => {
                    tracing::debug!(identity = %compute.identity, "reusing compute");
                    compute
                }
                None => {
                    let identity = definition.handler_identity(operation);
                    let registration = self
                        .platform
                        .register_compute(&identity, spec.construct, environment.clone())
                        .await;
                    match registration {
                        Ok(compute) => {
                            registered.push(compute.clone());
                            compute
                        }
                        Err(err) => return Err(handlers_error(operation, err, registered)),
                    }
                }
            };
            if let Err(err) = self.grant(&compute, store, spec.permission).await {
                return Err(handlers_error(operation, err, registered));
            }
            let binding = HandlerBinding {
                operation,
                resource: definition.name().to_string(),
                compute,
                store: store.clone(),
                permission: spec.permission,
            };
            bindings.insert(operation, binding);
        }
        Ok(bindings)
    }

    async fn grant(
        &self,
        compute: &ComputeHandle,
        store: &StoreHandle,
        permission: Permission,
    ) -> Result<(), ProvisioningError> {
        if self.platform.has_grant(compute, store, permission).await? {
            tracing::debug!(identity = %compute.identity, %permission, "grant already held");
            return Ok(());
        }
        self.platform.grant(compute, store, permission).await
    }
}

fn handlers_error(
    operation: Operation,
    err: ProvisioningError,
    registered: Vec<ComputeHandle>,
) -> Error {
    tracing::error!(%operation, registered = registered.len(), "handler provisioning failed: {err}");
    ProvisioningError::Handlers {
        operation,
        reason: err.to_string(),
        registered,
    }
    .into()
}
