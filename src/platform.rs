//! Hosting platform interface used at provisioning time.
//!
//! A [`Platform`] creates stores, registers compute units, grants store permissions
//! to compute units and binds HTTP routes to them. Provisioners only talk to this
//! trait; [`local::LocalPlatform`] hosts everything in process.

/// In-process platform serving routes through axum.
pub mod local;

use crate::config::HandlerEnvironment;
use crate::definition::Permission;
use crate::error::ProvisioningError;
use crate::handler::EntryPoint;
use crate::store::TableSchema;

use async_trait::async_trait;
use axum::http::Method;

/// A provisioned store.
#[derive(Clone, Debug, PartialEq)]
pub struct StoreHandle {
    /// The schema the store was created with.
    pub schema: TableSchema,
}

impl StoreHandle {
    /// The store identity, its table name.
    pub fn name(&self) -> &str {
        &self.schema.table_name
    }
}

/// A registered compute unit.
#[derive(Clone, Debug, PartialEq)]
pub struct ComputeHandle {
    /// Deployment-wide unique identity.
    pub identity: String,
    /// The environment injected at registration.
    pub environment: HandlerEnvironment,
}

/// Authorization settings of a route.
#[derive(Clone, Debug, PartialEq)]
pub struct AuthConfig {
    /// Name of an authorizer known to the platform.
    pub authorizer: String,
}

/// Whether a route can be bound, as judged by the platform's router.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RouteStatus {
    /// The route can be bound.
    Available,
    /// The method is already bound on this path.
    Bound,
    /// The router cannot accept the path, for the given reason.
    Invalid(String),
}

/// Resource creation APIs of the hosting platform.
#[async_trait]
pub trait Platform: Send + Sync {
    /// Look up an existing store by name.
    async fn find_store(&self, name: &str) -> Result<Option<StoreHandle>, ProvisioningError>;

    /// Create a store.
    async fn create_store(&self, schema: TableSchema) -> Result<StoreHandle, ProvisioningError>;

    /// Look up a registered compute unit by identity.
    async fn find_compute(&self, identity: &str)
    -> Result<Option<ComputeHandle>, ProvisioningError>;

    /// Register a compute unit running `entry_point` with `environment`.
    async fn register_compute(
        &self,
        identity: &str,
        entry_point: EntryPoint,
        environment: HandlerEnvironment,
    ) -> Result<ComputeHandle, ProvisioningError>;

    /// Whether `compute` already holds `permission` on `store`.
    async fn has_grant(
        &self,
        compute: &ComputeHandle,
        store: &StoreHandle,
        permission: Permission,
    ) -> Result<bool, ProvisioningError>;

    /// Give `compute` `permission` on `store`.
    async fn grant(
        &self,
        compute: &ComputeHandle,
        store: &StoreHandle,
        permission: Permission,
    ) -> Result<(), ProvisioningError>;

    /// Check `method` on `path` against the routes bound so far.
    async fn route_status(
        &self,
        path: &str,
        method: &Method,
    ) -> Result<RouteStatus, ProvisioningError>;

    /// Route `method` requests on `path` to `compute`, behind `auth` if given.
    async fn bind_route(
        &self,
        path: &str,
        method: Method,
        compute: &ComputeHandle,
        auth: Option<AuthConfig>,
    ) -> Result<(), ProvisioningError>;
}
