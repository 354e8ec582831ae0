//! Error taxonomy.
//!
//! Provisioning-time failures ([`ConfigurationError`], [`ProvisioningError`]) are
//! fatal and returned to the deployer. Request-time failures ([`StoreOperationError`])
//! are rendered into the response body by the handlers.

use crate::{definition, platform};

use aws_sdk_dynamodb::error::{self, ProvideErrorMetadata};
use thiserror::Error;

/// Invalid resource definition or wiring, detected before anything is created.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ConfigurationError {
    /// The resource name is empty.
    #[error("resource name must not be empty")]
    EmptyName,
    /// The primary key attribute name is empty.
    #[error("primary key must not be empty")]
    EmptyPrimaryKey,
    /// A secondary index attribute name is empty.
    #[error("secondary index name must not be empty")]
    EmptyIndex,
    /// A secondary index is declared twice.
    #[error("duplicate secondary index: {0}")]
    DuplicateIndex(String),
    /// A secondary index reuses the primary key attribute.
    #[error("secondary index {0} is the primary key")]
    IndexIsPrimaryKey(String),
    /// A handler identity is already taken by another resource.
    #[error("handler identity {identity} is already registered for table {table}")]
    DuplicateHandlerIdentity {
        /// The colliding identity.
        identity: String,
        /// The table the existing handler is wired to.
        table: String,
    },
    /// The `(path, method)` pair is already bound.
    #[error("route {method} {path} is already bound")]
    DuplicateRoute {
        /// The HTTP method.
        method: String,
        /// The resource path.
        path: String,
    },
    /// The path is not absolute or the platform's router cannot accept it.
    #[error("invalid route path {path}: {reason}")]
    InvalidPath {
        /// The resource path.
        path: String,
        /// Why it was refused.
        reason: String,
    },
    /// An authenticated route was requested but no authorizer is configured.
    #[error("route {method} {path} requires authorization but no authorizer is configured")]
    MissingAuthorizer {
        /// The HTTP method.
        method: String,
        /// The resource path.
        path: String,
    },
    /// A handler environment lacks a required variable.
    #[error("missing environment variable {0}")]
    MissingEnvironment(&'static str),
}

/// The hosting platform rejected a create, grant, or bind call.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ProvisioningError {
    /// Generic rejection from the platform.
    #[error("{operation} rejected: {reason}")]
    Rejected {
        /// The platform call that failed.
        operation: &'static str,
        /// The platform's message.
        reason: String,
    },
    /// A store with the same name exists with a different schema.
    #[error(
        "table {table} already exists with primary key {existing_primary_key} and indexes {existing_indexes:?}"
    )]
    SchemaConflict {
        /// The table name.
        table: String,
        /// The recorded primary key.
        existing_primary_key: String,
        /// The recorded secondary indexes.
        existing_indexes: Vec<String>,
    },
    /// The authorizer named by a route is unknown to the platform.
    #[error("unknown authorizer: {0}")]
    UnknownAuthorizer(String),
    /// Handler provisioning stopped part way through.
    #[error("provisioning the {operation} handler failed: {reason}")]
    Handlers {
        /// The operation whose handler failed.
        operation: definition::Operation,
        /// The underlying failure.
        reason: String,
        /// Compute units registered before the failure, for rollback.
        registered: Vec<platform::ComputeHandle>,
    },
}

/// Request-time failure talking to the store.
///
/// Display strings follow the store's own wording since they end up verbatim in
/// response bodies.
#[derive(Debug, Error)]
pub enum StoreOperationError {
    /// The table does not exist.
    #[error("Requested resource not found: Table: {0} not found")]
    ResourceNotFound(String),
    /// The table already exists.
    #[error("Table already exists: {0}")]
    ResourceInUse(String),
    /// A condition expression evaluated to false.
    #[error("The conditional request failed")]
    ConditionalCheckFailed,
    /// The request was rejected by store-side validation.
    #[error("One or more parameter values were invalid: {0}")]
    Validation(String),
    /// The calling handler lacks the grant for this operation.
    #[error("User: {identity} is not authorized to perform: {action} on resource: table/{table}")]
    AccessDenied {
        /// The compute identity.
        identity: String,
        /// The attempted store action.
        action: &'static str,
        /// The table name.
        table: String,
    },
    /// Item conversion failed.
    #[error(transparent)]
    Serialization(#[from] serde_dynamo::Error),
    /// Any other service failure.
    #[error("{0}")]
    Service(String),
}

impl<E, R> From<error::SdkError<E, R>> for StoreOperationError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    fn from(err: error::SdkError<E, R>) -> Self {
        let message = err
            .message()
            .map(ToOwned::to_owned)
            .unwrap_or_else(|| error::DisplayErrorContext(&err).to_string());
        match err.code() {
            Some("ConditionalCheckFailedException") => Self::ConditionalCheckFailed,
            _ => Self::Service(message),
        }
    }
}

/// Any provisioning-time failure.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum Error {
    /// Bad definition or wiring.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    /// Platform rejection.
    #[error(transparent)]
    Provisioning(#[from] ProvisioningError),
}
