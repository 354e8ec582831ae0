//! Request-time CRUD handlers.
//!
//! Every handler is constructed once from a [`HandlerConfig`] and a [`Store`], then
//! invoked per request with a [`RequestContext`]. Handlers always answer
//! `200 OK`: store failures are reported as the response body text.
//!
//! The handlers a resource can expose are listed in [`HANDLER_TABLE`], which pairs
//! each [`Operation`] with the permission its handler needs and its constructor.

/// Create handler.
pub mod create;

/// Delete handler.
pub mod delete;

/// Read handler.
pub mod read;

/// Update handler, the partial-update protocol.
pub mod update;

use crate::auth::Principal;
use crate::common::key::Key;
use crate::config::HandlerConfig;
use crate::definition::{Operation, Permission};
use crate::store::Store;

use async_trait::async_trait;
use axum::http::{Method, StatusCode};
use serde::Serialize;
use std::{collections, fmt, sync::Arc};

/// Body returned when a request carries nothing to act on.
pub const DEFAULT_BODY: &str = "Hello from DynamoDB";

/// One incoming request, as seen by a handler.
#[derive(Clone, Debug, PartialEq)]
pub struct RequestContext {
    /// The HTTP method.
    pub method: Method,
    /// Parameters captured from the route path.
    pub path_parameters: collections::HashMap<String, String>,
    /// Decoded query string parameters.
    pub query_parameters: collections::HashMap<String, String>,
    /// The raw request body, if any.
    pub body: Option<String>,
    /// The caller, on authenticated routes.
    pub principal: Option<Principal>,
}

impl Default for RequestContext {
    fn default() -> Self {
        Self {
            method: Method::GET,
            path_parameters: collections::HashMap::new(),
            query_parameters: collections::HashMap::new(),
            body: None,
            principal: None,
        }
    }
}

/// What a handler answers.
#[derive(Clone, Debug, PartialEq)]
pub struct HandlerResponse {
    /// Always `200 OK`.
    pub status: StatusCode,
    /// JSON document on success, error text on failure.
    pub body: String,
}

impl HandlerResponse {
    pub(crate) fn ok(body: impl Into<String>) -> Self {
        Self {
            status: StatusCode::OK,
            body: body.into(),
        }
    }

    pub(crate) fn json<T: Serialize>(value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(body) => Self::ok(body),
            Err(err) => Self::error(err),
        }
    }

    pub(crate) fn error(err: impl fmt::Display) -> Self {
        Self::ok(err.to_string())
    }
}

/// A compute unit serving one operation of one resource.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Serve one request.
    async fn handle(&self, context: RequestContext) -> HandlerResponse;
}

/// Constructor registered with the platform for a compute unit.
pub type EntryPoint = fn(HandlerConfig, Arc<dyn Store>) -> Arc<dyn Handler>;

/// One row of the handler table.
#[derive(Clone, Copy, Debug)]
pub struct HandlerSpec {
    /// The operation served.
    pub operation: Operation,
    /// The store permission the handler needs.
    pub permission: Permission,
    /// Builds the handler.
    pub construct: EntryPoint,
}

/// Handler for every operation, in provisioning order.
pub const HANDLER_TABLE: [HandlerSpec; 4] = [
    HandlerSpec {
        operation: Operation::Create,
        permission: Permission::Write,
        construct: create::CreateHandler::entry_point,
    },
    HandlerSpec {
        operation: Operation::Read,
        permission: Permission::Read,
        construct: read::ReadHandler::entry_point,
    },
    HandlerSpec {
        operation: Operation::Update,
        permission: Permission::Write,
        construct: update::UpdateHandler::entry_point,
    },
    HandlerSpec {
        operation: Operation::Delete,
        permission: Permission::Write,
        construct: delete::DeleteHandler::entry_point,
    },
];

/// The handler table row for `operation`.
pub fn handler_spec(operation: Operation) -> &'static HandlerSpec {
    let index = match operation {
        Operation::Create => 0,
        Operation::Read => 1,
        Operation::Update => 2,
        Operation::Delete => 3,
    };
    &HANDLER_TABLE[index]
}

/// The item key named by the request's primary key query parameter.
pub(crate) fn request_key(config: &HandlerConfig, context: &RequestContext) -> Option<Key> {
    let value = context.query_parameters.get(&config.primary_key)?;
    Some(Key::new(&config.primary_key, value.as_str()))
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::store::{StoreAdmin, TableSchema, memory::MemoryStore};

    pub(crate) const TABLE: &str = "SpacesTable";

    pub(crate) fn config() -> HandlerConfig {
        HandlerConfig {
            table_name: TABLE.to_string(),
            primary_key: "spaceId".to_string(),
        }
    }

    pub(crate) async fn store() -> Arc<MemoryStore> {
        let store = MemoryStore::default();
        store
            .create_table(&TableSchema {
                table_name: TABLE.to_string(),
                primary_key: "spaceId".to_string(),
                secondary_indexes: vec!["location".to_string()],
            })
            .await
            .unwrap();
        Arc::new(store)
    }

    pub(crate) fn context(query: &[(&str, &str)], body: Option<&str>) -> RequestContext {
        RequestContext {
            query_parameters: query
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
            body: body.map(ToString::to_string),
            ..Default::default()
        }
    }

    pub(crate) fn handler(operation: Operation, store: Arc<MemoryStore>) -> Arc<dyn Handler> {
        (handler_spec(operation).construct)(config(), store)
    }
}
