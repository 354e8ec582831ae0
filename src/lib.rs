#![deny(missing_docs)]
#![deny(warnings)]

//! # Generic Table
//!
//! Provision a CRUD resource backed by a DynamoDB table, and serve it, from a
//! declarative definition.
//!
//! ## Overview
//!
//! A [`definition::ResourceDefinition`] names a table, its primary key, the
//! operations to expose and the attributes to index. Provisioning turns it into:
//! - a store with one global secondary index per indexed attribute
//! - one compute unit per enabled operation, granted only the permission it needs
//! - HTTP routes bound to those compute units, optionally behind an authorizer
//!
//! At request time the handlers answer every request with `200 OK`; store failures
//! are reported as the response body.
//!
//! ## Quick Example
//!
//! ```no_run
//! use generic_table::definition::{Operation, ResourceArgs, ResourceDefinition};
//! use generic_table::platform::local::LocalPlatform;
//! use generic_table::provision::{GenericTable, RouteBinder};
//! use generic_table::store::memory::MemoryStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let definition = ResourceDefinition::try_from(ResourceArgs {
//!     name: "SpacesTable".to_string(),
//!     primary_key: "spaceId".to_string(),
//!     operations: Operation::ALL.into(),
//!     secondary_indexes: vec!["location".to_string()],
//! })?;
//! let platform = LocalPlatform::new(MemoryStore::default());
//! let table = GenericTable::provision(&platform, definition).await?;
//! RouteBinder::new(&platform)
//!     .bind_resource("/spaces", &table.bindings, false)
//!     .await?;
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//! axum::serve(listener, platform.router().await).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`mod@definition`] - Resource definitions and their validation
//! - [`mod@provision`] - Store, handler and route provisioning
//! - [`mod@handler`] - The CRUD request handlers
//! - [`mod@store`] - The store interface, backed by DynamoDB or memory
//! - [`mod@platform`] - The hosting platform interface and a local implementation

/// Token verification for authenticated routes.
pub mod auth;

/// Common building blocks for keys, conditions, and attribute values.
pub mod common;

/// Handler configuration injected at provisioning time.
pub mod config;

/// Resource definitions.
pub mod definition;

/// Error types.
pub mod error;

/// CRUD request handlers.
pub mod handler;

/// Hosting platform interface.
pub mod platform;

/// Resource provisioning.
pub mod provision;

/// DynamoDB get and scan requests.
pub mod read;

/// Store interface and implementations.
pub mod store;

/// DynamoDB put, update and delete requests.
pub mod write;
