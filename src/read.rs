//! DynamoDB read requests issued by [`crate::store::dynamodb::DynamoStore`].
//!
//! Reads are strongly consistent unless the store is configured otherwise.

/// Arguments shared by every read request.
pub mod common;

/// Single-item lookup by primary key.
pub mod get_item;

/// Paginated full-table scan.
pub mod scan;
