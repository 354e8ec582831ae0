//! DynamoDB write requests issued by [`crate::store::dynamodb::DynamoStore`].
//!
//! Attribute names never appear in expressions directly; they are bound through
//! expression attribute name placeholders.

/// Arguments and builder settings shared by every write request.
pub mod common;

/// Delete by primary key.
pub mod delete_item;

/// Insert or replace a whole item.
pub mod put_item;

/// Set one attribute of an existing item.
pub mod update_item;
