use crate::common::{key::Key, value::Item};
use crate::error::StoreOperationError;
use crate::read;
use crate::store::GetOutput;

use aws_sdk_dynamodb::{Client, types};
use serde_dynamo::from_item;
use std::collections;

#[derive(Clone, Debug, Default, PartialEq)]
struct GetItemInput {
    key: collections::HashMap<String, types::AttributeValue>,
    read_args: read::common::ReadArgs,
}

/// Get item request.
///
/// ```rust,no_run
/// use aws_sdk_dynamodb::Client;
/// use generic_table::{common::key::Key, read};
///
/// # async fn example(client: &Client) -> Result<(), Box<dyn std::error::Error>> {
/// let get_item = read::get_item::GetItem {
///     key: Key::new("spaceId", "s1"),
///     read_args: read::common::ReadArgs {
///         consistent_read: Some(true),
///         table_name: "SpacesTable".to_string(),
///     },
/// };
/// let output = get_item.send(client).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GetItem {
    /// The primary key of the item to fetch.
    pub key: Key,
    /// Table name and consistency.
    pub read_args: read::common::ReadArgs,
}

impl TryFrom<GetItem> for GetItemInput {
    type Error = serde_dynamo::Error;

    fn try_from(get_item: GetItem) -> Result<Self, Self::Error> {
        Ok(Self {
            key: get_item.key.try_into()?,
            read_args: get_item.read_args,
        })
    }
}

impl GetItem {
    /// Execute the request; a missing item yields an empty [`GetOutput`].
    pub async fn send(self, client: &Client) -> Result<GetOutput, StoreOperationError> {
        let input = GetItemInput::try_from(self)?;
        let builder = client.get_item().set_key(Some(input.key));
        let output = crate::apply_read_operation!(builder, input.read_args)
            .send()
            .await?;
        let item: Option<Item> = output.item.map(from_item).transpose()?;
        Ok(GetOutput { item })
    }
}
