use crate::common::value::Item;
use crate::error::StoreOperationError;
use crate::store::WriteOutput;
use crate::write;

use aws_sdk_dynamodb::{Client, types};
use serde_dynamo::to_item;
use std::collections;

#[derive(Debug, PartialEq)]
struct PutItemInput {
    item: collections::HashMap<String, types::AttributeValue>,
    write_input: write::common::WriteInput,
}

/// Put item request: insert an item, replacing any item with the same key.
///
/// ```rust,no_run
/// use aws_sdk_dynamodb::Client;
/// use generic_table::{common::value::Item, write};
/// use serde_json::json;
///
/// # async fn example(client: &Client) -> Result<(), Box<dyn std::error::Error>> {
/// let item: Item = serde_json::from_value(json!({"spaceId": "s1", "name": "Room A"}))?;
/// let put_item = write::put_item::PutItem {
///     item,
///     write_args: write::common::WriteArgs {
///         table_name: "SpacesTable".to_string(),
///         ..Default::default()
///     },
/// };
/// let output = put_item.send(client).await?;
/// assert_eq!(output.attributes, None);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, PartialEq)]
pub struct PutItem {
    /// The item to store.
    pub item: Item,
    /// Table name, condition and return values.
    pub write_args: write::common::WriteArgs,
}

impl TryFrom<PutItem> for PutItemInput {
    type Error = serde_dynamo::Error;

    fn try_from(put_item: PutItem) -> Result<Self, Self::Error> {
        Ok(Self {
            item: to_item(put_item.item)?,
            write_input: put_item.write_args.into(),
        })
    }
}

impl PutItem {
    /// Execute the request.
    pub async fn send(self, client: &Client) -> Result<WriteOutput, StoreOperationError> {
        let input = PutItemInput::try_from(self)?;
        let builder = client.put_item().set_item(Some(input.item));
        let output = crate::apply_write_operation!(builder, input.write_input)
            .send()
            .await?;
        write::common::write_output(output.attributes)
    }
}
