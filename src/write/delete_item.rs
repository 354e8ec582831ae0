use crate::common::key::Key;
use crate::error::StoreOperationError;
use crate::store::WriteOutput;
use crate::write;

use aws_sdk_dynamodb::{Client, types};
use std::collections;

#[derive(Debug, PartialEq)]
struct DeleteItemInput {
    key: collections::HashMap<String, types::AttributeValue>,
    write_input: write::common::WriteInput,
}

/// Delete item request. Deleting a key that is not stored succeeds.
///
/// ```rust,no_run
/// use aws_sdk_dynamodb::Client;
/// use generic_table::{common::key::Key, write};
///
/// # async fn example(client: &Client) -> Result<(), Box<dyn std::error::Error>> {
/// let delete_item = write::delete_item::DeleteItem {
///     key: Key::new("spaceId", "s1"),
///     write_args: write::common::WriteArgs {
///         table_name: "SpacesTable".to_string(),
///         ..Default::default()
///     },
/// };
/// delete_item.send(client).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, PartialEq)]
pub struct DeleteItem {
    /// The primary key of the item to delete.
    pub key: Key,
    /// Table name, condition and return values.
    pub write_args: write::common::WriteArgs,
}

impl TryFrom<DeleteItem> for DeleteItemInput {
    type Error = serde_dynamo::Error;

    fn try_from(delete_item: DeleteItem) -> Result<Self, Self::Error> {
        Ok(Self {
            key: delete_item.key.try_into()?,
            write_input: delete_item.write_args.into(),
        })
    }
}

impl DeleteItem {
    /// Execute the request.
    pub async fn send(self, client: &Client) -> Result<WriteOutput, StoreOperationError> {
        let input = DeleteItemInput::try_from(self)?;
        let builder = client.delete_item().set_key(Some(input.key));
        let output = crate::apply_write_operation!(builder, input.write_input)
            .send()
            .await?;
        write::common::write_output(output.attributes)
    }
}
