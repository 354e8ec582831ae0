use crate::common::value::Item;
use crate::error::StoreOperationError;
use crate::read;

use aws_sdk_dynamodb::Client;
use serde_dynamo::from_items;

/// Full-table scan request.
///
/// Follows `LastEvaluatedKey` until the table is exhausted, so the result holds
/// every item however many pages it takes.
///
/// ```rust,no_run
/// use aws_sdk_dynamodb::Client;
/// use generic_table::read;
///
/// # async fn example(client: &Client) -> Result<(), Box<dyn std::error::Error>> {
/// let scan = read::scan::Scan {
///     read_args: read::common::ReadArgs {
///         table_name: "SpacesTable".to_string(),
///         ..Default::default()
///     },
/// };
/// let items = scan.send(client).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scan {
    /// Table name and consistency.
    pub read_args: read::common::ReadArgs,
}

impl Scan {
    /// Execute the scan, collecting all pages.
    pub async fn send(self, client: &Client) -> Result<Vec<Item>, StoreOperationError> {
        let builder = client.scan();
        let mut pages = crate::apply_read_operation!(builder, self.read_args)
            .into_paginator()
            .send();
        let mut items = Vec::new();
        while let Some(page) = pages.next().await {
            let page_items: Vec<Item> = from_items(page?.items.unwrap_or_default())?;
            items.extend(page_items);
        }
        Ok(items)
    }
}
