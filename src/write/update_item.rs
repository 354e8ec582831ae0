use crate::common::{self, key::Key, value::AttributeValue};
use crate::error::StoreOperationError;
use crate::store::WriteOutput;
use crate::write;

use aws_sdk_dynamodb::{Client, types};
use serde_dynamo::to_attribute_value;
use std::collections;

/// One `SET` assignment.
///
/// The attribute name only ever reaches the store through an expression attribute
/// name placeholder, so it may be any non-empty string.
///
/// ```rust
/// use generic_table::write::update_item::SetAttribute;
///
/// let set = SetAttribute {
///     name: "opening hours".to_string(),
///     value: "9-17".into(),
/// };
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SetAttribute {
    /// The attribute to set.
    pub name: String,
    /// Its new value.
    pub value: AttributeValue,
}

impl TryFrom<SetAttribute> for common::ExpressionInput {
    type Error = serde_dynamo::Error;

    fn try_from(set: SetAttribute) -> Result<Self, Self::Error> {
        let (name_placeholder, value_placeholder) = common::Placeholders::new("set").next();
        Ok(Self {
            expression: format!("SET {name_placeholder} = {value_placeholder}"),
            expression_attribute_names: collections::HashMap::from([(name_placeholder, set.name)]),
            expression_attribute_values: collections::HashMap::from([(
                value_placeholder,
                to_attribute_value(set.value)?,
            )]),
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
struct UpdateItemInput {
    key: collections::HashMap<String, types::AttributeValue>,
    update_expression: String,
    write_input: write::common::WriteInput,
}

/// Update item request setting a single attribute.
///
/// ```rust,no_run
/// use aws_sdk_dynamodb::{Client, types};
/// use generic_table::common::{condition, key::Key};
/// use generic_table::write;
///
/// # async fn example(client: &Client) -> Result<(), Box<dyn std::error::Error>> {
/// let update_item = write::update_item::UpdateItem {
///     key: Key {
///         name: "spaceId".to_string(),
///         value: "s1".into(),
///     },
///     set: write::update_item::SetAttribute {
///         name: "name".to_string(),
///         value: "Room B".into(),
///     },
///     write_args: write::common::WriteArgs {
///         condition: Some(condition::Conditions(vec![condition::Condition::Exists(
///             "spaceId".to_string(),
///         )])),
///         return_values: Some(types::ReturnValue::UpdatedNew),
///         table_name: "SpacesTable".to_string(),
///     },
/// };
/// let output = update_item.send(client).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct UpdateItem {
    /// The primary key of the item to update.
    pub key: Key,
    /// The assignment.
    pub set: SetAttribute,
    /// Table name, condition and return values.
    pub write_args: write::common::WriteArgs,
}

impl TryFrom<UpdateItem> for UpdateItemInput {
    type Error = serde_dynamo::Error;

    fn try_from(update_item: UpdateItem) -> Result<Self, Self::Error> {
        let key = update_item.key.try_into()?;
        let mut write_input: write::common::WriteInput = update_item.write_args.into();
        let update_expression = write_input.merge_expression(update_item.set.try_into()?);
        Ok(Self {
            key,
            update_expression,
            write_input,
        })
    }
}

impl UpdateItem {
    /// Execute the request.
    pub async fn send(self, client: &Client) -> Result<WriteOutput, StoreOperationError> {
        let input = UpdateItemInput::try_from(self)?;
        let builder = client
            .update_item()
            .set_key(Some(input.key))
            .update_expression(input.update_expression);
        let output = crate::apply_write_operation!(builder, input.write_input)
            .send()
            .await
            .map_err(|err| {
                if err
                    .as_service_error()
                    .is_some_and(|err| err.is_conditional_check_failed_exception())
                {
                    StoreOperationError::ConditionalCheckFailed
                } else {
                    err.into()
                }
            })?;
        write::common::write_output(output.attributes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::condition::{Condition, Conditions};

    use rstest::rstest;

    #[rstest]
    #[case::string("name", AttributeValue::from("Room B"), types::AttributeValue::S("Room B".to_string()))]
    #[case::reserved_word("size", AttributeValue::Number(12.into()), types::AttributeValue::N("12".to_string()))]
    #[case::dotted_name("opening hours.weekday", AttributeValue::Null, types::AttributeValue::Null(true))]
    fn test_set_attribute(
        #[case] name: &str,
        #[case] value: AttributeValue,
        #[case] expected: types::AttributeValue,
    ) {
        let set = SetAttribute {
            name: name.to_string(),
            value,
        };
        let actual = common::ExpressionInput::try_from(set).unwrap();
        assert_eq!(
            actual,
            common::ExpressionInput {
                expression: "SET #set0 = :set0".to_string(),
                expression_attribute_names: collections::HashMap::from([(
                    "#set0".to_string(),
                    name.to_string(),
                )]),
                expression_attribute_values: collections::HashMap::from([(
                    ":set0".to_string(),
                    expected,
                )]),
            }
        );
    }

    #[test]
    fn test_update_item_with_existence_condition() {
        let update_item = UpdateItem {
            key: Key {
                name: "spaceId".to_string(),
                value: AttributeValue::from("s1"),
            },
            set: SetAttribute {
                name: "spaceId".to_string(),
                value: AttributeValue::from("s2"),
            },
            write_args: write::common::WriteArgs {
                condition: Some(Conditions(vec![Condition::Exists("spaceId".to_string())])),
                return_values: Some(types::ReturnValue::UpdatedNew),
                table_name: "SpacesTable".to_string(),
            },
        };
        let expected = UpdateItemInput {
            key: collections::HashMap::from([(
                "spaceId".to_string(),
                types::AttributeValue::S("s1".to_string()),
            )]),
            update_expression: "SET #set0 = :set0".to_string(),
            write_input: write::common::WriteInput {
                condition_expression: Some("attribute_exists(#cond0)".to_string()),
                expression_attribute_names: Some(collections::HashMap::from([
                    ("#cond0".to_string(), "spaceId".to_string()),
                    ("#set0".to_string(), "spaceId".to_string()),
                ])),
                expression_attribute_values: Some(collections::HashMap::from([(
                    ":set0".to_string(),
                    types::AttributeValue::S("s2".to_string()),
                )])),
                return_values: Some(types::ReturnValue::UpdatedNew),
                table_name: "SpacesTable".to_string(),
            },
        };
        let actual = UpdateItemInput::try_from(update_item).unwrap();
        assert_eq!(actual, expected);
    }
}
