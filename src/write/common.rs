use crate::common::{self, condition::Conditions, value::Item};
use crate::error::StoreOperationError;
use crate::store::WriteOutput;

use aws_sdk_dynamodb::types;
use serde_dynamo::from_item;
use std::collections;

/// Resolved write parameters, in the shape the SDK builders take them.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct WriteInput {
    pub(crate) condition_expression: Option<String>,
    pub(crate) expression_attribute_names: Option<collections::HashMap<String, String>>,
    pub(crate) expression_attribute_values:
        Option<collections::HashMap<String, types::AttributeValue>>,
    pub(crate) return_values: Option<types::ReturnValue>,
    pub(crate) table_name: String,
}

impl WriteInput {
    /// Fold an expression's placeholders into this write, returning the expression.
    pub(crate) fn merge_expression(&mut self, expression: common::ExpressionInput) -> String {
        expression.merge_into(
            &mut self.expression_attribute_names,
            &mut self.expression_attribute_values,
        )
    }
}

/// Arguments shared by put, update and delete requests.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WriteArgs {
    /// Conditions that must all hold for the write to happen; otherwise the write
    /// fails with [`StoreOperationError::ConditionalCheckFailed`].
    pub condition: Option<Conditions>,
    /// Which attributes the store sends back.
    pub return_values: Option<types::ReturnValue>,
    /// The table to write to.
    pub table_name: String,
}

impl From<WriteArgs> for WriteInput {
    fn from(write_args: WriteArgs) -> Self {
        let mut write_input = Self {
            return_values: write_args.return_values,
            table_name: write_args.table_name,
            ..Default::default()
        };
        if let Some(condition) = write_args.condition {
            let condition_expression = write_input.merge_expression(condition.into());
            write_input.condition_expression = Some(condition_expression);
        }
        write_input
    }
}

/// Convert the attributes a write sent back.
pub(crate) fn write_output(
    attributes: Option<collections::HashMap<String, types::AttributeValue>>,
) -> Result<WriteOutput, StoreOperationError> {
    let attributes: Option<Item> = attributes.map(from_item).transpose()?;
    Ok(WriteOutput { attributes })
}

/// apply common write settings to a builder
#[macro_export]
#[doc(hidden)]
macro_rules! apply_write_operation {
    ($builder:expr, $write_input:expr) => {
        $builder
            .set_condition_expression($write_input.condition_expression)
            .set_expression_attribute_names($write_input.expression_attribute_names)
            .set_expression_attribute_values($write_input.expression_attribute_values)
            .set_return_values($write_input.return_values)
            .table_name($write_input.table_name)
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::condition::Condition;

    #[test]
    fn test_write_input_without_condition() {
        let write_input = WriteInput::from(WriteArgs {
            table_name: "SpacesTable".to_string(),
            ..Default::default()
        });
        assert_eq!(write_input.condition_expression, None);
        assert_eq!(write_input.expression_attribute_names, None);
        assert_eq!(write_input.expression_attribute_values, None);
    }

    #[test]
    fn test_write_input_with_condition() {
        let write_input = WriteInput::from(WriteArgs {
            condition: Some(Conditions(vec![Condition::Exists("spaceId".to_string())])),
            return_values: Some(types::ReturnValue::AllOld),
            table_name: "SpacesTable".to_string(),
        });
        assert_eq!(
            write_input,
            WriteInput {
                condition_expression: Some("attribute_exists(#cond0)".to_string()),
                expression_attribute_names: Some(collections::HashMap::from([(
                    "#cond0".to_string(),
                    "spaceId".to_string(),
                )])),
                expression_attribute_values: None,
                return_values: Some(types::ReturnValue::AllOld),
                table_name: "SpacesTable".to_string(),
            }
        );
    }

    #[test]
    fn test_write_output_converts_attributes() {
        let attributes = collections::HashMap::from([(
            "name".to_string(),
            types::AttributeValue::S("Room B".to_string()),
        )]);
        let output = write_output(Some(attributes)).unwrap();
        assert_eq!(
            output.attributes,
            Some(Item::from([(
                "name".to_string(),
                common::value::AttributeValue::from("Room B"),
            )]))
        );
        assert_eq!(write_output(None).unwrap(), WriteOutput::default());
    }
}
