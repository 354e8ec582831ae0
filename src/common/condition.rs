use crate::common;

use std::collections;

/// Existence condition on one attribute.
///
/// ```rust
/// use generic_table::common::condition;
///
/// let condition = condition::Condition::Exists("spaceId".to_string());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Condition {
    /// The attribute must be present on the stored item.
    Exists(String),
}

impl Condition {
    pub(crate) fn get_expression(self, placeholders: &mut common::Placeholders) -> common::ExpressionInput {
        let (placeholder, _) = placeholders.next();
        let Self::Exists(name) = self;
        common::ExpressionInput {
            expression: format!("attribute_exists({placeholder})"),
            expression_attribute_names: collections::HashMap::from([(placeholder, name)]),
            ..Default::default()
        }
    }
}

/// Conditions combined with `AND`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Conditions(pub Vec<Condition>);

impl From<Conditions> for common::ExpressionInput {
    fn from(conditions: Conditions) -> Self {
        let mut placeholders = common::Placeholders::new("cond");
        let operations = conditions
            .0
            .into_iter()
            .map(|condition| condition.get_expression(&mut placeholders))
            .collect();
        common::ExpressionInput::merge(" AND ", operations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    #[case::exists(
        Conditions(
            vec![
                Condition::Exists(
                    "spaceId".to_string()
                ),
            ]
        ),
        common::ExpressionInput {
            expression: "attribute_exists(#cond0)".to_string(),
            expression_attribute_names: collections::HashMap::from(
                [
                    ("#cond0".to_string(), "spaceId".to_string()),
                ]
            ),
            ..Default::default()
        }
    )]
    #[case::combined(
        Conditions(
            vec![
                Condition::Exists(
                    "spaceId".to_string()
                ),
                Condition::Exists(
                    "created at".to_string()
                ),
            ]
        ),
        common::ExpressionInput {
            expression: "attribute_exists(#cond0) AND attribute_exists(#cond1)".to_string(),
            expression_attribute_names: collections::HashMap::from(
                [
                    ("#cond0".to_string(), "spaceId".to_string()),
                    ("#cond1".to_string(), "created at".to_string()),
                ]
            ),
            ..Default::default()
        }
    )]
    fn test_conditions(#[case] conditions: Conditions, #[case] expected: common::ExpressionInput) {
        let actual: common::ExpressionInput = conditions.into();
        assert_eq!(actual, expected);
    }
}
