//! Common building blocks for store requests.
//!
//! This module provides shared types used across read and write requests,
//! including key handling, condition expressions, and the attribute value model.

/// Condition expressions for conditional writes.
pub mod condition;

/// Key types for identifying items.
pub mod key;

/// Attribute values and items.
pub mod value;

use aws_sdk_dynamodb::types;
use std::collections;

/// Allocates expression placeholders for one part of an expression.
///
/// Placeholders are derived from a fixed prefix and a counter, never from the
/// attribute name itself, so caller-supplied names can hold any character
/// (spaces, dots, reserved words) without being read as expression syntax.
#[derive(Clone, Debug)]
pub(crate) struct Placeholders {
    prefix: &'static str,
    index: usize,
}

impl Placeholders {
    pub(crate) fn new(prefix: &'static str) -> Self {
        Self { prefix, index: 0 }
    }

    /// Next `(#name, :value)` placeholder pair.
    pub(crate) fn next(&mut self) -> (String, String) {
        let name = format!("#{}{}", self.prefix, self.index);
        let value = format!(":{}{}", self.prefix, self.index);
        self.index += 1;
        (name, value)
    }
}

fn get_expression(left: String, operator: &str, right: String) -> String {
    if left.is_empty() {
        right
    } else if right.is_empty() {
        left
    } else {
        format!("{left}{operator}{right}")
    }
}

/// expression operation
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct ExpressionInput {
    pub(crate) expression: String,
    pub(crate) expression_attribute_names: collections::HashMap<String, String>,
    pub(crate) expression_attribute_values: collections::HashMap<String, types::AttributeValue>,
}

impl ExpressionInput {
    pub(crate) fn merge(operator: &str, items: Vec<Self>) -> Self {
        let mut operation = Self::default();
        for item in items {
            operation
                .expression_attribute_names
                .extend(item.expression_attribute_names);
            operation
                .expression_attribute_values
                .extend(item.expression_attribute_values);
            operation.expression = get_expression(operation.expression, operator, item.expression);
        }
        operation
    }

    pub(crate) fn merge_into(
        self,
        names: &mut Option<collections::HashMap<String, String>>,
        values: &mut Option<collections::HashMap<String, types::AttributeValue>>,
    ) -> String {
        if !self.expression_attribute_names.is_empty() {
            names
                .get_or_insert_with(collections::HashMap::new)
                .extend(self.expression_attribute_names);
        }
        if !self.expression_attribute_values.is_empty() {
            values
                .get_or_insert_with(collections::HashMap::new)
                .extend(self.expression_attribute_values);
        }
        self.expression
    }
}
