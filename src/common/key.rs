use crate::common::value::AttributeValue;

use aws_sdk_dynamodb::types;
use serde_dynamo::to_attribute_value;
use std::collections;

/// Primary key of one item: the partition key attribute and the item's value for it.
///
/// ```rust
/// use generic_table::common::key::Key;
///
/// let key = Key::new("spaceId", "s1");
/// assert_eq!(key.value.as_str(), Some("s1"));
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Key {
    /// The partition key attribute name.
    pub name: String,
    /// The item's value for it.
    pub value: AttributeValue,
}

impl Key {
    /// Key `name = value`.
    pub fn new(name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl TryFrom<Key> for collections::HashMap<String, types::AttributeValue> {
    type Error = serde_dynamo::Error;

    fn try_from(key: Key) -> Result<Self, Self::Error> {
        Ok(Self::from([(key.name, to_attribute_value(key.value)?)]))
    }
}
