use crate::error::ConfigurationError;

use axum::http::Method;
use serde::{Deserialize, Serialize};
use std::{collections, fmt};

/// CRUD operation a resource can expose.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// Insert an item.
    Create,
    /// Fetch one item or scan all of them.
    Read,
    /// Set a single attribute of one item.
    Update,
    /// Remove one item.
    Delete,
}

impl Operation {
    /// Every operation, in provisioning order.
    pub const ALL: [Self; 4] = [Self::Create, Self::Read, Self::Update, Self::Delete];

    /// Canonical lowercase name, used to derive handler identities.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }

    /// Minimum store permission the operation's handler needs.
    pub fn permission(&self) -> Permission {
        match self {
            Self::Read => Permission::Read,
            Self::Create | Self::Update | Self::Delete => Permission::Write,
        }
    }

    /// HTTP method the operation is conventionally bound to.
    pub fn method(&self) -> Method {
        match self {
            Self::Create => Method::POST,
            Self::Read => Method::GET,
            Self::Update => Method::PUT,
            Self::Delete => Method::DELETE,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Store permission granted to a handler.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    /// Get and scan.
    Read,
    /// Put, update and delete.
    Write,
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => f.write_str("read"),
            Self::Write => f.write_str("write"),
        }
    }
}

/// Unvalidated resource definition, as written in configuration.
///
/// ```rust
/// use generic_table::definition;
/// use std::collections;
///
/// let args = definition::ResourceArgs {
///     name: "SpacesTable".to_string(),
///     primary_key: "spaceId".to_string(),
///     operations: collections::BTreeSet::from(definition::Operation::ALL),
///     secondary_indexes: vec!["location".to_string()],
/// };
/// let definition = definition::ResourceDefinition::try_from(args).unwrap();
/// assert_eq!(definition.primary_key(), "spaceId");
/// ```
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceArgs {
    /// The resource (and table) name.
    pub name: String,
    /// The primary key attribute name.
    pub primary_key: String,
    /// Operations to expose.
    #[serde(default)]
    pub operations: collections::BTreeSet<Operation>,
    /// Attribute names that get a secondary index each.
    #[serde(default)]
    pub secondary_indexes: Vec<String>,
}

/// Validated, immutable description of one CRUD resource.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(try_from = "ResourceArgs", into = "ResourceArgs")]
pub struct ResourceDefinition {
    name: String,
    primary_key: String,
    operations: collections::BTreeSet<Operation>,
    secondary_indexes: Vec<String>,
}

impl ResourceDefinition {
    /// The resource name, also the store identity.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The primary key attribute name.
    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    /// Enabled operations, iterated in provisioning order.
    pub fn operations(&self) -> impl Iterator<Item = Operation> + '_ {
        self.operations.iter().copied()
    }

    /// Whether `operation` is enabled.
    pub fn is_enabled(&self, operation: Operation) -> bool {
        self.operations.contains(&operation)
    }

    /// Secondary index attribute names, in declaration order.
    pub fn secondary_indexes(&self) -> &[String] {
        &self.secondary_indexes
    }

    /// Handler identity for `operation`: the resource name followed by the operation name.
    pub fn handler_identity(&self, operation: Operation) -> String {
        format!("{}{}", self.name, operation.as_str())
    }
}

impl TryFrom<ResourceArgs> for ResourceDefinition {
    type Error = ConfigurationError;

    fn try_from(args: ResourceArgs) -> Result<Self, Self::Error> {
        if args.name.is_empty() {
            return Err(ConfigurationError::EmptyName);
        }
        if args.primary_key.is_empty() {
            return Err(ConfigurationError::EmptyPrimaryKey);
        }
        let mut seen = collections::HashSet::with_capacity(args.secondary_indexes.len());
        for index in &args.secondary_indexes {
            if index.is_empty() {
                return Err(ConfigurationError::EmptyIndex);
            }
            if *index == args.primary_key {
                return Err(ConfigurationError::IndexIsPrimaryKey(index.clone()));
            }
            if !seen.insert(index.as_str()) {
                return Err(ConfigurationError::DuplicateIndex(index.clone()));
            }
        }
        let definition = Self {
            name: args.name,
            primary_key: args.primary_key,
            operations: args.operations,
            secondary_indexes: args.secondary_indexes,
        };
        Ok(definition)
    }
}

impl From<ResourceDefinition> for ResourceArgs {
    fn from(definition: ResourceDefinition) -> Self {
        Self {
            name: definition.name,
            primary_key: definition.primary_key,
            operations: definition.operations,
            secondary_indexes: definition.secondary_indexes,
        }
    }
}
