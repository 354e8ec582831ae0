use crate::error::ConfigurationError;

use std::{collections, env};

/// Environment variable holding the store identity.
pub const TABLE_NAME: &str = "TABLE_NAME";

/// Environment variable holding the primary key attribute name.
pub const PRIMARY_KEY: &str = "PRIMARY_KEY";

/// Environment injected into a compute unit at provisioning time.
pub type HandlerEnvironment = collections::BTreeMap<String, String>;

/// Configuration passed into every handler constructor.
///
/// ```rust
/// use generic_table::config::{HandlerConfig, HandlerEnvironment};
///
/// let config = HandlerConfig {
///     table_name: "SpacesTable".to_string(),
///     primary_key: "spaceId".to_string(),
/// };
/// let environment: HandlerEnvironment = config.to_environment();
/// assert_eq!(HandlerConfig::from_environment(&environment), Ok(config));
/// ```
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct HandlerConfig {
    /// The table the handler operates on.
    pub table_name: String,
    /// The table's primary key attribute name.
    pub primary_key: String,
}

impl HandlerConfig {
    /// Read the configuration from an injected environment.
    pub fn from_environment(environment: &HandlerEnvironment) -> Result<Self, ConfigurationError> {
        let lookup = |name: &'static str| {
            environment
                .get(name)
                .filter(|value| !value.is_empty())
                .cloned()
                .ok_or(ConfigurationError::MissingEnvironment(name))
        };
        Ok(Self {
            table_name: lookup(TABLE_NAME)?,
            primary_key: lookup(PRIMARY_KEY)?,
        })
    }

    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        let environment = [TABLE_NAME, PRIMARY_KEY]
            .into_iter()
            .filter_map(|name| env::var(name).ok().map(|value| (name.to_string(), value)))
            .collect();
        Self::from_environment(&environment)
    }

    /// The environment a compute unit needs to rebuild this configuration.
    pub fn to_environment(&self) -> HandlerEnvironment {
        HandlerEnvironment::from([
            (TABLE_NAME.to_string(), self.table_name.clone()),
            (PRIMARY_KEY.to_string(), self.primary_key.clone()),
        ])
    }
}
