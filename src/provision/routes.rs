use crate::error::{ConfigurationError, Error};
use crate::platform::{AuthConfig, Platform, RouteStatus};
use crate::provision::handlers::{HandlerBinding, HandlerBindings};

use axum::http::Method;

/// Binds HTTP routes to provisioned handlers.
///
/// Each `(path, method)` pair can be bound once per platform, whichever binder bound
/// it first. Routes that require authorization go through the authorizer configured
/// with [`RouteBinder::with_authorizer`] before the handler runs.
pub struct RouteBinder<'a> {
    platform: &'a dyn Platform,
    authorizer: Option<String>,
}

impl<'a> RouteBinder<'a> {
    /// Bind routes on `platform`.
    pub fn new(platform: &'a dyn Platform) -> Self {
        Self {
            platform,
            authorizer: None,
        }
    }

    /// Use the platform authorizer named `authorizer` for authenticated routes.
    pub fn with_authorizer(mut self, authorizer: impl Into<String>) -> Self {
        self.authorizer = Some(authorizer.into());
        self
    }

    /// Route `method` requests on `path` to the compute unit of `binding`.
    pub async fn bind(
        &self,
        path: &str,
        method: Method,
        binding: &HandlerBinding,
        auth_required: bool,
    ) -> Result<(), Error> {
        if !path.starts_with('/') {
            return Err(ConfigurationError::InvalidPath {
                path: path.to_string(),
                reason: "paths must start with '/'".to_string(),
            }
            .into());
        }
        match self.platform.route_status(path, &method).await? {
            RouteStatus::Available => {}
            RouteStatus::Bound => {
                return Err(ConfigurationError::DuplicateRoute {
                    method: method.to_string(),
                    path: path.to_string(),
                }
                .into());
            }
            RouteStatus::Invalid(reason) => {
                return Err(ConfigurationError::InvalidPath {
                    path: path.to_string(),
                    reason,
                }
                .into());
            }
        }
        let auth = match (auth_required, &self.authorizer) {
            (false, _) => None,
            (true, Some(authorizer)) => Some(AuthConfig {
                authorizer: authorizer.clone(),
            }),
            (true, None) => {
                return Err(ConfigurationError::MissingAuthorizer {
                    method: method.to_string(),
                    path: path.to_string(),
                }
                .into());
            }
        };
        self.platform
            .bind_route(path, method, &binding.compute, auth)
            .await?;
        Ok(())
    }

    /// Bind every provisioned operation on `path` to its conventional method:
    /// create to `POST`, read to `GET`, update to `PUT` and delete to `DELETE`.
    pub async fn bind_resource(
        &self,
        path: &str,
        bindings: &HandlerBindings,
        auth_required: bool,
    ) -> Result<(), Error> {
        for (operation, binding) in bindings {
            self.bind(path, operation.method(), binding, auth_required)
                .await?;
        }
        Ok(())
    }
}
