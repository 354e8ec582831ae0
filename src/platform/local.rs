use crate::auth::Authorizer;
use crate::common::{
    key::Key,
    value::{AttributeValue, Item},
};
use crate::config::{HandlerConfig, HandlerEnvironment};
use crate::definition::Permission;
use crate::error::{ProvisioningError, StoreOperationError};
use crate::handler::{EntryPoint, Handler, HandlerResponse, RequestContext};
use crate::platform::{AuthConfig, ComputeHandle, Platform, RouteStatus, StoreHandle};
use crate::store::{GetOutput, Store, StoreAdmin, TableSchema, WriteOutput};

use async_trait::async_trait;
use axum::{
    Router,
    body::Bytes,
    extract::{Path, Query},
    http::{HeaderMap, Method, StatusCode, Uri, header},
    response::{IntoResponse, Response},
    routing::any,
};
use indexmap::IndexMap;
use std::{collections, sync::Arc};
use tokio::sync::RwLock;

impl IntoResponse for HandlerResponse {
    fn into_response(self) -> Response {
        (self.status, self.body).into_response()
    }
}

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
struct Grant {
    identity: String,
    table: String,
    permission: Permission,
}

type Grants = Arc<RwLock<collections::HashSet<Grant>>>;

/// Store view of one compute unit: every call is checked against its grants.
struct GrantedStore<S> {
    identity: String,
    store: Arc<S>,
    grants: Grants,
}

impl<S> GrantedStore<S> {
    async fn check(
        &self,
        table: &str,
        permission: Permission,
        action: &'static str,
    ) -> Result<(), StoreOperationError> {
        let grant = Grant {
            identity: self.identity.clone(),
            table: table.to_string(),
            permission,
        };
        if self.grants.read().await.contains(&grant) {
            return Ok(());
        }
        Err(StoreOperationError::AccessDenied {
            identity: self.identity.clone(),
            action,
            table: table.to_string(),
        })
    }
}

#[async_trait]
impl<S: Store + 'static> Store for GrantedStore<S> {
    async fn put(&self, table: &str, item: Item) -> Result<WriteOutput, StoreOperationError> {
        self.check(table, Permission::Write, "dynamodb:PutItem").await?;
        self.store.put(table, item).await
    }

    async fn get_by_key(
        &self,
        table: &str,
        key: &Key,
    ) -> Result<GetOutput, StoreOperationError> {
        self.check(table, Permission::Read, "dynamodb:GetItem").await?;
        self.store.get_by_key(table, key).await
    }

    async fn scan_all(&self, table: &str) -> Result<Vec<Item>, StoreOperationError> {
        self.check(table, Permission::Read, "dynamodb:Scan").await?;
        self.store.scan_all(table).await
    }

    async fn update_attribute(
        &self,
        table: &str,
        key: &Key,
        name: &str,
        value: AttributeValue,
    ) -> Result<WriteOutput, StoreOperationError> {
        self.check(table, Permission::Write, "dynamodb:UpdateItem").await?;
        self.store.update_attribute(table, key, name, value).await
    }

    async fn delete(
        &self,
        table: &str,
        key: &Key,
    ) -> Result<WriteOutput, StoreOperationError> {
        self.check(table, Permission::Write, "dynamodb:DeleteItem").await?;
        self.store.delete(table, key).await
    }
}

struct Compute {
    handle: ComputeHandle,
    handler: Arc<dyn Handler>,
}

#[derive(Clone)]
struct Route {
    handler: Arc<dyn Handler>,
    authorizer: Option<Arc<dyn Authorizer>>,
}

#[derive(Default)]
struct Registry {
    stores: collections::HashMap<String, StoreHandle>,
    computes: collections::HashMap<String, Compute>,
    routes: IndexMap<String, IndexMap<Method, Route>>,
    authorizers: collections::HashMap<String, Arc<dyn Authorizer>>,
}

impl Registry {
    /// Replays the bound paths and `path` through the matcher `router` builds on.
    fn route_status(&self, path: &str, method: &Method) -> RouteStatus {
        if !path.starts_with('/') {
            return RouteStatus::Invalid("paths must start with '/'".to_string());
        }
        if let Some(methods) = self.routes.get(path) {
            if methods.contains_key(method) {
                return RouteStatus::Bound;
            }
            return RouteStatus::Available;
        }
        let mut matcher = matchit::Router::new();
        for bound in self.routes.keys() {
            if let Err(err) = matcher.insert(bound.as_str(), ()) {
                return RouteStatus::Invalid(err.to_string());
            }
        }
        match matcher.insert(path, ()) {
            Ok(()) => RouteStatus::Available,
            Err(err) => RouteStatus::Invalid(err.to_string()),
        }
    }
}

/// [`Platform`] hosting stores, compute units and routes in process.
///
/// Tables are created in `S`, compute units are built from their entry point right
/// away and reach the store only through the permissions granted to them. Bound
/// routes are served by [`LocalPlatform::router`].
///
/// ```rust
/// use generic_table::platform::local::LocalPlatform;
/// use generic_table::store::memory::MemoryStore;
///
/// # async fn example() {
/// let platform = LocalPlatform::new(MemoryStore::default());
/// let router = platform.router().await;
/// # }
/// ```
pub struct LocalPlatform<S> {
    store: Arc<S>,
    grants: Grants,
    registry: RwLock<Registry>,
}

impl<S: Store + StoreAdmin + 'static> LocalPlatform<S> {
    /// Host everything on top of `store`.
    pub fn new(store: S) -> Self {
        Self {
            store: Arc::new(store),
            grants: Grants::default(),
            registry: RwLock::new(Registry::default()),
        }
    }

    /// Make `authorizer` available to routes under `name`.
    pub async fn register_authorizer(&self, name: impl Into<String>, authorizer: Arc<dyn Authorizer>) {
        let name = name.into();
        tracing::info!(authorizer = %name, "registered authorizer");
        self.registry.write().await.authorizers.insert(name, authorizer);
    }

    /// Router serving every route bound so far.
    ///
    /// Unbound methods on a bound path answer `405`, authenticated routes answer
    /// `401` without a bearer token and `403` when the authorizer refuses it.
    pub async fn router(&self) -> Router {
        let registry = self.registry.read().await;
        registry
            .routes
            .iter()
            .fold(Router::new(), |router, (path, methods)| {
                let methods = Arc::new(methods.clone());
                router.route(
                    path,
                    any(
                        move |method: Method,
                              uri: Uri,
                              headers: HeaderMap,
                              path: Option<Path<collections::HashMap<String, String>>>,
                              body: Bytes| {
                            let methods = methods.clone();
                            async move { dispatch(&methods, method, uri, headers, path, body).await }
                        },
                    ),
                )
            })
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer ").map(str::trim))
        .filter(|token| !token.is_empty())
}

async fn dispatch(
    methods: &IndexMap<Method, Route>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    path: Option<Path<collections::HashMap<String, String>>>,
    body: Bytes,
) -> Response {
    let Some(route) = methods.get(&method) else {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    };
    let principal = match &route.authorizer {
        None => None,
        Some(authorizer) => {
            let Some(token) = bearer_token(&headers) else {
                return (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
            };
            match authorizer.verify(token).await {
                Ok(principal) => Some(principal),
                Err(err) => {
                    tracing::debug!(%method, path = %uri.path(), "authorization rejected: {err}");
                    return (StatusCode::FORBIDDEN, "Forbidden").into_response();
                }
            }
        }
    };
    let query_parameters = Query::<collections::HashMap<String, String>>::try_from_uri(&uri)
        .map(|Query(query)| query)
        .unwrap_or_default();
    let context = RequestContext {
        method,
        path_parameters: path.map(|Path(path)| path).unwrap_or_default(),
        query_parameters,
        body: (!body.is_empty()).then(|| String::from_utf8_lossy(&body).into_owned()),
        principal,
    };
    route.handler.handle(context).await.into_response()
}

fn rejected(operation: &'static str, reason: impl ToString) -> ProvisioningError {
    ProvisioningError::Rejected {
        operation,
        reason: reason.to_string(),
    }
}

#[async_trait]
impl<S: Store + StoreAdmin + 'static> Platform for LocalPlatform<S> {
    async fn find_store(&self, name: &str) -> Result<Option<StoreHandle>, ProvisioningError> {
        if let Some(store) = self.registry.read().await.stores.get(name) {
            return Ok(Some(store.clone()));
        }
        let Some(schema) = self
            .store
            .describe_table(name)
            .await
            .map_err(|err| rejected("find_store", err))?
        else {
            return Ok(None);
        };
        let handle = StoreHandle { schema };
        self.registry
            .write()
            .await
            .stores
            .insert(name.to_string(), handle.clone());
        Ok(Some(handle))
    }

    async fn create_store(&self, schema: TableSchema) -> Result<StoreHandle, ProvisioningError> {
        let mut registry = self.registry.write().await;
        self.store
            .create_table(&schema)
            .await
            .map_err(|err| rejected("create_store", err))?;
        tracing::info!(table = %schema.table_name, "created store");
        let handle = StoreHandle { schema };
        registry
            .stores
            .insert(handle.name().to_string(), handle.clone());
        Ok(handle)
    }

    async fn find_compute(
        &self,
        identity: &str,
    ) -> Result<Option<ComputeHandle>, ProvisioningError> {
        let registry = self.registry.read().await;
        Ok(registry
            .computes
            .get(identity)
            .map(|compute| compute.handle.clone()))
    }

    async fn register_compute(
        &self,
        identity: &str,
        entry_point: EntryPoint,
        environment: HandlerEnvironment,
    ) -> Result<ComputeHandle, ProvisioningError> {
        let mut registry = self.registry.write().await;
        if registry.computes.contains_key(identity) {
            return Err(rejected(
                "register_compute",
                format!("compute {identity} already exists"),
            ));
        }
        let config = HandlerConfig::from_environment(&environment)
            .map_err(|err| rejected("register_compute", err))?;
        let store = GrantedStore {
            identity: identity.to_string(),
            store: self.store.clone(),
            grants: self.grants.clone(),
        };
        let handler = entry_point(config, Arc::new(store));
        let handle = ComputeHandle {
            identity: identity.to_string(),
            environment,
        };
        tracing::info!(identity, "registered compute");
        let compute = Compute {
            handle: handle.clone(),
            handler,
        };
        registry.computes.insert(identity.to_string(), compute);
        Ok(handle)
    }

    async fn has_grant(
        &self,
        compute: &ComputeHandle,
        store: &StoreHandle,
        permission: Permission,
    ) -> Result<bool, ProvisioningError> {
        let grant = Grant {
            identity: compute.identity.clone(),
            table: store.name().to_string(),
            permission,
        };
        Ok(self.grants.read().await.contains(&grant))
    }

    async fn grant(
        &self,
        compute: &ComputeHandle,
        store: &StoreHandle,
        permission: Permission,
    ) -> Result<(), ProvisioningError> {
        {
            let registry = self.registry.read().await;
            if !registry.computes.contains_key(&compute.identity) {
                return Err(rejected(
                    "grant",
                    format!("unknown compute {}", compute.identity),
                ));
            }
            if !registry.stores.contains_key(store.name()) {
                return Err(rejected("grant", format!("unknown store {}", store.name())));
            }
        }
        let grant = Grant {
            identity: compute.identity.clone(),
            table: store.name().to_string(),
            permission,
        };
        tracing::info!(identity = %compute.identity, table = %store.name(), %permission, "granted");
        self.grants.write().await.insert(grant);
        Ok(())
    }

    async fn route_status(
        &self,
        path: &str,
        method: &Method,
    ) -> Result<RouteStatus, ProvisioningError> {
        Ok(self.registry.read().await.route_status(path, method))
    }

    async fn bind_route(
        &self,
        path: &str,
        method: Method,
        compute: &ComputeHandle,
        auth: Option<AuthConfig>,
    ) -> Result<(), ProvisioningError> {
        let mut registry = self.registry.write().await;
        match registry.route_status(path, &method) {
            RouteStatus::Available => {}
            RouteStatus::Bound => {
                return Err(rejected(
                    "bind_route",
                    format!("route {method} {path} is already bound"),
                ));
            }
            RouteStatus::Invalid(reason) => {
                return Err(rejected("bind_route", format!("invalid path {path}: {reason}")));
            }
        }
        let handler = registry
            .computes
            .get(&compute.identity)
            .map(|compute| compute.handler.clone())
            .ok_or_else(|| rejected("bind_route", format!("unknown compute {}", compute.identity)))?;
        let authorizer = match auth {
            None => None,
            Some(auth) => Some(
                registry
                    .authorizers
                    .get(&auth.authorizer)
                    .cloned()
                    .ok_or(ProvisioningError::UnknownAuthorizer(auth.authorizer))?,
            ),
        };
        let methods = registry.routes.entry(path.to_string()).or_default();
        tracing::info!(%method, path, identity = %compute.identity, "bound route");
        methods.insert(method, Route { handler, authorizer });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticTokenAuthorizer;
    use crate::definition::Operation;
    use crate::handler::handler_spec;
    use crate::store::memory::MemoryStore;

    use axum::body::{self, Body};
    use axum::http::Request;
    use rstest::rstest;
    use tower::ServiceExt;

    const TABLE: &str = "SpacesTable";

    fn schema() -> TableSchema {
        TableSchema {
            table_name: TABLE.to_string(),
            primary_key: "spaceId".to_string(),
            secondary_indexes: vec![],
        }
    }

    fn environment() -> HandlerEnvironment {
        HandlerConfig {
            table_name: TABLE.to_string(),
            primary_key: "spaceId".to_string(),
        }
        .to_environment()
    }

    async fn register(
        platform: &LocalPlatform<MemoryStore>,
        operation: Operation,
    ) -> ComputeHandle {
        let identity = format!("{TABLE}{operation}");
        platform
            .register_compute(&identity, handler_spec(operation).construct, environment())
            .await
            .unwrap()
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, String) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let body = body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_store_operations_need_grants() {
        let platform = LocalPlatform::new(MemoryStore::default());
        let store = platform.create_store(schema()).await.unwrap();
        let compute = register(&platform, Operation::Create).await;
        platform
            .bind_route("/spaces", Method::POST, &compute, None)
            .await
            .unwrap();
        let request = || {
            Request::post("/spaces")
                .body(Body::from(r#"{"spaceId": "s1"}"#))
                .unwrap()
        };

        let (status, body) = send(platform.router().await, request()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            "User: SpacesTablecreate is not authorized to perform: dynamodb:PutItem on resource: table/SpacesTable"
        );

        // Read access does not cover writes.
        platform.grant(&compute, &store, Permission::Read).await.unwrap();
        let (_, body) = send(platform.router().await, request()).await;
        assert!(body.starts_with("User: SpacesTablecreate is not authorized"));

        platform.grant(&compute, &store, Permission::Write).await.unwrap();
        assert!(platform.has_grant(&compute, &store, Permission::Write).await.unwrap());
        let (status, body) = send(platform.router().await, request()).await;
        assert_eq!((status, body.as_str()), (StatusCode::OK, "{}"));
    }

    #[tokio::test]
    async fn test_unbound_method_is_not_allowed() {
        let platform = LocalPlatform::new(MemoryStore::default());
        platform.create_store(schema()).await.unwrap();
        let compute = register(&platform, Operation::Read).await;
        platform
            .bind_route("/spaces", Method::GET, &compute, None)
            .await
            .unwrap();
        let request = Request::delete("/spaces?spaceId=s1")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(platform.router().await, request).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[rstest]
    #[case::missing_token(None, StatusCode::UNAUTHORIZED)]
    #[case::not_bearer(Some("Basic dXNlcg=="), StatusCode::UNAUTHORIZED)]
    #[case::rejected_token(Some("Bearer nope"), StatusCode::FORBIDDEN)]
    #[case::accepted_token(Some("Bearer token-1"), StatusCode::OK)]
    #[tokio::test]
    async fn test_authenticated_route(
        #[case] authorization: Option<&str>,
        #[case] expected: StatusCode,
    ) {
        let platform = LocalPlatform::new(MemoryStore::default());
        let store = platform.create_store(schema()).await.unwrap();
        let authorizer = StaticTokenAuthorizer::default().with_token("token-1", "alice");
        platform.register_authorizer("tokens", Arc::new(authorizer)).await;
        let compute = register(&platform, Operation::Read).await;
        platform.grant(&compute, &store, Permission::Read).await.unwrap();
        let auth = AuthConfig {
            authorizer: "tokens".to_string(),
        };
        platform
            .bind_route("/spaces", Method::GET, &compute, Some(auth))
            .await
            .unwrap();

        let mut request = Request::get("/spaces");
        if let Some(authorization) = authorization {
            request = request.header(header::AUTHORIZATION, authorization);
        }
        let (status, body) = send(platform.router().await, request.body(Body::empty()).unwrap()).await;
        assert_eq!(status, expected);
        if expected == StatusCode::OK {
            assert_eq!(body, "[]");
        }
    }

    #[tokio::test]
    async fn test_bind_route_rejections() {
        let platform = LocalPlatform::new(MemoryStore::default());
        platform.create_store(schema()).await.unwrap();
        let compute = register(&platform, Operation::Read).await;
        platform
            .bind_route("/spaces", Method::GET, &compute, None)
            .await
            .unwrap();

        let duplicate = platform.bind_route("/spaces", Method::GET, &compute, None).await;
        assert_eq!(
            duplicate,
            Err(ProvisioningError::Rejected {
                operation: "bind_route",
                reason: "route GET /spaces is already bound".to_string(),
            })
        );
        let auth = AuthConfig {
            authorizer: "missing".to_string(),
        };
        let unknown = platform
            .bind_route("/spaces", Method::PUT, &compute, Some(auth))
            .await;
        assert_eq!(
            unknown,
            Err(ProvisioningError::UnknownAuthorizer("missing".to_string()))
        );
    }

    #[rstest]
    #[case::free("/spaces", Method::POST, RouteStatus::Available)]
    #[case::bound("/spaces", Method::GET, RouteStatus::Bound)]
    #[case::same_parameter("/spaces/:id", Method::DELETE, RouteStatus::Available)]
    #[case::renamed_parameter(
        "/spaces/:key",
        Method::PUT,
        RouteStatus::Invalid(
            "insertion failed due to conflict with previously registered route: /spaces/:id"
                .to_string()
        )
    )]
    #[case::relative("spaces", Method::GET, RouteStatus::Invalid("paths must start with '/'".to_string()))]
    #[tokio::test]
    async fn test_route_status(
        #[case] path: &str,
        #[case] method: Method,
        #[case] expected: RouteStatus,
    ) {
        let platform = LocalPlatform::new(MemoryStore::default());
        let compute = register(&platform, Operation::Read).await;
        for bound in ["/spaces", "/spaces/:id"] {
            platform
                .bind_route(bound, Method::GET, &compute, None)
                .await
                .unwrap();
        }
        let status = platform.route_status(path, &method).await.unwrap();
        assert_eq!(status, expected);
    }

    #[tokio::test]
    async fn test_conflicting_path_is_refused_before_routing() {
        let platform = LocalPlatform::new(MemoryStore::default());
        platform.create_store(schema()).await.unwrap();
        let read = register(&platform, Operation::Read).await;
        let update = register(&platform, Operation::Update).await;
        platform
            .bind_route("/spaces/:id", Method::GET, &read, None)
            .await
            .unwrap();
        let conflicting = platform
            .bind_route("/spaces/:key", Method::PUT, &update, None)
            .await;
        assert!(matches!(
            conflicting,
            Err(ProvisioningError::Rejected { operation: "bind_route", reason })
                if reason.starts_with("invalid path /spaces/:key")
        ));

        let request = Request::put("/spaces/s1").body(Body::empty()).unwrap();
        let (status, _) = send(platform.router().await, request).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_register_compute_rejections() {
        let platform = LocalPlatform::new(MemoryStore::default());
        register(&platform, Operation::Read).await;
        let duplicate = platform
            .register_compute("SpacesTableread", handler_spec(Operation::Read).construct, environment())
            .await;
        assert!(matches!(
            duplicate,
            Err(ProvisioningError::Rejected { operation: "register_compute", .. })
        ));
        let unconfigured = platform
            .register_compute(
                "SpacesTableupdate",
                handler_spec(Operation::Update).construct,
                HandlerEnvironment::new(),
            )
            .await;
        assert_eq!(
            unconfigured,
            Err(ProvisioningError::Rejected {
                operation: "register_compute",
                reason: "missing environment variable TABLE_NAME".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_find_store_falls_back_to_existing_tables() {
        let store = MemoryStore::default();
        store.create_table(&schema()).await.unwrap();
        let platform = LocalPlatform::new(store);
        let found = platform.find_store(TABLE).await.unwrap();
        assert_eq!(found, Some(StoreHandle { schema: schema() }));
        assert_eq!(platform.find_store("Missing").await.unwrap(), None);
        let created = platform.create_store(schema()).await;
        assert_eq!(
            created,
            Err(ProvisioningError::Rejected {
                operation: "create_store",
                reason: "Table already exists: SpacesTable".to_string(),
            })
        );
    }
}
