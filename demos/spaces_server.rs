//! Serves the `spaces` resource from memory on port 3000.
//!
//! Set `RESOURCE_PATH` to a JSON resource definition to serve another resource, and
//! `API_TOKEN` to require `Authorization: Bearer <API_TOKEN>` on every route.

use generic_table::{
    auth::StaticTokenAuthorizer,
    definition::{Operation, ResourceArgs, ResourceDefinition},
    platform::local::LocalPlatform,
    provision::{GenericTable, RouteBinder},
    store::memory::MemoryStore,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("generic_table=info".parse()?))
        .init();

    let definition = match std::env::var("RESOURCE_PATH") {
        Ok(path) => serde_json::from_str(&tokio::fs::read_to_string(path).await?)?,
        Err(_) => ResourceDefinition::try_from(ResourceArgs {
            name: "SpacesTable".to_string(),
            primary_key: "spaceId".to_string(),
            operations: Operation::ALL.into(),
            secondary_indexes: vec!["location".to_string()],
        })?,
    };

    let platform = LocalPlatform::new(MemoryStore::default());
    let mut binder = RouteBinder::new(&platform);
    let token = std::env::var("API_TOKEN").ok();
    if let Some(token) = &token {
        let authorizer = StaticTokenAuthorizer::default().with_token(token.as_str(), "api");
        platform.register_authorizer("token", Arc::new(authorizer)).await;
        binder = binder.with_authorizer("token");
    }

    let table = GenericTable::provision(&platform, definition).await?;
    binder
        .bind_resource("/spaces", &table.bindings, token.is_some())
        .await?;

    let listener = TcpListener::bind("0.0.0.0:3000").await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, platform.router().await).await?;
    Ok(())
}
