//! Command implementations.

pub mod backup;
pub mod list;
pub mod restore;

use anyhow::{Context, Result};
use docsheet_core::DocumentStore;
use docsheet_driver_mongodb::{MongoDbConnection, MongoDbDriver, redact_uri};
use std::future::Future;
use std::sync::Arc;

use crate::settings::Settings;

/// Connect to the server named in the settings
pub async fn connect(settings: &Settings) -> Result<Arc<MongoDbConnection>> {
    let connection = MongoDbDriver::new()
        .connect(&settings.uri)
        .await
        .with_context(|| format!("Could not connect to {}", redact_uri(&settings.uri)))?;
    Ok(Arc::new(connection))
}

/// Run `body` against `store`, then close the store whether `body` failed
/// or not. An error from `body` wins over one from closing.
pub async fn closing<S, T, F, Fut>(store: Arc<S>, body: F) -> Result<T>
where
    S: DocumentStore + ?Sized,
    F: FnOnce(Arc<S>) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let outcome = body(store.clone()).await;
    let closed = store.close().await;
    let value = outcome?;
    closed?;
    Ok(value)
}
