//! Shared application state

use std::sync::Arc;

use crate::config::Settings;
use crate::error::{SpendError, SpendResult};
use crate::storage::Storage;

/// State handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<Storage>,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(storage: Storage, settings: Settings) -> Self {
        Self {
            storage: Arc::new(storage),
            settings: Arc::new(settings),
        }
    }

    /// Run storage work on the blocking pool.
    ///
    /// Repositories take std locks and rewrite whole files with fsync, so
    /// handlers never call into the service layer on a runtime worker.
    pub async fn blocking<T, F>(&self, work: F) -> SpendResult<T>
    where
        F: FnOnce(&Storage) -> SpendResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let storage = Arc::clone(&self.storage);
        tokio::task::spawn_blocking(move || work(&storage))
            .await
            .map_err(|e| SpendError::Storage(format!("spawn_blocking failed: {e}")))?
    }
}
