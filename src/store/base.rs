use std::sync::Arc;

use tracing::info;

use super::{file_store::FileStore, memory_store::MemoryStore};
use crate::config::StoreConfig;
use crate::models::AccessToken;

/// The CredentialStore trait abstracts where the access token lives.
///
/// All operations are synchronous and never fail: a store that cannot read
/// behaves as empty, and a store that cannot write logs the problem and keeps
/// the value in memory.
pub trait CredentialStore: Send + Sync {
    fn get(&self) -> Option<AccessToken>;
    fn set(&self, token: AccessToken);
    fn clear(&self);
}

/// Creates a concrete store implementation based on the StoreConfig.
pub fn create_store(config: &StoreConfig) -> Arc<dyn CredentialStore> {
    match config {
        StoreConfig::Memory => {
            info!("Using in-memory credential store.");
            Arc::new(MemoryStore::new())
        }
        StoreConfig::File(file_config) => {
            info!(
                "Using file credential store at '{}'.",
                file_config.path.display()
            );
            Arc::new(FileStore::open(&file_config.path))
        }
    }
}
