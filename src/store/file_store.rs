//! Token persistence: a JSON file written atomically, mirrored in memory.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::CredentialStore;
use crate::models::AccessToken;

#[derive(Serialize, Deserialize, Debug, Default)]
struct PersistedToken {
    #[serde(default)]
    token: Option<AccessToken>,
}

/// Persists the token to disk so it survives restarts.
///
/// Reads are served from memory; the file is only read once, on open.
pub struct FileStore {
    path: PathBuf,
    token: RwLock<Option<AccessToken>>,
}

impl FileStore {
    /// Open a store backed by `path`. A missing or unreadable file yields an
    /// empty store.
    pub fn open(path: &Path) -> Self {
        let token = match load(path) {
            Ok(persisted) => persisted.token,
            Err(e) => {
                debug!("No usable token file at '{}': {}", path.display(), e);
                None
            }
        };
        FileStore {
            path: path.to_path_buf(),
            token: RwLock::new(token),
        }
    }

    fn persist(&self, token: Option<AccessToken>) {
        let persisted = PersistedToken { token };
        if let Err(e) = save(&self.path, &persisted) {
            warn!(
                event_name = "store.file.write_failed",
                event_domain = "store",
                path = %self.path.display(),
                "failed to persist access token: {}",
                e
            );
        }
    }
}

impl CredentialStore for FileStore {
    fn get(&self) -> Option<AccessToken> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set(&self, token: AccessToken) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token.clone());
        self.persist(Some(token));
    }

    fn clear(&self) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
        self.persist(None);
    }
}

fn load(path: &Path) -> std::io::Result<PersistedToken> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(std::io::Error::other)
}

/// Write to a unique temp file, then rename over the target.
fn save(path: &Path, persisted: &PersistedToken) -> std::io::Result<()> {
    static COUNTER: AtomicU32 = AtomicU32::new(0);

    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            std::fs::create_dir_all(dir)?;
        }
    }
    let json = serde_json::to_string_pretty(persisted).map_err(std::io::Error::other)?;
    let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
    let tmp_name = format!(
        "{}.{}.{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy(),
        std::process::id(),
        seq,
    );
    let tmp_path = path.with_file_name(tmp_name);
    std::fs::write(&tmp_path, json)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state/token.json");

        let store = FileStore::open(&path);
        assert!(store.get().is_none());
        store.set(AccessToken::new("persisted").unwrap());

        let reopened = FileStore::open(&path);
        assert_eq!(reopened.get().unwrap().as_str(), "persisted");
    }

    #[test]
    fn test_clear_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");

        let store = FileStore::open(&path);
        store.set(AccessToken::new("short-lived").unwrap());
        store.clear();

        assert!(store.get().is_none());
        assert!(FileStore::open(&path).get().is_none());
    }

    #[test]
    fn test_corrupt_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        std::fs::write(&path, "{not json").unwrap();

        assert!(FileStore::open(&path).get().is_none());
    }
}
