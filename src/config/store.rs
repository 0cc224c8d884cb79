use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Where the access token lives between runs. Differentiated by a "type"
/// tag in the YAML.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
#[serde(tag = "type")]
pub enum StoreConfig {
    /// Process memory only; the token is gone on restart.
    #[serde(rename = "memory")]
    Memory,
    /// A JSON file on disk.
    #[serde(rename = "file")]
    File(FileStoreConfig),
}

#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct FileStoreConfig {
    #[serde(default = "default_token_path")]
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::File(FileStoreConfig {
            path: default_token_path(),
        })
    }
}

/// Resolve the default token file.
///
/// Checks `AUDITDESK_STATE_DIR`, then `$XDG_STATE_HOME/auditdesk`,
/// then `$HOME/.local/state/auditdesk`, then `.auditdesk`.
pub fn default_token_path() -> PathBuf {
    state_dir().join("token.json")
}

fn state_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("AUDITDESK_STATE_DIR") {
        return PathBuf::from(dir);
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return PathBuf::from(xdg).join("auditdesk");
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".local/state/auditdesk");
    }
    PathBuf::from(".auditdesk")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_path_follows_state_dir() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("AUDITDESK_STATE_DIR", "/srv/auditdesk");
            assert_eq!(
                default_token_path(),
                PathBuf::from("/srv/auditdesk/token.json")
            );
            Ok(())
        });
    }

    #[test]
    fn test_default_path_falls_back_to_xdg() {
        figment::Jail::expect_with(|jail| {
            std::env::remove_var("AUDITDESK_STATE_DIR");
            jail.set_env("XDG_STATE_HOME", "/home/alice/.state");
            assert_eq!(
                default_token_path(),
                PathBuf::from("/home/alice/.state/auditdesk/token.json")
            );
            Ok(())
        });
    }
}
