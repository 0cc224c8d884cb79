use std::sync::{PoisonError, RwLock};

use super::CredentialStore;
use crate::models::AccessToken;

/// Keeps the token in process memory only.
#[derive(Default)]
pub struct MemoryStore {
    token: RwLock<Option<AccessToken>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore {
            token: RwLock::new(None),
        }
    }

    pub fn with_token(token: AccessToken) -> Self {
        MemoryStore {
            token: RwLock::new(Some(token)),
        }
    }
}

impl CredentialStore for MemoryStore {
    fn get(&self) -> Option<AccessToken> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set(&self, token: AccessToken) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token);
    }

    fn clear(&self) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}
