use std::sync::{PoisonError, RwLock};

use tracing::info;

use super::Navigator;

/// An in-process location, standing in for the browser's address bar.
pub struct SessionNavigator {
    location: RwLock<String>,
    history: RwLock<Vec<String>>,
}

impl SessionNavigator {
    pub fn new(start: impl Into<String>) -> Self {
        SessionNavigator {
            location: RwLock::new(start.into()),
            history: RwLock::new(Vec::new()),
        }
    }

    /// Every route navigated to, oldest first.
    pub fn history(&self) -> Vec<String> {
        self.history
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for SessionNavigator {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Navigator for SessionNavigator {
    fn current_path(&self) -> String {
        self.location
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn navigate(&self, route: &str) {
        info!(
            event_name = "navigation.navigate",
            event_domain = "navigation",
            route,
            "navigating"
        );
        *self.location.write().unwrap_or_else(PoisonError::into_inner) = route.to_string();
        self.history
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(route.to_string());
    }
}
