use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Redirects to the sign-in view never fire sooner than this.
pub const MIN_REDIRECT_DELAY: Duration = Duration::from_millis(100);

/// Settings of the authenticated request gateway.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct GatewayConfig {
    /// Base URL prepended to every request path.
    pub base_url: String,
    /// Timeout applied to every regular API call.
    #[serde(default = "default_timeout_in_ms")]
    pub timeout_in_ms: u64,
    /// Timeout of the refresh call.
    #[serde(default = "default_refresh_timeout_in_ms")]
    pub refresh_timeout_in_ms: u64,
    /// Content type sent with JSON bodies.
    #[serde(default = "default_content_type")]
    pub content_type: String,
    #[serde(default = "default_refresh_path")]
    pub refresh_path: String,
    #[serde(default = "default_sign_in_path")]
    pub sign_in_path: String,
    /// Application route of the login page.
    #[serde(default = "default_sign_in_route")]
    pub sign_in_route: String,
    #[serde(default = "default_redirect_delay_in_ms")]
    pub redirect_delay_in_ms: u64,
    /// Request paths containing any of these are login/registration calls
    /// and never trigger recovery.
    #[serde(default = "default_auth_endpoint_markers")]
    pub auth_endpoint_markers: Vec<String>,
    /// Page paths containing any of these count as "already on a login page".
    #[serde(default = "default_auth_page_markers")]
    pub auth_page_markers: Vec<String>,
}

fn default_timeout_in_ms() -> u64 {
    60_000
}

fn default_refresh_timeout_in_ms() -> u64 {
    5_000
}

fn default_content_type() -> String {
    "application/json".to_string()
}

fn default_refresh_path() -> String {
    "/auth/refresh".to_string()
}

fn default_sign_in_path() -> String {
    "/auth/login".to_string()
}

fn default_sign_in_route() -> String {
    "/signin".to_string()
}

fn default_redirect_delay_in_ms() -> u64 {
    100
}

fn default_auth_endpoint_markers() -> Vec<String> {
    ["/login", "/register", "/signin", "/signup"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_auth_page_markers() -> Vec<String> {
    ["/signin", "/login", "/auth"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl GatewayConfig {
    /// A config with every setting at its default.
    pub fn new(base_url: impl Into<String>) -> Self {
        GatewayConfig {
            base_url: base_url.into(),
            timeout_in_ms: default_timeout_in_ms(),
            refresh_timeout_in_ms: default_refresh_timeout_in_ms(),
            content_type: default_content_type(),
            refresh_path: default_refresh_path(),
            sign_in_path: default_sign_in_path(),
            sign_in_route: default_sign_in_route(),
            redirect_delay_in_ms: default_redirect_delay_in_ms(),
            auth_endpoint_markers: default_auth_endpoint_markers(),
            auth_page_markers: default_auth_page_markers(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_in_ms)
    }

    pub fn refresh_timeout(&self) -> Duration {
        Duration::from_millis(self.refresh_timeout_in_ms)
    }

    /// Delay before a sign-in redirect, clamped to [`MIN_REDIRECT_DELAY`].
    pub fn redirect_delay(&self) -> Duration {
        Duration::from_millis(self.redirect_delay_in_ms).max(MIN_REDIRECT_DELAY)
    }

    /// Whether a request path targets a login or registration endpoint.
    pub fn is_auth_endpoint(&self, path: &str) -> bool {
        self.auth_endpoint_markers
            .iter()
            .any(|marker| path.contains(marker.as_str()))
    }

    /// Absolute URL for a request path.
    pub fn url_for(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        if path.starts_with('/') {
            format!("{}{}", base, path)
        } else {
            format!("{}/{}", base, path)
        }
    }
}
