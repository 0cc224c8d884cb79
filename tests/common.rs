#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use auditdesk::api::ApiClient;
use auditdesk::config::{load_config_from_str, ConfigV1};
use auditdesk::models::AccessToken;
use auditdesk::navigation::SessionNavigator;
use auditdesk::startup::build_client;

/// Longer than the redirect delay, so a scheduled redirect has fired.
pub const REDIRECT_SETTLE: Duration = Duration::from_millis(400);

pub fn build_config(base_url: &str) -> ConfigV1 {
    let yaml = format!(
        r#"
version: "1.0.0"
gateway:
  base_url: "{base_url}"
  timeout_in_ms: 3000
  refresh_timeout_in_ms: 2000
store:
  type: "memory"
logging:
  level: "warn"
  format: "json"
"#
    );

    load_config_from_str(&yaml).expect("Failed to parse integration test config")
}

/// A client against `base_url`, starting on the dashboard.
pub fn client_for(base_url: &str) -> (ApiClient, Arc<SessionNavigator>) {
    let navigator = Arc::new(SessionNavigator::new("/dashboard"));
    let client = build_client(&build_config(base_url), navigator.clone())
        .expect("failed to build client");
    (client, navigator)
}

pub fn store_token(client: &ApiClient, token: &str) {
    client
        .gateway()
        .store()
        .set(AccessToken::new(token).expect("token must not be empty"));
}

pub fn stored_token(client: &ApiClient) -> Option<String> {
    client
        .gateway()
        .store()
        .get()
        .map(|t| t.as_str().to_owned())
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}
