//! Application startup.
//!
//! Turns a loaded configuration into a ready [`ApiClient`]: the credential
//! store, the cookie-keeping HTTP transport and the gateway that ties them to
//! the navigator.

use std::sync::Arc;

use tracing::info;

use crate::api::ApiClient;
use crate::config::ConfigV1;
use crate::gateway::{ApiError, Gateway, ReqwestTransport};
use crate::navigation::Navigator;
use crate::store::create_store;

/// Builds the client described by `config`.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be constructed.
pub fn build_client(
    config: &ConfigV1,
    navigator: Arc<dyn Navigator>,
) -> Result<ApiClient, ApiError> {
    let store = create_store(&config.store);
    let transport = Arc::new(ReqwestTransport::new(&config.gateway)?);

    info!(
        event_name = "startup.client.ready",
        event_domain = "startup",
        base_url = config.gateway.base_url.as_str(),
        "API client configured"
    );

    let gateway = Gateway::new(config.gateway.clone(), transport, store, navigator);
    Ok(ApiClient::new(gateway))
}
