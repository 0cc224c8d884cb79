use std::sync::Arc;

use http::header::{HeaderValue, AUTHORIZATION};
use tracing::{debug, info, warn};

use super::refresh::{RefreshCoordinator, RefreshTicket};
use super::transport::Transport;
use super::ApiError;
use crate::config::GatewayConfig;
use crate::models::{AccessToken, ApiResponse, OutboundRequest, RefreshResponse};
use crate::navigation::{Navigator, RedirectScheduler};
use crate::store::CredentialStore;

/// Issues every API call with the current access token attached, and
/// recovers from token expiry with a single shared refresh.
///
/// Cloning is cheap and every clone shares the same refresh state, store and
/// redirect scheduler.
#[derive(Clone)]
pub struct Gateway {
    config: Arc<GatewayConfig>,
    transport: Arc<dyn Transport>,
    store: Arc<dyn CredentialStore>,
    redirects: RedirectScheduler,
    refresh: RefreshCoordinator,
}

impl Gateway {
    pub fn new(
        config: GatewayConfig,
        transport: Arc<dyn Transport>,
        store: Arc<dyn CredentialStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let redirects = RedirectScheduler::new(navigator, &config);
        Gateway {
            config: Arc::new(config),
            transport,
            store,
            redirects,
            refresh: RefreshCoordinator::new(),
        }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    pub fn redirects(&self) -> &RedirectScheduler {
        &self.redirects
    }

    pub fn refresh_coordinator(&self) -> &RefreshCoordinator {
        &self.refresh
    }

    /// Pre-send hook: a copy of `request` carrying the stored token as a
    /// bearer credential. Without a token the copy goes out unauthenticated.
    pub fn prepare(&self, request: &OutboundRequest) -> OutboundRequest {
        let mut prepared = request.clone();
        if let Some(token) = self.store.get() {
            match HeaderValue::from_str(&token.bearer_header()) {
                Ok(mut value) => {
                    value.set_sensitive(true);
                    prepared.headers.insert(AUTHORIZATION, value);
                }
                Err(_) => warn!(
                    request_id = %request.id,
                    "Stored token is not a valid header value; sending unauthenticated"
                ),
            }
        }
        prepared
    }

    /// Send `request`, transparently refreshing the token and re-issuing the
    /// call once if the server reports it expired.
    pub async fn execute(&self, request: OutboundRequest) -> Result<ApiResponse, ApiError> {
        match self.dispatch(&request).await {
            Ok(response) => Ok(response),
            Err(err) => self.recover(request, err).await,
        }
    }

    async fn dispatch(&self, request: &OutboundRequest) -> Result<ApiResponse, ApiError> {
        let prepared = self.prepare(request);
        self.transport.send(&prepared, self.config.timeout()).await
    }

    /// Post-response hook for a failed call.
    async fn recover(
        &self,
        mut request: OutboundRequest,
        err: ApiError,
    ) -> Result<ApiResponse, ApiError> {
        if self.config.is_auth_endpoint(&request.path) {
            debug!(
                request_id = %request.id,
                path = request.path.as_str(),
                "Auth endpoint failed; surfacing as-is"
            );
            return Err(err);
        }

        if err.is_unauthorized() && !request.retried {
            if self.redirects.on_auth_page() {
                debug!(
                    request_id = %request.id,
                    "401 while on an auth page; not refreshing"
                );
                return Err(err);
            }
            request.retried = true;
            return match self.refresh.begin_or_join() {
                RefreshTicket::Follower(wait) => {
                    debug!(
                        request_id = %request.id,
                        position = wait.position(),
                        "Waiting for in-flight refresh"
                    );
                    wait.wait().await?;
                    self.replay(&request).await
                }
                RefreshTicket::Leader(lead) => match self.refresh_access_token().await {
                    Ok(token) => {
                        self.store.set(token);
                        let released = lead.settle(Ok(()));
                        info!(
                            event_name = "gateway.refresh.succeeded",
                            event_domain = "gateway",
                            request_id = %request.id,
                            released,
                            "access token refreshed"
                        );
                        self.replay(&request).await
                    }
                    Err(refresh_err) => {
                        let released = lead.settle(Err(refresh_err.clone()));
                        warn!(
                            event_name = "gateway.refresh.failed",
                            event_domain = "gateway",
                            request_id = %request.id,
                            released,
                            "access token refresh failed: {}",
                            refresh_err
                        );
                        self.apply_refresh_failure_policy(&refresh_err);
                        Err(refresh_err)
                    }
                },
            };
        }

        if err.is_forbidden() {
            self.apply_forbidden_policy(&request);
        }
        Err(err)
    }

    /// Re-issue a call after a refresh settled successfully. A second 401 is
    /// terminal for the call; a 403 still clears the session.
    async fn replay(&self, request: &OutboundRequest) -> Result<ApiResponse, ApiError> {
        debug!(
            request_id = %request.id,
            path = request.path.as_str(),
            "Re-issuing request after refresh"
        );
        self.dispatch(request).await.inspect_err(|err| {
            if err.is_forbidden() {
                self.apply_forbidden_policy(request);
            }
        })
    }

    /// Exchange the session cookie for a new access token.
    ///
    /// Sends `POST {base}{refresh_path}` with an empty body, bounded by the
    /// refresh timeout. A success without a token is [`ApiError::NoTokenReceived`].
    pub async fn refresh_access_token(&self) -> Result<AccessToken, ApiError> {
        let request = OutboundRequest::post(self.config.refresh_path.clone());
        let timeout = self.config.refresh_timeout();
        debug!(request_id = %request.id, "Refreshing access token");

        let response = tokio::time::timeout(timeout, self.transport.send(&request, timeout))
            .await
            .map_err(|_| ApiError::Timeout {
                timeout_ms: self.config.refresh_timeout_in_ms,
            })??;

        response
            .json::<RefreshResponse>()
            .ok()
            .and_then(|body| body.token)
            .and_then(AccessToken::new)
            .ok_or(ApiError::NoTokenReceived)
    }

    /// Refresh failures that prove the session is gone clear the token and
    /// send the user to sign-in. Anything else is left for the caller to retry.
    fn apply_refresh_failure_policy(&self, err: &ApiError) {
        if err.is_session_invalid() {
            warn!(
                event_name = "gateway.session.invalid",
                event_domain = "gateway",
                status = err.status(),
                "session is gone; clearing stored credentials"
            );
            self.store.clear();
            self.redirects.schedule("refresh rejected");
        } else {
            debug!("Transient refresh failure; keeping stored credentials");
        }
    }

    fn apply_forbidden_policy(&self, request: &OutboundRequest) {
        warn!(
            event_name = "gateway.forbidden",
            event_domain = "gateway",
            request_id = %request.id,
            path = request.path.as_str(),
            "403 received; clearing stored credentials"
        );
        self.store.clear();
        self.redirects.schedule("forbidden");
    }
}
