use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;

use super::upload::DocumentUpload;
use crate::gateway::{ApiError, Gateway};
use crate::models::{AccessToken, ApiResponse, OutboundRequest, RefreshResponse};

pub const CURRENT_USER_PATH: &str = "/user/getuser";

/// Typed entry point for the dashboard's API calls. Every call goes through
/// the [`Gateway`], so token attachment and refresh are transparent here.
#[derive(Clone)]
pub struct ApiClient {
    gateway: Gateway,
}

impl ApiClient {
    pub fn new(gateway: Gateway) -> Self {
        ApiClient { gateway }
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    pub async fn execute(&self, request: OutboundRequest) -> Result<ApiResponse, ApiError> {
        self.gateway.execute(request).await
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.execute(OutboundRequest::get(path)).await?.json()
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = OutboundRequest::post(path).with_json(to_json(body)?);
        self.execute(request).await?.json()
    }

    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = OutboundRequest::put(path).with_json(to_json(body)?);
        self.execute(request).await?.json()
    }

    pub async fn delete(&self, path: &str) -> Result<ApiResponse, ApiError> {
        self.execute(OutboundRequest::delete(path)).await
    }

    pub async fn current_user(&self) -> Result<Value, ApiError> {
        self.get_json(CURRENT_USER_PATH).await
    }

    /// Exchange credentials for an access token and store it.
    pub async fn sign_in(&self, username: &str, password: &str) -> Result<(), ApiError> {
        if username.trim().is_empty() {
            return Err(ApiError::validation("username", "a username is required"));
        }
        if password.is_empty() {
            return Err(ApiError::validation("password", "a password is required"));
        }

        let path = self.gateway.config().sign_in_path.clone();
        let request =
            OutboundRequest::post(path).with_json(json!({ "username": username, "password": password }));
        let response = self.execute(request).await?;

        let token = response
            .json::<RefreshResponse>()
            .ok()
            .and_then(|body| body.token)
            .and_then(AccessToken::new)
            .ok_or(ApiError::NoTokenReceived)?;
        self.gateway.store().set(token);

        info!(
            event_name = "client.sign_in.succeeded",
            event_domain = "client",
            username,
            "signed in"
        );
        Ok(())
    }

    /// Forget the stored token and go back to the sign-in view.
    pub fn sign_out(&self) {
        self.gateway.store().clear();
        self.gateway.redirects().redirect_now();
        info!(
            event_name = "client.sign_out",
            event_domain = "client",
            "signed out"
        );
    }

    /// Let a scheduled sign-in redirect fire before the caller exits.
    pub async fn flush_navigation(&self) {
        self.gateway.redirects().flush().await;
    }

    /// Upload a document as multipart form data. Empty names and empty files
    /// are rejected before anything is sent.
    pub async fn upload_document(
        &self,
        path: &str,
        field: &str,
        file_name: &str,
        bytes: Bytes,
    ) -> Result<ApiResponse, ApiError> {
        let part = DocumentUpload::new(field, file_name, bytes).into_part()?;
        self.execute(OutboundRequest::post(path).with_file(part)).await
    }
}

fn to_json<B: Serialize + ?Sized>(body: &B) -> Result<Value, ApiError> {
    serde_json::to_value(body).map_err(|e| ApiError::validation("body", e.to_string()))
}
