//! The network seam: sends one prepared request and reports the outcome.

use std::time::Duration;

use async_trait::async_trait;
use http::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use tracing::debug;

use super::ApiError;
use crate::config::GatewayConfig;
use crate::models::{ApiResponse, OutboundRequest, RequestBody};

/// Sends a request exactly as given. Non-2xx responses come back as
/// [`ApiError::Status`]; recovery is the caller's job.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        request: &OutboundRequest,
        timeout: Duration,
    ) -> Result<ApiResponse, ApiError>;
}

/// Transport backed by a shared `reqwest::Client`.
///
/// The client keeps a cookie store, so cookies set by the server (such as the
/// session cookie the refresh endpoint relies on) go out with every request.
pub struct ReqwestTransport {
    client: Client,
    config: GatewayConfig,
}

impl ReqwestTransport {
    pub fn new(config: &GatewayConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .cookie_store(true)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Network {
                message: format!("Failed to build HTTP client: {}", e),
            })?;
        Ok(Self::with_client(client, config))
    }

    pub fn with_client(client: Client, config: &GatewayConfig) -> Self {
        ReqwestTransport {
            client,
            config: config.clone(),
        }
    }

    fn build_body(
        &self,
        builder: reqwest::RequestBuilder,
        request: &OutboundRequest,
    ) -> Result<reqwest::RequestBuilder, ApiError> {
        match &request.body {
            RequestBody::Empty => Ok(builder),
            RequestBody::Json(value) => {
                let body = serde_json::to_vec(value).map_err(|e| {
                    ApiError::validation("body", format!("could not serialize JSON: {}", e))
                })?;
                let builder = if request.headers.contains_key(CONTENT_TYPE) {
                    builder
                } else {
                    builder.header(CONTENT_TYPE, self.config.content_type.as_str())
                };
                Ok(builder.body(body))
            }
            RequestBody::File(file) => {
                let part = Part::bytes(file.bytes.to_vec())
                    .file_name(file.file_name.clone())
                    .mime_str(&file.content_type)
                    .map_err(|e| ApiError::validation("content_type", e.to_string()))?;
                Ok(builder.multipart(Form::new().part(file.field.clone(), part)))
            }
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(
        &self,
        request: &OutboundRequest,
        timeout: Duration,
    ) -> Result<ApiResponse, ApiError> {
        let timeout_ms = timeout.as_millis() as u64;
        let url = self.config.url_for(&request.path);
        debug!(
            request_id = %request.id,
            method = %request.method,
            url = url.as_str(),
            "Sending request"
        );

        let builder = self
            .client
            .request(request.method.clone(), &url)
            .headers(request.headers.clone())
            .timeout(timeout);
        let builder = self.build_body(builder, request)?;

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest(e, timeout_ms))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::from_reqwest(e, timeout_ms))?;

        if status.is_success() {
            Ok(ApiResponse::new(status, headers, body))
        } else {
            debug!(
                request_id = %request.id,
                status = status.as_u16(),
                "Request failed"
            );
            Err(ApiError::from_response(status.as_u16(), &body))
        }
    }
}
