use bytes::Bytes;
use http::header::HeaderMap;
use http::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::gateway::ApiError;

/// A successful (2xx) response returned by the gateway.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ApiResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        ApiResponse {
            status,
            headers,
            body,
        }
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_slice(&self.body).map_err(|e| ApiError::Decode {
            message: format!("Error parsing JSON: {}", e),
        })
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Body of a refresh or sign-in response. A missing `token` is a failure
/// even when the HTTP status is a success.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct RefreshResponse {
    #[serde(default)]
    pub token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_response_without_token() {
        let parsed: RefreshResponse = serde_json::from_str(r#"{"message": "ok"}"#).unwrap();
        assert!(parsed.token.is_none());
    }

    #[test]
    fn test_json_decode_error_is_reported() {
        let response = ApiResponse::new(StatusCode::OK, HeaderMap::new(), Bytes::from("not json"));
        let result: Result<serde_json::Value, _> = response.json();
        assert!(matches!(result, Err(ApiError::Decode { .. })));
    }
}
