use bytes::Bytes;
use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::Method;
use serde_json::Value;
use uuid::Uuid;

/// A file attached to a multipart upload.
#[derive(Debug, Clone, PartialEq)]
pub struct FilePart {
    /// Form field the file is sent under.
    pub field: String,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

/// Body of an outbound call. Every variant is cheap to clone so a call can be
/// re-issued after a credential refresh.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    File(FilePart),
}

/// Description of one API call as seen by the gateway.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    /// Correlates the log lines of a call and its replay.
    pub id: Uuid,
    pub method: Method,
    /// Path relative to the configured base URL, e.g. `/client/bills/1`.
    pub path: String,
    pub headers: HeaderMap,
    pub body: RequestBody,
    /// Set once the gateway has re-issued this call after a refresh.
    pub(crate) retried: bool,
}

impl OutboundRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        OutboundRequest {
            id: Uuid::new_v4(),
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            body: RequestBody::Empty,
            retried: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn with_json(mut self, body: Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    pub fn with_file(mut self, file: FilePart) -> Self {
        self.body = RequestBody::File(file);
        self
    }

    /// Adds a header. Invalid names or values are skipped with a warning
    /// rather than failing the call.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                self.headers.insert(name, value);
            }
            _ => tracing::warn!("Skipping invalid header '{}' on {}", name, self.path),
        }
        self
    }

    /// Whether the gateway already re-issued this call once.
    pub fn was_retried(&self) -> bool {
        self.retried
    }
}
