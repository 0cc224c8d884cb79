//! Scripted transport used by unit tests to drive the refresh protocol.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http::header::{HeaderMap, AUTHORIZATION};
use http::StatusCode;

use super::{ApiError, Gateway, Transport};
use crate::config::GatewayConfig;
use crate::models::{AccessToken, ApiResponse, OutboundRequest};
use crate::navigation::SessionNavigator;
use crate::store::{CredentialStore, MemoryStore};

pub const REFRESH_PATH: &str = "/auth/refresh";

/// How the fake refresh endpoint answers.
#[derive(Clone)]
pub enum RefreshScript {
    /// Issue `token` after `delay`, and accept it from then on.
    Issue { token: String, delay: Duration },
    /// Issue `token` but keep rejecting it.
    IssueRejected { token: String },
    /// Answer 2xx without a token.
    NoToken,
    /// Answer with this status after `delay`.
    Status { status: u16, delay: Duration },
    /// Never answer.
    Hang,
}

/// One call observed by the fake server.
#[derive(Debug, Clone)]
pub struct SentRequest {
    pub path: String,
    pub authorization: Option<String>,
}

pub struct ScriptedTransport {
    valid_token: Mutex<Option<String>>,
    refresh: Mutex<RefreshScript>,
    forbidden_paths: Mutex<HashSet<String>>,
    failing_paths: Mutex<HashSet<String>>,
    sent: Mutex<Vec<SentRequest>>,
    refresh_calls: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new(valid_token: Option<&str>, refresh: RefreshScript) -> Self {
        ScriptedTransport {
            valid_token: Mutex::new(valid_token.map(str::to_owned)),
            refresh: Mutex::new(refresh),
            forbidden_paths: Mutex::new(HashSet::new()),
            failing_paths: Mutex::new(HashSet::new()),
            sent: Mutex::new(Vec::new()),
            refresh_calls: AtomicUsize::new(0),
        }
    }

    pub fn set_refresh(&self, refresh: RefreshScript) {
        *self.refresh.lock().unwrap() = refresh;
    }

    /// Answer 403 to every call on `path`.
    pub fn forbid(&self, path: &str) {
        self.forbidden_paths.lock().unwrap().insert(path.to_owned());
    }

    /// Answer 500 to every call on `path`.
    pub fn fail(&self, path: &str) {
        self.failing_paths.lock().unwrap().insert(path.to_owned());
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    /// Non-refresh calls, in the order they were sent.
    pub fn sent(&self) -> Vec<SentRequest> {
        self.sent.lock().unwrap().clone()
    }

    /// Paths of calls sent with `token`, in order.
    pub fn sent_with(&self, token: &str) -> Vec<String> {
        let header = format!("Bearer {}", token);
        self.sent()
            .into_iter()
            .filter(|r| r.authorization.as_deref() == Some(header.as_str()))
            .map(|r| r.path)
            .collect()
    }

    async fn answer_refresh(&self) -> Result<ApiResponse, ApiError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        let script = self.refresh.lock().unwrap().clone();
        match script {
            RefreshScript::Issue { token, delay } => {
                tokio::time::sleep(delay).await;
                *self.valid_token.lock().unwrap() = Some(token.clone());
                Ok(json_ok(format!(r#"{{"token": "{}"}}"#, token)))
            }
            RefreshScript::IssueRejected { token } => {
                Ok(json_ok(format!(r#"{{"token": "{}"}}"#, token)))
            }
            RefreshScript::NoToken => Ok(json_ok(r#"{"message": "ok"}"#.to_string())),
            RefreshScript::Status { status, delay } => {
                tokio::time::sleep(delay).await;
                Err(ApiError::from_response(status, br#"{"message": "session not found"}"#))
            }
            RefreshScript::Hang => std::future::pending().await,
        }
    }
}

fn json_ok(body: String) -> ApiResponse {
    ApiResponse::new(StatusCode::OK, HeaderMap::new(), Bytes::from(body))
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(
        &self,
        request: &OutboundRequest,
        _timeout: Duration,
    ) -> Result<ApiResponse, ApiError> {
        if request.path == REFRESH_PATH {
            return self.answer_refresh().await;
        }

        let authorization = request
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        self.sent.lock().unwrap().push(SentRequest {
            path: request.path.clone(),
            authorization: authorization.clone(),
        });

        if request.path.starts_with("/public") {
            return Ok(json_ok("{}".to_string()));
        }
        if self.forbidden_paths.lock().unwrap().contains(&request.path) {
            return Err(ApiError::from_response(403, br#"{"message": "Forbidden"}"#));
        }
        if self.failing_paths.lock().unwrap().contains(&request.path) {
            return Err(ApiError::from_response(500, b"Internal Server Error"));
        }
        if request.path.contains("/login") {
            return Err(ApiError::from_response(401, br#"{"message": "Bad credentials"}"#));
        }

        let expected = self
            .valid_token
            .lock()
            .unwrap()
            .as_ref()
            .map(|t| format!("Bearer {}", t));
        if expected.is_some() && authorization == expected {
            Ok(json_ok(format!(r#"{{"path": "{}"}}"#, request.path)))
        } else {
            Err(ApiError::from_response(401, br#"{"message": "jwt expired"}"#))
        }
    }
}

/// Everything a gateway test needs to observe.
pub struct Harness {
    pub gateway: Gateway,
    pub transport: Arc<ScriptedTransport>,
    pub store: Arc<MemoryStore>,
    pub navigator: Arc<SessionNavigator>,
}

impl Harness {
    pub fn new(stored: Option<&str>, valid: Option<&str>, refresh: RefreshScript) -> Self {
        Self::at_location("/dashboard", stored, valid, refresh)
    }

    pub fn at_location(
        location: &str,
        stored: Option<&str>,
        valid: Option<&str>,
        refresh: RefreshScript,
    ) -> Self {
        let transport = Arc::new(ScriptedTransport::new(valid, refresh));
        let store = Arc::new(match stored.and_then(AccessToken::new) {
            Some(token) => MemoryStore::with_token(token),
            None => MemoryStore::new(),
        });
        let navigator = Arc::new(SessionNavigator::new(location));
        let gateway = Gateway::new(
            GatewayConfig::new("https://api.example.com"),
            transport.clone(),
            store.clone(),
            navigator.clone(),
        );
        Harness {
            gateway,
            transport,
            store,
            navigator,
        }
    }

    pub fn stored_token(&self) -> Option<String> {
        self.store.get().map(|t| t.as_str().to_owned())
    }
}
