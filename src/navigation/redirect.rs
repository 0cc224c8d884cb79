use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::{looks_like_auth_page, Navigator};
use crate::config::GatewayConfig;

/// Schedules the delayed redirect to the sign-in view.
///
/// At most one redirect is pending at a time, nothing is scheduled while the
/// user is already on an auth page, and the location is checked again when
/// the delay elapses.
#[derive(Clone)]
pub struct RedirectScheduler {
    navigator: Arc<dyn Navigator>,
    sign_in_route: String,
    auth_page_markers: Vec<String>,
    delay: Duration,
    pending: Arc<AtomicBool>,
    task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl RedirectScheduler {
    pub fn new(navigator: Arc<dyn Navigator>, config: &GatewayConfig) -> Self {
        RedirectScheduler {
            navigator,
            sign_in_route: config.sign_in_route.clone(),
            auth_page_markers: config.auth_page_markers.clone(),
            delay: config.redirect_delay(),
            pending: Arc::new(AtomicBool::new(false)),
            task: Arc::new(Mutex::new(None)),
        }
    }

    /// Whether the user is currently on a sign-in/login/auth page.
    pub fn on_auth_page(&self) -> bool {
        looks_like_auth_page(&self.navigator.current_path(), &self.auth_page_markers)
    }

    /// Schedule a redirect to sign-in after the configured delay.
    ///
    /// Returns `false` when nothing was scheduled because the user is on an
    /// auth page or another redirect is already pending. Must be called from
    /// within a tokio runtime.
    pub fn schedule(&self, reason: &str) -> bool {
        if self.on_auth_page() {
            debug!("Already on an auth page; not redirecting ({})", reason);
            return false;
        }
        if self.pending.swap(true, Ordering::AcqRel) {
            debug!("Sign-in redirect already pending; ignoring ({})", reason);
            return false;
        }

        info!(
            event_name = "navigation.redirect.scheduled",
            event_domain = "navigation",
            reason,
            delay_ms = self.delay.as_millis() as u64,
            "sign-in redirect scheduled"
        );

        let scheduler = self.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(scheduler.delay).await;
            if scheduler.on_auth_page() {
                debug!("Location moved to an auth page before the redirect fired; skipping");
            } else {
                scheduler.navigator.navigate(&scheduler.sign_in_route);
            }
            scheduler.pending.store(false, Ordering::Release);
        });
        *self.task.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
        true
    }

    /// Wait for a pending redirect to fire. Short-lived processes call this
    /// before their runtime shuts down so the redirect is not dropped.
    pub async fn flush(&self) {
        let handle = self
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                debug!("Sign-in redirect task did not complete: {}", e);
            }
        }
    }

    /// Navigate to sign-in right away, without delay.
    pub fn redirect_now(&self) {
        if !self.on_auth_page() {
            self.navigator.navigate(&self.sign_in_route);
        }
    }
}
