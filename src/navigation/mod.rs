//! Navigation capability used for sign-in redirects.
//!
//! The gateway never touches a real browser location. It asks an injected
//! [`Navigator`] where the user is and where to send them, which keeps the
//! redirect policy testable in isolation.

mod redirect;
mod session;

pub use redirect::RedirectScheduler;
pub use session::SessionNavigator;

/// Where the user currently is, and how to send them elsewhere.
pub trait Navigator: Send + Sync {
    fn current_path(&self) -> String;
    fn navigate(&self, route: &str);
}

/// Whether `path` is a sign-in/login/auth page according to `markers`.
pub fn looks_like_auth_page(path: &str, markers: &[String]) -> bool {
    markers.iter().any(|marker| path.contains(marker.as_str()))
}
