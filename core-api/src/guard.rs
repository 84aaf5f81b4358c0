//! Route Guard
//!
//! Keeps unauthenticated users out of the console's protected routes while
//! preserving the path they asked for, so the shell can send them back
//! there after login.

use core_session::SessionStore;
use url::form_urlencoded;

/// Decision for a navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// A current user exists; let the navigation through.
    Allow,
    /// No session; send the user to login, carrying the requested path.
    RedirectToLogin {
        /// Login route with the requested path as a `returnUrl` query
        /// parameter, e.g. `/login?returnUrl=%2Ftransport-items%2F7`.
        redirect_to: String,
    },
}

/// Guards protected routes on the presence of a session.
#[derive(Debug, Clone)]
pub struct RouteGuard {
    store: SessionStore,
}

impl RouteGuard {
    pub fn new(store: SessionStore) -> Self {
        Self { store }
    }

    /// Checks whether navigation to `path` is allowed.
    pub fn check(&self, path: &str) -> GuardDecision {
        if self.store.session().is_some() {
            return GuardDecision::Allow;
        }

        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("returnUrl", path)
            .finish();

        GuardDecision::RedirectToLogin {
            redirect_to: format!("/login?{}", query),
        }
    }
}
