//! Navigation
//!
//! Seam between the login flow and whatever hosts it (browser shell, webview,
//! CLI opening a system browser).

use parking_lot::Mutex;
use std::sync::Arc;

/// Query flag appended to the login route after a failed callback.
pub const OAUTH2_FAILED: &str = "oauth2_failed";

/// A navigation performed through a [`Navigator`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NavigationTarget {
    /// Hard navigation that leaves the application.
    External(String),
    /// In-application route change.
    Route(String),
}

/// Navigation interface (for dependency injection).
#[cfg_attr(test, mockall::automock)]
pub trait Navigator: Send + Sync {
    /// Leave the application for `url`. The current page is unloaded.
    fn redirect(&self, url: &str);

    /// Switch to an in-application route.
    fn push(&self, route: &str);
}

impl<N: Navigator + ?Sized> Navigator for Arc<N> {
    fn redirect(&self, url: &str) {
        (**self).redirect(url)
    }

    fn push(&self, route: &str) {
        (**self).push(route)
    }
}

/// Login route carrying the `oauth2_failed` indicator.
pub fn login_failure_route(login_route: &str) -> String {
    let separator = if login_route.contains('?') { '&' } else { '?' };
    format!("{}{}error={}", login_route, separator, OAUTH2_FAILED)
}

/// Navigator that records every navigation instead of performing it.
#[derive(Default)]
pub struct RecordingNavigator {
    history: Mutex<Vec<NavigationTarget>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// All navigations, oldest first.
    pub fn history(&self) -> Vec<NavigationTarget> {
        self.history.lock().clone()
    }

    /// Most recent navigation.
    pub fn last(&self) -> Option<NavigationTarget> {
        self.history.lock().last().cloned()
    }
}

impl Navigator for RecordingNavigator {
    fn redirect(&self, url: &str) {
        self.history
            .lock()
            .push(NavigationTarget::External(url.to_string()));
    }

    fn push(&self, route: &str) {
        self.history
            .lock()
            .push(NavigationTarget::Route(route.to_string()));
    }
}
