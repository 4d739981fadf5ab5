//! Route Guards
//!
//! Navigation decisions derived from the session predicates.

use std::sync::Arc;

use crate::types::RouteConfig;

/// Read-only view of the session used by guards.
pub trait AccessControl {
    fn is_authenticated(&self) -> bool;
    fn is_admin(&self) -> bool;
}

impl<A: AccessControl + ?Sized> AccessControl for Arc<A> {
    fn is_authenticated(&self) -> bool {
        (**self).is_authenticated()
    }

    fn is_admin(&self) -> bool {
        (**self).is_admin()
    }
}

/// Result of running a guard.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    /// Navigation may proceed.
    Allow,
    /// Navigation is replaced by the given route.
    Redirect(String),
}

impl GuardDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Only signed-in users pass; others go to the login route.
pub fn require_auth(session: &impl AccessControl, routes: &RouteConfig) -> GuardDecision {
    if session.is_authenticated() {
        GuardDecision::Allow
    } else {
        GuardDecision::Redirect(routes.login.clone())
    }
}

/// Only administrators pass. Anonymous users go to login, others go home.
pub fn require_admin(session: &impl AccessControl, routes: &RouteConfig) -> GuardDecision {
    if !session.is_authenticated() {
        GuardDecision::Redirect(routes.login.clone())
    } else if !session.is_admin() {
        GuardDecision::Redirect(routes.home.clone())
    } else {
        GuardDecision::Allow
    }
}

/// Keeps signed-in users off the login page.
pub fn redirect_if_authenticated(
    session: &impl AccessControl,
    routes: &RouteConfig,
) -> GuardDecision {
    if session.is_authenticated() {
        GuardDecision::Redirect(routes.home.clone())
    } else {
        GuardDecision::Allow
    }
}
