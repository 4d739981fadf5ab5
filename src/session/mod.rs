//! Session
//!
//! Session store, token persistence and route guards.

pub mod guards;
pub mod persistence;
pub mod store;

pub use guards::{
    redirect_if_authenticated, require_admin, require_auth, AccessControl, GuardDecision,
};
pub use persistence::{
    FileTokenPersistence, InMemoryTokenPersistence, MockTokenPersistence, PersistenceOp,
    TokenPersistence,
};
pub use store::{SessionState, SessionStore};
