//! Authentication Types
//!
//! Data structures shared by the flow coordinator and the session store.

pub mod callback;
pub mod config;
pub mod user;

pub use callback::*;
pub use config::*;
pub use user::*;
