//! Core Components
//!
//! Transport, navigation and callback-parameter plumbing shared by the flow
//! and the session store.

pub mod interceptor;
pub mod navigator;
pub mod params;
pub mod state;
pub mod transport;

pub use interceptor::*;
pub use navigator::*;
pub use params::*;
pub use state::*;
pub use transport::*;
