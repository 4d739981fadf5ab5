//! Flows
//!
//! Authorization Code login through the course platform's provider.

pub mod authorization_code;

pub use authorization_code::{
    AuthorizationFlow, AuthorizationFlowCoordinator, FlowPhase, FlowStatus,
};
