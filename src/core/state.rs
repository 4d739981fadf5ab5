//! State Validation
//!
//! Syntactic checks for the anti-forgery `state` parameter.
//!
//! The backend issues and tracks state tokens; the client only verifies that
//! a token has the expected shape before it is used or sent back.

use rand::Rng;

use crate::error::{AuthError, ValidationError};

/// Length of a well-formed state token.
pub const STATE_LENGTH: usize = 32;

/// True iff `state` is exactly 32 lowercase hexadecimal characters.
pub fn validate_state(state: &str) -> bool {
    state.len() == STATE_LENGTH
        && state
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

/// Validate state, producing a validation error on mismatch.
pub fn ensure_valid_state(state: &str) -> Result<(), AuthError> {
    if validate_state(state) {
        Ok(())
    } else {
        Err(AuthError::Validation(ValidationError::InvalidState {
            state: state.to_string(),
        }))
    }
}

/// Generate a fresh state token in the accepted shape.
pub fn generate_state() -> String {
    let bytes: [u8; STATE_LENGTH / 2] = rand::thread_rng().gen();
    hex::encode(bytes)
}
