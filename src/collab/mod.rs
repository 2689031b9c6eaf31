//! External collaborators
//!
//! The shell talks to two services through narrow traits: a chat-completions
//! endpoint that produces assistant replies, and the account registration
//! service. Neither touches the store; results come back as values and the
//! terminal host decides what to do with them.

mod compose;
mod registration;

pub use compose::{ComposeService, DeltaSink, HttpComposeService};
pub use registration::{
    submit_registration, HttpRegistrationService, RegistrationOutcome, RegistrationRequest,
    RegistrationService, ValidationError,
};

use thiserror::Error;

/// Failure talking to a collaborator
#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("{0}")]
    Validation(#[from] ValidationError),
}

/// Trim a response body for an error message
fn excerpt(body: &str) -> String {
    const LIMIT: usize = 200;
    let body = body.trim();
    match body.char_indices().nth(LIMIT) {
        Some((cut, _)) => format!("{}…", &body[..cut]),
        None => body.to_string(),
    }
}
