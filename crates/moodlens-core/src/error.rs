use thiserror::Error;

/// Errors surfaced by the core clients.
///
/// The feed treats every `Store` error the same way (terminal "unavailable"
/// state, no retry); the variants exist so the login flow and the CLI can
/// present different messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The document store rejected a request or could not be reached.
    #[error("document store error ({status}): {body}")]
    Store { status: u16, body: String },

    /// Sign-in was rejected by the identity service.
    /// `message` is already human-readable (see `auth::friendly_auth_message`).
    #[error("{message}")]
    Auth { code: String, message: String },

    /// Transport-level failure before any service response.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A response body did not decode into the expected shape.
    #[error("unexpected response shape: {0}")]
    Decode(String),
}

impl CoreError {
    /// Short single-line form for status bars and CLI stderr.
    pub fn brief(&self) -> String {
        match self {
            CoreError::Store { status, .. } => format!("store error ({status})"),
            CoreError::Auth { message, .. } => message.clone(),
            CoreError::Http(_) => "network error".to_string(),
            CoreError::Decode(_) => "bad response from service".to_string(),
        }
    }
}
