use thiserror::Error;

use crate::common::Notice;

/// Failures reported by an auth or row-store collaborator.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Rejected credentials or sign-up, carrying the server's message.
    #[error("{0}")]
    Auth(String),
    /// Rejected insert or query, carrying the server's message.
    #[error("{0}")]
    Request(String),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Sqlite Error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Malformed record: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Invalid identifier `{0}`")]
    InvalidIdentifier(String),
}

/// The four categories surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Authentication,
    AuthenticationRequired,
    Validation,
    Transport,
}

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("{0}")]
    Authentication(String),
    #[error("You need to be signed in to send messages.")]
    AuthenticationRequired,
    #[error("{0}")]
    Validation(String),
    #[error("Could not fetch messages: {0}")]
    Fetch(#[source] BackendError),
    #[error("Failed to add message: {0}")]
    Send(#[source] BackendError),
    #[error("{0}")]
    Transport(#[from] BackendError),
}

impl FeedError {
    /// Auth collaborator failures keep the server message; anything else is transport.
    pub fn from_auth(err: BackendError) -> Self {
        match err {
            BackendError::Auth(message) => FeedError::Authentication(message),
            other => FeedError::Transport(other),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            FeedError::Authentication(_) => ErrorKind::Authentication,
            FeedError::AuthenticationRequired => ErrorKind::AuthenticationRequired,
            FeedError::Validation(_) => ErrorKind::Validation,
            FeedError::Fetch(_) | FeedError::Send(_) | FeedError::Transport(_) => {
                ErrorKind::Transport
            }
        }
    }

    pub fn notice(&self) -> Notice {
        Notice::error(self.to_string())
    }
}
