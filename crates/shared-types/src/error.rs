//! Error taxonomy shared by every layer of the document pipeline

use thiserror::Error;

use crate::types::DocumentStatus;

/// Message shown when a transport failure carries no server-provided text
pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocError {
    /// A required field is missing or malformed
    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    /// The action is not allowed in the document's current status
    #[error("Cannot {action} a document in '{status}' status")]
    InvalidState {
        action: String,
        status: DocumentStatus,
    },

    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    #[error("{0}")]
    Transport(String),

    #[error("Missing or expired credential")]
    Unauthorized,
}

pub type DocResult<T> = Result<T, DocError>;

impl DocError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        DocError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn invalid_state(action: impl Into<String>, status: DocumentStatus) -> Self {
        DocError::InvalidState {
            action: action.into(),
            status,
        }
    }

    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DocError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Transport failure, preferring the server's message when it sent one
    pub fn transport(server_message: Option<String>) -> Self {
        match server_message {
            Some(msg) if !msg.trim().is_empty() => DocError::Transport(msg),
            _ => DocError::Transport(GENERIC_FAILURE.to_string()),
        }
    }

    /// Stable machine-readable code, also used on the wire
    pub fn code(&self) -> &'static str {
        match self {
            DocError::Validation { .. } => "VALIDATION_ERROR",
            DocError::InvalidState { .. } => "INVALID_STATE",
            DocError::NotFound { .. } => "NOT_FOUND",
            DocError::Transport(_) => "TRANSPORT_ERROR",
            DocError::Unauthorized => "UNAUTHORIZED",
        }
    }
}
