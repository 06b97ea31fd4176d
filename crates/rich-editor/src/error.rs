use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Invalid position: block {block}, offset {offset}")]
    InvalidPosition { block: usize, offset: usize },

    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
