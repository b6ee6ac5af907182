use thiserror::Error;

use super::channel::ChannelError;

/// Errors reported by media stages and the coordinator
#[derive(Debug, Error)]
pub enum StageError {
    /// Unrecoverable fault inside a running stage; ends the session
    #[error("{stage} stage failed: {message}")]
    Fault { stage: String, message: String },
    /// Start requested while a recording is already running
    #[error("recording is already in progress")]
    AlreadyRecording,
    #[error("{0}")]
    Channel(#[from] ChannelError),
    #[error("{0}")]
    Media(#[from] crate::utils::gist::Error),
}

impl StageError {
    pub fn fault(stage: impl Into<String>, message: impl Into<String>) -> Self {
        StageError::Fault {
            stage: stage.into(),
            message: message.into(),
        }
    }

    /// Whether the error is operator misuse rather than a broken stage
    pub fn is_misuse(&self) -> bool {
        matches!(self, StageError::AlreadyRecording)
    }
}
