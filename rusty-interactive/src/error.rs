use thiserror::Error;

/// Errors surfaced by the interactive engine to its callers.
#[derive(Debug, Error)]
pub enum InteractiveError {
    /// A widget or configuration value failed validation; no session was started.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// The caller's cancellation token was already triggered when the session was requested.
    #[error("cancellation was requested before the session started")]
    AlreadyCanceled,
    /// A message is already bound to another running session.
    #[error("message {0} already has an active interactive session")]
    SessionExists(u64),
    #[error(transparent)]
    Platform(#[from] PlatformError),
}

/// A failed call to the chat platform, classified by whether the target still exists.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// The message, interaction or webhook no longer exists.
    #[error("target no longer exists: {0}")]
    NotFound(#[source] anyhow::Error),
    #[error("platform request failed: {0}")]
    Other(#[source] anyhow::Error),
}

impl PlatformError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

pub type Result<T, E = InteractiveError> = std::result::Result<T, E>;

pub(crate) fn invalid(message: impl Into<String>) -> InteractiveError {
    InteractiveError::InvalidConfiguration(message.into())
}

/// Treat "the target vanished" as success for cleanup calls.
pub(crate) trait IgnoreNotFound {
    fn ignore_not_found(self) -> Result<(), PlatformError>;
}

impl IgnoreNotFound for Result<(), PlatformError> {
    fn ignore_not_found(self) -> Result<(), PlatformError> {
        match self {
            Err(source) if source.is_not_found() => {
                tracing::debug!(%source, "cleanup target already gone");
                Ok(())
            }
            other => other,
        }
    }
}
