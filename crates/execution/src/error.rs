//! Controller errors.

use volsim_domain::DomainError;

/// Errors returned through a [`crate::controller::ControllerHandle`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ControllerError {
    /// The session rejected the request.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The controller task is no longer running.
    #[error("Session controller has stopped")]
    Stopped,
}

/// Result alias for controller requests.
pub type ControllerResult<T> = Result<T, ControllerError>;
