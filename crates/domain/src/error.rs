//! Error taxonomy shared by the generator, the injector and the controller.
//!
//! Every variant is local and recoverable; callers decide whether to surface
//! a notice or ignore it.

/// Errors raised by domain operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    /// A generator or configuration input is out of range.
    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
    /// An event was triggered before any candle exists.
    #[error("No active candle series")]
    NoActiveSeries,
    /// The event kind is not part of the supported set.
    #[error("Unsupported event kind: {0}")]
    UnsupportedEventKind(String),
    /// The symbol id is not in the catalogue.
    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),
}

impl DomainError {
    /// Shorthand for [`DomainError::InvalidParameter`].
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Result alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
