//! Error types for the collaborator services.

use thiserror::Error;

/// Failures surfaced by the external collaborator services.
///
/// These propagate through latchkey verbatim: the core never reclassifies a
/// remote-fetch failure, a session-service failure, or a cancellation into
/// one of its own validation outcomes.
///
/// # Stability
///
/// New variants may be added in minor versions (enum is `#[non_exhaustive]`).
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A remote call failed in transit.
    #[error("network failure: {reason}")]
    Network {
        /// Description of the transport failure
        reason: String,
    },

    /// The caller's context was cancelled or timed out while a call was in
    /// flight.
    #[error("operation cancelled")]
    Cancelled,

    /// The local configuration store could not be read or written.
    #[error("configuration store failure: {reason}")]
    Store {
        /// Description of the store failure
        reason: String,
    },

    /// The session service rejected or failed an operation.
    #[error("session failure: {reason}")]
    Session {
        /// Description of the session failure
        reason: String,
    },

    /// Credential exchange was attempted and did not succeed.
    #[error("login failed: {reason}")]
    LoginFailed {
        /// Reason reported by the login service
        reason: String,
    },

    /// The keyring could not produce or unlock a key.
    #[error("keyring failure: {reason}")]
    Keyring {
        /// Description of the keyring failure
        reason: String,
    },

    /// An interactive prompt failed or was dismissed.
    #[error("prompt failed: {reason}")]
    Prompt {
        /// Description of the prompt failure
        reason: String,
    },
}

impl ServiceError {
    /// Check if this error is a cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ServiceError::Cancelled)
    }

    /// Check if this error came from the network transport.
    pub fn is_network(&self) -> bool {
        matches!(self, ServiceError::Network { .. })
    }

    /// Check if this error is a failed credential exchange.
    pub fn is_login_failure(&self) -> bool {
        matches!(self, ServiceError::LoginFailed { .. })
    }
}

impl From<ServiceError> for crate::Error {
    fn from(err: ServiceError) -> Self {
        crate::Error::Service(err)
    }
}
