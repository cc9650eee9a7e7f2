//!
//! Latchkey: provisioned-device login reconciliation.
//!
//! Before a credential-backed login is attempted on a client that already
//! holds a provisioned device identity, latchkey verifies that identity
//! against the authoritative record, repairs stale local state, and routes to
//! exactly one login flow.
//!
//! ## Core Concepts
//!
//! * **Services (`services::Services`)**: The injected context bundling every
//!   external collaborator — configuration store, identity-record loader,
//!   session/login service, notifications, connectivity monitor, keyring —
//!   behind narrow trait seams.
//! * **Device Identity Validator (`identity::DeviceValidator`)**: Resolves
//!   which username/device pair to attempt and confirms the cached device
//!   against a forced-fresh authoritative record, nuking stale local
//!   configuration as a side effect.
//! * **Login Dispatcher (`login::ProvisionedLogin`)**: The entry point.
//!   Short-circuits when already logged in, validates, then delegates
//!   credential exchange in one fixed [`login::LoginMode`], applying
//!   post-success effects exactly once.
//! * **Device-key unlock (`login::unlock_device_keys`)**: A separately
//!   callable follow-up step, deliberately not inlined into the dispatch.
//!
//! ```rust,ignore
//! use latchkey::{LoginMode, ProvisionedLogin, Services};
//!
//! let services = Services::new(
//!     config, identities, login, session, notify, connectivity, keyring,
//! );
//! let mut engine = ProvisionedLogin::new(services, None, LoginMode::SecretStoreOnly);
//! engine.run().await?;
//! ```

pub mod identity;
pub mod login;
pub mod services;
pub mod types;

pub use identity::{DeviceValidator, Validated};
pub use login::{LoginMode, ProvisionedLogin};
pub use services::Services;

/// Result type used throughout the latchkey library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the latchkey library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Structured validation outcomes from the identity module
    #[error(transparent)]
    Identity(identity::IdentityError),

    /// Collaborator failures from the services module, propagated verbatim
    #[error(transparent)]
    Service(services::ServiceError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Identity(_) => "identity",
            Error::Service(_) => "services",
        }
    }

    /// Check if the remediation for this error is a full device provisioning
    /// flow.
    pub fn needs_provisioning(&self) -> bool {
        match self {
            Error::Identity(err) => err.needs_provisioning(),
            _ => false,
        }
    }

    /// Check if this error reports a deleted account.
    pub fn is_account_deleted(&self) -> bool {
        match self {
            Error::Identity(err) => err.is_account_deleted(),
            _ => false,
        }
    }

    /// Check if this error is a cancellation surfaced by a collaborator.
    pub fn is_cancelled(&self) -> bool {
        match self {
            Error::Service(err) => err.is_cancelled(),
            _ => false,
        }
    }
}
