//! Validation outcomes that mean a provisioned login cannot proceed.

use thiserror::Error;

use crate::types::Username;

/// Terminal validation outcomes.
///
/// Each variant tells the caller which remediation applies: `NoConfig` and
/// `NoDevice` mean "fall back to full device provisioning", while
/// `AccountDeleted` is kept distinct so callers can offer account creation
/// instead. None of these are retried by latchkey.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum IdentityError {
    /// No local configuration entry exists for the target identity.
    #[error("no local user configuration")]
    NoConfig,

    /// A configuration entry exists but carries no usable device: the device
    /// identifier is absent, unknown to the authority, or revoked.
    #[error("no usable device for this user")]
    NoDevice,

    /// The authoritative record reports the account as removed.
    #[error("account '{username}' has been deleted")]
    AccountDeleted {
        /// Canonical username reported by the authority, for diagnostics
        username: Username,
    },
}

impl IdentityError {
    /// Check if this outcome means the local device is stale or absent.
    pub fn is_stale_device(&self) -> bool {
        matches!(self, IdentityError::NoDevice)
    }

    /// Check if this outcome reports a deleted account.
    pub fn is_account_deleted(&self) -> bool {
        matches!(self, IdentityError::AccountDeleted { .. })
    }

    /// Check if the remediation is a full device provisioning flow.
    pub fn needs_provisioning(&self) -> bool {
        matches!(self, IdentityError::NoConfig | IdentityError::NoDevice)
    }
}

impl From<IdentityError> for crate::Error {
    fn from(err: IdentityError) -> Self {
        crate::Error::Identity(err)
    }
}
