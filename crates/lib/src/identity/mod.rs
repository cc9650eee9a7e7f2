//! Device identity validation against the authoritative record.
//!
//! Resolves which username/device pair a login should attempt, fetches a
//! forced-fresh copy of the authoritative identity record, and decides
//! whether the locally cached device is still recognized and unrevoked. A
//! stale device triggers best-effort cleanup of the local configuration entry
//! so later provisioning flows are not confused by it.

pub mod errors;

pub use errors::IdentityError;

use tracing::{debug, warn};

use crate::{
    Result,
    services::Services,
    types::{AccountStatus, DeviceId, Username},
};

/// Successful validation: the authority-confirmed username and the device it
/// recognizes for this client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Validated {
    /// Canonical username, which may differ in normalization from the
    /// requested one.
    pub username: Username,

    /// The locally stored device id, confirmed unrevoked by the authority.
    pub device_id: DeviceId,
}

/// Validates the locally cached device identity for a user.
pub struct DeviceValidator<'a> {
    services: &'a Services,
}

impl<'a> DeviceValidator<'a> {
    pub fn new(services: &'a Services) -> Self {
        Self { services }
    }

    /// Produce a validation outcome for `requested`, or for the currently
    /// configured local user when `None`.
    ///
    /// Validation outcomes surface as [`IdentityError`]; a loader failure is
    /// not an outcome and propagates verbatim.
    pub async fn validate(&self, requested: Option<&Username>) -> Result<Validated> {
        let entry = match requested {
            None => {
                debug!("using current username");
                self.services.config().get(None)
            }
            Some(username) => {
                debug!(%username, "using requested username");
                self.services.config().get(Some(username))
            }
        };

        let entry = match entry {
            Ok(Some(entry)) => entry,
            Ok(None) => {
                debug!("no user config entry");
                return Err(IdentityError::NoConfig.into());
            }
            Err(err) => {
                debug!(%err, "error reading user config");
                return Err(IdentityError::NoConfig.into());
            }
        };

        let Some(device_id) = entry.device_id else {
            debug!("no device in user config");
            return Err(IdentityError::NoDevice.into());
        };

        // Revocation must be observed promptly, so bypass any local cache of
        // the authority and demand a fresh remote check.
        let record = self.services.identities().load(requested, true).await?;

        if record.status == AccountStatus::Deleted {
            debug!(uid = %record.uid, "user has been deleted");
            return Err(IdentityError::AccountDeleted {
                username: record.username,
            }
            .into());
        }

        let canonical = record.username.clone();

        let stale = match record.find_signing_device(&device_id) {
            None => {
                debug!(device = %device_id, "current device not found in record");
                true
            }
            Some(device) if device.is_revoked() => {
                debug!(device = %device_id, "current device has been revoked");
                true
            }
            Some(_) => false,
        };

        if stale {
            // A leftover device id (for example from before an account reset)
            // would confuse later provisioning, so delete the entry here.
            // Cleanup is best-effort and never blocks the outcome.
            if let Err(err) = self.services.config().remove(&canonical) {
                warn!(%err, "error clearing user config");
            }
            return Err(IdentityError::NoDevice.into());
        }

        Ok(Validated {
            username: canonical,
            device_id,
        })
    }
}
