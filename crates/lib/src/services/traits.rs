//! Collaborator trait seams.
//!
//! Every external system latchkey touches sits behind one of these
//! object-safe traits. The async traits cover calls that may block on the
//! network; implementations must honor caller cancellation by surfacing
//! [`ServiceError::Cancelled`] (or simply by their future being dropped)
//! rather than blocking indefinitely.

use async_trait::async_trait;

use super::errors::ServiceError;
use crate::types::{
    ConfigEntry, ConnectivityState, DeviceId, KeyType, Passphrase, Uid, UserRecord, Username,
};

/// Persisted local configuration: username → provisioned device.
///
/// Reads are cheap local lookups; `None` selects the currently active
/// ("self") entry.
pub trait ConfigStore: Send + Sync {
    /// Look up the entry for `username`, or the active entry when `None`.
    ///
    /// Returns `Ok(None)` when no entry exists.
    fn get(&self, username: Option<&Username>) -> Result<Option<ConfigEntry>, ServiceError>;

    /// Delete the entry for `username`.
    fn remove(&self, username: &Username) -> Result<(), ServiceError>;
}

/// Loads the authoritative identity record for a user.
#[async_trait]
pub trait IdentityLoader: Send + Sync {
    /// Load the record for `username`, or for the current user when `None`.
    ///
    /// `force_poll` bypasses any local cache of the authority and demands a
    /// fresh remote check.
    async fn load(
        &self,
        username: Option<&Username>,
        force_poll: bool,
    ) -> Result<UserRecord, ServiceError>;
}

/// The persisted session record of the currently running login.
///
/// Handed to the [`AfterLogin`] continuation by the login service.
pub trait SessionRecord: Send + Sync {
    /// Mark the active session's device as provisioned.
    fn set_device_provisioned(&self, device_id: &DeviceId) -> Result<(), ServiceError>;
}

/// Continuation run by the login service after a successful credential
/// exchange, synchronously, before the login call returns.
pub type AfterLogin<'a> =
    &'a (dyn Fn(&dyn SessionRecord) -> Result<(), ServiceError> + Send + Sync);

/// The external session/login service that performs credential exchange.
///
/// Both operations invoke `after_login` exactly once on success, before
/// returning. Retry policy, if any, lives inside the implementation; latchkey
/// never retries a delegation.
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Log `username` in using only the stored secret; never opens UI.
    async fn login_with_stored_secret(
        &self,
        username: &Username,
        after_login: AfterLogin<'_>,
    ) -> Result<(), ServiceError>;

    /// Log `username` in, prompting through the supplied UI handles when the
    /// stored secret is missing or insufficient.
    async fn login_with_prompt(
        &self,
        username: &Username,
        login_ui: &dyn LoginUi,
        secret_ui: &dyn SecretUi,
        after_login: AfterLogin<'_>,
    ) -> Result<(), ServiceError>;
}

/// Read-only view of the process-wide session state.
pub trait SessionState: Send + Sync {
    /// The uid of the logged-in user, if any login is active.
    fn logged_in_uid(&self) -> Option<Uid>;

    /// Resolve a uid back to its username, if known locally.
    fn username_for_uid(&self, uid: &Uid) -> Option<Username>;
}

/// Outbound login notifications.
pub trait NotifySink: Send + Sync {
    /// Announce that `username` is now logged in. Fire-and-forget.
    fn notify_login(&self, username: &Username);
}

/// A post-login hook registered on the [`Services`](super::Services) context.
///
/// Hooks run after the login notification; their failures are never surfaced
/// to the login caller, so the trait is infallible by construction.
pub trait LoginHook: Send + Sync {
    fn on_login(&self);
}

/// Probes whether the identity service is reachable.
#[async_trait]
pub trait ConnectivityMonitor: Send + Sync {
    /// Last known connectivity state, without touching the network.
    async fn is_connected(&self) -> ConnectivityState;

    /// Actively probe reachability, updating the monitor's state.
    async fn check_reachability(&self) -> Result<(), ServiceError>;
}

/// Secret/keyring storage backend.
#[async_trait]
pub trait Keyring: Send + Sync {
    /// Unlock the given device key, prompting through `secret_ui` if the
    /// stored secret alone is not enough. `reason` is shown to the user.
    async fn unlock_key_with_prompt(
        &self,
        key: KeyType,
        reason: &str,
        secret_ui: &dyn SecretUi,
    ) -> Result<(), ServiceError>;
}

/// Interactive login UI handle.
///
/// Latchkey never drives this itself; it is forwarded to the login service.
#[async_trait]
pub trait LoginUi: Send + Sync {
    /// Ask the user which account to log in as.
    async fn get_username(&self, default: Option<&Username>) -> Result<Username, ServiceError>;
}

/// Interactive secret-prompt UI handle.
///
/// Forwarded to the login service and the keyring.
#[async_trait]
pub trait SecretUi: Send + Sync {
    /// Collect a passphrase from the user.
    async fn get_passphrase(&self, prompt: &str) -> Result<Passphrase, ServiceError>;
}
