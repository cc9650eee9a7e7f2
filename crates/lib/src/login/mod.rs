//! Provisioned-device login dispatch.
//!
//! [`ProvisionedLogin`] is the entry point of the crate: it short-circuits if
//! the user is already logged in, validates the cached device identity, then
//! delegates credential exchange to the session service in exactly one of two
//! modes, applying the post-success effects (session record update,
//! notification, hooks) exactly once.

pub mod unlock;

pub use unlock::unlock_device_keys;

use std::sync::Arc;

use tracing::{debug, warn};

use crate::{
    Result,
    identity::DeviceValidator,
    services::{LoginUi, SecretUi, ServiceError, Services, SessionRecord},
    types::Username,
};

/// Which credential flow a [`ProvisionedLogin`] uses.
///
/// Fixed at construction and never retried with the other mode on failure.
#[derive(Clone)]
pub enum LoginMode {
    /// Use only the stored secret; never opens interactive UI. Meant for
    /// unattended startup logins.
    SecretStoreOnly,

    /// Allow the login service to prompt through the supplied UI handles
    /// when the stored secret is missing or insufficient.
    Interactive {
        login_ui: Arc<dyn LoginUi>,
        secret_ui: Arc<dyn SecretUi>,
    },
}

/// Attempts a login using the current device, if there is an existing
/// provisioned device.
///
/// A failure from [`run`](Self::run) means the caller should fall back to a
/// full device provisioning flow; success means the user is fully logged in
/// on this device.
pub struct ProvisionedLogin {
    services: Services,
    username: Option<Username>,
    mode: LoginMode,
}

impl ProvisionedLogin {
    /// Create a login attempt for `username`, or for the currently configured
    /// local user when `None`.
    pub fn new(services: Services, username: Option<Username>, mode: LoginMode) -> Self {
        Self {
            services,
            username,
            mode,
        }
    }

    /// Drive the full flow.
    ///
    /// Idempotent when the requested user is already logged in: returns
    /// success immediately without touching the validator, the login service,
    /// or the notification path.
    pub async fn run(&mut self) -> Result<()> {
        if self.already_logged_in() {
            return Ok(());
        }

        let username = self.attempt().await?;

        debug!(%username, "provisioned login succeeded, sending login notification");
        self.services.notify().notify_login(&username);
        debug!("provisioned login succeeded, running login hooks");
        self.services.call_login_hooks();

        Ok(())
    }

    /// True when a session is active for the requested user (or for any user,
    /// when no specific username was requested).
    fn already_logged_in(&self) -> bool {
        let Some(uid) = self.services.session().logged_in_uid() else {
            return false;
        };

        let matches = match &self.username {
            None => true,
            Some(requested) => self
                .services
                .session()
                .username_for_uid(&uid)
                .is_some_and(|current| current == *requested),
        };

        if matches {
            debug!(%uid, "user already logged in; short-circuiting");
        }
        matches
    }

    async fn attempt(&mut self) -> Result<Username> {
        // Validation failures are hard stops: the caller must see them and
        // fall back to provisioning, never a silent success without a login.
        let validated = DeviceValidator::new(&self.services)
            .validate(self.username.as_ref())
            .await?;

        // The config entry carries a device id the authority still
        // recognizes, so this is a provisioned device and a normal login
        // should go through.
        self.username = Some(validated.username.clone());

        let device_id = validated.device_id;
        let mark_provisioned =
            move |record: &dyn SessionRecord| -> std::result::Result<(), ServiceError> {
                if let Err(err) = record.set_device_provisioned(&device_id) {
                    // Not fatal, the session stays valid in memory.
                    warn!(%err, "error saving session record");
                }
                Ok(())
            };

        match &self.mode {
            LoginMode::SecretStoreOnly => {
                self.services
                    .login()
                    .login_with_stored_secret(&validated.username, &mark_provisioned)
                    .await?;
            }
            LoginMode::Interactive {
                login_ui,
                secret_ui,
            } => {
                self.services
                    .login()
                    .login_with_prompt(
                        &validated.username,
                        login_ui.as_ref(),
                        secret_ui.as_ref(),
                        &mark_provisioned,
                    )
                    .await?;
            }
        }

        Ok(validated.username)
    }
}
