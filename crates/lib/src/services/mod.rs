//! Injected collaborator services.
//!
//! [`Services`] bundles every external system the login core calls — local
//! configuration, the identity-record loader, the session/login service,
//! notifications, connectivity, and the keyring — behind narrow trait
//! objects. It is an explicit, cloneable context handed to each flow rather
//! than a module-level singleton, so tests substitute in-memory fakes.

pub mod errors;
pub mod traits;

pub use errors::ServiceError;
pub use traits::{
    AfterLogin, ConfigStore, ConnectivityMonitor, IdentityLoader, Keyring, LoginHook,
    LoginService, LoginUi, NotifySink, SecretUi, SessionRecord, SessionState,
};

use std::sync::{Arc, RwLock};

use tracing::debug;

/// Shared handle to the collaborator services.
///
/// Cloning is cheap; all clones share the same underlying services and the
/// same login-hook registry.
#[derive(Clone)]
pub struct Services {
    inner: Arc<Inner>,
}

struct Inner {
    config: Arc<dyn ConfigStore>,
    identities: Arc<dyn IdentityLoader>,
    login: Arc<dyn LoginService>,
    session: Arc<dyn SessionState>,
    notify: Arc<dyn NotifySink>,
    connectivity: Arc<dyn ConnectivityMonitor>,
    keyring: Arc<dyn Keyring>,
    login_hooks: RwLock<Vec<Arc<dyn LoginHook>>>,
}

impl Services {
    /// Assemble a service context from its collaborators.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: Arc<dyn ConfigStore>,
        identities: Arc<dyn IdentityLoader>,
        login: Arc<dyn LoginService>,
        session: Arc<dyn SessionState>,
        notify: Arc<dyn NotifySink>,
        connectivity: Arc<dyn ConnectivityMonitor>,
        keyring: Arc<dyn Keyring>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                identities,
                login,
                session,
                notify,
                connectivity,
                keyring,
                login_hooks: RwLock::new(Vec::new()),
            }),
        }
    }

    pub fn config(&self) -> &dyn ConfigStore {
        self.inner.config.as_ref()
    }

    pub fn identities(&self) -> &dyn IdentityLoader {
        self.inner.identities.as_ref()
    }

    pub fn login(&self) -> &dyn LoginService {
        self.inner.login.as_ref()
    }

    pub fn session(&self) -> &dyn SessionState {
        self.inner.session.as_ref()
    }

    pub fn notify(&self) -> &dyn NotifySink {
        self.inner.notify.as_ref()
    }

    pub fn connectivity(&self) -> &dyn ConnectivityMonitor {
        self.inner.connectivity.as_ref()
    }

    pub fn keyring(&self) -> &dyn Keyring {
        self.inner.keyring.as_ref()
    }

    /// Register a hook to run after every successful login.
    pub fn register_login_hook(&self, hook: Arc<dyn LoginHook>) {
        let mut hooks = match self.inner.login_hooks.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        hooks.push(hook);
    }

    /// Run all registered login hooks.
    ///
    /// Hook outcomes are not observed; a hook must not be able to fail the
    /// login that triggered it.
    pub fn call_login_hooks(&self) {
        let hooks: Vec<_> = {
            let guard = match self.inner.login_hooks.read() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            guard.clone()
        };
        debug!(count = hooks.len(), "running login hooks");
        for hook in hooks {
            hook.on_login();
        }
    }
}
