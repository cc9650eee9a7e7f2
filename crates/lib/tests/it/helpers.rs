//! Shared in-memory fake services for the integration tests.
//!
//! Every collaborator trait gets a counting fake so tests can assert not just
//! outcomes but which external systems were touched, how often, and in what
//! order. [`TestHarness`] wires a full set together.

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use chrono::Utc;
use latchkey::{
    Services,
    services::{
        AfterLogin, ConfigStore, ConnectivityMonitor, IdentityLoader, Keyring, LoginHook,
        LoginService, LoginUi, NotifySink, SecretUi, ServiceError, SessionRecord, SessionState,
    },
    types::{
        AccountStatus, ConfigEntry, ConnectivityState, DeviceEntry, DeviceId, DeviceStatus,
        KeyType, Passphrase, Uid, UserRecord, Username,
    },
};
use uuid::Uuid;

/// Ordered record of externally visible side effects, shared by the fakes
/// that produce them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    MarkerWrite,
    Notify(Username),
    Hook,
}

pub type EventLog = Arc<Mutex<Vec<Event>>>;

// ==========================
// CONVENIENCE CONSTRUCTORS
// ==========================

pub fn uid() -> Uid {
    Uid::new(Uuid::new_v4())
}

pub fn active_device(id: &str) -> DeviceEntry {
    DeviceEntry {
        id: DeviceId::new(id),
        name: None,
        status: DeviceStatus::Active,
    }
}

pub fn revoked_device(id: &str) -> DeviceEntry {
    DeviceEntry {
        id: DeviceId::new(id),
        name: None,
        status: DeviceStatus::Revoked { at: Utc::now() },
    }
}

pub fn record_for(username: &str, devices: Vec<DeviceEntry>) -> UserRecord {
    UserRecord {
        uid: uid(),
        username: Username::new(username),
        status: AccountStatus::Active,
        devices,
    }
}

pub fn deleted_record_for(username: &str) -> UserRecord {
    UserRecord {
        uid: uid(),
        username: Username::new(username),
        status: AccountStatus::Deleted,
        devices: Vec::new(),
    }
}

pub fn entry(username: &str, device_id: Option<&str>) -> ConfigEntry {
    ConfigEntry {
        username: Username::new(username),
        device_id: device_id.map(DeviceId::new),
    }
}

// ==========================
// FAKE COLLABORATORS
// ==========================

#[derive(Default)]
pub struct FakeConfigStore {
    self_entry: Mutex<Option<ConfigEntry>>,
    entries: Mutex<HashMap<Username, ConfigEntry>>,
    pub fail_reads: AtomicBool,
    pub fail_removes: AtomicBool,
    /// Every username passed to `remove`, in call order.
    pub removed: Mutex<Vec<Username>>,
}

impl FakeConfigStore {
    pub fn set_self_entry(&self, entry: ConfigEntry) {
        *self.self_entry.lock().unwrap() = Some(entry);
    }

    pub fn insert(&self, entry: ConfigEntry) {
        self.entries
            .lock()
            .unwrap()
            .insert(entry.username.clone(), entry);
    }
}

impl ConfigStore for FakeConfigStore {
    fn get(&self, username: Option<&Username>) -> Result<Option<ConfigEntry>, ServiceError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(ServiceError::Store {
                reason: "config file unreadable".to_string(),
            });
        }
        match username {
            None => Ok(self.self_entry.lock().unwrap().clone()),
            Some(name) => Ok(self.entries.lock().unwrap().get(name).cloned()),
        }
    }

    fn remove(&self, username: &Username) -> Result<(), ServiceError> {
        self.removed.lock().unwrap().push(username.clone());
        if self.fail_removes.load(Ordering::SeqCst) {
            return Err(ServiceError::Store {
                reason: "config file read-only".to_string(),
            });
        }
        self.entries.lock().unwrap().remove(username);
        let mut self_entry = self.self_entry.lock().unwrap();
        if self_entry.as_ref().is_some_and(|e| e.username == *username) {
            *self_entry = None;
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeIdentityLoader {
    record: Mutex<Option<UserRecord>>,
    pub fail: AtomicBool,
    pub loads: AtomicUsize,
    pub last_force_poll: Mutex<Option<bool>>,
}

impl FakeIdentityLoader {
    pub fn set_record(&self, record: UserRecord) {
        *self.record.lock().unwrap() = Some(record);
    }
}

#[async_trait]
impl IdentityLoader for FakeIdentityLoader {
    async fn load(
        &self,
        _username: Option<&Username>,
        force_poll: bool,
    ) -> Result<UserRecord, ServiceError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        *self.last_force_poll.lock().unwrap() = Some(force_poll);
        if self.fail.load(Ordering::SeqCst) {
            return Err(ServiceError::Network {
                reason: "identity service unreachable".to_string(),
            });
        }
        self.record
            .lock()
            .unwrap()
            .clone()
            .ok_or(ServiceError::Network {
                reason: "no record configured".to_string(),
            })
    }
}

pub struct FakeSessionRecord {
    pub provisioned: Mutex<Option<DeviceId>>,
    pub fail: AtomicBool,
    events: EventLog,
}

impl FakeSessionRecord {
    pub fn new(events: EventLog) -> Self {
        Self {
            provisioned: Mutex::new(None),
            fail: AtomicBool::new(false),
            events,
        }
    }
}

impl SessionRecord for FakeSessionRecord {
    fn set_device_provisioned(&self, device_id: &DeviceId) -> Result<(), ServiceError> {
        self.events.lock().unwrap().push(Event::MarkerWrite);
        if self.fail.load(Ordering::SeqCst) {
            return Err(ServiceError::Session {
                reason: "session file write failed".to_string(),
            });
        }
        *self.provisioned.lock().unwrap() = Some(device_id.clone());
        Ok(())
    }
}

pub struct FakeLoginService {
    record: Arc<FakeSessionRecord>,
    pub stored_secret_logins: AtomicUsize,
    pub prompt_logins: AtomicUsize,
    pub fail: AtomicBool,
    pub last_username: Mutex<Option<Username>>,
}

impl FakeLoginService {
    pub fn new(record: Arc<FakeSessionRecord>) -> Self {
        Self {
            record,
            stored_secret_logins: AtomicUsize::new(0),
            prompt_logins: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
            last_username: Mutex::new(None),
        }
    }

    pub fn total_logins(&self) -> usize {
        self.stored_secret_logins.load(Ordering::SeqCst) + self.prompt_logins.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LoginService for FakeLoginService {
    async fn login_with_stored_secret(
        &self,
        username: &Username,
        after_login: AfterLogin<'_>,
    ) -> Result<(), ServiceError> {
        self.stored_secret_logins.fetch_add(1, Ordering::SeqCst);
        *self.last_username.lock().unwrap() = Some(username.clone());
        if self.fail.load(Ordering::SeqCst) {
            return Err(ServiceError::LoginFailed {
                reason: "stored secret rejected".to_string(),
            });
        }
        after_login(self.record.as_ref())
    }

    async fn login_with_prompt(
        &self,
        username: &Username,
        _login_ui: &dyn LoginUi,
        secret_ui: &dyn SecretUi,
        after_login: AfterLogin<'_>,
    ) -> Result<(), ServiceError> {
        self.prompt_logins.fetch_add(1, Ordering::SeqCst);
        *self.last_username.lock().unwrap() = Some(username.clone());
        if self.fail.load(Ordering::SeqCst) {
            return Err(ServiceError::LoginFailed {
                reason: "passphrase rejected".to_string(),
            });
        }
        let _passphrase = secret_ui.get_passphrase("enter your passphrase").await?;
        after_login(self.record.as_ref())
    }
}

#[derive(Default)]
pub struct FakeSessionState {
    logged_in: Mutex<Option<(Uid, Username)>>,
}

impl FakeSessionState {
    pub fn log_in(&self, uid: Uid, username: Username) {
        *self.logged_in.lock().unwrap() = Some((uid, username));
    }
}

impl SessionState for FakeSessionState {
    fn logged_in_uid(&self) -> Option<Uid> {
        self.logged_in.lock().unwrap().as_ref().map(|(uid, _)| *uid)
    }

    fn username_for_uid(&self, uid: &Uid) -> Option<Username> {
        self.logged_in
            .lock()
            .unwrap()
            .as_ref()
            .filter(|(current, _)| current == uid)
            .map(|(_, username)| username.clone())
    }
}

pub struct FakeNotify {
    pub logins: Mutex<Vec<Username>>,
    events: EventLog,
}

impl FakeNotify {
    pub fn new(events: EventLog) -> Self {
        Self {
            logins: Mutex::new(Vec::new()),
            events,
        }
    }
}

impl NotifySink for FakeNotify {
    fn notify_login(&self, username: &Username) {
        self.events
            .lock()
            .unwrap()
            .push(Event::Notify(username.clone()));
        self.logins.lock().unwrap().push(username.clone());
    }
}

pub struct CountingHook {
    pub calls: AtomicUsize,
    events: EventLog,
}

impl CountingHook {
    pub fn new(events: EventLog) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            events,
        }
    }
}

impl LoginHook for CountingHook {
    fn on_login(&self) {
        self.events.lock().unwrap().push(Event::Hook);
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct FakeConnectivity {
    state: Mutex<ConnectivityState>,
    /// State the monitor switches to after a successful reachability check.
    pub state_after_check: Mutex<Option<ConnectivityState>>,
    pub reachability_checks: AtomicUsize,
    pub fail_check: AtomicBool,
}

impl FakeConnectivity {
    pub fn new(state: ConnectivityState) -> Self {
        Self {
            state: Mutex::new(state),
            state_after_check: Mutex::new(None),
            reachability_checks: AtomicUsize::new(0),
            fail_check: AtomicBool::new(false),
        }
    }

    pub fn set_state(&self, state: ConnectivityState) {
        *self.state.lock().unwrap() = state;
    }
}

#[async_trait]
impl ConnectivityMonitor for FakeConnectivity {
    async fn is_connected(&self) -> ConnectivityState {
        *self.state.lock().unwrap()
    }

    async fn check_reachability(&self) -> Result<(), ServiceError> {
        self.reachability_checks.fetch_add(1, Ordering::SeqCst);
        if self.fail_check.load(Ordering::SeqCst) {
            return Err(ServiceError::Network {
                reason: "probe timed out".to_string(),
            });
        }
        if let Some(next) = *self.state_after_check.lock().unwrap() {
            *self.state.lock().unwrap() = next;
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeKeyring {
    pub unlocked: Mutex<Vec<KeyType>>,
    pub fail_on: Mutex<Option<KeyType>>,
}

#[async_trait]
impl Keyring for FakeKeyring {
    async fn unlock_key_with_prompt(
        &self,
        key: KeyType,
        _reason: &str,
        _secret_ui: &dyn SecretUi,
    ) -> Result<(), ServiceError> {
        if *self.fail_on.lock().unwrap() == Some(key) {
            return Err(ServiceError::Keyring {
                reason: format!("cannot unlock {key:?}"),
            });
        }
        self.unlocked.lock().unwrap().push(key);
        Ok(())
    }
}

pub struct FakeLoginUi;

#[async_trait]
impl LoginUi for FakeLoginUi {
    async fn get_username(&self, default: Option<&Username>) -> Result<Username, ServiceError> {
        Ok(default.cloned().unwrap_or_else(|| Username::new("prompted")))
    }
}

#[derive(Default)]
pub struct FakeSecretUi {
    pub prompts: AtomicUsize,
}

#[async_trait]
impl SecretUi for FakeSecretUi {
    async fn get_passphrase(&self, _prompt: &str) -> Result<Passphrase, ServiceError> {
        self.prompts.fetch_add(1, Ordering::SeqCst);
        Ok(Passphrase::new("test passphrase"))
    }
}

// ==========================
// HARNESS
// ==========================

/// A full set of wired fakes plus the [`Services`] context built from them.
///
/// One counting hook is registered up front so every test can assert hook
/// behavior without extra setup.
pub struct TestHarness {
    pub services: Services,
    pub config: Arc<FakeConfigStore>,
    pub loader: Arc<FakeIdentityLoader>,
    pub login: Arc<FakeLoginService>,
    pub session: Arc<FakeSessionState>,
    pub record: Arc<FakeSessionRecord>,
    pub notify: Arc<FakeNotify>,
    pub connectivity: Arc<FakeConnectivity>,
    pub keyring: Arc<FakeKeyring>,
    pub hook: Arc<CountingHook>,
    events: EventLog,
}

impl TestHarness {
    pub fn new() -> Self {
        let events: EventLog = Arc::new(Mutex::new(Vec::new()));

        let config = Arc::new(FakeConfigStore::default());
        let loader = Arc::new(FakeIdentityLoader::default());
        let record = Arc::new(FakeSessionRecord::new(events.clone()));
        let login = Arc::new(FakeLoginService::new(record.clone()));
        let session = Arc::new(FakeSessionState::default());
        let notify = Arc::new(FakeNotify::new(events.clone()));
        let connectivity = Arc::new(FakeConnectivity::new(ConnectivityState::Connected));
        let keyring = Arc::new(FakeKeyring::default());

        let services = Services::new(
            config.clone(),
            loader.clone(),
            login.clone(),
            session.clone(),
            notify.clone(),
            connectivity.clone(),
            keyring.clone(),
        );

        let hook = Arc::new(CountingHook::new(events.clone()));
        services.register_login_hook(hook.clone());

        Self {
            services,
            config,
            loader,
            login,
            session,
            record,
            notify,
            connectivity,
            keyring,
            hook,
            events,
        }
    }

    /// Snapshot of the side-effect log so far.
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }
}
