//! Core identity types shared by the validator and the login dispatcher.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Normalized username.
///
/// Usernames are trimmed and ASCII-lowercased on construction, so equality is
/// always on the normalized form. The authoritative record may report a
/// different spelling than the one a caller requested; both normalize to the
/// same value when they refer to the same account.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    /// Create a normalized username from raw input.
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_ascii_lowercase())
    }

    /// The normalized string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Username {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// Opaque stable account identifier, as reported by the session layer and the
/// authoritative record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Uid(Uuid);

impl Uid {
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Opaque device identifier.
///
/// Latchkey never interprets the contents; it only compares the locally
/// stored identifier against the authoritative device list.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Status of a signing device in the authoritative record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum DeviceStatus {
    Active,
    /// The authority has marked this device's key as no longer trusted.
    Revoked { at: DateTime<Utc> },
}

/// One signing-device entry in the authoritative record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceEntry {
    pub id: DeviceId,

    /// Optional human-readable device name ("alice's laptop").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(flatten)]
    pub status: DeviceStatus,
}

impl DeviceEntry {
    pub fn is_revoked(&self) -> bool {
        matches!(self.status, DeviceStatus::Revoked { .. })
    }
}

/// Account status in the authoritative record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Active,
    Deleted,
}

/// The authoritative identity service's view of a user.
///
/// Fetched fresh on every validation call; read-only to this crate.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserRecord {
    pub uid: Uid,

    /// Canonical username as the authority spells it.
    pub username: Username,

    pub status: AccountStatus,

    /// Currently known signing devices, including revoked ones.
    pub devices: Vec<DeviceEntry>,
}

impl UserRecord {
    /// Find the signing-device entry matching `id`, revoked or not.
    pub fn find_signing_device(&self, id: &DeviceId) -> Option<&DeviceEntry> {
        self.devices.iter().find(|device| device.id == *id)
    }
}

/// Persisted local mapping from a username to the device this client was
/// provisioned with.
///
/// Owned by the configuration store; latchkey reads entries and may request
/// deletion of a stale one, but never mutates them otherwise.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub username: Username,

    /// Absent when the user has an entry but was never provisioned here.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<DeviceId>,
}

/// Tri-state answer from the connectivity monitor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectivityState {
    Connected,
    Disconnected,
    Unknown,
}

/// Which device key the keyring should unlock.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyType {
    DeviceSigning,
    DeviceEncryption,
}

/// Secret collected from the user.
///
/// Latchkey forwards this to the keyring or login service without
/// interpreting it. The contents are zeroized on drop and redacted from
/// `Debug` output.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Passphrase(String);

impl Passphrase {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Access the secret contents.
    pub fn reveal(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Passphrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Passphrase(<redacted>)")
    }
}
