//! Optional device-key unlock step.
//!
//! Not part of the dispatch flow: callers that want the device signing and
//! encryption keys unlocked right after a login invoke this separately.

use tracing::debug;

use crate::{
    Result,
    services::{SecretUi, Services},
    types::{ConnectivityState, KeyType},
};

const UNLOCK_REASON: &str = "unlock device keys";

/// Unlock the device signing and encryption keys, prompting through
/// `secret_ui` if the keyring requires it.
///
/// The locally held server half of the key secret can go stale if the
/// passphrase was changed from another device while this client was offline.
/// A suspect connectivity state is therefore re-probed first, giving the
/// keyring a chance to sync before it prompts; the probe outcome itself never
/// aborts the unlock.
pub async fn unlock_device_keys(services: &Services, secret_ui: &dyn SecretUi) -> Result<()> {
    let connectivity = services.connectivity();
    if connectivity.is_connected().await != ConnectivityState::Connected {
        debug!("connectivity monitor says not reachable, double-checking");
        match connectivity.check_reachability().await {
            Err(err) => debug!(%err, "error checking reachability"),
            Ok(()) => {
                let state = connectivity.is_connected().await;
                debug!(?state, "connectivity after reachability check");
            }
        }
    }

    let keyring = services.keyring();
    keyring
        .unlock_key_with_prompt(KeyType::DeviceSigning, UNLOCK_REASON, secret_ui)
        .await?;
    keyring
        .unlock_key_with_prompt(KeyType::DeviceEncryption, UNLOCK_REASON, secret_ui)
        .await?;

    Ok(())
}
