//! Locally persisted panel UI flags, read once at startup and written by their intents.

use rewards_platform::{load_pref_with, save_pref_with, PrefsStore};
use serde_json::Value;

use crate::{
    coerce::{to_number, truthy},
    config::PanelConfig,
};

const HIDE_PUBLISHER_UNVERIFIED_NOTE_KEY: &str = "hide-publisher-unverified-note";
const NOTIFICATIONS_LAST_VIEWED_KEY: &str = "notifications-last-viewed";

/// Persisted UI flags with their defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LocalFlags {
    pub hide_publisher_unverified_note: bool,
    pub notifications_last_viewed: u64,
}

fn storage_key(config: &PanelConfig, key: &str) -> String {
    format!("{}{key}", config.storage_key_prefix)
}

async fn load_raw<S: PrefsStore + ?Sized>(store: &S, key: &str) -> Option<Value> {
    match load_pref_with::<_, Value>(store, key).await {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(key, "local flag load failed: {err}");
            None
        }
    }
}

/// Loads both flags; missing or corrupt entries read as defaults.
pub async fn load_local_flags<S: PrefsStore + ?Sized>(
    store: &S,
    config: &PanelConfig,
) -> LocalFlags {
    let hide_note = load_raw(store, &storage_key(config, HIDE_PUBLISHER_UNVERIFIED_NOTE_KEY)).await;
    let last_viewed = load_raw(store, &storage_key(config, NOTIFICATIONS_LAST_VIEWED_KEY)).await;

    LocalFlags {
        hide_publisher_unverified_note: truthy(hide_note.as_ref()),
        notifications_last_viewed: to_number(last_viewed.as_ref())
            .filter(|millis| *millis > 0.0)
            .map(|millis| millis as u64)
            .unwrap_or(0),
    }
}

/// Persists the unverified-note flag.
///
/// # Errors
///
/// Returns the store error text when the write fails.
pub async fn persist_hide_publisher_unverified_note<S: PrefsStore + ?Sized>(
    store: &S,
    config: &PanelConfig,
    hide: bool,
) -> Result<(), String> {
    save_pref_with(
        store,
        &storage_key(config, HIDE_PUBLISHER_UNVERIFIED_NOTE_KEY),
        &hide,
    )
    .await
}

/// Persists the notifications-last-viewed timestamp (epoch milliseconds).
///
/// # Errors
///
/// Returns the store error text when the write fails.
pub async fn persist_notifications_last_viewed<S: PrefsStore + ?Sized>(
    store: &S,
    config: &PanelConfig,
    millis: u64,
) -> Result<(), String> {
    save_pref_with(
        store,
        &storage_key(config, NOTIFICATIONS_LAST_VIEWED_KEY),
        &millis,
    )
    .await
}
