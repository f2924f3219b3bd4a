//! Typed contracts for the browser rewards capability surface consumed by the rewards panel.
//!
//! This crate is the API-first boundary between the panel core and the host browser. It exposes
//! the raw (weakly-typed) platform records exactly as the extension API reports them, the
//! object-safe service traits the panel consumes, listener plumbing for recurring platform
//! events, and in-memory adapters used by tests and headless builds. Normalization into domain
//! types lives in `rewards_panel`.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod api;
pub mod error;
pub mod events;
pub mod locale;
pub mod memory;
pub mod prefs;
pub mod records;
pub mod tabs;
pub mod time;

pub use api::{PlatformFuture, RewardsApi, TipKind};
pub use error::PlatformError;
pub use events::{EventListener, ListenerId, ListenerRegistry, PlatformEvent, PlatformEventKind};
pub use locale::{LocaleStrings, MemoryLocaleStrings, NoopLocaleStrings};
pub use memory::{MemoryRewardsApi, MemoryRewardsData, RewardsApiCall};
pub use prefs::{
    load_pref_with, save_pref_with, MemoryPrefsStore, NoopPrefsStore, PrefsStore, PrefsStoreFuture,
};
pub use records::{
    RawAdsAccountStatement, RawBalance, RawBalanceReport, RawCaptcha, RawExternalWallet,
    RawNotification, RawPrefs, RawPrefsUpdate, RawPromotion, RawPublisherRecord, RawRecurringTip,
    RawRewardsParameters, PROMOTIONS_RESULT_ERROR,
};
pub use tabs::{BrowserTabs, MemoryBrowserTabs, TabEffect};
pub use time::unix_time_ms_now;
