//! Rewards panel core: typed application state built from the browser rewards extension API.
//!
//! The crate is split along the data flow:
//! - [`api_adapter`] normalizes raw platform records and codes into the domain model,
//! - [`notifications`] classifies raw notification records into typed notifications,
//! - [`state_manager`] holds the immutable [`PanelState`] snapshot and notifies subscribers,
//! - [`host`] coordinates startup fetches, platform events, and user intents.

pub mod api_adapter;
pub mod config;
mod coerce;
pub mod host;
pub mod model;
pub mod notifications;
pub mod persistence;
pub mod state_manager;

pub use api_adapter::{LoginUrlCache, RewardsParameters, Subscription};
pub use config::{ConfigError, PanelConfig};
pub use host::{PanelServices, RewardsPanelHost};
pub use model::*;
pub use notifications::map_notification;
pub use state_manager::{ListenerHandle, MergeState, StateManager};
