//! Host orchestrator: owns the panel state, composes adapter calls at startup, keeps state live
//! from platform events, and executes user intents.
//!
//! Every intent returns immediately. Optimistic state changes are applied synchronously and
//! platform round trips run as local tasks on the injected spawner; their failures are logged and
//! leave state unchanged.

mod boot;
mod captcha;
mod wallet_actions;

use std::{cell::RefCell, collections::HashMap, future::Future, rc::Rc};

use futures::task::{LocalSpawn, LocalSpawnExt};
use rewards_platform::{
    unix_time_ms_now, BrowserTabs, LocaleStrings, PlatformError, PrefsStore, RawPrefsUpdate,
    RewardsApi, TipKind,
};

use crate::{
    api_adapter::{self, LoginUrlCache, Subscription},
    config::PanelConfig,
    model::{
        CaptchaSolution, ExternalWalletAction, GrantCaptchaStatus, GrantInfo, MonthlyTipAction,
        NotificationAction, PanelState, PanelStatePatch, Settings,
    },
    persistence,
    state_manager::{ListenerHandle, StateManager},
};

const PLACEHOLDER_MARKERS: [&str; 9] = ["$1", "$2", "$3", "$4", "$5", "$6", "$7", "$8", "$9"];

#[derive(Clone)]
/// Host service bundle the orchestrator runs against.
pub struct PanelServices {
    /// Rewards extension API.
    pub api: Rc<dyn RewardsApi>,
    /// Tab queries and navigation.
    pub tabs: Rc<dyn BrowserTabs>,
    /// Local storage for persisted UI flags.
    pub prefs: Rc<dyn PrefsStore>,
    /// Localized string lookup.
    pub strings: Rc<dyn LocaleStrings>,
    /// Executor for background platform round trips.
    pub spawner: Rc<dyn LocalSpawn>,
}

struct HostInner {
    services: PanelServices,
    config: PanelConfig,
    state: StateManager<PanelState>,
    grants: RefCell<HashMap<String, GrantInfo>>,
    login_urls: LoginUrlCache,
    subscriptions: RefCell<Vec<Subscription>>,
}

impl HostInner {
    fn update(&self, patch: PanelStatePatch) {
        self.state.update(patch);
    }

    fn spawn(&self, task: impl Future<Output = ()> + 'static) {
        if let Err(err) = self.services.spawner.spawn_local(task) {
            tracing::error!("panel task spawn failed: {err}");
        }
    }

    fn api(&self) -> &dyn RewardsApi {
        self.services.api.as_ref()
    }

    async fn update_publisher_info(&self) -> Result<(), PlatformError> {
        let Some(tab_id) = self.services.tabs.active_tab_id().await? else {
            return Ok(());
        };
        let publisher_info = api_adapter::get_publisher_info(self.api(), tab_id).await?;
        self.update(PanelStatePatch {
            publisher_info: Some(publisher_info),
            ..PanelStatePatch::default()
        });
        Ok(())
    }

    fn update_settings(&self, edit: impl FnOnce(&mut Settings)) {
        let mut settings = self.state.get_state().settings.clone();
        edit(&mut settings);
        self.update(PanelStatePatch {
            settings: Some(settings),
            ..PanelStatePatch::default()
        });
    }

    fn update_prefs(self: &Rc<Self>, prefs: RawPrefsUpdate) {
        let inner = self.clone();
        self.spawn(async move {
            if let Err(err) = inner.api().update_prefs(&prefs).await {
                tracing::warn!("rewards preference update failed: {err}");
            }
        });
    }

    fn tip_current_publisher(self: &Rc<Self>, kind: TipKind) {
        let inner = self.clone();
        self.spawn(async move {
            let tab_id = match inner.services.tabs.active_tab_id().await {
                Ok(Some(tab_id)) => tab_id,
                Ok(None) => return,
                Err(err) => {
                    tracing::warn!("active tab query failed: {err}");
                    return;
                }
            };
            let Some(publisher_id) = inner
                .state
                .get_state()
                .publisher_info
                .as_ref()
                .map(|publisher| publisher.id.clone())
            else {
                return;
            };
            if let Err(err) = inner.api().tip_site(tab_id, &publisher_id, kind).await {
                tracing::warn!(kind = kind.as_str(), "tip command failed: {err}");
            }
            inner.services.tabs.close_panel();
        });
    }
}

/// Rewards panel session bound to one set of host services.
///
/// Dropping the last clone (or calling [`RewardsPanelHost::shutdown`]) removes every platform
/// listener registered at startup.
#[derive(Clone)]
pub struct RewardsPanelHost {
    inner: Rc<HostInner>,
}

impl RewardsPanelHost {
    /// Creates the host, subscribes to platform events, and starts the startup fetch batch.
    pub fn new(services: PanelServices, config: PanelConfig) -> Self {
        let mut initial = PanelState::default();
        initial.exchange_info.currency = config.currency.clone();
        let inner = Rc::new(HostInner {
            services,
            config,
            state: StateManager::new(initial),
            grants: RefCell::new(HashMap::new()),
            login_urls: LoginUrlCache::default(),
            subscriptions: RefCell::new(Vec::new()),
        });
        boot::install_listeners(&inner);
        inner.spawn(boot::initialize(inner.clone()));
        Self { inner }
    }

    /// Current state snapshot.
    pub fn state(&self) -> Rc<PanelState> {
        self.inner.state.get_state()
    }

    /// Registers a state subscriber.
    pub fn add_listener(
        &self,
        listener: impl Fn(&Rc<PanelState>) + 'static,
    ) -> ListenerHandle<PanelState> {
        self.inner.state.add_listener(listener)
    }

    /// Localized message for `key` with `$1`..`$9` left as positional markers.
    pub fn get_string(&self, key: &str) -> String {
        self.inner
            .services
            .strings
            .get_message(key, &PLACEHOLDER_MARKERS)
    }

    /// Login URLs learned from wallet fetches.
    pub fn login_urls(&self) -> &LoginUrlCache {
        &self.inner.login_urls
    }

    pub fn enable_rewards(&self) {
        self.inner.update(PanelStatePatch {
            rewards_enabled: Some(true),
            ..PanelStatePatch::default()
        });
        let inner = self.inner.clone();
        self.inner.spawn(async move {
            if let Err(err) = inner.api().enable_rewards().await {
                tracing::warn!("enable rewards failed: {err}");
            }
        });
    }

    pub fn open_rewards_settings(&self) {
        wallet_actions::open_tab(&self.inner, self.inner.config.rewards_settings_url.clone());
    }

    /// Asks the platform to re-check the current publisher and recomposes publisher info.
    ///
    /// `publisher_refreshing` is set for the duration and cleared on every path.
    pub fn refresh_publisher_status(&self) {
        let Some(publisher_id) = self.publisher_id() else {
            return;
        };
        self.inner.update(PanelStatePatch {
            publisher_refreshing: Some(true),
            ..PanelStatePatch::default()
        });
        tracing::debug!(publisher = %publisher_id, "refreshing publisher");

        let inner = self.inner.clone();
        self.inner.spawn(async move {
            match inner.api().refresh_publisher(&publisher_id).await {
                Ok(()) => {
                    if let Err(err) = inner.update_publisher_info().await {
                        tracing::warn!("publisher info refresh failed: {err}");
                    }
                }
                Err(err) => tracing::warn!("publisher refresh failed: {err}"),
            }
            inner.update(PanelStatePatch {
                publisher_refreshing: Some(false),
                ..PanelStatePatch::default()
            });
        });
    }

    pub fn set_include_in_auto_contribute(&self, include: bool) {
        let state = self.inner.state.get_state();
        let Some(publisher) = state.publisher_info.as_ref() else {
            return;
        };
        let publisher_id = publisher.id.clone();
        let mut updated = publisher.clone();
        updated.auto_contribute_enabled = include;
        self.inner.update(PanelStatePatch {
            publisher_info: Some(Some(updated)),
            ..PanelStatePatch::default()
        });

        let inner = self.inner.clone();
        self.inner.spawn(async move {
            // The platform command takes the inverse flag.
            if let Err(err) = inner
                .api()
                .include_in_auto_contribution(&publisher_id, !include)
                .await
            {
                tracing::warn!("auto-contribute inclusion update failed: {err}");
            }
        });
    }

    pub fn set_auto_contribute_amount(&self, amount: f64) {
        self.inner
            .update_settings(|settings| settings.auto_contribute_amount = amount);
        self.inner.update_prefs(RawPrefsUpdate {
            auto_contribute_amount: Some(amount),
            ..RawPrefsUpdate::default()
        });
    }

    pub fn set_ads_per_hour(&self, ads_per_hour: u32) {
        self.inner
            .update_settings(|settings| settings.ads_per_hour = ads_per_hour);
        self.inner.update_prefs(RawPrefsUpdate {
            ads_per_hour: Some(ads_per_hour),
            ..RawPrefsUpdate::default()
        });
    }

    pub fn hide_publisher_unverified_note(&self) {
        self.inner.update(PanelStatePatch {
            hide_publisher_unverified_note: Some(true),
            ..PanelStatePatch::default()
        });
        let inner = self.inner.clone();
        self.inner.spawn(async move {
            let store = inner.services.prefs.as_ref();
            if let Err(err) =
                persistence::persist_hide_publisher_unverified_note(store, &inner.config, true)
                    .await
            {
                tracing::warn!("persist unverified-note flag failed: {err}");
            }
        });
    }

    /// One-time tip for the active tab's publisher; closes the panel afterwards.
    pub fn send_tip(&self) {
        self.inner.tip_current_publisher(TipKind::OneTime);
    }

    /// Sets or cancels the monthly tip for the active tab's publisher; closes the panel
    /// afterwards.
    pub fn handle_monthly_tip_action(&self, action: MonthlyTipAction) {
        let kind = match action {
            MonthlyTipAction::Update => TipKind::SetMonthly,
            MonthlyTipAction::Cancel => TipKind::ClearMonthly,
        };
        self.inner.tip_current_publisher(kind);
    }

    pub fn handle_external_wallet_action(&self, action: ExternalWalletAction) {
        wallet_actions::handle_external_wallet_action(&self.inner, action);
    }

    pub fn handle_notification_action(&self, action: NotificationAction) {
        match action {
            NotificationAction::OpenLink { url } => wallet_actions::open_tab(&self.inner, url),
            NotificationAction::BackupWallet => {
                wallet_actions::open_tab(&self.inner, self.inner.config.manage_wallet_url.clone())
            }
            NotificationAction::ClaimGrant { grant_id } => {
                captcha::load_captcha(&self.inner, &grant_id, GrantCaptchaStatus::Pending)
            }
            NotificationAction::AddFunds => {
                self.handle_external_wallet_action(ExternalWalletAction::AddFunds)
            }
            NotificationAction::ReconnectExternalWallet => {
                self.handle_external_wallet_action(ExternalWalletAction::Reconnect)
            }
        }
    }

    /// Deletes a notification on the platform and drops it from the local list.
    pub fn dismiss_notification(&self, notification_id: &str) {
        let notifications = self
            .inner
            .state
            .get_state()
            .notifications
            .iter()
            .filter(|notification| notification.id != notification_id)
            .cloned()
            .collect();
        self.inner.update(PanelStatePatch {
            notifications: Some(notifications),
            ..PanelStatePatch::default()
        });

        let inner = self.inner.clone();
        let notification_id = notification_id.to_string();
        self.inner.spawn(async move {
            if let Err(err) = inner.api().delete_notification(&notification_id).await {
                tracing::warn!(notification = %notification_id, "notification delete failed: {err}");
            }
        });
    }

    pub fn set_notifications_viewed(&self) {
        let now = unix_time_ms_now();
        self.inner.update(PanelStatePatch {
            notifications_last_viewed: Some(now),
            ..PanelStatePatch::default()
        });
        let inner = self.inner.clone();
        self.inner.spawn(async move {
            let store = inner.services.prefs.as_ref();
            if let Err(err) =
                persistence::persist_notifications_last_viewed(store, &inner.config, now).await
            {
                tracing::warn!("persist notifications-last-viewed failed: {err}");
            }
        });
    }

    /// Starts the captcha flow for a known grant.
    pub fn claim_grant(&self, grant_id: &str) {
        captcha::load_captcha(&self.inner, grant_id, GrantCaptchaStatus::Pending);
    }

    pub fn solve_grant_captcha(&self, solution: CaptchaSolution) {
        captcha::solve(&self.inner, solution);
    }

    pub fn clear_grant_captcha(&self) {
        captcha::clear(&self.inner);
    }

    /// Removes every platform listener. State stays readable; no further live refreshes arrive.
    pub fn shutdown(&self) {
        let subscriptions = std::mem::take(&mut *self.inner.subscriptions.borrow_mut());
        drop(subscriptions);
    }

    fn publisher_id(&self) -> Option<String> {
        self.inner
            .state
            .get_state()
            .publisher_info
            .as_ref()
            .map(|publisher| publisher.id.clone())
    }
}
