//! Scriptable in-memory implementation of [`RewardsApi`].
//!
//! Used by headless builds and tests. Data answers come from [`MemoryRewardsData`]; commands are
//! recorded as [`RewardsApiCall`] values; any capability can be switched to fail or reported as
//! unwired. Captcha claims and attestations can be held open and resolved later to reproduce
//! out-of-order completion.

use std::{
    cell::{Cell, Ref, RefCell, RefMut},
    collections::{HashMap, HashSet, VecDeque},
};

use futures::channel::oneshot;

use crate::{
    EventListener, ListenerId, ListenerRegistry, PlatformError, PlatformEvent, PlatformEventKind,
    PlatformFuture, RawAdsAccountStatement, RawBalance, RawBalanceReport, RawCaptcha,
    RawExternalWallet, RawNotification, RawPrefs, RawPrefsUpdate, RawPublisherRecord,
    RawRecurringTip, RawRewardsParameters, RewardsApi, TipKind,
};

/// Data served by [`MemoryRewardsApi`] queries.
#[derive(Debug, Clone, Default)]
pub struct MemoryRewardsData {
    /// Balance answer.
    pub balance: RawBalance,
    /// Preference answer; updated by `update_prefs`.
    pub prefs: RawPrefs,
    /// Wallet parameters answer.
    pub parameters: RawRewardsParameters,
    /// External wallet answer.
    pub external_wallet: RawExternalWallet,
    /// Ads statement answer.
    pub ads_statement: RawAdsAccountStatement,
    /// Balance report answer (any month).
    pub balance_report: RawBalanceReport,
    /// Notification list; `delete_notification` removes entries.
    pub notifications: Vec<RawNotification>,
    /// Recurring tip list.
    pub recurring_tips: Vec<RawRecurringTip>,
    /// Onboarding flag (true while rewards are off).
    pub show_onboarding: bool,
    /// Background publisher records keyed by tab id.
    pub publishers: HashMap<i64, RawPublisherRecord>,
}

/// Command issued against [`MemoryRewardsApi`].
#[derive(Debug, Clone, PartialEq)]
pub enum RewardsApiCall {
    /// `update_prefs`.
    UpdatePrefs(RawPrefsUpdate),
    /// `disconnect_wallet`.
    DisconnectWallet,
    /// `delete_notification`.
    DeleteNotification(String),
    /// `fetch_promotions`.
    FetchPromotions,
    /// `claim_promotion`.
    ClaimPromotion(String),
    /// `attest_promotion`.
    AttestPromotion {
        /// Promotion id.
        promotion_id: String,
        /// JSON solution payload.
        solution: String,
    },
    /// `tip_site`.
    TipSite {
        /// Tab the tip was issued from.
        tab_id: i64,
        /// Publisher key.
        publisher_key: String,
        /// Tip flavour.
        kind: TipKind,
    },
    /// `refresh_publisher`.
    RefreshPublisher(String),
    /// `include_in_auto_contribution`.
    IncludeInAutoContribution {
        /// Publisher key.
        publisher_key: String,
        /// Exclude flag as sent to the platform.
        exclude: bool,
    },
    /// `enable_rewards`.
    EnableRewards,
}

/// In-memory rewards platform.
#[derive(Default)]
pub struct MemoryRewardsApi {
    data: RefCell<MemoryRewardsData>,
    failing: RefCell<HashSet<&'static str>>,
    unwired: RefCell<HashSet<&'static str>>,
    calls: RefCell<Vec<RewardsApiCall>>,
    defer_claims: Cell<bool>,
    pending_claims: RefCell<VecDeque<(String, oneshot::Sender<RawCaptcha>)>>,
    defer_attestations: Cell<bool>,
    pending_attestations: RefCell<VecDeque<(String, oneshot::Sender<i32>)>>,
    attest_results: RefCell<VecDeque<i32>>,
    stall_promotion_fetch: Cell<bool>,
    issued_captchas: Cell<u32>,
    listeners: ListenerRegistry,
}

impl MemoryRewardsApi {
    /// Creates a platform serving `data`.
    pub fn new(data: MemoryRewardsData) -> Self {
        Self {
            data: RefCell::new(data),
            ..Self::default()
        }
    }

    /// Borrows the served data.
    pub fn data(&self) -> Ref<'_, MemoryRewardsData> {
        self.data.borrow()
    }

    /// Mutably borrows the served data.
    pub fn data_mut(&self) -> RefMut<'_, MemoryRewardsData> {
        self.data.borrow_mut()
    }

    /// Makes every later call of `capability` fail with a transport error.
    pub fn fail(&self, capability: &'static str) {
        self.failing.borrow_mut().insert(capability);
    }

    /// Makes every later call of `capability` report it as unavailable on this host.
    pub fn unwire(&self, capability: &'static str) {
        self.unwired.borrow_mut().insert(capability);
    }

    /// Keeps `fetch_promotions` pending forever after recording it.
    pub fn stall_promotion_fetch(&self, stall: bool) {
        self.stall_promotion_fetch.set(stall);
    }

    /// Returns the recorded commands in issue order.
    pub fn calls(&self) -> Vec<RewardsApiCall> {
        self.calls.borrow().clone()
    }

    /// Holds `claim_promotion` answers until [`MemoryRewardsApi::resolve_next_claim`] is called.
    pub fn defer_claims(&self, defer: bool) {
        self.defer_claims.set(defer);
    }

    /// Number of claims waiting for an answer.
    pub fn pending_claim_count(&self) -> usize {
        self.pending_claims.borrow().len()
    }

    /// Answers the oldest held claim and returns its promotion id.
    pub fn resolve_next_claim(&self) -> Option<String> {
        let (promotion_id, sender) = self.pending_claims.borrow_mut().pop_front()?;
        let _ = sender.send(self.next_captcha());
        Some(promotion_id)
    }

    /// Holds `attest_promotion` answers until [`MemoryRewardsApi::resolve_next_attestation`]
    /// is called.
    pub fn defer_attestations(&self, defer: bool) {
        self.defer_attestations.set(defer);
    }

    /// Number of attestations waiting for an answer.
    pub fn pending_attestation_count(&self) -> usize {
        self.pending_attestations.borrow().len()
    }

    /// Answers the oldest held attestation with `code` and returns its promotion id.
    pub fn resolve_next_attestation(&self, code: i32) -> Option<String> {
        let (promotion_id, sender) = self.pending_attestations.borrow_mut().pop_front()?;
        let _ = sender.send(code);
        Some(promotion_id)
    }

    /// Queues the result code returned by the next `attest_promotion`.
    ///
    /// With an empty queue the attestation passes (code `0`).
    pub fn push_attest_result(&self, code: i32) {
        self.attest_results.borrow_mut().push_back(code);
    }

    /// Delivers a recurring event to registered listeners.
    pub fn emit(&self, event: &PlatformEvent) {
        self.listeners.emit(event);
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn check(&self, capability: &'static str) -> Result<(), PlatformError> {
        if self.unwired.borrow().contains(capability) {
            return Err(PlatformError::Unavailable { capability });
        }
        if self.failing.borrow().contains(capability) {
            return Err(PlatformError::transport(capability, "scripted failure"));
        }
        Ok(())
    }

    fn record(&self, call: RewardsApiCall) {
        self.calls.borrow_mut().push(call);
    }

    fn next_captcha(&self) -> RawCaptcha {
        let n = self.issued_captchas.get() + 1;
        self.issued_captchas.set(n);
        RawCaptcha {
            captcha_id: format!("captcha-{n}"),
            hint: format!("hint-{n}"),
            captcha_image: format!("data:image/png;base64,{n}"),
        }
    }

    fn query<T>(
        &self,
        capability: &'static str,
        read: impl FnOnce(&MemoryRewardsData) -> T,
    ) -> Result<T, PlatformError> {
        self.check(capability)?;
        Ok(read(&self.data.borrow()))
    }

    fn command(&self, capability: &'static str, call: RewardsApiCall) -> Result<(), PlatformError> {
        self.record(call);
        self.check(capability)
    }
}

impl RewardsApi for MemoryRewardsApi {
    fn fetch_balance(&self) -> PlatformFuture<'_, RawBalance> {
        Box::pin(async move { self.query("fetchBalance", |data| data.balance.clone()) })
    }

    fn get_prefs(&self) -> PlatformFuture<'_, RawPrefs> {
        Box::pin(async move { self.query("getPrefs", |data| data.prefs.clone()) })
    }

    fn update_prefs<'a>(&'a self, update: &'a RawPrefsUpdate) -> PlatformFuture<'a, ()> {
        Box::pin(async move {
            self.command("updatePrefs", RewardsApiCall::UpdatePrefs(update.clone()))?;
            let mut data = self.data.borrow_mut();
            if let Some(ads_per_hour) = update.ads_per_hour {
                data.prefs.ads_per_hour = ads_per_hour;
            }
            if let Some(amount) = update.auto_contribute_amount {
                data.prefs.auto_contribute_amount = amount;
            }
            Ok(())
        })
    }

    fn get_rewards_parameters(&self) -> PlatformFuture<'_, RawRewardsParameters> {
        Box::pin(async move { self.query("getRewardsParameters", |data| data.parameters.clone()) })
    }

    fn get_external_wallet(&self) -> PlatformFuture<'_, RawExternalWallet> {
        Box::pin(async move { self.query("getExternalWallet", |data| data.external_wallet.clone()) })
    }

    fn disconnect_wallet(&self) -> PlatformFuture<'_, ()> {
        Box::pin(async move {
            self.command("disconnectWallet", RewardsApiCall::DisconnectWallet)?;
            self.data.borrow_mut().external_wallet = RawExternalWallet::default();
            Ok(())
        })
    }

    fn get_ads_account_statement(&self) -> PlatformFuture<'_, RawAdsAccountStatement> {
        Box::pin(async move {
            self.query("getAdsAccountStatement", |data| data.ads_statement.clone())
        })
    }

    fn get_balance_report(&self, _month: u32, _year: i32) -> PlatformFuture<'_, RawBalanceReport> {
        Box::pin(async move { self.query("getBalanceReport", |data| data.balance_report.clone()) })
    }

    fn get_all_notifications(&self) -> PlatformFuture<'_, Vec<RawNotification>> {
        Box::pin(async move { self.query("getAllNotifications", |data| data.notifications.clone()) })
    }

    fn delete_notification<'a>(&'a self, id: &'a str) -> PlatformFuture<'a, ()> {
        Box::pin(async move {
            self.command(
                "deleteNotification",
                RewardsApiCall::DeleteNotification(id.to_string()),
            )?;
            self.data
                .borrow_mut()
                .notifications
                .retain(|notification| notification.id != id);
            Ok(())
        })
    }

    fn fetch_promotions(&self) -> PlatformFuture<'_, ()> {
        Box::pin(async move {
            self.command("fetchPromotions", RewardsApiCall::FetchPromotions)?;
            if self.stall_promotion_fetch.get() {
                futures::future::pending::<()>().await;
            }
            Ok(())
        })
    }

    fn claim_promotion<'a>(&'a self, promotion_id: &'a str) -> PlatformFuture<'a, RawCaptcha> {
        Box::pin(async move {
            self.command(
                "claimPromotion",
                RewardsApiCall::ClaimPromotion(promotion_id.to_string()),
            )?;
            if !self.defer_claims.get() {
                return Ok(self.next_captcha());
            }
            let (sender, receiver) = oneshot::channel();
            self.pending_claims
                .borrow_mut()
                .push_back((promotion_id.to_string(), sender));
            receiver
                .await
                .map_err(|_| PlatformError::transport("claimPromotion", "claim abandoned"))
        })
    }

    fn attest_promotion<'a>(
        &'a self,
        promotion_id: &'a str,
        solution: &'a str,
    ) -> PlatformFuture<'a, i32> {
        Box::pin(async move {
            self.command(
                "attestPromotion",
                RewardsApiCall::AttestPromotion {
                    promotion_id: promotion_id.to_string(),
                    solution: solution.to_string(),
                },
            )?;
            if !self.defer_attestations.get() {
                return Ok(self.attest_results.borrow_mut().pop_front().unwrap_or(0));
            }
            let (sender, receiver) = oneshot::channel();
            self.pending_attestations
                .borrow_mut()
                .push_back((promotion_id.to_string(), sender));
            receiver
                .await
                .map_err(|_| PlatformError::transport("attestPromotion", "attestation abandoned"))
        })
    }

    fn get_recurring_tips(&self) -> PlatformFuture<'_, Vec<RawRecurringTip>> {
        Box::pin(async move { self.query("getRecurringTips", |data| data.recurring_tips.clone()) })
    }

    fn tip_site<'a>(
        &'a self,
        tab_id: i64,
        publisher_key: &'a str,
        kind: TipKind,
    ) -> PlatformFuture<'a, ()> {
        Box::pin(async move {
            self.command(
                "tipSite",
                RewardsApiCall::TipSite {
                    tab_id,
                    publisher_key: publisher_key.to_string(),
                    kind,
                },
            )
        })
    }

    fn refresh_publisher<'a>(&'a self, publisher_key: &'a str) -> PlatformFuture<'a, ()> {
        Box::pin(async move {
            self.command(
                "refreshPublisher",
                RewardsApiCall::RefreshPublisher(publisher_key.to_string()),
            )
        })
    }

    fn include_in_auto_contribution<'a>(
        &'a self,
        publisher_key: &'a str,
        exclude: bool,
    ) -> PlatformFuture<'a, ()> {
        Box::pin(async move {
            self.command(
                "includeInAutoContribution",
                RewardsApiCall::IncludeInAutoContribution {
                    publisher_key: publisher_key.to_string(),
                    exclude,
                },
            )
        })
    }

    fn enable_rewards(&self) -> PlatformFuture<'_, ()> {
        Box::pin(async move {
            self.command("enableRewards", RewardsApiCall::EnableRewards)?;
            self.data.borrow_mut().show_onboarding = false;
            Ok(())
        })
    }

    fn should_show_onboarding(&self) -> PlatformFuture<'_, bool> {
        Box::pin(async move { self.query("shouldShowOnboarding", |data| data.show_onboarding) })
    }

    fn get_publisher_record(&self, tab_id: i64) -> PlatformFuture<'_, Option<RawPublisherRecord>> {
        Box::pin(async move {
            self.query("getPublisherRecord", |data| data.publishers.get(&tab_id).cloned())
        })
    }

    fn add_listener(&self, kind: PlatformEventKind, listener: EventListener) -> ListenerId {
        self.listeners.add(kind, listener)
    }

    fn remove_listener(&self, id: ListenerId) {
        self.listeners.remove(id);
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use futures::executor::{block_on, LocalPool};
    use futures::task::LocalSpawnExt;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn scripted_failure_only_affects_named_capability() {
        let api = MemoryRewardsApi::new(MemoryRewardsData {
            balance: RawBalance { total: 3.0 },
            ..MemoryRewardsData::default()
        });
        api.fail("getPrefs");

        assert_eq!(block_on(api.fetch_balance()).expect("balance").total, 3.0);
        let err = block_on(api.get_prefs()).expect_err("prefs fail");
        assert_eq!(err.capability(), "getPrefs");
    }

    #[test]
    fn commands_are_recorded_even_when_they_fail() {
        let api = MemoryRewardsApi::default();
        api.fail("enableRewards");

        assert!(block_on(api.enable_rewards()).is_err());
        block_on(api.include_in_auto_contribution("pub", true)).expect("include");

        assert_eq!(
            api.calls(),
            vec![
                RewardsApiCall::EnableRewards,
                RewardsApiCall::IncludeInAutoContribution {
                    publisher_key: "pub".to_string(),
                    exclude: true,
                },
            ]
        );
    }

    #[test]
    fn deferred_claim_resolves_on_demand() {
        let api = Rc::new(MemoryRewardsApi::default());
        api.defer_claims(true);
        let answer = Rc::new(RefCell::new(None));

        let mut pool = LocalPool::new();
        let task_api = api.clone();
        let slot = answer.clone();
        pool.spawner()
            .spawn_local(async move {
                *slot.borrow_mut() = Some(task_api.claim_promotion("grant-1").await);
            })
            .expect("spawn");

        pool.run_until_stalled();
        assert_eq!(api.pending_claim_count(), 1);
        assert!(answer.borrow().is_none());

        assert_eq!(api.resolve_next_claim(), Some("grant-1".to_string()));
        pool.run_until_stalled();

        let captcha = answer.borrow_mut().take().expect("resolved").expect("ok");
        assert_eq!(captcha.captcha_id, "captcha-1");
    }

    #[test]
    fn attest_results_pop_in_order_then_pass() {
        let api = MemoryRewardsApi::default();
        api.push_attest_result(6);

        assert_eq!(block_on(api.attest_promotion("g", "{}")).expect("attest"), 6);
        assert_eq!(block_on(api.attest_promotion("g", "{}")).expect("attest"), 0);
    }

    #[test]
    fn deferred_attestation_answers_with_given_code() {
        let api = Rc::new(MemoryRewardsApi::default());
        api.defer_attestations(true);
        let answer = Rc::new(RefCell::new(None));

        let mut pool = LocalPool::new();
        let task_api = api.clone();
        let slot = answer.clone();
        pool.spawner()
            .spawn_local(async move {
                *slot.borrow_mut() = Some(task_api.attest_promotion("grant-1", "{}").await);
            })
            .expect("spawn");

        pool.run_until_stalled();
        assert_eq!(api.pending_attestation_count(), 1);
        assert!(answer.borrow().is_none());

        assert_eq!(api.resolve_next_attestation(6), Some("grant-1".to_string()));
        pool.run_until_stalled();

        assert_eq!(answer.borrow_mut().take().expect("resolved").expect("ok"), 6);
        assert_eq!(api.resolve_next_attestation(0), None);
    }

    #[test]
    fn unwired_capability_reports_unavailable() {
        let api = MemoryRewardsApi::default();
        api.unwire("enableRewards");
        api.fail("enableRewards");

        let err = block_on(api.enable_rewards()).expect_err("unwired");
        assert!(matches!(
            err,
            PlatformError::Unavailable {
                capability: "enableRewards"
            }
        ));
        assert_eq!(api.calls(), vec![RewardsApiCall::EnableRewards]);
        block_on(api.fetch_balance()).expect("other capabilities still answer");
    }

    #[test]
    fn stalled_promotion_fetch_never_completes() {
        let api = Rc::new(MemoryRewardsApi::default());
        api.stall_promotion_fetch(true);
        let done = Rc::new(Cell::new(false));

        let mut pool = LocalPool::new();
        let task_api = api.clone();
        let flag = done.clone();
        pool.spawner()
            .spawn_local(async move {
                let _ = task_api.fetch_promotions().await;
                flag.set(true);
            })
            .expect("spawn");

        pool.run_until_stalled();
        assert!(!done.get());
        assert_eq!(api.calls(), vec![RewardsApiCall::FetchPromotions]);
    }
}
