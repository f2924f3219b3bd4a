//! One function per rewards platform capability, normalizing raw answers into the domain model.
//!
//! Every fetch resolves with an explicit empty/default value when the platform reports "not
//! found" or "disabled"; `Err` is reserved for transport failures. Unrecognized codes never fail:
//! each translation table below has a default arm that produces an absent or fallback value.

use std::{cell::RefCell, collections::HashMap, rc::Rc};

use chrono::Datelike;
use rewards_platform::{
    ListenerId, PlatformError, PlatformEvent, PlatformEventKind, RawExternalWallet, RawPromotion,
    RawPublisherRecord, RewardsApi, PROMOTIONS_RESULT_ERROR,
};
use serde_json::Value;

use crate::{
    coerce::{to_display_string, to_number, truthy},
    model::{
        EarningsInfo, ExchangeInfo, ExternalWallet, ExternalWalletLinks, ExternalWalletProvider,
        ExternalWalletStatus, GrantCaptchaStatus, GrantInfo, GrantSource, Notification,
        PublisherInfo, RewardsOptions, RewardsSummaryData, Settings,
    },
    notifications::map_notifications,
};

const WALLET_CONNECTED: i32 = 1;
const WALLET_VERIFIED: i32 = 2;
const WALLET_DISCONNECTED_NOT_VERIFIED: i32 = 3;
const WALLET_DISCONNECTED_VERIFIED: i32 = 4;
const WALLET_PENDING: i32 = 5;

const PROMOTION_TYPE_ADS: i32 = 1;

const PUBLISHER_NOT_VERIFIED: i64 = 0;
const PUBLISHER_CONNECTED: i64 = 1;
const PUBLISHER_UPHOLD_VERIFIED: i64 = 2;
const PUBLISHER_BITFLYER_VERIFIED: i64 = 3;
const PUBLISHER_GEMINI_VERIFIED: i64 = 4;

const ATTEST_PASSED: i32 = 0;
const ATTEST_CAPTCHA_FAILED: i32 = 6;

/// Exchange and contribution options reported together by the wallet parameters call.
#[derive(Debug, Clone, PartialEq)]
pub struct RewardsParameters {
    pub exchange_info: ExchangeInfo,
    pub options: RewardsOptions,
}

/// Registration state and tipping providers derived from a publisher status code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublisherVerification {
    pub registered: bool,
    pub supported_wallet_providers: Vec<ExternalWalletProvider>,
}

impl PublisherVerification {
    fn unregistered() -> Self {
        Self {
            registered: false,
            supported_wallet_providers: Vec::new(),
        }
    }

    fn registered(supported_wallet_providers: Vec<ExternalWalletProvider>) -> Self {
        Self {
            registered: true,
            supported_wallet_providers,
        }
    }
}

/// Provider-keyed login URLs, learned only as a side effect of [`get_external_wallet`].
#[derive(Debug, Default)]
pub struct LoginUrlCache {
    urls: RefCell<HashMap<ExternalWalletProvider, String>>,
}

impl LoginUrlCache {
    /// Returns the cached login URL, or an empty string when none was seen.
    pub fn login_url(&self, provider: ExternalWalletProvider) -> String {
        self.urls.borrow().get(&provider).cloned().unwrap_or_default()
    }

    /// Number of cached providers.
    pub fn len(&self) -> usize {
        self.urls.borrow().len()
    }

    /// Returns whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.urls.borrow().is_empty()
    }

    fn record(&self, provider: ExternalWalletProvider, url: String) {
        self.urls.borrow_mut().insert(provider, url);
    }
}

/// Registration of one platform listener; removed on [`Subscription::unsubscribe`] or drop.
pub struct Subscription {
    api: Rc<dyn RewardsApi>,
    id: Option<ListenerId>,
}

impl Subscription {
    fn register(
        api: &Rc<dyn RewardsApi>,
        kind: PlatformEventKind,
        listener: impl Fn(&PlatformEvent) + 'static,
    ) -> Self {
        let id = api.add_listener(kind, Rc::new(listener));
        Self {
            api: api.clone(),
            id: Some(id),
        }
    }

    /// Removes the listener now.
    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(id) = self.id.take() {
            self.api.remove_listener(id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

pub fn map_wallet_type(wallet_type: &str) -> Option<ExternalWalletProvider> {
    match wallet_type {
        "bitflyer" => Some(ExternalWalletProvider::Bitflyer),
        "uphold" => Some(ExternalWalletProvider::Uphold),
        "gemini" => Some(ExternalWalletProvider::Gemini),
        _ => None,
    }
}

pub fn map_wallet_status(code: i32) -> Option<ExternalWalletStatus> {
    match code {
        WALLET_CONNECTED | WALLET_VERIFIED => Some(ExternalWalletStatus::Verified),
        WALLET_DISCONNECTED_NOT_VERIFIED | WALLET_DISCONNECTED_VERIFIED => {
            Some(ExternalWalletStatus::Disconnected)
        }
        WALLET_PENDING => Some(ExternalWalletStatus::Pending),
        _ => None,
    }
}

pub fn map_grant_source(promotion_type: i32) -> GrantSource {
    match promotion_type {
        PROMOTION_TYPE_ADS => GrantSource::Ads,
        _ => GrantSource::UserGrant,
    }
}

/// Converts an expiry in epoch seconds to epoch milliseconds; zero or absent means no expiry.
pub fn normalize_expiry(expires_at_secs: Option<u64>) -> Option<u64> {
    expires_at_secs
        .filter(|secs| *secs > 0)
        .map(|secs| secs.saturating_mul(1000))
}

pub fn map_grants(promotions: &[RawPromotion]) -> Vec<GrantInfo> {
    promotions
        .iter()
        .map(|promotion| GrantInfo {
            id: promotion.promotion_id.clone(),
            source: map_grant_source(promotion.promotion_type),
            amount: promotion.amount,
            expires_at: normalize_expiry(promotion.expires_at),
        })
        .collect()
}

/// Maps a publisher status code; unrecognized or fractional codes read as unregistered.
pub fn map_publisher_status(code: f64) -> PublisherVerification {
    if code.fract() != 0.0 {
        return PublisherVerification::unregistered();
    }
    match code as i64 {
        PUBLISHER_NOT_VERIFIED => PublisherVerification::unregistered(),
        PUBLISHER_CONNECTED => PublisherVerification::registered(Vec::new()),
        PUBLISHER_UPHOLD_VERIFIED => {
            PublisherVerification::registered(vec![ExternalWalletProvider::Uphold])
        }
        PUBLISHER_BITFLYER_VERIFIED => {
            PublisherVerification::registered(vec![ExternalWalletProvider::Bitflyer])
        }
        PUBLISHER_GEMINI_VERIFIED => {
            PublisherVerification::registered(vec![ExternalWalletProvider::Gemini])
        }
        _ => PublisherVerification::unregistered(),
    }
}

/// Maps a captcha attestation result code.
pub fn map_attest_result(code: i32) -> GrantCaptchaStatus {
    match code {
        ATTEST_PASSED => GrantCaptchaStatus::Passed,
        ATTEST_CAPTCHA_FAILED => GrantCaptchaStatus::Failed,
        _ => GrantCaptchaStatus::Error,
    }
}

/// Calendar month (1-based) and year used for the balance report.
pub fn report_period(now: &impl Datelike) -> (u32, i32) {
    (now.month(), now.year())
}

pub async fn get_rewards_balance(api: &dyn RewardsApi) -> Result<f64, PlatformError> {
    Ok(api.fetch_balance().await?.total)
}

pub async fn get_settings(api: &dyn RewardsApi) -> Result<Settings, PlatformError> {
    let prefs = api.get_prefs().await?;
    Ok(Settings {
        ads_per_hour: prefs.ads_per_hour,
        auto_contribute_amount: prefs.auto_contribute_amount,
    })
}

pub async fn get_rewards_parameters(
    api: &dyn RewardsApi,
    currency: &str,
) -> Result<RewardsParameters, PlatformError> {
    let parameters = api.get_rewards_parameters().await?;
    Ok(RewardsParameters {
        exchange_info: ExchangeInfo {
            currency: currency.to_string(),
            rate: parameters.rate,
        },
        options: RewardsOptions {
            auto_contribute_amounts: parameters.auto_contribute_choices,
        },
    })
}

pub async fn get_external_wallet_providers(
    api: &dyn RewardsApi,
) -> Result<Vec<ExternalWalletProvider>, PlatformError> {
    // TODO: query the provider list directly once the extension API exposes one.
    let wallet = api.get_external_wallet().await?;
    Ok(map_wallet_type(&wallet.wallet_type).into_iter().collect())
}

/// Fetches the linked wallet and records its login URL in `login_urls`.
///
/// Resolves to `None` when the provider or status code is not recognized; the cache is then left
/// untouched.
pub async fn get_external_wallet(
    api: &dyn RewardsApi,
    login_urls: &LoginUrlCache,
) -> Result<Option<ExternalWallet>, PlatformError> {
    let wallet = api.get_external_wallet().await?;
    Ok(normalize_external_wallet(wallet, login_urls))
}

fn normalize_external_wallet(
    wallet: RawExternalWallet,
    login_urls: &LoginUrlCache,
) -> Option<ExternalWallet> {
    let provider = map_wallet_type(&wallet.wallet_type)?;
    let status = map_wallet_status(wallet.status)?;
    login_urls.record(provider, wallet.login_url);
    Some(ExternalWallet {
        provider,
        status,
        username: wallet.user_name,
        links: ExternalWalletLinks {
            account: non_empty(wallet.account_url),
            add_funds: non_empty(wallet.add_url),
            complete_verification: non_empty(wallet.verify_url),
        },
    })
}

fn non_empty(url: String) -> Option<String> {
    (!url.is_empty()).then_some(url)
}

/// Resolves to `None` when the ads statement is unavailable.
pub async fn get_earnings_info(
    api: &dyn RewardsApi,
) -> Result<Option<EarningsInfo>, PlatformError> {
    let statement = api.get_ads_account_statement().await?;
    if !statement.success {
        return Ok(None);
    }
    Ok(Some(EarningsInfo {
        earnings_last_month: statement.earnings_last_month,
        earnings_this_month: statement.earnings_this_month,
        next_payment_date: statement.next_payment_date,
    }))
}

pub async fn get_rewards_summary_data(
    api: &dyn RewardsApi,
    month: u32,
    year: i32,
) -> Result<RewardsSummaryData, PlatformError> {
    let report = api.get_balance_report(month, year).await?;
    Ok(RewardsSummaryData {
        grant_claims: report.grant,
        ad_earnings: report.ads,
        auto_contributions: report.contribute,
        one_time_tips: report.tips,
        monthly_tips: report.monthly,
    })
}

pub async fn get_notifications(api: &dyn RewardsApi) -> Result<Vec<Notification>, PlatformError> {
    let raw = api.get_all_notifications().await?;
    Ok(map_notifications(&raw))
}

/// Rewards count as enabled once onboarding is no longer offered.
pub async fn get_rewards_enabled(api: &dyn RewardsApi) -> Result<bool, PlatformError> {
    Ok(!api.should_show_onboarding().await?)
}

/// Monthly tip amount for a publisher; zero when no recurring tip matches.
pub async fn get_monthly_tip_amount(
    api: &dyn RewardsApi,
    publisher_key: &str,
) -> Result<f64, PlatformError> {
    let tips = api.get_recurring_tips().await?;
    Ok(tips
        .iter()
        .find(|tip| tip.publisher_key == publisher_key)
        .map(|tip| tip.amount)
        .unwrap_or(0.0))
}

/// Composes publisher info for a tab from the background publisher record and the recurring tip
/// list. Resolves to `None` when the tab has no publisher key.
pub async fn get_publisher_info(
    api: &dyn RewardsApi,
    tab_id: i64,
) -> Result<Option<PublisherInfo>, PlatformError> {
    let Some(record) = api.get_publisher_record(tab_id).await? else {
        return Ok(None);
    };
    let Some(publisher_key) = publisher_key(&record) else {
        return Ok(None);
    };
    let monthly_contribution = get_monthly_tip_amount(api, &publisher_key).await?;
    Ok(Some(publisher_info_from_record(
        publisher_key,
        &record,
        monthly_contribution,
    )))
}

fn publisher_key(record: &RawPublisherRecord) -> Option<String> {
    record
        .get("publisherKey")
        .and_then(Value::as_str)
        .filter(|key| !key.is_empty())
        .map(str::to_string)
}

fn publisher_info_from_record(
    publisher_key: String,
    record: &RawPublisherRecord,
    monthly_contribution: f64,
) -> PublisherInfo {
    let verification = map_publisher_status(to_number(record.get("status")).unwrap_or(0.0));
    let attention_score = to_number(record.get("percentage"))
        .map(|percentage| (percentage / 100.0).clamp(0.0, 1.0))
        .unwrap_or(0.0);

    PublisherInfo {
        id: publisher_key,
        name: to_display_string(record.get("name")),
        icon: to_display_string(record.get("favIconUrl")),
        registered: verification.registered,
        attention_score,
        auto_contribute_enabled: !truthy(record.get("excluded")),
        monthly_contribution,
        supported_wallet_providers: verification.supported_wallet_providers,
    }
}

/// Subscribes to promotion list updates. Failed fetches are ignored; each delivery is the full
/// current grant list.
///
/// Call [`request_grants`] afterwards to trigger the first delivery.
pub fn on_grants_updated(
    api: &Rc<dyn RewardsApi>,
    callback: impl Fn(Vec<GrantInfo>) + 'static,
) -> Subscription {
    Subscription::register(api, PlatformEventKind::Promotions, move |event| {
        if let PlatformEvent::Promotions { result, promotions } = event {
            if *result == PROMOTIONS_RESULT_ERROR {
                return;
            }
            callback(map_grants(promotions));
        }
    })
}

pub async fn request_grants(api: &dyn RewardsApi) -> Result<(), PlatformError> {
    api.fetch_promotions().await
}

/// Subscribes to "new tokens ready", which changes the balance.
pub fn on_unblinded_tokens_ready(
    api: &Rc<dyn RewardsApi>,
    callback: impl Fn() + 'static,
) -> Subscription {
    Subscription::register(api, PlatformEventKind::UnblindedTokensReady, move |_| {
        callback()
    })
}

/// Subscribes to every notification list change (added, deleted, all deleted).
pub fn on_notifications_changed(
    api: &Rc<dyn RewardsApi>,
    callback: impl Fn() + 'static,
) -> Vec<Subscription> {
    let callback = Rc::new(callback);
    [
        PlatformEventKind::NotificationAdded,
        PlatformEventKind::NotificationDeleted,
        PlatformEventKind::AllNotificationsDeleted,
    ]
    .into_iter()
    .map(|kind| {
        let callback = callback.clone();
        Subscription::register(api, kind, move |_| callback())
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use chrono::NaiveDate;
    use futures::executor::block_on;
    use pretty_assertions::assert_eq;
    use rewards_platform::{
        MemoryRewardsApi, MemoryRewardsData, RawAdsAccountStatement, RawRecurringTip,
        RewardsApiCall,
    };
    use serde_json::json;

    use super::*;

    fn linked_wallet(status: i32) -> RawExternalWallet {
        RawExternalWallet {
            wallet_type: "uphold".to_string(),
            status,
            user_name: "sam".to_string(),
            account_url: "https://uphold.example/account".to_string(),
            add_url: String::new(),
            verify_url: "https://uphold.example/verify".to_string(),
            login_url: "https://uphold.example/login".to_string(),
        }
    }

    fn api_with(data: MemoryRewardsData) -> MemoryRewardsApi {
        MemoryRewardsApi::new(data)
    }

    fn publisher_record(value: serde_json::Value) -> RawPublisherRecord {
        match value {
            Value::Object(map) => map,
            _ => RawPublisherRecord::new(),
        }
    }

    #[test]
    fn wallet_status_codes_collapse_many_to_one() {
        assert_eq!(map_wallet_status(1), Some(ExternalWalletStatus::Verified));
        assert_eq!(map_wallet_status(2), Some(ExternalWalletStatus::Verified));
        assert_eq!(map_wallet_status(3), Some(ExternalWalletStatus::Disconnected));
        assert_eq!(map_wallet_status(4), Some(ExternalWalletStatus::Disconnected));
        assert_eq!(map_wallet_status(5), Some(ExternalWalletStatus::Pending));
        for code in [-1, 0, 6, 24, 100] {
            assert_eq!(map_wallet_status(code), None);
        }
    }

    #[test]
    fn provider_tokens_outside_the_fixed_set_are_absent() {
        assert_eq!(map_wallet_type("gemini"), Some(ExternalWalletProvider::Gemini));
        assert_eq!(map_wallet_type("Uphold"), None);
        assert_eq!(map_wallet_type(""), None);
    }

    #[test]
    fn expiry_zero_or_absent_means_no_expiry() {
        assert_eq!(normalize_expiry(None), None);
        assert_eq!(normalize_expiry(Some(0)), None);
        for secs in [1_u64, 59, 1_700_000_000] {
            assert_eq!(normalize_expiry(Some(secs)), Some(secs * 1000));
        }
    }

    #[test]
    fn grants_map_source_and_expiry() {
        let grants = map_grants(&[
            RawPromotion {
                promotion_id: "a".to_string(),
                promotion_type: 1,
                amount: 2.5,
                expires_at: Some(10),
            },
            RawPromotion {
                promotion_id: "b".to_string(),
                promotion_type: 0,
                amount: 1.0,
                expires_at: Some(0),
            },
        ]);

        assert_eq!(grants[0].source, GrantSource::Ads);
        assert_eq!(grants[0].expires_at, Some(10_000));
        assert_eq!(grants[1].source, GrantSource::UserGrant);
        assert_eq!(grants[1].expires_at, None);
    }

    #[test]
    fn publisher_status_table_defaults_to_unregistered() {
        assert_eq!(map_publisher_status(0.0), PublisherVerification::unregistered());
        assert_eq!(
            map_publisher_status(1.0),
            PublisherVerification::registered(Vec::new())
        );
        assert_eq!(
            map_publisher_status(3.0).supported_wallet_providers,
            vec![ExternalWalletProvider::Bitflyer]
        );
        assert_eq!(map_publisher_status(9.0), PublisherVerification::unregistered());
        assert_eq!(map_publisher_status(2.5), PublisherVerification::unregistered());
    }

    #[test]
    fn attest_codes_map_to_captcha_status() {
        assert_eq!(map_attest_result(0), GrantCaptchaStatus::Passed);
        assert_eq!(map_attest_result(6), GrantCaptchaStatus::Failed);
        assert_eq!(map_attest_result(3), GrantCaptchaStatus::Error);
    }

    #[test]
    fn report_period_uses_one_based_month() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 31).expect("valid date");
        assert_eq!(report_period(&date), (1, 2024));
    }

    #[test]
    fn recognized_wallet_populates_login_url_cache() {
        let api = api_with(MemoryRewardsData {
            external_wallet: linked_wallet(2),
            ..MemoryRewardsData::default()
        });
        let cache = LoginUrlCache::default();

        let wallet = block_on(get_external_wallet(&api, &cache))
            .expect("fetch")
            .expect("wallet");

        assert_eq!(wallet.status, ExternalWalletStatus::Verified);
        assert_eq!(wallet.links.add_funds, None);
        assert_eq!(
            wallet.links.complete_verification.as_deref(),
            Some("https://uphold.example/verify")
        );
        assert_eq!(
            cache.login_url(ExternalWalletProvider::Uphold),
            "https://uphold.example/login"
        );
    }

    #[test]
    fn unrecognized_wallet_status_is_absent_and_cache_untouched() {
        for code in [0, 6, 24] {
            let api = api_with(MemoryRewardsData {
                external_wallet: linked_wallet(code),
                ..MemoryRewardsData::default()
            });
            let cache = LoginUrlCache::default();

            assert_eq!(block_on(get_external_wallet(&api, &cache)).expect("fetch"), None);
            assert!(cache.is_empty());
        }
    }

    #[test]
    fn provider_list_follows_wallet_type() {
        let api = api_with(MemoryRewardsData {
            external_wallet: linked_wallet(0),
            ..MemoryRewardsData::default()
        });
        assert_eq!(
            block_on(get_external_wallet_providers(&api)).expect("providers"),
            vec![ExternalWalletProvider::Uphold]
        );

        let unlinked = MemoryRewardsApi::default();
        assert!(block_on(get_external_wallet_providers(&unlinked))
            .expect("providers")
            .is_empty());
    }

    #[test]
    fn unavailable_statement_resolves_to_none() {
        let api = api_with(MemoryRewardsData {
            ads_statement: RawAdsAccountStatement {
                success: false,
                earnings_this_month: 3.0,
                ..RawAdsAccountStatement::default()
            },
            ..MemoryRewardsData::default()
        });
        assert_eq!(block_on(get_earnings_info(&api)).expect("statement"), None);
    }

    #[test]
    fn transport_failure_propagates() {
        let api = MemoryRewardsApi::default();
        api.fail("fetchBalance");
        let err = block_on(get_rewards_balance(&api)).expect_err("fails");
        assert_eq!(err.capability(), "fetchBalance");
    }

    #[test]
    fn monthly_tip_lookup_defaults_to_zero() {
        let api = api_with(MemoryRewardsData {
            recurring_tips: vec![RawRecurringTip {
                publisher_key: "brave.com".to_string(),
                amount: 10.0,
            }],
            ..MemoryRewardsData::default()
        });
        assert_eq!(
            block_on(get_monthly_tip_amount(&api, "brave.com")).expect("tips"),
            10.0
        );
        assert_eq!(
            block_on(get_monthly_tip_amount(&api, "other.com")).expect("tips"),
            0.0
        );
    }

    #[test]
    fn publisher_info_composes_record_and_monthly_tip() {
        let mut data = MemoryRewardsData {
            recurring_tips: vec![RawRecurringTip {
                publisher_key: "brave.com".to_string(),
                amount: 5.0,
            }],
            ..MemoryRewardsData::default()
        };
        data.publishers.insert(
            4,
            publisher_record(json!({
                "publisherKey": "brave.com",
                "name": "Brave",
                "favIconUrl": "chrome://favicon/brave.com",
                "status": "2",
                "percentage": 40,
                "excluded": false,
            })),
        );
        let api = api_with(data);

        let info = block_on(get_publisher_info(&api, 4))
            .expect("fetch")
            .expect("publisher");

        assert_eq!(
            info,
            PublisherInfo {
                id: "brave.com".to_string(),
                name: "Brave".to_string(),
                icon: "chrome://favicon/brave.com".to_string(),
                registered: true,
                attention_score: 0.4,
                auto_contribute_enabled: true,
                monthly_contribution: 5.0,
                supported_wallet_providers: vec![ExternalWalletProvider::Uphold],
            }
        );
    }

    #[test]
    fn publisher_record_with_loose_fields_normalizes_to_defaults() {
        let mut data = MemoryRewardsData::default();
        data.publishers.insert(
            1,
            publisher_record(json!({
                "publisherKey": "site.example",
                "status": "garbage",
                "percentage": "n/a",
                "excluded": 1,
            })),
        );
        data.publishers
            .insert(2, publisher_record(json!({ "publisherKey": 42 })));
        let api = api_with(data);

        let info = block_on(get_publisher_info(&api, 1))
            .expect("fetch")
            .expect("publisher");
        assert!(!info.registered);
        assert_eq!(info.attention_score, 0.0);
        assert!(!info.auto_contribute_enabled);
        assert_eq!(info.name, "");
        assert_eq!(info.monthly_contribution, 0.0);

        assert_eq!(block_on(get_publisher_info(&api, 2)).expect("fetch"), None);
        assert_eq!(block_on(get_publisher_info(&api, 3)).expect("fetch"), None);
    }

    #[test]
    fn grants_subscription_ignores_failed_fetches_and_unsubscribes() {
        let memory = Rc::new(MemoryRewardsApi::default());
        let api: Rc<dyn RewardsApi> = memory.clone();
        let deliveries = Rc::new(Cell::new(0));

        let counter = deliveries.clone();
        let subscription = on_grants_updated(&api, move |grants| {
            assert_eq!(grants.len(), 1);
            counter.set(counter.get() + 1);
        });
        block_on(request_grants(api.as_ref())).expect("request");

        let promotions = vec![RawPromotion {
            promotion_id: "g".to_string(),
            ..RawPromotion::default()
        }];
        memory.emit(&PlatformEvent::Promotions {
            result: PROMOTIONS_RESULT_ERROR,
            promotions: promotions.clone(),
        });
        memory.emit(&PlatformEvent::Promotions {
            result: 0,
            promotions: promotions.clone(),
        });
        assert_eq!(deliveries.get(), 1);
        assert_eq!(memory.calls(), vec![RewardsApiCall::FetchPromotions]);

        subscription.unsubscribe();
        memory.emit(&PlatformEvent::Promotions {
            result: 0,
            promotions,
        });
        assert_eq!(deliveries.get(), 1);
        assert_eq!(memory.listener_count(), 0);
    }

    #[test]
    fn notification_change_subscriptions_cover_all_kinds_and_drop_cleanly() {
        let memory = Rc::new(MemoryRewardsApi::default());
        let api: Rc<dyn RewardsApi> = memory.clone();
        let hits = Rc::new(Cell::new(0));

        let counter = hits.clone();
        let subscriptions = on_notifications_changed(&api, move || counter.set(counter.get() + 1));
        memory.emit(&PlatformEvent::NotificationAdded);
        memory.emit(&PlatformEvent::NotificationDeleted);
        memory.emit(&PlatformEvent::AllNotificationsDeleted);
        memory.emit(&PlatformEvent::UnblindedTokensReady);
        assert_eq!(hits.get(), 3);

        drop(subscriptions);
        assert_eq!(memory.listener_count(), 0);
    }
}
