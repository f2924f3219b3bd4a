use serde::{Deserialize, Serialize};

use crate::state_manager::MergeState;

pub const DEFAULT_CURRENCY: &str = "USD";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExternalWalletProvider {
    Bitflyer,
    Uphold,
    Gemini,
}

impl ExternalWalletProvider {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bitflyer => "bitflyer",
            Self::Uphold => "uphold",
            Self::Gemini => "gemini",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExternalWalletStatus {
    Verified,
    Pending,
    Disconnected,
}

/// Provider pages for a linked wallet. Empty platform strings are stored as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalWalletLinks {
    pub account: Option<String>,
    pub add_funds: Option<String>,
    pub complete_verification: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalWallet {
    pub provider: ExternalWalletProvider,
    pub status: ExternalWalletStatus,
    pub username: String,
    pub links: ExternalWalletLinks,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GrantSource {
    Ads,
    UserGrant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantInfo {
    pub id: String,
    pub source: GrantSource,
    pub amount: f64,
    /// Expiry in epoch milliseconds; `None` when the grant never expires.
    pub expires_at: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GrantCaptchaStatus {
    Pending,
    Passed,
    Failed,
    Error,
}

/// One grant-claim attempt. Challenge fields stay empty until the platform returns them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantCaptchaInfo {
    pub id: String,
    pub hint: String,
    #[serde(rename = "imageURL")]
    pub image_url: String,
    pub status: GrantCaptchaStatus,
    pub grant_info: GrantInfo,
}

impl GrantCaptchaInfo {
    pub fn awaiting_challenge(grant_info: GrantInfo, status: GrantCaptchaStatus) -> Self {
        Self {
            id: String::new(),
            hint: String::new(),
            image_url: String::new(),
            status,
            grant_info,
        }
    }

    pub fn grant_id(&self) -> &str {
        &self.grant_info.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CaptchaSolution {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub ads_per_hour: u32,
    pub auto_contribute_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeInfo {
    pub currency: String,
    pub rate: f64,
}

impl Default for ExchangeInfo {
    fn default() -> Self {
        Self {
            currency: DEFAULT_CURRENCY.to_string(),
            rate: 0.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardsOptions {
    pub auto_contribute_amounts: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarningsInfo {
    pub earnings_last_month: f64,
    pub earnings_this_month: f64,
    pub next_payment_date: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardsSummaryData {
    pub grant_claims: f64,
    pub ad_earnings: f64,
    pub auto_contributions: f64,
    pub one_time_tips: f64,
    pub monthly_tips: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublisherInfo {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub registered: bool,
    /// Share of attention in `0.0..=1.0`.
    pub attention_score: f64,
    pub auto_contribute_enabled: bool,
    pub monthly_contribution: f64,
    pub supported_wallet_providers: Vec<ExternalWalletProvider>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MonthlyContributionFailedReason {
    Unknown,
    InsufficientFunds,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PendingTipFailedReason {
    InsufficientFunds,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExternalWalletLinkingFailedReason {
    DeviceLimitReached,
    MismatchedProviderAccounts,
    UpholdBatNotSupported,
    UpholdUserBlocked,
    UpholdUserPending,
    UpholdUserRestricted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum NotificationKind {
    AutoContributeCompleted {
        amount: f64,
    },
    MonthlyContributionFailed {
        reason: MonthlyContributionFailedReason,
    },
    GrantAvailable {
        source: GrantSource,
        #[serde(rename = "grantId")]
        grant_id: String,
    },
    BackupWallet,
    AddFunds,
    MonthlyTipCompleted,
    PendingPublisherVerified {
        #[serde(rename = "publisherName")]
        publisher_name: String,
    },
    PendingTipFailed {
        reason: PendingTipFailedReason,
    },
    ExternalWalletVerified {
        provider: ExternalWalletProvider,
    },
    ExternalWalletDisconnected {
        provider: ExternalWalletProvider,
    },
    ExternalWalletLinkingFailed {
        provider: ExternalWalletProvider,
        reason: ExternalWalletLinkingFailedReason,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub time_stamp: u64,
    #[serde(flatten)]
    pub kind: NotificationKind,
}

/// Action buttons rendered on notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationAction {
    OpenLink { url: String },
    BackupWallet,
    ClaimGrant { grant_id: String },
    AddFunds,
    ReconnectExternalWallet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExternalWalletAction {
    Disconnect,
    AddFunds,
    CompleteVerification,
    Reconnect,
    Verify,
    ViewAccount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthlyTipAction {
    Update,
    Cancel,
}

/// Full panel view model. Every field has a usable default before startup fetches resolve;
/// `loading` stays true until the startup batch settles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelState {
    pub loading: bool,
    pub rewards_enabled: bool,
    pub balance: f64,
    pub settings: Settings,
    pub options: RewardsOptions,
    pub exchange_info: ExchangeInfo,
    pub earnings_info: EarningsInfo,
    pub summary_data: RewardsSummaryData,
    pub publisher_info: Option<PublisherInfo>,
    pub external_wallet_providers: Vec<ExternalWalletProvider>,
    pub external_wallet: Option<ExternalWallet>,
    pub notifications: Vec<Notification>,
    pub grant_captcha_info: Option<GrantCaptchaInfo>,
    pub publisher_refreshing: bool,
    pub hide_publisher_unverified_note: bool,
    pub notifications_last_viewed: u64,
}

impl Default for PanelState {
    fn default() -> Self {
        Self {
            loading: true,
            rewards_enabled: false,
            balance: 0.0,
            settings: Settings::default(),
            options: RewardsOptions::default(),
            exchange_info: ExchangeInfo::default(),
            earnings_info: EarningsInfo::default(),
            summary_data: RewardsSummaryData::default(),
            publisher_info: None,
            external_wallet_providers: Vec::new(),
            external_wallet: None,
            notifications: Vec::new(),
            grant_captcha_info: None,
            publisher_refreshing: false,
            hide_publisher_unverified_note: false,
            notifications_last_viewed: 0,
        }
    }
}

/// Partial update of [`PanelState`]. `None` leaves a field untouched; nullable fields take
/// `Some(None)` to clear.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PanelStatePatch {
    pub loading: Option<bool>,
    pub rewards_enabled: Option<bool>,
    pub balance: Option<f64>,
    pub settings: Option<Settings>,
    pub options: Option<RewardsOptions>,
    pub exchange_info: Option<ExchangeInfo>,
    pub earnings_info: Option<EarningsInfo>,
    pub summary_data: Option<RewardsSummaryData>,
    pub publisher_info: Option<Option<PublisherInfo>>,
    pub external_wallet_providers: Option<Vec<ExternalWalletProvider>>,
    pub external_wallet: Option<Option<ExternalWallet>>,
    pub notifications: Option<Vec<Notification>>,
    pub grant_captcha_info: Option<Option<GrantCaptchaInfo>>,
    pub publisher_refreshing: Option<bool>,
    pub hide_publisher_unverified_note: Option<bool>,
    pub notifications_last_viewed: Option<u64>,
}

impl MergeState for PanelState {
    type Patch = PanelStatePatch;

    fn merge(&mut self, patch: PanelStatePatch) {
        let PanelStatePatch {
            loading,
            rewards_enabled,
            balance,
            settings,
            options,
            exchange_info,
            earnings_info,
            summary_data,
            publisher_info,
            external_wallet_providers,
            external_wallet,
            notifications,
            grant_captcha_info,
            publisher_refreshing,
            hide_publisher_unverified_note,
            notifications_last_viewed,
        } = patch;

        merge_field(&mut self.loading, loading);
        merge_field(&mut self.rewards_enabled, rewards_enabled);
        merge_field(&mut self.balance, balance);
        merge_field(&mut self.settings, settings);
        merge_field(&mut self.options, options);
        merge_field(&mut self.exchange_info, exchange_info);
        merge_field(&mut self.earnings_info, earnings_info);
        merge_field(&mut self.summary_data, summary_data);
        merge_field(&mut self.publisher_info, publisher_info);
        merge_field(&mut self.external_wallet_providers, external_wallet_providers);
        merge_field(&mut self.external_wallet, external_wallet);
        merge_field(&mut self.notifications, notifications);
        merge_field(&mut self.grant_captcha_info, grant_captcha_info);
        merge_field(&mut self.publisher_refreshing, publisher_refreshing);
        merge_field(
            &mut self.hide_publisher_unverified_note,
            hide_publisher_unverified_note,
        );
        merge_field(&mut self.notifications_last_viewed, notifications_last_viewed);
    }
}

fn merge_field<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}
