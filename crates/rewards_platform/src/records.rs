//! Raw records as reported by the rewards extension API.
//!
//! Field names follow the extension API (camelCase on the wire) so browser bridges can decode
//! callback payloads directly. Values are deliberately loose: numeric status codes, empty strings
//! for "absent", and untyped publisher maps are normalized later by the panel adapter.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `result` code the promotions event uses to signal a failed fetch.
pub const PROMOTIONS_RESULT_ERROR: i32 = 1;

/// Wallet balance payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBalance {
    /// Total spendable balance.
    pub total: f64,
}

/// Rewards preference values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPrefs {
    /// Maximum number of ads shown per hour.
    pub ads_per_hour: u32,
    /// Monthly auto-contribute budget.
    pub auto_contribute_amount: f64,
}

/// Partial preference update; absent fields are left untouched by the platform.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPrefsUpdate {
    /// New ads-per-hour value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ads_per_hour: Option<u32>,
    /// New auto-contribute amount.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_contribute_amount: Option<f64>,
}

/// Wallet parameters (exchange rate and allowed contribution amounts).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRewardsParameters {
    /// Exchange rate to the display currency.
    pub rate: f64,
    /// Allowed auto-contribute amounts.
    #[serde(default)]
    pub auto_contribute_choices: Vec<f64>,
}

/// External wallet status payload.
///
/// An unlinked profile reports an empty `type`; the status field is an integer code.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawExternalWallet {
    /// Provider token (`uphold`, `bitflyer`, `gemini`, or anything else).
    #[serde(rename = "type", default)]
    pub wallet_type: String,
    /// Platform wallet status code.
    #[serde(default)]
    pub status: i32,
    /// Provider account display name.
    #[serde(default)]
    pub user_name: String,
    /// Provider account page.
    #[serde(default)]
    pub account_url: String,
    /// Provider add-funds page.
    #[serde(default)]
    pub add_url: String,
    /// Provider verification page.
    #[serde(default)]
    pub verify_url: String,
    /// Provider login page used to reconnect.
    #[serde(default)]
    pub login_url: String,
}

/// Ads earnings statement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAdsAccountStatement {
    /// Whether the statement could be produced (ads may be disabled).
    pub success: bool,
    /// Earnings for the previous month.
    #[serde(default)]
    pub earnings_last_month: f64,
    /// Earnings for the current month.
    #[serde(default)]
    pub earnings_this_month: f64,
    /// Next payout date in epoch milliseconds.
    #[serde(default)]
    pub next_payment_date: u64,
}

/// Balance report for one month.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBalanceReport {
    /// Claimed grants.
    #[serde(default)]
    pub grant: f64,
    /// Ad earnings.
    #[serde(default)]
    pub ads: f64,
    /// Auto-contributions.
    #[serde(default)]
    pub contribute: f64,
    /// One-time tips.
    #[serde(default)]
    pub tips: f64,
    /// Monthly tips.
    #[serde(default)]
    pub monthly: f64,
}

/// One entry of the rewards notification list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawNotification {
    /// Numeric notification type code.
    #[serde(rename = "type")]
    pub notification_type: i32,
    /// Positional string arguments; meaning depends on `type`.
    #[serde(default)]
    pub args: Vec<String>,
    /// Platform notification id.
    pub id: String,
    /// Creation timestamp as reported by the platform.
    #[serde(default)]
    pub timestamp: u64,
}

/// One promotion (grant) entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPromotion {
    /// Promotion id.
    pub promotion_id: String,
    /// Numeric promotion type code.
    #[serde(rename = "type", default)]
    pub promotion_type: i32,
    /// Grant amount.
    #[serde(default)]
    pub amount: f64,
    /// Expiry in seconds since the epoch; zero or absent means no expiry.
    #[serde(default)]
    pub expires_at: Option<u64>,
}

/// Captcha challenge material returned when claiming a promotion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCaptcha {
    /// Challenge id to echo back with the solution.
    pub captcha_id: String,
    /// Human-readable hint.
    #[serde(default)]
    pub hint: String,
    /// Image data URL.
    #[serde(default)]
    pub captcha_image: String,
}

/// One recurring (monthly) tip.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRecurringTip {
    /// Publisher key the tip goes to.
    pub publisher_key: String,
    /// Monthly amount.
    pub amount: f64,
}

/// Untyped publisher record keyed by tab, as kept by the rewards background state.
///
/// Known keys: `publisherKey`, `name`, `favIconUrl`, `status`, `percentage`, `excluded`. Any of
/// them may be missing or carry an unexpected JSON type.
pub type RawPublisherRecord = Map<String, Value>;
