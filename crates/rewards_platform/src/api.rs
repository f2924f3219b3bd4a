//! Rewards extension capability contract.

use std::{future::Future, pin::Pin};

use crate::{
    EventListener, ListenerId, PlatformError, PlatformEventKind, RawAdsAccountStatement,
    RawBalance, RawBalanceReport, RawCaptcha, RawExternalWallet, RawNotification, RawPrefs,
    RawPrefsUpdate, RawPublisherRecord, RawRecurringTip, RawRewardsParameters,
};

/// Object-safe boxed future used by [`RewardsApi`] and the other platform services.
pub type PlatformFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, PlatformError>> + 'a>>;

/// Tip command flavour accepted by [`RewardsApi::tip_site`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TipKind {
    /// Single tip.
    OneTime,
    /// Create or change the monthly tip.
    SetMonthly,
    /// Cancel the monthly tip.
    ClearMonthly,
}

impl TipKind {
    /// Returns the token the extension API expects.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OneTime => "one-time",
            Self::SetMonthly => "set-monthly",
            Self::ClearMonthly => "clear-monthly",
        }
    }
}

/// Host capability surface of the rewards extension API.
///
/// Every one-shot callback of the extension API is exposed as a single-resolution future;
/// recurring events are exposed through [`RewardsApi::add_listener`] and
/// [`RewardsApi::remove_listener`]. Implementations resolve "not found" answers with ordinary
/// records and reserve `Err` for requests that failed outright.
pub trait RewardsApi {
    /// Fetches the wallet balance.
    fn fetch_balance(&self) -> PlatformFuture<'_, RawBalance>;

    /// Reads rewards preferences.
    fn get_prefs(&self) -> PlatformFuture<'_, RawPrefs>;

    /// Persists a partial preference update.
    fn update_prefs<'a>(&'a self, update: &'a RawPrefsUpdate) -> PlatformFuture<'a, ()>;

    /// Fetches wallet parameters.
    fn get_rewards_parameters(&self) -> PlatformFuture<'_, RawRewardsParameters>;

    /// Fetches external wallet status.
    fn get_external_wallet(&self) -> PlatformFuture<'_, RawExternalWallet>;

    /// Unlinks the external wallet.
    fn disconnect_wallet(&self) -> PlatformFuture<'_, ()>;

    /// Fetches the ads earnings statement.
    fn get_ads_account_statement(&self) -> PlatformFuture<'_, RawAdsAccountStatement>;

    /// Fetches the balance report for a calendar month (`month` is 1-based).
    fn get_balance_report(&self, month: u32, year: i32) -> PlatformFuture<'_, RawBalanceReport>;

    /// Lists current rewards notifications.
    fn get_all_notifications(&self) -> PlatformFuture<'_, Vec<RawNotification>>;

    /// Deletes one notification.
    fn delete_notification<'a>(&'a self, id: &'a str) -> PlatformFuture<'a, ()>;

    /// Asks the platform to publish the promotion list through the promotions event.
    fn fetch_promotions(&self) -> PlatformFuture<'_, ()>;

    /// Starts claiming a promotion and returns captcha challenge material.
    fn claim_promotion<'a>(&'a self, promotion_id: &'a str) -> PlatformFuture<'a, RawCaptcha>;

    /// Submits a captcha solution (JSON payload) and returns the numeric result code.
    fn attest_promotion<'a>(
        &'a self,
        promotion_id: &'a str,
        solution: &'a str,
    ) -> PlatformFuture<'a, i32>;

    /// Lists recurring tips.
    fn get_recurring_tips(&self) -> PlatformFuture<'_, Vec<RawRecurringTip>>;

    /// Opens the tip flow for a publisher on a tab.
    fn tip_site<'a>(
        &'a self,
        tab_id: i64,
        publisher_key: &'a str,
        kind: TipKind,
    ) -> PlatformFuture<'a, ()>;

    /// Re-checks a publisher's verification status.
    fn refresh_publisher<'a>(&'a self, publisher_key: &'a str) -> PlatformFuture<'a, ()>;

    /// Includes or excludes a publisher from auto-contribute.
    ///
    /// The boolean is an *exclude* flag.
    fn include_in_auto_contribution<'a>(
        &'a self,
        publisher_key: &'a str,
        exclude: bool,
    ) -> PlatformFuture<'a, ()>;

    /// Turns rewards on.
    fn enable_rewards(&self) -> PlatformFuture<'_, ()>;

    /// Returns whether onboarding should be shown (true while rewards are off).
    fn should_show_onboarding(&self) -> PlatformFuture<'_, bool>;

    /// Looks up the background publisher record for a tab.
    fn get_publisher_record(&self, tab_id: i64) -> PlatformFuture<'_, Option<RawPublisherRecord>>;

    /// Registers a listener for one recurring event kind.
    fn add_listener(&self, kind: PlatformEventKind, listener: EventListener) -> ListenerId;

    /// Removes a listener; unknown ids are ignored.
    fn remove_listener(&self, id: ListenerId);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tip_kind_tokens_match_extension_api() {
        assert_eq!(TipKind::OneTime.as_str(), "one-time");
        assert_eq!(TipKind::SetMonthly.as_str(), "set-monthly");
        assert_eq!(TipKind::ClearMonthly.as_str(), "clear-monthly");
    }
}
