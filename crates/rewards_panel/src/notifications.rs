//! Classification of raw rewards notifications into typed [`Notification`] values.
//!
//! Dispatch is on the numeric notification type; auto-contribute records dispatch again on the
//! result code in `args[1]`, general-ledger records on the string key in `args[0]`. Any
//! combination not listed here has no translation and is dropped from the panel.

use rewards_platform::RawNotification;

use crate::{
    coerce::{parse_finite_float, parse_leading_int},
    model::{
        ExternalWalletLinkingFailedReason, ExternalWalletProvider, GrantSource,
        MonthlyContributionFailedReason, Notification, NotificationKind, PendingTipFailedReason,
    },
};

const TYPE_AUTO_CONTRIBUTE: i32 = 1;
const TYPE_GRANT: i32 = 2;
const TYPE_GRANT_ADS: i32 = 3;
const TYPE_INSUFFICIENT_FUNDS: i32 = 6;
const TYPE_BACKUP_WALLET: i32 = 7;
const TYPE_TIPS_PROCESSED: i32 = 8;
const TYPE_VERIFIED_PUBLISHER: i32 = 10;
const TYPE_PENDING_NOT_ENOUGH_FUNDS: i32 = 11;
const TYPE_GENERAL_LEDGER: i32 = 12;

const CONTRIBUTION_SUCCESS: i64 = 0;
const CONTRIBUTION_GENERAL_ERROR: i64 = 1;
const CONTRIBUTION_NOT_ENOUGH_FUNDS: i64 = 15;

/// Maps one raw record to a typed notification, or `None` when it has no translation.
///
/// Total and side-effect free.
pub fn map_notification(raw: &RawNotification) -> Option<Notification> {
    let kind = classify(raw)?;
    Some(Notification {
        id: raw.id.clone(),
        time_stamp: raw.timestamp,
        kind,
    })
}

/// Maps a raw list, dropping untranslatable records and keeping order.
pub fn map_notifications(raw: &[RawNotification]) -> Vec<Notification> {
    raw.iter().filter_map(map_notification).collect()
}

fn classify(raw: &RawNotification) -> Option<NotificationKind> {
    match raw.notification_type {
        TYPE_AUTO_CONTRIBUTE => classify_auto_contribute(&raw.args),
        TYPE_GRANT => Some(NotificationKind::GrantAvailable {
            source: GrantSource::UserGrant,
            grant_id: grant_id_from_notification_id(&raw.id),
        }),
        TYPE_GRANT_ADS => Some(NotificationKind::GrantAvailable {
            source: GrantSource::Ads,
            grant_id: grant_id_from_notification_id(&raw.id),
        }),
        TYPE_INSUFFICIENT_FUNDS => Some(NotificationKind::AddFunds),
        TYPE_BACKUP_WALLET => Some(NotificationKind::BackupWallet),
        TYPE_TIPS_PROCESSED => Some(NotificationKind::MonthlyTipCompleted),
        TYPE_VERIFIED_PUBLISHER => Some(NotificationKind::PendingPublisherVerified {
            publisher_name: arg(&raw.args, 0).to_string(),
        }),
        TYPE_PENDING_NOT_ENOUGH_FUNDS => Some(NotificationKind::PendingTipFailed {
            reason: PendingTipFailedReason::InsufficientFunds,
        }),
        TYPE_GENERAL_LEDGER => classify_general_ledger(&raw.args),
        _ => None,
    }
}

fn classify_auto_contribute(args: &[String]) -> Option<NotificationKind> {
    match parse_leading_int(arg(args, 1))? {
        CONTRIBUTION_SUCCESS => Some(NotificationKind::AutoContributeCompleted {
            amount: parse_finite_float(arg(args, 3)).unwrap_or(0.0),
        }),
        CONTRIBUTION_GENERAL_ERROR => Some(NotificationKind::MonthlyContributionFailed {
            reason: MonthlyContributionFailedReason::Unknown,
        }),
        CONTRIBUTION_NOT_ENOUGH_FUNDS => Some(NotificationKind::MonthlyContributionFailed {
            reason: MonthlyContributionFailedReason::InsufficientFunds,
        }),
        _ => None,
    }
}

fn classify_general_ledger(args: &[String]) -> Option<NotificationKind> {
    use ExternalWalletLinkingFailedReason as Reason;

    let linking_failed = |provider, reason| NotificationKind::ExternalWalletLinkingFailed {
        provider,
        reason,
    };
    let named_provider =
        || provider_from_name(arg(args, 1)).unwrap_or(ExternalWalletProvider::Uphold);

    match arg(args, 0) {
        // No provider is reported for these keys; they default to uphold.
        "wallet_device_limit_reached" => Some(linking_failed(
            ExternalWalletProvider::Uphold,
            Reason::DeviceLimitReached,
        )),
        "wallet_disconnected" => Some(NotificationKind::ExternalWalletDisconnected {
            provider: ExternalWalletProvider::Uphold,
        }),
        "wallet_mismatched_provider_accounts" => Some(linking_failed(
            named_provider(),
            Reason::MismatchedProviderAccounts,
        )),
        "wallet_new_verified" => Some(NotificationKind::ExternalWalletVerified {
            provider: named_provider(),
        }),
        "uphold_bat_not_allowed_for_user" => Some(linking_failed(
            ExternalWalletProvider::Uphold,
            Reason::UpholdBatNotSupported,
        )),
        "uphold_blocked_user" => Some(linking_failed(
            ExternalWalletProvider::Uphold,
            Reason::UpholdUserBlocked,
        )),
        "uphold_pending_user" => Some(linking_failed(
            ExternalWalletProvider::Uphold,
            Reason::UpholdUserPending,
        )),
        "uphold_restricted_user" => Some(linking_failed(
            ExternalWalletProvider::Uphold,
            Reason::UpholdUserRestricted,
        )),
        _ => None,
    }
}

fn arg(args: &[String], index: usize) -> &str {
    args.get(index).map(String::as_str).unwrap_or("")
}

/// Grant ids are carried as the last `_`-separated segment of the notification id.
fn grant_id_from_notification_id(id: &str) -> String {
    match id.rsplit_once('_') {
        Some((_, grant_id)) => grant_id.to_string(),
        None => String::new(),
    }
}

fn provider_from_name(name: &str) -> Option<ExternalWalletProvider> {
    match name.to_ascii_lowercase().as_str() {
        "uphold" => Some(ExternalWalletProvider::Uphold),
        "bitflyer" => Some(ExternalWalletProvider::Bitflyer),
        "gemini" => Some(ExternalWalletProvider::Gemini),
        _ => None,
    }
}
