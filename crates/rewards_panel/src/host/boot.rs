use std::rc::{Rc, Weak};

use rewards_platform::PlatformError;

use super::{captcha, HostInner};
use crate::{
    api_adapter,
    model::{GrantCaptchaStatus, PanelStatePatch},
    persistence,
};

pub(super) fn install_listeners(inner: &Rc<HostInner>) {
    let api = &inner.services.api;
    let mut subscriptions = Vec::new();

    let weak = Rc::downgrade(inner);
    subscriptions.push(api_adapter::on_grants_updated(api, move |grants| {
        if let Some(inner) = weak.upgrade() {
            captcha::replace_grants(&inner, grants);
        }
    }));

    let weak = Rc::downgrade(inner);
    subscriptions.push(api_adapter::on_unblinded_tokens_ready(api, move || {
        with_host(&weak, refresh_balance);
    }));

    let weak = Rc::downgrade(inner);
    subscriptions.extend(api_adapter::on_notifications_changed(api, move || {
        with_host(&weak, refresh_notifications);
    }));

    inner.subscriptions.borrow_mut().extend(subscriptions);
}

fn with_host(weak: &Weak<HostInner>, action: fn(&Rc<HostInner>)) {
    if let Some(inner) = weak.upgrade() {
        action(&inner);
    }
}

fn refresh_balance(inner: &Rc<HostInner>) {
    let task_inner = inner.clone();
    inner.spawn(async move {
        match api_adapter::get_rewards_balance(task_inner.api()).await {
            Ok(balance) => task_inner.update(PanelStatePatch {
                balance: Some(balance),
                ..PanelStatePatch::default()
            }),
            Err(err) => tracing::warn!("balance refresh failed: {err}"),
        }
    });
}

fn refresh_notifications(inner: &Rc<HostInner>) {
    let task_inner = inner.clone();
    inner.spawn(async move {
        match api_adapter::get_notifications(task_inner.api()).await {
            Ok(notifications) => task_inner.update(PanelStatePatch {
                notifications: Some(notifications),
                ..PanelStatePatch::default()
            }),
            Err(err) => tracing::warn!("notification refresh failed: {err}"),
        }
    });
}

fn settled<T>(what: &'static str, result: Result<T, PlatformError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(fetch = what, "startup fetch failed: {err}");
            None
        }
    }
}

/// Startup sequence: local flags, a detached grant list request, the concurrent fetch batch,
/// `loading` cleared, then the `#grant_<id>` deep link.
pub(super) async fn initialize(inner: Rc<HostInner>) {
    let flags = persistence::load_local_flags(inner.services.prefs.as_ref(), &inner.config).await;
    inner.update(PanelStatePatch {
        hide_publisher_unverified_note: Some(flags.hide_publisher_unverified_note),
        notifications_last_viewed: Some(flags.notifications_last_viewed),
        ..PanelStatePatch::default()
    });

    // Grants arrive through the promotions listener, so the request never gates startup.
    let task_inner = inner.clone();
    inner.spawn(async move {
        if let Err(err) = api_adapter::request_grants(task_inner.api()).await {
            tracing::warn!("grant list request failed: {err}");
        }
    });

    let api = inner.api();
    let host = inner.as_ref();
    let (month, year) = api_adapter::report_period(&chrono::Local::now());

    let rewards_enabled = async {
        if let Some(rewards_enabled) =
            settled("rewardsEnabled", api_adapter::get_rewards_enabled(api).await)
        {
            host.update(PanelStatePatch {
                rewards_enabled: Some(rewards_enabled),
                ..PanelStatePatch::default()
            });
        }
    };
    let balance = async {
        if let Some(balance) = settled("balance", api_adapter::get_rewards_balance(api).await) {
            host.update(PanelStatePatch {
                balance: Some(balance),
                ..PanelStatePatch::default()
            });
        }
    };
    let parameters = async {
        let currency = host.config.currency.as_str();
        if let Some(parameters) = settled(
            "rewardsParameters",
            api_adapter::get_rewards_parameters(api, currency).await,
        ) {
            host.update(PanelStatePatch {
                options: Some(parameters.options),
                exchange_info: Some(parameters.exchange_info),
                ..PanelStatePatch::default()
            });
        }
    };
    let settings = async {
        if let Some(settings) = settled("settings", api_adapter::get_settings(api).await) {
            host.update(PanelStatePatch {
                settings: Some(settings),
                ..PanelStatePatch::default()
            });
        }
    };
    let providers = async {
        if let Some(providers) = settled(
            "externalWalletProviders",
            api_adapter::get_external_wallet_providers(api).await,
        ) {
            host.update(PanelStatePatch {
                external_wallet_providers: Some(providers),
                ..PanelStatePatch::default()
            });
        }
    };
    let external_wallet = async {
        if let Some(external_wallet) = settled(
            "externalWallet",
            api_adapter::get_external_wallet(api, &host.login_urls).await,
        ) {
            host.update(PanelStatePatch {
                external_wallet: Some(external_wallet),
                ..PanelStatePatch::default()
            });
        }
    };
    let earnings = async {
        if let Some(Some(earnings_info)) =
            settled("earningsInfo", api_adapter::get_earnings_info(api).await)
        {
            host.update(PanelStatePatch {
                earnings_info: Some(earnings_info),
                ..PanelStatePatch::default()
            });
        }
    };
    let summary = async {
        if let Some(summary_data) = settled(
            "summaryData",
            api_adapter::get_rewards_summary_data(api, month, year).await,
        ) {
            host.update(PanelStatePatch {
                summary_data: Some(summary_data),
                ..PanelStatePatch::default()
            });
        }
    };
    let notifications = async {
        if let Some(notifications) =
            settled("notifications", api_adapter::get_notifications(api).await)
        {
            host.update(PanelStatePatch {
                notifications: Some(notifications),
                ..PanelStatePatch::default()
            });
        }
    };
    let publisher = async {
        if let Err(err) = host.update_publisher_info().await {
            tracing::warn!(fetch = "publisherInfo", "startup fetch failed: {err}");
        }
    };

    futures::join!(
        rewards_enabled,
        balance,
        parameters,
        settings,
        providers,
        external_wallet,
        earnings,
        summary,
        notifications,
        publisher,
    );

    inner.update(PanelStatePatch {
        loading: Some(false),
        ..PanelStatePatch::default()
    });

    if let Some(grant_id) = parse_grant_deep_link(&inner.services.tabs.location_hash()) {
        captcha::load_captcha(&inner, grant_id, GrantCaptchaStatus::Pending);
    }
}

/// Grant id from a `#grant_<id>` panel URL hash.
pub(super) fn parse_grant_deep_link(hash: &str) -> Option<&str> {
    let hash = hash.strip_prefix('#').unwrap_or(hash);
    hash.strip_prefix("grant_").filter(|grant_id| !grant_id.is_empty())
}

#[cfg(test)]
mod tests {
    use super::parse_grant_deep_link;

    #[test]
    fn grant_deep_link_accepts_optional_hash_prefix() {
        assert_eq!(parse_grant_deep_link("#grant_abc"), Some("abc"));
        assert_eq!(parse_grant_deep_link("grant_a_b"), Some("a_b"));
        assert_eq!(parse_grant_deep_link("#grant_"), None);
        assert_eq!(parse_grant_deep_link("#verify"), None);
        assert_eq!(parse_grant_deep_link(""), None);
    }
}
