use std::rc::Rc;

use super::HostInner;
use crate::{
    api_adapter::LoginUrlCache,
    config::PanelConfig,
    model::{ExternalWallet, ExternalWalletAction, PanelStatePatch},
};

/// Opens `url` in a new tab, then closes the panel. Empty URLs are refused.
pub(super) fn open_tab(inner: &Rc<HostInner>, url: String) {
    if url.is_empty() {
        tracing::error!("cannot open a tab with an empty URL");
        return;
    }
    let task_inner = inner.clone();
    inner.spawn(async move {
        match task_inner.services.tabs.create_tab(&url).await {
            Ok(()) => task_inner.services.tabs.close_panel(),
            Err(err) => tracing::warn!(%url, "open tab failed: {err}"),
        }
    });
}

/// URL a navigating wallet action opens; `None` for [`ExternalWalletAction::Disconnect`].
pub(super) fn wallet_action_url(
    action: ExternalWalletAction,
    wallet: Option<&ExternalWallet>,
    config: &PanelConfig,
    login_urls: &LoginUrlCache,
) -> Option<String> {
    let Some(wallet) = wallet else {
        return (action != ExternalWalletAction::Disconnect)
            .then(|| config.verify_wallet_url.clone());
    };

    let links = &wallet.links;
    let account = || links.account.clone().unwrap_or_default();
    let url = match action {
        ExternalWalletAction::AddFunds => links.add_funds.clone().unwrap_or_else(account),
        ExternalWalletAction::CompleteVerification => links
            .complete_verification
            .clone()
            .unwrap_or_else(account),
        ExternalWalletAction::Reconnect => login_urls.login_url(wallet.provider),
        ExternalWalletAction::Verify => config.verify_wallet_url.clone(),
        ExternalWalletAction::ViewAccount => account(),
        ExternalWalletAction::Disconnect => return None,
    };
    Some(url)
}

pub(super) fn handle_external_wallet_action(inner: &Rc<HostInner>, action: ExternalWalletAction) {
    let state = inner.state.get_state();
    let wallet = state.external_wallet.as_ref();

    if action == ExternalWalletAction::Disconnect {
        if wallet.is_none() {
            return;
        }
        inner.update(PanelStatePatch {
            external_wallet: Some(None),
            ..PanelStatePatch::default()
        });
        let task_inner = inner.clone();
        inner.spawn(async move {
            if let Err(err) = task_inner.api().disconnect_wallet().await {
                tracing::warn!("wallet disconnect failed: {err}");
            }
        });
        return;
    }

    if let Some(url) = wallet_action_url(action, wallet, &inner.config, &inner.login_urls) {
        open_tab(inner, url);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{ExternalWalletLinks, ExternalWalletProvider, ExternalWalletStatus};

    fn wallet(links: ExternalWalletLinks) -> ExternalWallet {
        ExternalWallet {
            provider: ExternalWalletProvider::Gemini,
            status: ExternalWalletStatus::Verified,
            username: "sam".to_string(),
            links,
        }
    }

    fn url_for(action: ExternalWalletAction, wallet: Option<&ExternalWallet>) -> Option<String> {
        wallet_action_url(
            action,
            wallet,
            &PanelConfig::default(),
            &LoginUrlCache::default(),
        )
    }

    #[test]
    fn no_wallet_routes_every_navigation_to_verify() {
        for action in [
            ExternalWalletAction::AddFunds,
            ExternalWalletAction::Reconnect,
            ExternalWalletAction::ViewAccount,
        ] {
            assert_eq!(
                url_for(action, None).as_deref(),
                Some("chrome://rewards#verify")
            );
        }
        assert_eq!(url_for(ExternalWalletAction::Disconnect, None), None);
    }

    #[test]
    fn specific_links_fall_back_to_account() {
        let with_links = wallet(ExternalWalletLinks {
            account: Some("https://gemini.example/account".to_string()),
            add_funds: Some("https://gemini.example/deposit".to_string()),
            complete_verification: None,
        });

        assert_eq!(
            url_for(ExternalWalletAction::AddFunds, Some(&with_links)).as_deref(),
            Some("https://gemini.example/deposit")
        );
        assert_eq!(
            url_for(ExternalWalletAction::CompleteVerification, Some(&with_links)).as_deref(),
            Some("https://gemini.example/account")
        );
    }

    #[test]
    fn missing_links_and_login_url_resolve_to_empty() {
        let bare = wallet(ExternalWalletLinks::default());
        assert_eq!(
            url_for(ExternalWalletAction::ViewAccount, Some(&bare)).as_deref(),
            Some("")
        );
        assert_eq!(
            url_for(ExternalWalletAction::Reconnect, Some(&bare)).as_deref(),
            Some("")
        );
    }
}
