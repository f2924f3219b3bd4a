//! Grant captcha flow. Each platform response re-checks that the current session still refers to
//! the grant it was issued for; responses for abandoned sessions are dropped.

use std::rc::Rc;

use serde_json::json;

use super::HostInner;
use crate::{
    api_adapter::map_attest_result,
    model::{CaptchaSolution, GrantCaptchaInfo, GrantCaptchaStatus, GrantInfo, PanelStatePatch},
};

fn set_session(inner: &HostInner, session: Option<GrantCaptchaInfo>) {
    inner.update(PanelStatePatch {
        grant_captcha_info: Some(session),
        ..PanelStatePatch::default()
    });
}

fn current_session_is_for(inner: &HostInner, grant_id: &str) -> Option<GrantCaptchaInfo> {
    inner
        .state
        .get_state()
        .grant_captcha_info
        .as_ref()
        .filter(|session| session.grant_id() == grant_id)
        .cloned()
}

pub(super) fn clear(inner: &HostInner) {
    set_session(inner, None);
}

/// Replaces the known grant table and drops a session whose grant disappeared.
pub(super) fn replace_grants(inner: &HostInner, grants: Vec<GrantInfo>) {
    {
        let mut table = inner.grants.borrow_mut();
        table.clear();
        table.extend(grants.into_iter().map(|grant| (grant.id.clone(), grant)));
    }

    let orphaned = inner
        .state
        .get_state()
        .grant_captcha_info
        .as_ref()
        .is_some_and(|session| !inner.grants.borrow().contains_key(session.grant_id()));
    if orphaned {
        tracing::debug!("grant list no longer holds the captcha grant; clearing session");
        clear(inner);
    }
}

/// Opens a session for `grant_id` and requests challenge material. Unknown grants clear any
/// session instead.
pub(super) fn load_captcha(inner: &Rc<HostInner>, grant_id: &str, status: GrantCaptchaStatus) {
    let grant = inner.grants.borrow().get(grant_id).cloned();
    let Some(grant) = grant else {
        tracing::debug!(grant = grant_id, "captcha requested for unknown grant");
        clear(inner);
        return;
    };

    set_session(
        inner,
        Some(GrantCaptchaInfo::awaiting_challenge(grant.clone(), status)),
    );

    let task_inner = inner.clone();
    inner.spawn(async move {
        let captcha = match task_inner.api().claim_promotion(&grant.id).await {
            Ok(captcha) => captcha,
            Err(err) => {
                tracing::warn!(grant = %grant.id, "captcha claim failed: {err}");
                return;
            }
        };
        if current_session_is_for(&task_inner, &grant.id).is_none() {
            tracing::debug!(grant = %grant.id, "discarding stale captcha challenge");
            return;
        }
        set_session(
            &task_inner,
            Some(GrantCaptchaInfo {
                id: captcha.captcha_id,
                hint: captcha.hint,
                image_url: captcha.captcha_image,
                status,
                grant_info: grant,
            }),
        );
    });
}

/// Submits a solution for the current session. A failed attempt requests a fresh challenge for
/// the same grant, keeping the `failed` status while it loads.
pub(super) fn solve(inner: &Rc<HostInner>, solution: CaptchaSolution) {
    let Some(session) = inner.state.get_state().grant_captcha_info.clone() else {
        return;
    };
    let grant_id = session.grant_id().to_string();
    let payload = json!({
        "captchaId": session.id,
        "x": solution.x.round() as i64,
        "y": solution.y.round() as i64,
    })
    .to_string();

    let task_inner = inner.clone();
    inner.spawn(async move {
        let code = match task_inner.api().attest_promotion(&grant_id, &payload).await {
            Ok(code) => code,
            Err(err) => {
                tracing::warn!(grant = %grant_id, "captcha attestation failed: {err}");
                return;
            }
        };
        let Some(current) = current_session_is_for(&task_inner, &grant_id) else {
            tracing::debug!(grant = %grant_id, "discarding stale attestation result");
            return;
        };

        let status = map_attest_result(code);
        set_session(&task_inner, Some(GrantCaptchaInfo { status, ..current }));
        if status == GrantCaptchaStatus::Failed {
            load_captcha(&task_inner, &grant_id, GrantCaptchaStatus::Failed);
        }
    });
}
