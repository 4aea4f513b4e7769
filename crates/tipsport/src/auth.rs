//! Login sequence and session re-validation against the betting site.
//!
//! Nothing here retries: a stale session fails the current call and the host
//! decides whether to log in again.

use std::sync::LazyLock;

use regex::Regex;
use reqwest::StatusCode;
use tracing::debug;

use crate::client::SessionClient;
use crate::error::TipsportError;
use crate::site::{Credentials, SiteVariant};

const LOGIN_PATH: &str = "/LoginAction.do";
/// Cheap authenticated endpoint; answers 401 for anonymous sessions.
const SESSION_CHECK_PATH: &str = "/rest/ver1/client/restrictions/login/duration";

/// Post-login marker: the page header either carries the logout action or a
/// `"logged":true` flag in its embedded client config.
static LOGGED_IN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"logoutAction|"logged"\s*:\s*true"#).unwrap());

pub(crate) fn is_logged_in(page: &str) -> bool {
    LOGGED_IN_RE.is_match(page)
}

/// Performs the site's login sequence: seed cookies from the base page, POST
/// the credential form, follow the redirect bounce and verify the post-login
/// marker in the landing page.
pub async fn login(
    client: &mut SessionClient,
    credentials: &Credentials,
) -> Result<(), TipsportError> {
    let base = credentials.site.base_url();

    // A fresh login must not replay cookies from an expired session.
    client.clear_cookies();

    // First GET hands out the session cookie the login POST must present.
    let _ = client.get_text(base).await?;

    let fields = [
        ("agree", "true"),
        ("requestURI", "/"),
        ("userName", credentials.username.as_str()),
        ("password", credentials.password.as_str()),
    ];
    let page = client
        .post_form_text(&format!("{base}{LOGIN_PATH}"), &fields)
        .await?;

    if !is_logged_in(&page) {
        debug!(site = %credentials.site, "post-login marker missing");
        return Err(TipsportError::LoginFailed);
    }
    debug!(site = %credentials.site, user = %credentials.username, "login succeeded");
    Ok(())
}

/// Re-validates an existing session with one lightweight authenticated
/// request. Surfaced to the host as the "connection test".
pub async fn check_login(
    client: &mut SessionClient,
    site: SiteVariant,
) -> Result<(), TipsportError> {
    let url = format!("{}{SESSION_CHECK_PATH}", site.base_url());
    let response = client.get(&url).await?;
    let status = response.status();

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(TipsportError::LoginFailed);
    }
    if !status.is_success() {
        return Err(TipsportError::Other(format!(
            "session check answered {status}"
        )));
    }
    Ok(())
}
