//! Best-effort crash reporting. The upload must never raise or block the
//! user-visible failure path: every failure here is swallowed and logged.

use std::sync::LazyLock;

use regex::Regex;
use reqwest::Client;
use tracing::debug;

const REPORT_URL: &str =
    "https://script.google.com/macros/s/AKfycbyEXPShEN6O7Eounxf932MyzOHrsaRAcksU0LvEMcYRgXDRhqu-/exec";

/// The endpoint answers with an HTML-escaped JS blob; success is signalled
/// by `userHtml\x22:\x22OK\x22` in the body.
static RESPONSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"userHtml\\x22:\\x22(.*?)\\x22").unwrap());

/// Uploads an error description to the diagnostics endpoint. Returns whether
/// the endpoint acknowledged it; never fails.
pub async fn send_crash_report(client: &Client, addon: &str, version: &str, data: &str) -> bool {
    let params = [("addon", addon), ("version", version), ("data", data)];
    let result = client
        .get(REPORT_URL)
        .query(&params)
        .header(
            reqwest::header::CONTENT_TYPE,
            "application/x-www-form-urlencoded",
        )
        .send()
        .await;

    let response = match result {
        Ok(response) => response,
        Err(e) => {
            debug!(error = %e, "crash report upload failed");
            return false;
        }
    };
    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => {
            debug!(error = %e, "crash report response unreadable");
            return false;
        }
    };

    let acknowledged = RESPONSE_RE
        .captures(&body)
        .and_then(|caps| caps.get(1))
        .is_some_and(|m| m.as_str() == "OK");
    if !acknowledged {
        debug!("crash report not acknowledged");
    }
    acknowledged
}
