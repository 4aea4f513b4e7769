//! Stream resolution: the strictly sequential handshake that turns a match
//! page URL into a playable link. No step retries; every failure maps to one
//! taxonomy kind and propagates.

pub mod dwr;
pub mod playlist;

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::client::SessionClient;
use crate::error::TipsportError;
use crate::site::{QualityPreference, SiteVariant};
use dwr::MetadataStatus;

const GET_STREAM_DWR_PATH: &str = "/dwr/call/plaincall/StreamDWR.getStream.dwr";

/// Trailing numeric id of a match page URL, e.g. `/live/hokej/4321001`.
static MATCH_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)(?:[/?#][^/]*)?$").unwrap());

/// The final resolved, directly playable stream link for a match. Produced
/// fresh on every resolution call, never cached.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StreamHandle {
    pub link: String,
}

pub(crate) fn match_id_from_url(url: &str) -> Result<&str, TipsportError> {
    MATCH_ID_RE
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or(TipsportError::UnableGetStreamNumber)
}

fn absolutize(url: &str, site: SiteVariant) -> String {
    if url.starts_with("http") {
        url.to_string()
    } else {
        format!("{}{}", site.base_url(), url)
    }
}

/// Walks the full handshake for one match:
/// match page → script session id → `getStream` metadata → stream list →
/// selected link.
pub async fn resolve(
    client: &mut SessionClient,
    site: SiteVariant,
    quality: &QualityPreference,
    match_url: &str,
) -> Result<StreamHandle, TipsportError> {
    let page_url = absolutize(match_url, site);
    let match_id = match_id_from_url(&page_url)?.to_string();

    let page = client.get_text(&page_url).await?;
    let script_session_id = dwr::detect_script_session_id(&page)?;
    debug!(match_id, "detected script session id");

    let call = dwr::get_stream_call(&script_session_id, &match_id);
    let fields: Vec<(&str, &str)> = call.iter().map(|(k, v)| (*k, v.as_str())).collect();
    let body = client
        .post_form_text(&format!("{}{GET_STREAM_DWR_PATH}", site.base_url()), &fields)
        .await?;

    let metadata = dwr::parse_stream_metadata(&body)?;
    if metadata.status == MetadataStatus::NotStarted {
        return Err(TipsportError::StreamHasNotStarted);
    }
    if !metadata.format.eq_ignore_ascii_case("hls") {
        return Err(TipsportError::UnsupportedStreamFormat(metadata.format));
    }

    let playlist_url = Url::parse(site.base_url())
        .and_then(|base| base.join(&metadata.url))
        .map_err(|e| TipsportError::Other(format!("invalid stream list url: {e}")))?;
    debug!(url = %playlist_url, "fetching stream list");

    let body = client.get_bytes(playlist_url.as_str()).await?;
    let links = playlist::parse_stream_list(&playlist_url, &body)?;
    let selected = playlist::select_stream(&links, quality)?;
    debug!(quality = %selected.quality, bandwidth = selected.bandwidth, "selected stream");

    Ok(StreamHandle {
        link: selected.url.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_match_id_from_page_urls() {
        assert_eq!(
            match_id_from_url("https://www.tipsport.cz/live/hokej/4321001").unwrap(),
            "4321001"
        );
        assert_eq!(
            match_id_from_url("https://www.tipsport.cz/live/hokej/4321001?tab=stream").unwrap(),
            "4321001"
        );
    }

    #[test]
    fn url_without_match_id_is_stream_number_failure() {
        let err = match_id_from_url("https://www.tipsport.cz/live").unwrap_err();
        assert!(matches!(err, TipsportError::UnableGetStreamNumber));
    }

    #[test]
    fn relative_match_urls_are_joined_with_the_site() {
        assert_eq!(
            absolutize("/live/hokej/4321001", SiteVariant::TipsportSk),
            "https://www.tipsport.sk/live/hokej/4321001"
        );
        assert_eq!(
            absolutize("https://www.chance.cz/live/hokej/1", SiteVariant::TipsportCz),
            "https://www.chance.cz/live/hokej/1"
        );
    }
}
