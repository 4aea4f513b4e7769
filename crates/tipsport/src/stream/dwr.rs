//! The DWR (Direct Web Remoting) leg of the handshake: the match page embeds
//! a script session id, which authorizes one `StreamDWR.getStream` call, whose
//! reply names the stream list. DWR replies are JS, not JSON, so the fields
//! are picked out with regexes instead of serde.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::TipsportError;

/// Both spellings occur in the wild: the embedded player config carries a
/// JSON-style key, older pages assign the DWR engine variable directly.
static SCRIPT_SESSION_ID_JSON_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""scriptSessionId"\s*:\s*"([0-9A-Za-z$/+_-]+)""#).unwrap());
static SCRIPT_SESSION_ID_VAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"_origScriptSessionId\s*=\s*['"]([0-9A-Za-z$/+_-]+)['"]"#).unwrap()
});

static DWR_CALLBACK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)_remoteHandleCallback\('\d+',\s*'\d+',\s*\{(.*?)\}\s*\)").unwrap()
});
static STATUS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"status\s*:\s*"([A-Z_]+)""#).unwrap());
static TYPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"type\s*:\s*"([A-Za-z0-9]+)""#).unwrap());
static DATA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"data\s*:\s*"((?:[^"\\]|\\.)*)""#).unwrap());
static MESSAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"messages\s*:\s*\[\s*"((?:[^"\\]|\\.)*)""#).unwrap());

const DWR_REPLY_MARKER: &str = "//#DWR-REPLY";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataStatus {
    Ok,
    NotStarted,
}

/// What the `getStream` reply said about the match's stream.
#[derive(Debug, Clone)]
pub struct StreamMetadata {
    pub status: MetadataStatus,
    /// Delivery format the backend offers, e.g. "HLS" or "RTMP".
    pub format: String,
    /// Location of the stream list; empty for a not-yet-started match.
    pub url: String,
}

pub fn detect_script_session_id(page: &str) -> Result<String, TipsportError> {
    SCRIPT_SESSION_ID_JSON_RE
        .captures(page)
        .or_else(|| SCRIPT_SESSION_ID_VAR_RE.captures(page))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or(TipsportError::UnableDetectScriptSessionId)
}

/// Form fields of the `StreamDWR.getStream` call for one match.
pub fn get_stream_call(script_session_id: &str, match_id: &str) -> Vec<(&'static str, String)> {
    vec![
        ("callCount", "1".to_string()),
        ("page", "/live".to_string()),
        ("httpSessionId", String::new()),
        ("scriptSessionId", script_session_id.to_string()),
        ("c0-scriptName", "StreamDWR".to_string()),
        ("c0-methodName", "getStream".to_string()),
        ("c0-id", "0".to_string()),
        (
            "c0-param0",
            format!("string:{}", urlencoding::encode(match_id)),
        ),
        ("c0-param1", "string:HLS".to_string()),
        ("batchId", "2".to_string()),
    ]
}

/// Decodes a `getStream` DWR reply.
///
/// Failure mapping, in order: an empty body or one without the DWR reply
/// marker could not deliver metadata at all; a marked body whose callback
/// cannot be decoded is a parse failure; an ERROR status carrying a message
/// from the site is passed through verbatim.
pub fn parse_stream_metadata(body: &str) -> Result<StreamMetadata, TipsportError> {
    let body = body.trim();
    if body.is_empty() || !body.contains(DWR_REPLY_MARKER) {
        return Err(TipsportError::UnableGetStreamMetadata);
    }

    let payload = DWR_CALLBACK_RE
        .captures(body)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or(TipsportError::UnableParseStreamMetadata)?;

    let status = STATUS_RE
        .captures(payload)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or(TipsportError::UnableParseStreamMetadata)?;

    match status {
        "OK" => {}
        "NOT_STARTED" => {
            return Ok(StreamMetadata {
                status: MetadataStatus::NotStarted,
                format: capture_unescaped(&TYPE_RE, payload).unwrap_or_default(),
                url: String::new(),
            });
        }
        "ERROR" => {
            return match capture_unescaped(&MESSAGE_RE, payload) {
                Some(message) if !message.is_empty() => Err(TipsportError::SiteMessage(message)),
                _ => Err(TipsportError::UnableGetStreamMetadata),
            };
        }
        _ => return Err(TipsportError::UnableParseStreamMetadata),
    }

    let format =
        capture_unescaped(&TYPE_RE, payload).ok_or(TipsportError::UnableParseStreamMetadata)?;
    let url = capture_unescaped(&DATA_RE, payload)
        .filter(|url| !url.is_empty())
        .ok_or(TipsportError::UnableParseStreamMetadata)?;

    Ok(StreamMetadata {
        status: MetadataStatus::Ok,
        format,
        url,
    })
}

fn capture_unescaped(re: &Regex, payload: &str) -> Option<String> {
    re.captures(payload)
        .and_then(|caps| caps.get(1))
        .map(|m| unescape_js(m.as_str()))
}

/// Undoes the escaping DWR applies to string values (`\/`, `\"`, `\\`).
fn unescape_js(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some(escaped) => out.push(escaped),
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}
