use thiserror::Error;

/// Everything the resolver can fail with. Each variant maps 1:1 to a
/// user-facing notice in the host, so nothing here is recovered internally;
/// every failure propagates to the caller.
#[derive(Debug, Error)]
pub enum TipsportError {
    /// DNS/connect failure, request timeout or a truncated transfer. The
    /// three transport sub-cases are deliberately collapsed into one kind so
    /// the host can show a single "no connection" notice.
    #[error("no internet connection: {0}")]
    NoInternetConnection(String),
    #[error("login failed")]
    LoginFailed,
    #[error("unable to get stream metadata")]
    UnableGetStreamMetadata,
    #[error("unable to parse stream metadata")]
    UnableParseStreamMetadata,
    #[error("unsupported stream format: {0}")]
    UnsupportedStreamFormat(String),
    #[error("script session id not found in match page")]
    UnableDetectScriptSessionId,
    #[error("unable to determine stream number")]
    UnableGetStreamNumber,
    #[error("stream list is empty")]
    UnableGetStreamList,
    /// The match exists but streaming has not begun. Informational, not a
    /// hard failure.
    #[error("stream has not started yet")]
    StreamHasNotStarted,
    /// A message the site itself addressed to the user; shown verbatim
    /// instead of being mapped to a generic notice.
    #[error("{0}")]
    SiteMessage(String),
    #[error("{0}")]
    Other(String),
}

impl TipsportError {
    /// Whether the host should render this as an informational notice
    /// rather than an error.
    pub fn is_informational(&self) -> bool {
        matches!(self, TipsportError::StreamHasNotStarted)
    }
}

impl From<reqwest::Error> for TipsportError {
    fn from(err: reqwest::Error) -> Self {
        // `is_connect` covers DNS and TCP/TLS connect failures, `is_body`
        // covers transfers interrupted mid-flight (chunked truncation).
        if err.is_connect() || err.is_timeout() || err.is_body() {
            TipsportError::NoInternetConnection(err.to_string())
        } else {
            TipsportError::Other(err.to_string())
        }
    }
}
