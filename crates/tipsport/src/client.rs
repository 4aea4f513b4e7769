use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, LOCATION};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use rustc_hash::FxHashMap;
use rustls::{ClientConfig, crypto::ring};
use rustls_platform_verifier::BuilderVerifierExt;
use tracing::debug;
use url::Url;

use crate::error::TipsportError;

pub(crate) const DEFAULT_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";

/// Redirect chains on the site are short (login bounces through two hops);
/// anything longer is a loop.
const MAX_REDIRECTS: usize = 10;

/// Builds the shared HTTP client. Redirects are disabled on purpose:
/// [`SessionClient`] follows them itself so cookies set on intermediate hops
/// are not lost.
pub fn default_client() -> Client {
    let provider = Arc::new(ring::default_provider());
    let tls_config = ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .expect("Failed to configure default TLS protocol versions")
        .with_platform_verifier()
        .unwrap()
        .with_no_client_auth();

    Client::builder()
        .use_preconfigured_tls(tls_config)
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(30))
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

/// Cookie-carrying HTTP transport for one authenticated site session.
///
/// The cookie store is a plain map so it can be snapshotted into
/// [`crate::resolver::ResolverState`] and replayed by a later invocation.
#[derive(Debug, Clone)]
pub struct SessionClient {
    client: Client,
    headers: HeaderMap,
    cookies: FxHashMap<String, String>,
}

impl SessionClient {
    pub fn new(client: Client) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            HeaderValue::from_static(DEFAULT_UA),
        );
        headers.insert(
            reqwest::header::ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(
            reqwest::header::ACCEPT_LANGUAGE,
            HeaderValue::from_static("cs-CZ,cs;q=0.8,sk;q=0.6,en-US;q=0.4,en;q=0.2"),
        );
        // No `Accept-Encoding` here; reqwest adds it and transparently
        // decompresses when the gzip/deflate features are on.

        Self {
            client,
            headers,
            cookies: FxHashMap::default(),
        }
    }

    pub fn with_cookies(client: Client, cookies: FxHashMap<String, String>) -> Self {
        let mut session = Self::new(client);
        session.cookies = cookies;
        session
    }

    pub fn cookies(&self) -> &FxHashMap<String, String> {
        &self.cookies
    }

    pub fn clear_cookies(&mut self) {
        self.cookies.clear();
    }

    fn cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }

        let mut header = String::with_capacity(
            self.cookies
                .iter()
                .map(|(k, v)| k.len() + 1 + v.len() + 2)
                .sum(),
        );
        for (name, value) in &self.cookies {
            if !header.is_empty() {
                header.push_str("; ");
            }
            header.push_str(name);
            header.push('=');
            header.push_str(value);
        }
        Some(header)
    }

    /// Captures `Set-Cookie` values from a response so the session survives
    /// into the next request (and, via the state snapshot, the next
    /// invocation).
    pub fn store_cookies_from(&mut self, headers: &HeaderMap) {
        for value in headers.get_all(reqwest::header::SET_COOKIE).iter() {
            if let Ok(cookie_str) = value.to_str()
                && let Some(cookie_part) = cookie_str.split(';').next()
                && let Some((name, value)) = cookie_part.split_once('=')
            {
                let name = name.trim();
                let value = value.trim();
                if name.is_empty() || value.is_empty() {
                    continue;
                }
                debug!(name, "storing session cookie");
                self.cookies.insert(name.to_owned(), value.to_owned());
            }
        }
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let mut headers = self.headers.clone();
        if let Some(cookie_header) = self.cookie_header() {
            match HeaderValue::from_str(&cookie_header) {
                Ok(value) => {
                    headers.insert(reqwest::header::COOKIE, value);
                }
                Err(e) => {
                    // Skip the Cookie header rather than send an invalid one.
                    debug!(error = %e, "failed to build Cookie header");
                }
            }
        }
        self.client.request(method, url).headers(headers)
    }

    /// Sends a request, storing cookies and following redirects manually.
    /// A POST answered with a redirect is re-issued as GET, matching what a
    /// browser does with the site's 302/303 login bounces.
    async fn send(
        &mut self,
        method: Method,
        url: &str,
        form: Option<&[(&str, &str)]>,
    ) -> Result<Response, TipsportError> {
        let mut url = Url::parse(url)
            .map_err(|e| TipsportError::Other(format!("invalid request url {url}: {e}")))?;
        let mut method = method;
        let mut form = form;

        for _ in 0..MAX_REDIRECTS {
            let mut builder = self.request(method.clone(), url.as_str());
            if let Some(fields) = form {
                builder = builder.form(fields);
            }
            let response = builder.send().await?;
            self.store_cookies_from(response.headers());

            if !response.status().is_redirection() {
                return Ok(response);
            }
            let Some(location) = response
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
            else {
                return Ok(response);
            };
            let next = url.join(location).map_err(|e| {
                TipsportError::Other(format!("invalid redirect location {location}: {e}"))
            })?;
            debug!(from = %url, to = %next, "following redirect");
            if response.status() == StatusCode::SEE_OTHER || method == Method::POST {
                method = Method::GET;
                form = None;
            }
            url = next;
        }

        Err(TipsportError::Other(format!(
            "too many redirects fetching {url}"
        )))
    }

    pub async fn get(&mut self, url: &str) -> Result<Response, TipsportError> {
        self.send(Method::GET, url, None).await
    }

    pub async fn get_text(&mut self, url: &str) -> Result<String, TipsportError> {
        let response = self.get(url).await?;
        Ok(response.text().await?)
    }

    pub async fn get_bytes(&mut self, url: &str) -> Result<Vec<u8>, TipsportError> {
        let response = self.get(url).await?;
        Ok(response.bytes().await?.to_vec())
    }

    pub async fn post_form(
        &mut self,
        url: &str,
        fields: &[(&str, &str)],
    ) -> Result<Response, TipsportError> {
        self.send(Method::POST, url, Some(fields)).await
    }

    pub async fn post_form_text(
        &mut self,
        url: &str,
        fields: &[(&str, &str)],
    ) -> Result<String, TipsportError> {
        let response = self.post_form(url, fields).await?;
        Ok(response.text().await?)
    }
}
