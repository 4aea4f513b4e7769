//! The resolver aggregate: credentials plus the authenticated session,
//! persisted whole between invocations.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::auth;
use crate::client::{SessionClient, default_client};
use crate::error::TipsportError;
use crate::listing::{self, models::Match};
use crate::site::{CompetitionGroup, Credentials};
use crate::stream::{self, StreamHandle};

/// Serializable snapshot of a [`StreamResolver`]: everything needed to
/// resume the session in a later process without logging in again.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ResolverState {
    pub credentials: Credentials,
    pub cookies: FxHashMap<String, String>,
}

/// Owns the credentials and the live session; one instance per host session,
/// re-saved to the [`crate::SessionStore`] after every use.
#[derive(Debug)]
pub struct StreamResolver {
    credentials: Credentials,
    client: SessionClient,
}

impl StreamResolver {
    /// Logs in against the site and returns the authenticated aggregate.
    pub async fn login(credentials: Credentials) -> Result<Self, TipsportError> {
        let mut client = SessionClient::new(default_client());
        auth::login(&mut client, &credentials).await?;
        Ok(Self {
            credentials,
            client,
        })
    }

    /// Rebuilds a resolver from a persisted snapshot. The session is assumed
    /// valid until a call proves otherwise; no login is performed here.
    pub fn from_state(state: ResolverState) -> Self {
        Self {
            client: SessionClient::with_cookies(default_client(), state.cookies),
            credentials: state.credentials,
        }
    }

    pub fn state(&self) -> ResolverState {
        ResolverState {
            credentials: self.credentials.clone(),
            cookies: self.client.cookies().clone(),
        }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Lightweight session health check; `LoginFailed` when expired.
    pub async fn check_login(&mut self) -> Result<(), TipsportError> {
        auth::check_login(&mut self.client, self.credentials.site).await
    }

    /// Lists the matches of one competition group; empty when nothing is
    /// scheduled.
    pub async fn get_matches(
        &mut self,
        group: CompetitionGroup,
    ) -> Result<Vec<Match>, TipsportError> {
        listing::get_matches(&mut self.client, self.credentials.site, group).await
    }

    /// Resolves the playable stream link for a match page URL.
    pub async fn get_stream(&mut self, match_url: &str) -> Result<StreamHandle, TipsportError> {
        stream::resolve(
            &mut self.client,
            self.credentials.site,
            &self.credentials.quality,
            match_url,
        )
        .await
    }
}
