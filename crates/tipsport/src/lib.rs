//! Core library for resolving playable live-stream URLs from the
//! Tipsport/Chance betting sites.
//!
//! The host application (a Kodi-style plugin, a CLI, ...) collects
//! credentials and decides which operation to run; this crate performs the
//! authenticated scraping protocol and hands back plain values or a typed
//! [`TipsportError`]:
//!
//! - [`StreamResolver::login`] authenticates and yields the resolver
//!   aggregate,
//! - [`StreamResolver::get_matches`] lists the matches of a
//!   [`CompetitionGroup`],
//! - [`StreamResolver::get_stream`] walks the script-session-id / stream-list
//!   handshake down to a playable [`StreamHandle`],
//! - [`SessionStore`] keeps the resolver state alive across stateless host
//!   invocations so a still-valid session is never re-logged-in.

pub mod auth;
pub mod client;
pub mod error;
pub mod listing;
pub mod report;
pub mod resolver;
pub mod site;
pub mod store;
pub mod stream;

pub use client::SessionClient;
pub use error::TipsportError;
pub use listing::models::Match;
pub use resolver::{ResolverState, StreamResolver};
pub use site::{CompetitionGroup, Credentials, QualityPreference, SiteVariant};
pub use store::SessionStore;
pub use stream::StreamHandle;
