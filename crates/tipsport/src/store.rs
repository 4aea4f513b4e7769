//! Cross-invocation persistence of the resolver state.
//!
//! Each host invocation is a fresh process, so the authenticated session has
//! to outlive the process without being durable across host restarts. A JSON
//! file per key under the OS temp directory gives exactly that lifetime.
//! Access is read-modify-write without locking; invocations are effectively
//! sequential and last-write-wins is accepted.

use std::fs;
use std::io;
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::error::TipsportError;
use crate::resolver::ResolverState;

const STORE_DIR: &str = "tipsport-streams";

#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            dir: std::env::temp_dir().join(STORE_DIR),
        }
    }

    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store key scoped by package identity and version, so an upgraded
    /// build never resumes a stale session saved by an older one.
    pub fn default_key() -> String {
        format!("{}-{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Loads a saved state. Absence is the normal first-use case, and a
    /// snapshot that no longer decodes is discarded rather than surfaced.
    pub fn load(&self, key: &str) -> Result<Option<ResolverState>, TipsportError> {
        let path = self.path_for(key);
        let body = match fs::read_to_string(&path) {
            Ok(body) => body,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(TipsportError::Other(format!(
                    "cannot read session store {}: {e}",
                    path.display()
                )));
            }
        };

        match serde_json::from_str(&body) {
            Ok(state) => {
                debug!(key, "restored resolver state");
                Ok(Some(state))
            }
            Err(e) => {
                warn!(key, error = %e, "discarding corrupt resolver state");
                Ok(None)
            }
        }
    }

    /// Saves the state under the key, overwriting whatever was there.
    pub fn save(&self, key: &str, state: &ResolverState) -> Result<(), TipsportError> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            TipsportError::Other(format!(
                "cannot create session store {}: {e}",
                self.dir.display()
            ))
        })?;
        let body = serde_json::to_string(state)
            .map_err(|e| TipsportError::Other(format!("cannot encode resolver state: {e}")))?;
        let path = self.path_for(key);
        fs::write(&path, body).map_err(|e| {
            TipsportError::Other(format!(
                "cannot write session store {}: {e}",
                path.display()
            ))
        })?;
        debug!(key, "saved resolver state");
        Ok(())
    }

    /// Drops the saved state for the key, if any.
    pub fn clear(&self, key: &str) -> Result<(), TipsportError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(TipsportError::Other(format!(
                "cannot clear session store key {key}: {e}"
            ))),
        }
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::{Credentials, QualityPreference, SiteVariant};
    use rustc_hash::FxHashMap;

    fn sample_state() -> ResolverState {
        let mut cookies = FxHashMap::default();
        cookies.insert("JSESSIONID".to_string(), "abc123".to_string());
        ResolverState {
            credentials: Credentials::new(
                "user",
                "secret",
                QualityPreference::Highest,
                SiteVariant::TipsportCz,
            ),
            cookies,
        }
    }

    #[test]
    fn round_trip_across_store_instances() {
        let dir = tempfile::tempdir().unwrap();
        let key = SessionStore::default_key();

        SessionStore::with_dir(dir.path())
            .save(&key, &sample_state())
            .unwrap();

        // A logically separate invocation opens its own store handle.
        let restored = SessionStore::with_dir(dir.path())
            .load(&key)
            .unwrap()
            .expect("state should survive");
        assert_eq!(restored.cookies.get("JSESSIONID").unwrap(), "abc123");
        assert_eq!(restored.credentials.username, "user");
    }

    #[test]
    fn missing_key_is_none_not_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::with_dir(dir.path());
        assert!(store.load("never-saved").unwrap().is_none());
    }

    #[test]
    fn corrupt_state_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.json"), "{not json").unwrap();
        let store = SessionStore::with_dir(dir.path());
        assert!(store.load("broken").unwrap().is_none());
    }

    #[test]
    fn clear_removes_saved_state() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::with_dir(dir.path());
        store.save("k", &sample_state()).unwrap();
        store.clear("k").unwrap();
        assert!(store.load("k").unwrap().is_none());
        // Clearing an absent key is fine too.
        store.clear("k").unwrap();
    }

    #[test]
    fn default_key_is_version_scoped() {
        let key = SessionStore::default_key();
        assert!(key.starts_with("tipsport-streams-"));
        assert!(key.contains(env!("CARGO_PKG_VERSION")));
    }
}
