// ── Session ──
//
// Holds the bearer token for the current user. The token is mirrored to
// the key-value store under `token` so later runs start logged in.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::error::CoreError;
use crate::storage::{KeyValueStore, TOKEN_KEY};

/// Authentication state shared by the catalog and the favorites reconciler.
///
/// Cheaply cloneable; clones observe the same token.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn KeyValueStore>,
    token: Arc<watch::Sender<Option<SecretString>>>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Restore the session from the store, if a token was saved.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Result<Self, CoreError> {
        let saved = store
            .get(TOKEN_KEY)?
            .filter(|t| !t.trim().is_empty())
            .map(SecretString::from);
        debug!(restored = saved.is_some(), "session loaded");
        let (token, _) = watch::channel(saved);
        Ok(Self {
            store,
            token: Arc::new(token),
        })
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.borrow().is_some()
    }

    /// The current token, or `NotAuthenticated`.
    pub fn require(&self) -> Result<SecretString, CoreError> {
        self.token.borrow().clone().ok_or(CoreError::NotAuthenticated)
    }

    /// Persist and adopt a freshly issued token.
    pub fn set_token(&self, token: SecretString) -> Result<(), CoreError> {
        self.store.set(TOKEN_KEY, token.expose_secret())?;
        self.token.send_replace(Some(token));
        info!("session started");
        Ok(())
    }

    /// Forget the token locally. There is no server-side logout.
    pub fn clear(&self) -> Result<(), CoreError> {
        self.store.remove(TOKEN_KEY)?;
        self.token.send_replace(None);
        info!("session cleared");
        Ok(())
    }

    /// Notified whenever the user logs in or out.
    pub fn subscribe(&self) -> watch::Receiver<Option<SecretString>> {
        self.token.subscribe()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn restores_saved_token() {
        let store = Arc::new(MemoryStore::new());
        store.set(TOKEN_KEY, "abc").unwrap();

        let session = Session::load(store).unwrap();
        assert!(session.is_authenticated());
        assert_eq!(session.require().unwrap().expose_secret(), "abc");
    }

    #[test]
    fn require_without_token_fails() {
        let session = Session::load(Arc::new(MemoryStore::new())).unwrap();
        assert!(matches!(
            session.require(),
            Err(CoreError::NotAuthenticated)
        ));
    }

    #[test]
    fn set_and_clear_update_store() {
        let store = Arc::new(MemoryStore::new());
        let session = Session::load(store.clone()).unwrap();
        let observer = session.clone();

        session.set_token(SecretString::from("t1".to_string())).unwrap();
        assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("t1"));
        assert!(observer.is_authenticated());

        session.clear().unwrap();
        assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
        assert!(!observer.is_authenticated());
    }
}
