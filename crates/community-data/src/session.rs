//! The logged-in identity shared by every repository.
//!
//! [`SessionState`] is an injected, cloneable handle: reads come from memory,
//! every change is written through to the store's session row so a restart
//! picks up where the last run left off.

use std::sync::{Arc, PoisonError, RwLock};

use community_store::{LocalStore, StoredSession, Table};

use crate::error::{DataError, Result};
use crate::remote::AuthTokens;

#[derive(Clone)]
pub struct SessionState {
    inner: Arc<RwLock<StoredSession>>,
    store: LocalStore,
}

impl SessionState {
    /// Restore the persisted session from `store`.
    pub fn load(store: LocalStore) -> Result<Self> {
        let session = store.with_db(|db| db.load_session())?;
        tracing::debug!(logged_in = session.auth_token.is_some(), "session restored");

        Ok(Self {
            inner: Arc::new(RwLock::new(session)),
            store,
        })
    }

    pub fn current_user_id(&self) -> Option<String> {
        self.read().user_id.clone()
    }

    pub fn auth_token(&self) -> Option<String> {
        self.read().auth_token.clone()
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.read().refresh_token.clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.read()
            .auth_token
            .as_deref()
            .is_some_and(|token| !token.is_empty())
    }

    /// Record a successful login or registration.
    pub fn sign_in(&self, tokens: &AuthTokens, user_id: &str) -> Result<()> {
        self.update(|session| {
            session.auth_token = Some(tokens.access_token.clone());
            session.refresh_token = Some(tokens.refresh_token.clone());
            session.expires_in = Some(tokens.expires_in);
            session.user_id = Some(user_id.to_string());
        })
    }

    pub fn update_tokens(&self, tokens: &AuthTokens) -> Result<()> {
        self.update(|session| {
            session.auth_token = Some(tokens.access_token.clone());
            session.refresh_token = Some(tokens.refresh_token.clone());
            session.expires_in = Some(tokens.expires_in);
        })
    }

    pub fn set_user_id(&self, user_id: &str) -> Result<()> {
        self.update(|session| session.user_id = Some(user_id.to_string()))
    }

    /// Forget the session.  Memory is cleared even if the persisted row
    /// cannot be deleted.
    pub fn clear(&self) -> Result<()> {
        *self.write() = StoredSession::default();
        self.persisted(self.store.with_db(|db| db.clear_session()))
    }

    /// Apply `change` in memory, then persist.  A persistence failure is
    /// returned but the in-memory session keeps the change, and live queries
    /// over [`Table::Session`] are woken either way.
    fn update(&self, change: impl FnOnce(&mut StoredSession)) -> Result<()> {
        let next = {
            let mut session = self.write();
            change(&mut session);
            session.clone()
        };

        self.persisted(self.store.with_db(|db| db.save_session(&next)))
    }

    // A successful write notifies through the store.
    fn persisted(&self, result: community_store::Result<()>) -> Result<()> {
        result.map_err(|e| {
            self.store.changes().notify(Table::Session);
            DataError::local_write(e)
        })
    }

    // A panic while holding the lock cannot leave a half-written session:
    // every writer replaces the whole value.
    fn read(&self) -> std::sync::RwLockReadGuard<'_, StoredSession> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, StoredSession> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}
