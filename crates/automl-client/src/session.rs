//! Authenticated session: bearer token plus in-flight request tracking.
//!
//! One `Session` is shared (via `Arc`) by everything that talks to the backend.
//! The token lives in memory and in a [`TokenStore`]; every change bumps a
//! generation counter so dispatchers built for an older token can be detected
//! and rebuilt. The pending-request count is published on a watch channel so a
//! front end can drive a busy indicator from it.

use crate::store::TokenStore;
use crate::token::is_well_formed;
use automl_types::StorageError;
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

#[derive(Debug, Default)]
struct TokenState {
    token: Option<String>,
    generation: u64,
}

/// Shared session state.
pub struct Session {
    state: RwLock<TokenState>,
    pending: watch::Sender<usize>,
    store: Arc<dyn TokenStore>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("Session")
            .field("authenticated", &state.token.is_some())
            .field("generation", &state.generation)
            .field("pending", &*self.pending.borrow())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Empty, logged-out session backed by `store`. The store is not read.
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        let (pending, _) = watch::channel(0);
        Self { state: RwLock::new(TokenState::default()), pending, store }
    }

    /// Session restored from `store`.
    ///
    /// A stored token without three dot-separated segments is discarded and
    /// removed from the store; the session then starts logged out. Storage
    /// read failures are logged and also yield a logged-out session.
    pub fn hydrate(store: Arc<dyn TokenStore>) -> Self {
        let session = Self::new(store);

        match session.store.load() {
            Ok(Some(token)) if is_well_formed(&token) => {
                debug!("Restored session token from storage");
                session.state.write().token = Some(token);
            },
            Ok(Some(_)) => {
                warn!("Discarding malformed stored token");
                if let Err(e) = session.store.clear() {
                    warn!("Failed to remove malformed token: {}", e);
                }
            },
            Ok(None) => debug!("No stored session token"),
            Err(e) => warn!("Could not read stored token, starting logged out: {}", e),
        }

        session
    }

    /// Current bearer token.
    pub fn token(&self) -> Option<String> {
        self.state.read().token.clone()
    }

    /// Token together with the generation it belongs to.
    pub fn snapshot(&self) -> (Option<String>, u64) {
        let state = self.state.read();
        (state.token.clone(), state.generation)
    }

    /// Incremented on every token change.
    pub fn generation(&self) -> u64 {
        self.state.read().generation
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.read().token.is_some()
    }

    /// Replaces the active token in memory and in durable storage.
    ///
    /// The in-memory token is updated even if persisting it fails.
    pub fn set_token(&self, token: impl Into<String>) -> Result<(), StorageError> {
        let token = token.into();
        if !is_well_formed(&token) {
            warn!("Accepted a token that will not survive a restart (not three segments)");
        }
        {
            let mut state = self.state.write();
            state.token = Some(token.clone());
            state.generation += 1;
        }
        info!("Session authenticated");
        self.store.save(&token)
    }

    /// Logs out: clears the token in memory and in durable storage.
    pub fn clear(&self) -> Result<(), StorageError> {
        {
            let mut state = self.state.write();
            if state.token.take().is_some() {
                state.generation += 1;
            }
        }
        self.store.clear()
    }

    /// Clears the session after the server answered 401.
    ///
    /// Any rejection logs out, whichever token the request carried. Returns
    /// `true` when a token was actually removed, so concurrent rejections
    /// signal the login prompt once.
    pub(crate) fn invalidate(&self) -> bool {
        let removed = {
            let mut state = self.state.write();
            let removed = state.token.take().is_some();
            if removed {
                state.generation += 1;
            }
            removed
        };
        if removed {
            warn!("Session rejected by server, logged out");
        } else {
            debug!("Auth failure with no active session");
        }
        if let Err(e) = self.store.clear() {
            warn!("Failed to remove stored token: {}", e);
        }
        removed
    }

    /// Number of requests currently in flight.
    pub fn pending_requests(&self) -> usize {
        *self.pending.borrow()
    }

    pub fn is_busy(&self) -> bool {
        self.pending_requests() > 0
    }

    /// Receiver notified on every change of the in-flight count.
    pub fn subscribe_busy(&self) -> watch::Receiver<usize> {
        self.pending.subscribe()
    }

    /// Marks a request as in flight until the returned guard is dropped.
    pub(crate) fn begin_request(&self) -> InFlight<'_> {
        self.pending.send_modify(|n| *n += 1);
        InFlight { session: self }
    }
}

/// In-flight marker; decrements the pending count (saturating) on drop.
pub(crate) struct InFlight<'a> {
    session: &'a Session,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.session.pending.send_modify(|n| *n = n.saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryTokenStore;

    #[test]
    fn hydrate_keeps_well_formed_token() {
        let store = Arc::new(MemoryTokenStore::with_token("aaa.bbb.ccc"));
        let session = Session::hydrate(store.clone());
        assert!(session.is_authenticated());
        assert_eq!(session.token().as_deref(), Some("aaa.bbb.ccc"));
        assert_eq!(store.peek().as_deref(), Some("aaa.bbb.ccc"));
    }

    #[test]
    fn hydrate_discards_malformed_token() {
        for bad in ["opaque", "a.b", "a.b.c.d"] {
            let store = Arc::new(MemoryTokenStore::with_token(bad));
            let session = Session::hydrate(store.clone());
            assert!(!session.is_authenticated(), "token {bad:?}");
            assert_eq!(store.peek(), None, "token {bad:?} should be removed");
        }
    }

    #[test]
    fn set_and_clear_bump_generation_and_persist() {
        let store = Arc::new(MemoryTokenStore::new());
        let session = Session::new(store.clone());
        let g0 = session.generation();

        session.set_token("x.y.z").unwrap();
        assert_eq!(store.peek().as_deref(), Some("x.y.z"));
        assert!(session.generation() > g0);

        let g1 = session.generation();
        session.clear().unwrap();
        assert!(!session.is_authenticated());
        assert_eq!(store.peek(), None);
        assert!(session.generation() > g1);
    }

    #[test]
    fn invalidation_clears_whichever_token_is_current() {
        let store = Arc::new(MemoryTokenStore::new());
        let session = Session::new(store.clone());
        session.set_token("old.tok.en").unwrap();
        session.set_token("new.tok.en").unwrap();
        let generation = session.generation();

        assert!(session.invalidate());
        assert!(!session.is_authenticated());
        assert_eq!(store.peek(), None);
        assert!(session.generation() > generation);

        assert!(!session.invalidate());
    }

    #[test]
    fn in_flight_guard_counts_and_saturates() {
        let session = Session::new(Arc::new(MemoryTokenStore::new()));
        {
            let _a = session.begin_request();
            let _b = session.begin_request();
            assert_eq!(session.pending_requests(), 2);
            assert!(session.is_busy());
        }
        assert_eq!(session.pending_requests(), 0);

        // An extra decrement must not wrap around.
        drop(InFlight { session: &session });
        assert_eq!(session.pending_requests(), 0);
        assert!(!session.is_busy());
    }

    #[tokio::test]
    async fn busy_subscribers_see_changes() {
        let session = Session::new(Arc::new(MemoryTokenStore::new()));
        let mut rx = session.subscribe_busy();
        let guard = session.begin_request();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), 1);
        drop(guard);
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), 0);
    }
}
