//! Session controller.
//!
//! Owns one [`UserSession`] per login: the auth signal, the cached inventory
//! and the view cursor. Handlers only ever see a read-only [`CurrentUser`]
//! snapshot of who is signed in. Ending a session flips the signal and drops
//! everything cached for it.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use stockscan_auth::{AuthSession, AuthSubscription, CurrentUser};
use stockscan_core::SessionId;
use stockscan_inventory::{InventoryItem, ViewState};

/// Per-session inventory cache and view cursor.
#[derive(Debug)]
pub struct SessionState {
    pub view: ViewState,
    /// Last inventory loaded from the store; `None` until the first load.
    pub inventory: Option<Vec<InventoryItem>>,
}

impl SessionState {
    fn new(page_size: usize) -> Self {
        Self {
            view: ViewState::new(page_size),
            inventory: None,
        }
    }
}

pub struct UserSession {
    auth: AuthSession,
    /// The controller's view of the auth signal.
    subscription: AuthSubscription,
    expires_at: DateTime<Utc>,
    page_size: usize,
    state: Mutex<SessionState>,
}

impl UserSession {
    pub fn id(&self) -> SessionId {
        self.auth.id()
    }

    /// Signed-in user, or `None` once the session has ended.
    pub fn current_user(&self) -> Option<CurrentUser> {
        self.subscription.snapshot()
    }

    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.subscription.is_authenticated() && now < self.expires_at
    }

    /// Exclusive access to the session's cache. Holding the guard serializes
    /// mutations within the session.
    pub async fn state(&self) -> tokio::sync::MutexGuard<'_, SessionState> {
        self.state.lock().await
    }

    async fn end(&self) {
        self.auth.end();
        *self.state.lock().await = SessionState::new(self.page_size);
    }
}

#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<SessionId, Arc<UserSession>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a freshly signed-in session. Expired sessions are pruned.
    pub fn start(
        &self,
        id: SessionId,
        user: CurrentUser,
        expires_at: DateTime<Utc>,
        page_size: usize,
    ) -> Arc<UserSession> {
        let auth = AuthSession::start(id, user);
        let session = Arc::new(UserSession {
            subscription: auth.subscribe(),
            auth,
            expires_at,
            page_size,
            state: Mutex::new(SessionState::new(page_size)),
        });

        let now = Utc::now();
        let mut sessions = self.sessions.write().unwrap_or_else(|e| e.into_inner());
        sessions.retain(|_, s| s.is_live(now));
        sessions.insert(id, session.clone());
        session
    }

    /// The live session for `id`, if any. An expired session is evicted and
    /// signed out on sight, so its cache goes with it.
    pub fn get(&self, id: SessionId, now: DateTime<Utc>) -> Option<Arc<UserSession>> {
        {
            let sessions = self.sessions.read().unwrap_or_else(|e| e.into_inner());
            match sessions.get(&id) {
                None => return None,
                Some(session) if session.is_live(now) => return Some(session.clone()),
                Some(_) => {}
            }
        }

        let mut sessions = self.sessions.write().unwrap_or_else(|e| e.into_inner());
        if let Some(session) = sessions.get(&id) {
            if session.is_live(now) {
                return Some(session.clone());
            }
            session.auth.end();
            sessions.remove(&id);
            tracing::info!(session_id = %id, "expired session evicted");
        }
        None
    }

    /// Sign the session out and discard its cached state. Returns `false`
    /// when no such session was registered.
    pub async fn end(&self, id: SessionId) -> bool {
        let removed = {
            let mut sessions = self.sessions.write().unwrap_or_else(|e| e.into_inner());
            sessions.remove(&id)
        };
        match removed {
            Some(session) => {
                session.end().await;
                tracing::info!(session_id = %id, "session ended");
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
