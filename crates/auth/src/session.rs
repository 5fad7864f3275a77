//! Explicit auth session.
//!
//! One [`AuthSession`] per login. It owns the "current user" signal; readers
//! hold an [`AuthSubscription`] and see a read-only snapshot. Ending the
//! session flips the signal to signed-out for every subscriber.

use serde::Serialize;
use tokio::sync::watch;

use stockscan_core::{SessionId, UserId};

/// Read-only snapshot of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentUser {
    pub user_id: UserId,
    pub email: String,
}

#[derive(Debug)]
pub struct AuthSession {
    id: SessionId,
    tx: watch::Sender<Option<CurrentUser>>,
}

impl AuthSession {
    /// Start a signed-in session for `user`.
    pub fn start(id: SessionId, user: CurrentUser) -> Self {
        let (tx, _rx) = watch::channel(Some(user));
        Self { id, tx }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn subscribe(&self) -> AuthSubscription {
        AuthSubscription {
            rx: self.tx.subscribe(),
        }
    }

    /// Sign out. Idempotent.
    pub fn end(&self) {
        self.tx.send_replace(None);
    }
}

impl Drop for AuthSession {
    fn drop(&mut self) {
        self.end();
    }
}

/// Receiving side of an [`AuthSession`].
#[derive(Debug, Clone)]
pub struct AuthSubscription {
    rx: watch::Receiver<Option<CurrentUser>>,
}

impl AuthSubscription {
    pub fn snapshot(&self) -> Option<CurrentUser> {
        self.rx.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.rx.borrow().is_some()
    }
}
