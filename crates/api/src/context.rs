use stockscan_core::{SessionId, UserId};

/// Authenticated caller for a request.
///
/// Inserted by the auth middleware; immutable and present on every
/// protected route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserContext {
    user_id: UserId,
    session_id: SessionId,
    email: String,
}

impl UserContext {
    pub fn new(user_id: UserId, session_id: SessionId, email: impl Into<String>) -> Self {
        Self {
            user_id,
            session_id,
            email: email.into(),
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}
