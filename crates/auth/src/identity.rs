//! Identity provider port and an in-memory implementation for dev/tests.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;

use stockscan_core::UserId;

use crate::credentials::normalize_email;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentityError {
    #[error("an account with this email already exists")]
    EmailTaken,

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

/// External identity collaborator: owns accounts, hands out stable user ids.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Register a new account; returns its user id.
    async fn sign_up(&self, email: &str, password: &str) -> Result<UserId, IdentityError>;

    /// Verify credentials; returns the account's user id.
    async fn sign_in(&self, email: &str, password: &str) -> Result<UserId, IdentityError>;
}

#[derive(Debug, Clone)]
struct Account {
    user_id: UserId,
    salt: String,
    digest: String,
}

fn digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Process-local account table keyed by normalized email.
///
/// Passwords are kept only as salted SHA-256 digests.
#[derive(Debug, Default)]
pub struct InMemoryIdentityProvider {
    accounts: RwLock<HashMap<String, Account>>,
}

impl InMemoryIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn sign_up(&self, email: &str, password: &str) -> Result<UserId, IdentityError> {
        let email = normalize_email(email);
        let mut accounts = self
            .accounts
            .write()
            .map_err(|_| IdentityError::Unavailable("account table poisoned".to_string()))?;

        if accounts.contains_key(&email) {
            return Err(IdentityError::EmailTaken);
        }

        let salt = Uuid::now_v7().simple().to_string();
        let account = Account {
            user_id: UserId::new(),
            digest: digest(&salt, password),
            salt,
        };
        let user_id = account.user_id;
        accounts.insert(email, account);

        tracing::info!(%user_id, "account created");
        Ok(user_id)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<UserId, IdentityError> {
        let email = normalize_email(email);
        let accounts = self
            .accounts
            .read()
            .map_err(|_| IdentityError::Unavailable("account table poisoned".to_string()))?;

        match accounts.get(&email) {
            Some(account) if account.digest == digest(&account.salt, password) => Ok(account.user_id),
            _ => Err(IdentityError::InvalidCredentials),
        }
    }
}
