//! Collaborator wiring: store, identity provider, tokens, vision model and
//! the session registry, built once from [`AppConfig`].

use std::sync::Arc;

use thiserror::Error;

use stockscan_ai::{AiError, VisionModel, create_vision_model};
use stockscan_auth::{Hs256Tokens, IdentityProvider, InMemoryIdentityProvider, JwtValidator, TokenIssuer};
use stockscan_infra::{
    InMemoryInventoryStore, InventoryService, InventoryStore, PostgresInventoryStore, StoreError,
};

use crate::config::{AppConfig, MAX_TOKEN_TTL_MINUTES};
use crate::sessions::SessionRegistry;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to open inventory store: {0}")]
    Store(#[from] StoreError),

    #[error("failed to configure vision model: {0}")]
    Vision(#[from] AiError),
}

pub struct AppServices {
    pub inventory: InventoryService,
    pub identity: Arc<dyn IdentityProvider>,
    pub issuer: Arc<dyn TokenIssuer>,
    pub validator: Arc<dyn JwtValidator>,
    pub vision: Arc<dyn VisionModel>,
    pub sessions: Arc<SessionRegistry>,
    pub page_size: usize,
    pub token_ttl: chrono::Duration,
    pub max_upload_bytes: usize,
}

impl AppServices {
    /// Assemble services from explicit collaborators.
    pub fn new(
        config: &AppConfig,
        store: Arc<dyn InventoryStore>,
        identity: Arc<dyn IdentityProvider>,
        vision: Arc<dyn VisionModel>,
    ) -> Self {
        let token_ttl = chrono::Duration::minutes(config.token_ttl_minutes.clamp(1, MAX_TOKEN_TTL_MINUTES));
        let tokens = Arc::new(Hs256Tokens::new(config.jwt_secret.as_bytes(), token_ttl));

        Self {
            inventory: InventoryService::new(store),
            identity,
            issuer: tokens.clone(),
            validator: tokens,
            vision,
            sessions: Arc::new(SessionRegistry::new()),
            page_size: config.page_size,
            token_ttl,
            max_upload_bytes: config.max_upload_bytes,
        }
    }

    /// Build the production collaborators described by `config`.
    pub async fn from_config(config: &AppConfig) -> Result<Self, StartupError> {
        let store: Arc<dyn InventoryStore> = match &config.database_url {
            Some(url) => {
                tracing::info!("using postgres inventory store");
                Arc::new(PostgresInventoryStore::connect(url).await?)
            }
            None => {
                tracing::warn!("DATABASE_URL not set; inventory is kept in memory");
                Arc::new(InMemoryInventoryStore::new())
            }
        };

        let vision = create_vision_model(&config.vision)?;
        tracing::info!(provider = %config.vision.provider, model = vision.model_name(), "vision model ready");

        Ok(Self::new(
            config,
            store,
            Arc::new(InMemoryIdentityProvider::new()),
            vision,
        ))
    }
}
