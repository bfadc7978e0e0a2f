//! API client layer for the gateway REST backend.
//!
//! A generic request wrapper ([`client::ApiClient`]) plus per-resource
//! services built on a common factory ([`resource::ResourceService`]).
//! Field-name translation between the wire format (snake_case) and the UI
//! format (camelCase) happens once, at the client boundary.

pub mod chat;
pub mod client;
pub mod conversations;
pub mod models;
pub mod providers;
pub mod resource;
pub mod types;

use std::sync::Arc;

use crate::config::Config;
use crate::error::ApiResult;

/// Bundle of all resource services sharing one HTTP client.
#[derive(Debug, Clone)]
pub struct Services {
    pub providers: providers::ProviderService,
    pub keys: providers::ApiKeyService,
    pub quotas: providers::FreeQuotaService,
    pub models: models::ModelService,
    pub implementations: models::ImplementationService,
    pub conversations: conversations::ConversationService,
    pub presets: conversations::PresetService,
    pub chat: chat::ChatService,
}

impl Services {
    pub fn new(client: Arc<client::ApiClient>) -> Self {
        Self {
            providers: providers::ProviderService::new(client.clone()),
            keys: providers::ApiKeyService::new(client.clone()),
            quotas: providers::FreeQuotaService::new(client.clone()),
            models: models::ModelService::new(client.clone()),
            implementations: models::ImplementationService::new(client.clone()),
            conversations: conversations::ConversationService::new(client.clone()),
            presets: conversations::PresetService::new(client.clone()),
            chat: chat::ChatService::new(client),
        }
    }

    pub fn from_config(config: &Config) -> ApiResult<Self> {
        let client = Arc::new(client::ApiClient::new(config.api_url())?);
        Ok(Self::new(client))
    }
}
