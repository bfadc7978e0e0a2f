//! API key state for the provider detail view.

use uuid::Uuid;

use crate::api::types::{ApiKey, ApiKeyDraft};
use crate::api::Services;
use crate::error::{ApiError, ApiResult};
use crate::store::order::{build_order_map, MoveDirection};

#[derive(Debug, Default)]
pub struct KeyStore {
    /// Provider whose keys are loaded; actions are scoped to it.
    pub provider_id: Option<Uuid>,
    pub keys: Vec<ApiKey>,
    pub loading: bool,
    pub error: Option<String>,
}

impl KeyStore {
    pub async fn fetch(&mut self, services: &Services, provider_id: Uuid) {
        self.provider_id = Some(provider_id);
        self.loading = true;
        match services.keys.get_all(provider_id).await {
            Ok(mut keys) => {
                keys.sort_by_key(|k| k.sort_order);
                self.keys = keys;
                self.error = None;
            }
            Err(e) => self.error = Some(e.to_string()),
        }
        self.loading = false;
    }

    pub async fn create(&mut self, services: &Services, draft: &ApiKeyDraft) -> ApiResult<ApiKey> {
        let provider_id = self.require_provider()?;
        self.loading = true;
        let result = services.keys.create(provider_id, draft).await;
        self.finish(services, provider_id, result).await
    }

    pub async fn update(
        &mut self,
        services: &Services,
        key_id: Uuid,
        draft: &ApiKeyDraft,
    ) -> ApiResult<ApiKey> {
        let provider_id = self.require_provider()?;
        self.loading = true;
        let result = services.keys.update(key_id, draft).await;
        self.finish(services, provider_id, result).await
    }

    pub async fn delete(&mut self, services: &Services, key_id: Uuid) -> ApiResult<()> {
        let provider_id = self.require_provider()?;
        self.loading = true;
        let result = services.keys.delete(key_id).await;
        self.finish(services, provider_id, result).await
    }

    /// Move a key one step and submit the full order map; a move past either
    /// end is a local no-op and issues no request.
    pub async fn reorder(
        &mut self,
        services: &Services,
        key_id: Uuid,
        direction: MoveDirection,
    ) -> ApiResult<bool> {
        let provider_id = self.require_provider()?;
        let ids: Vec<Uuid> = self.keys.iter().map(|k| k.id).collect();
        let Some(order) = build_order_map(&ids, key_id, direction) else {
            return Ok(false);
        };

        self.loading = true;
        let result = services.keys.reorder(provider_id, &order).await;
        self.finish(services, provider_id, result).await?;
        Ok(true)
    }

    fn require_provider(&self) -> ApiResult<Uuid> {
        self.provider_id
            .ok_or_else(|| ApiError::InvalidInput("no provider selected".to_string()))
    }

    async fn finish<T>(
        &mut self,
        services: &Services,
        provider_id: Uuid,
        result: ApiResult<T>,
    ) -> ApiResult<T> {
        match &result {
            Ok(_) => {
                if let Ok(mut keys) = services.keys.get_all(provider_id).await {
                    keys.sort_by_key(|k| k.sort_order);
                    self.keys = keys;
                }
                self.error = None;
                crate::bus::global().publish(crate::bus::SessionEvent::CollectionRefreshed {
                    resource: "keys",
                });
            }
            Err(e) => self.error = Some(e.to_string()),
        }
        self.loading = false;
        result
    }
}
