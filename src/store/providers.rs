//! Provider collection state and CRUD actions.
//!
//! Action contract (shared by every store): set the loading flag, perform the
//! API call, on success update local state and re-fetch the owning collection
//! for server-confirmed consistency, on failure record the error string and
//! leave prior state untouched, finally clear the loading flag.

use uuid::Uuid;

use crate::api::types::{ApiKeyDraft, FreeQuotaDraft, Provider, ProviderDraft};
use crate::api::Services;
use crate::error::{ApiError, ApiResult};

#[derive(Debug, Default)]
pub struct ProviderStore {
    pub providers: Vec<Provider>,
    pub loading: bool,
    pub error: Option<String>,
}

impl ProviderStore {
    pub fn find(&self, id: Uuid) -> Option<&Provider> {
        self.providers.iter().find(|p| p.id == id)
    }

    pub async fn fetch(&mut self, services: &Services) {
        self.loading = true;
        match services.providers.get_all().await {
            Ok(providers) => {
                self.providers = providers;
                self.error = None;
            }
            Err(e) => self.error = Some(e.to_string()),
        }
        self.loading = false;
    }

    /// Create a provider, optionally with a bundled initial key.
    pub async fn create(
        &mut self,
        services: &Services,
        draft: &ProviderDraft,
        initial_key: Option<&ApiKeyDraft>,
    ) -> ApiResult<Provider> {
        self.loading = true;
        let result = services.providers.create(draft, initial_key).await;
        self.finish(services, result).await
    }

    pub async fn update(
        &mut self,
        services: &Services,
        id: Uuid,
        draft: &ProviderDraft,
    ) -> ApiResult<Provider> {
        self.loading = true;
        let result = services.providers.update(id, draft).await;
        self.finish(services, result).await
    }

    /// Delete a provider; the gateway cascades its API keys.
    pub async fn delete(&mut self, services: &Services, id: Uuid) -> ApiResult<()> {
        self.loading = true;
        let result = services.providers.delete(id).await;
        self.finish(services, result).await
    }

    /// Refresh one provider's detail (keys, quota) in place.
    pub async fn refresh_one(&mut self, services: &Services, id: Uuid) -> ApiResult<()> {
        match services.providers.get_one(id).await {
            Ok(detail) => {
                if let Some(slot) = self.providers.iter_mut().find(|p| p.id == id) {
                    *slot = detail;
                }
                Ok(())
            }
            Err(e) => {
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    async fn finish<T>(&mut self, services: &Services, result: ApiResult<T>) -> ApiResult<T> {
        match &result {
            Ok(_) => {
                // Re-fetch the whole collection rather than merging the
                // mutation locally; the server-confirmed list wins.
                if let Ok(providers) = services.providers.get_all().await {
                    self.providers = providers;
                }
                self.error = None;
                crate::bus::global().publish(crate::bus::SessionEvent::CollectionRefreshed {
                    resource: "providers",
                });
            }
            Err(e) => self.error = Some(e.to_string()),
        }
        self.loading = false;
        result
    }
}

/// Free-quota actions, provider-scoped. At most one active quota is shown
/// per provider, so the store carries no collection of its own.
#[derive(Debug, Default)]
pub struct QuotaStore {
    pub loading: bool,
    pub error: Option<String>,
}

impl QuotaStore {
    /// Create or replace the provider's quota. `existing` is the id of the
    /// quota being edited, `None` when adding a fresh one.
    pub async fn save(
        &mut self,
        services: &Services,
        provider_id: Uuid,
        draft: &FreeQuotaDraft,
        existing: Option<Uuid>,
    ) -> ApiResult<()> {
        self.loading = true;
        let result = match existing {
            Some(quota_id) => services.quotas.update(provider_id, quota_id, draft).await,
            None => services.quotas.create(provider_id, draft).await,
        };
        self.loading = false;
        match result {
            Ok(_) => {
                self.error = None;
                Ok(())
            }
            Err(e) => {
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub async fn delete(
        &mut self,
        services: &Services,
        provider_id: Uuid,
        quota_id: Uuid,
    ) -> ApiResult<()> {
        self.loading = true;
        let result = services.quotas.delete(provider_id, quota_id).await;
        self.loading = false;
        match result {
            Ok(()) => {
                self.error = None;
                Ok(())
            }
            Err(e) => {
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }
}
