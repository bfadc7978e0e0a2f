//! Provider, API key, and free-quota services.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::client::ApiClient;
use crate::api::resource::{ResourcePaths, ResourceService};
use crate::api::types::{ApiKey, ApiKeyDraft, FreeQuota, FreeQuotaDraft, Provider, ProviderDraft};
use crate::error::ApiResult;

/// Provider create payload; the bundled initial key is shaped by hand since
/// it falls outside the generic factory.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProviderCreatePayload<'a> {
    #[serde(flatten)]
    draft: &'a ProviderDraft,
    #[serde(skip_serializing_if = "Option::is_none")]
    initial_api_key: Option<&'a ApiKeyDraft>,
}

#[derive(Debug, Clone)]
pub struct ProviderService {
    inner: ResourceService<Provider>,
}

impl ProviderService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            inner: ResourceService::new(
                client,
                ResourcePaths {
                    collection: "/providers/",
                    item: "/providers",
                },
            ),
        }
    }

    pub async fn get_all(&self) -> ApiResult<Vec<Provider>> {
        self.inner.get_all(None).await
    }

    pub async fn get_one(&self, id: Uuid) -> ApiResult<Provider> {
        self.inner.get_one(&id.to_string()).await
    }

    /// Create a provider, optionally bundling an initial API key so a fresh
    /// provider is usable in one step.
    pub async fn create(
        &self,
        draft: &ProviderDraft,
        initial_key: Option<&ApiKeyDraft>,
    ) -> ApiResult<Provider> {
        let payload = ProviderCreatePayload {
            draft,
            initial_api_key: initial_key,
        };
        self.inner.create(None, &payload).await
    }

    pub async fn update(&self, id: Uuid, draft: &ProviderDraft) -> ApiResult<Provider> {
        self.inner.update(&id.to_string(), draft).await
    }

    /// Delete a provider; the gateway cascades to its API keys.
    pub async fn delete(&self, id: Uuid) -> ApiResult<()> {
        self.inner.delete(&id.to_string()).await
    }
}

/// Reorder submission: a full id -> index map covering every key in the list.
#[derive(Debug, Clone, Serialize)]
struct ReorderPayload<'a> {
    order: &'a HashMap<Uuid, usize>,
}

#[derive(Debug, Clone)]
pub struct ApiKeyService {
    inner: ResourceService<ApiKey>,
}

impl ApiKeyService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            inner: ResourceService::new(
                client,
                ResourcePaths {
                    collection: "/providers/{}/keys",
                    item: "/keys",
                },
            ),
        }
    }

    pub async fn get_all(&self, provider_id: Uuid) -> ApiResult<Vec<ApiKey>> {
        self.inner.get_all(Some(&provider_id.to_string())).await
    }

    pub async fn create(&self, provider_id: Uuid, draft: &ApiKeyDraft) -> ApiResult<ApiKey> {
        self.inner.create(Some(&provider_id.to_string()), draft).await
    }

    pub async fn update(&self, key_id: Uuid, draft: &ApiKeyDraft) -> ApiResult<ApiKey> {
        self.inner.update(&key_id.to_string(), draft).await
    }

    pub async fn delete(&self, key_id: Uuid) -> ApiResult<()> {
        self.inner.delete(&key_id.to_string()).await
    }

    /// Submit the full order map in one request. The map must be a bijection
    /// from the provider's key ids onto `{0..N-1}`; see
    /// [`crate::store::order`].
    pub async fn reorder(&self, provider_id: Uuid, order: &HashMap<Uuid, usize>) -> ApiResult<()> {
        let path = format!("/providers/{}/keys/reorder", provider_id);
        self.inner.client().put_unit(&path, &ReorderPayload { order }).await
    }
}

#[derive(Debug, Clone)]
pub struct FreeQuotaService {
    client: Arc<ApiClient>,
}

impl FreeQuotaService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    fn collection_path(provider_id: Uuid) -> String {
        format!("/providers/{}/free-quota", provider_id)
    }

    // The collection path only accepts GET/POST; update and delete address
    // the quota itself.
    fn item_path(provider_id: Uuid, quota_id: Uuid) -> String {
        format!("/providers/{}/free-quota/{}", provider_id, quota_id)
    }

    pub async fn create(&self, provider_id: Uuid, draft: &FreeQuotaDraft) -> ApiResult<FreeQuota> {
        self.client.post(&Self::collection_path(provider_id), draft).await
    }

    pub async fn update(
        &self,
        provider_id: Uuid,
        quota_id: Uuid,
        draft: &FreeQuotaDraft,
    ) -> ApiResult<FreeQuota> {
        self.client.put(&Self::item_path(provider_id, quota_id), draft).await
    }

    pub async fn delete(&self, provider_id: Uuid, quota_id: Uuid) -> ApiResult<()> {
        self.client.delete(&Self::item_path(provider_id, quota_id)).await
    }
}
