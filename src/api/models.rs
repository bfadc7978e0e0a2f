//! Model and model-implementation services.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::client::ApiClient;
use crate::api::resource::{ResourcePaths, ResourceService};
use crate::api::types::{ImplementationDraft, Model, ModelDraft, ModelImplementation};
use crate::error::ApiResult;

#[derive(Debug, Clone)]
pub struct ModelService {
    inner: ResourceService<Model>,
}

impl ModelService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            inner: ResourceService::new(
                client,
                ResourcePaths {
                    collection: "/models",
                    item: "/models",
                },
            ),
        }
    }

    pub async fn get_all(&self) -> ApiResult<Vec<Model>> {
        self.inner.get_all(None).await
    }

    pub async fn get_one(&self, id: Uuid) -> ApiResult<Model> {
        self.inner.get_one(&id.to_string()).await
    }

    pub async fn create(&self, draft: &ModelDraft) -> ApiResult<Model> {
        self.inner.create(None, draft).await
    }

    pub async fn update(&self, id: Uuid, draft: &ModelDraft) -> ApiResult<Model> {
        self.inner.update(&id.to_string(), draft).await
    }

    /// Delete a model; implementations are owned and go with it.
    pub async fn delete(&self, id: Uuid) -> ApiResult<()> {
        self.inner.delete(&id.to_string()).await
    }
}

#[derive(Debug, Clone, Serialize)]
struct ReorderPayload<'a> {
    order: &'a HashMap<Uuid, usize>,
}

#[derive(Debug, Clone)]
pub struct ImplementationService {
    inner: ResourceService<ModelImplementation>,
}

impl ImplementationService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            inner: ResourceService::new(
                client,
                ResourcePaths {
                    collection: "/models/{}/implementations",
                    item: "/models/implementations",
                },
            ),
        }
    }

    pub async fn get_all(&self, model_id: Uuid) -> ApiResult<Vec<ModelImplementation>> {
        self.inner.get_all(Some(&model_id.to_string())).await
    }

    pub async fn get_one(&self, id: Uuid) -> ApiResult<ModelImplementation> {
        self.inner.get_one(&id.to_string()).await
    }

    pub async fn create(
        &self,
        model_id: Uuid,
        draft: &ImplementationDraft,
    ) -> ApiResult<ModelImplementation> {
        self.inner.create(Some(&model_id.to_string()), draft).await
    }

    pub async fn update(&self, id: Uuid, draft: &ImplementationDraft) -> ApiResult<ModelImplementation> {
        self.inner.update(&id.to_string(), draft).await
    }

    pub async fn delete(&self, id: Uuid) -> ApiResult<()> {
        self.inner.delete(&id.to_string()).await
    }

    /// Same full-map reorder contract as API keys, scoped to one model.
    pub async fn reorder(&self, model_id: Uuid, order: &HashMap<Uuid, usize>) -> ApiResult<()> {
        let path = format!("/models/{}/implementations/reorder", model_id);
        self.inner.client().put_unit(&path, &ReorderPayload { order }).await
    }
}
