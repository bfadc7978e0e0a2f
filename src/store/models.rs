//! Model collection state and CRUD actions.

use uuid::Uuid;

use crate::api::types::{Model, ModelDraft};
use crate::api::Services;
use crate::error::ApiResult;

#[derive(Debug, Default)]
pub struct ModelStore {
    pub models: Vec<Model>,
    pub loading: bool,
    pub error: Option<String>,
}

impl ModelStore {
    pub fn find(&self, id: Uuid) -> Option<&Model> {
        self.models.iter().find(|m| m.id == id)
    }

    pub async fn fetch(&mut self, services: &Services) {
        self.loading = true;
        match services.models.get_all().await {
            Ok(models) => {
                self.models = models;
                self.error = None;
            }
            Err(e) => self.error = Some(e.to_string()),
        }
        self.loading = false;
    }

    pub async fn create(&mut self, services: &Services, draft: &ModelDraft) -> ApiResult<Model> {
        self.loading = true;
        let result = services.models.create(draft).await;
        self.finish(services, result).await
    }

    pub async fn update(
        &mut self,
        services: &Services,
        id: Uuid,
        draft: &ModelDraft,
    ) -> ApiResult<Model> {
        self.loading = true;
        let result = services.models.update(id, draft).await;
        self.finish(services, result).await
    }

    pub async fn delete(&mut self, services: &Services, id: Uuid) -> ApiResult<()> {
        self.loading = true;
        let result = services.models.delete(id).await;
        self.finish(services, result).await
    }

    async fn finish<T>(&mut self, services: &Services, result: ApiResult<T>) -> ApiResult<T> {
        match &result {
            Ok(_) => {
                if let Ok(models) = services.models.get_all().await {
                    self.models = models;
                }
                self.error = None;
                crate::bus::global().publish(crate::bus::SessionEvent::CollectionRefreshed {
                    resource: "models",
                });
            }
            Err(e) => self.error = Some(e.to_string()),
        }
        self.loading = false;
        result
    }
}
