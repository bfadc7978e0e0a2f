//! Implementation state scoped to the model currently open in the
//! detail panel.

use uuid::Uuid;

use crate::api::types::{ImplementationDraft, ModelImplementation};
use crate::api::Services;
use crate::error::{ApiError, ApiResult};
use crate::store::order::{build_order_map, MoveDirection};

#[derive(Debug, Default)]
pub struct ImplStore {
    pub model_id: Option<Uuid>,
    pub implementations: Vec<ModelImplementation>,
    pub loading: bool,
    pub error: Option<String>,
}

impl ImplStore {
    pub async fn fetch(&mut self, services: &Services, model_id: Uuid) {
        self.model_id = Some(model_id);
        self.loading = true;
        match services.implementations.get_all(model_id).await {
            Ok(mut impls) => {
                impls.sort_by_key(|i| i.sort_order);
                self.implementations = impls;
                self.error = None;
            }
            Err(e) => self.error = Some(e.to_string()),
        }
        self.loading = false;
    }

    pub async fn create(
        &mut self,
        services: &Services,
        draft: &ImplementationDraft,
    ) -> ApiResult<ModelImplementation> {
        let model_id = self.require_model()?;
        self.loading = true;
        let result = services.implementations.create(model_id, draft).await;
        self.finish(services, result).await
    }

    pub async fn update(
        &mut self,
        services: &Services,
        id: Uuid,
        draft: &ImplementationDraft,
    ) -> ApiResult<ModelImplementation> {
        self.require_model()?;
        self.loading = true;
        let result = services.implementations.update(id, draft).await;
        self.finish(services, result).await
    }

    pub async fn delete(&mut self, services: &Services, id: Uuid) -> ApiResult<()> {
        self.require_model()?;
        self.loading = true;
        let result = services.implementations.delete(id).await;
        self.finish(services, result).await
    }

    /// Moves an implementation one slot and submits the complete order
    /// map. Returns `Ok(false)` when the move falls off either end, in
    /// which case no request is made.
    pub async fn reorder(
        &mut self,
        services: &Services,
        impl_id: Uuid,
        direction: MoveDirection,
    ) -> ApiResult<bool> {
        let model_id = self.require_model()?;
        let ids: Vec<Uuid> = self.implementations.iter().map(|i| i.id).collect();
        let Some(order) = build_order_map(&ids, impl_id, direction) else {
            return Ok(false);
        };
        self.loading = true;
        let result = services.implementations.reorder(model_id, &order).await;
        self.finish(services, result).await?;
        Ok(true)
    }

    fn require_model(&self) -> ApiResult<Uuid> {
        self.model_id
            .ok_or_else(|| ApiError::InvalidInput("no model selected".into()))
    }

    async fn finish<T>(&mut self, services: &Services, result: ApiResult<T>) -> ApiResult<T> {
        match &result {
            Ok(_) => {
                if let Some(model_id) = self.model_id {
                    if let Ok(mut impls) = services.implementations.get_all(model_id).await {
                        impls.sort_by_key(|i| i.sort_order);
                        self.implementations = impls;
                    }
                }
                self.error = None;
                crate::bus::global().publish(crate::bus::SessionEvent::CollectionRefreshed {
                    resource: "implementations",
                });
            }
            Err(e) => self.error = Some(e.to_string()),
        }
        self.loading = false;
        result
    }
}
