//! Parameter preset state for the chat settings dialog.

use uuid::Uuid;

use crate::api::types::{ModelParameters, ParameterPreset, PresetDraft};
use crate::api::Services;
use crate::error::ApiResult;

#[derive(Debug, Default)]
pub struct PresetStore {
    pub presets: Vec<ParameterPreset>,
    pub loading: bool,
    pub error: Option<String>,
}

impl PresetStore {
    pub async fn fetch(&mut self, services: &Services) {
        self.loading = true;
        match services.presets.get_all().await {
            Ok(presets) => {
                self.presets = presets;
                self.error = None;
            }
            Err(e) => self.error = Some(e.to_string()),
        }
        self.loading = false;
    }

    pub async fn create(
        &mut self,
        services: &Services,
        draft: &PresetDraft,
    ) -> ApiResult<ParameterPreset> {
        self.loading = true;
        let result = services.presets.create(draft).await;
        self.finish(services, result).await
    }

    pub async fn delete(&mut self, services: &Services, id: Uuid) -> ApiResult<()> {
        self.loading = true;
        let result = services.presets.delete(id).await;
        self.finish(services, result).await
    }

    /// Applying a preset copies its parameters into the caller's draft;
    /// nothing is sent to the gateway.
    pub fn select(&self, id: Uuid) -> Option<ModelParameters> {
        self.presets
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.parameters.clone())
    }

    async fn finish<T>(&mut self, services: &Services, result: ApiResult<T>) -> ApiResult<T> {
        match &result {
            Ok(_) => {
                if let Ok(presets) = services.presets.get_all().await {
                    self.presets = presets;
                }
                self.error = None;
            }
            Err(e) => self.error = Some(e.to_string()),
        }
        self.loading = false;
        result
    }
}
