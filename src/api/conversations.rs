//! Conversation, turn, and parameter-preset services.

use std::sync::Arc;
use uuid::Uuid;

use crate::api::client::ApiClient;
use crate::api::resource::{ResourcePaths, ResourceService};
use crate::api::types::{
    Conversation, ConversationDraft, ConversationTurn, ParameterPreset, PresetDraft,
};
use crate::error::ApiResult;

#[derive(Debug, Clone)]
pub struct ConversationService {
    inner: ResourceService<Conversation>,
}

impl ConversationService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            inner: ResourceService::new(
                client,
                ResourcePaths {
                    collection: "/conversations/",
                    item: "/conversations",
                },
            ),
        }
    }

    pub async fn get_all(&self) -> ApiResult<Vec<Conversation>> {
        self.inner.get_all(None).await
    }

    pub async fn get_one(&self, id: Uuid) -> ApiResult<Conversation> {
        self.inner.get_one(&id.to_string()).await
    }

    pub async fn create(&self, draft: &ConversationDraft) -> ApiResult<Conversation> {
        self.inner.create(None, draft).await
    }

    pub async fn update(&self, id: Uuid, draft: &ConversationDraft) -> ApiResult<Conversation> {
        self.inner.update(&id.to_string(), draft).await
    }

    pub async fn delete(&self, id: Uuid) -> ApiResult<()> {
        self.inner.delete(&id.to_string()).await
    }

    /// Turn summaries for a conversation, in order. Soft-deleted turns are
    /// included with `isDeleted` set.
    pub async fn get_turns(&self, conversation_id: Uuid) -> ApiResult<Vec<ConversationTurn>> {
        let path = format!("/conversations/{}/turns", conversation_id);
        self.inner.client().get(&path).await
    }

    /// Full turn detail: responses and input versions.
    pub async fn get_turn(&self, conversation_id: Uuid, turn_id: Uuid) -> ApiResult<ConversationTurn> {
        let path = format!("/conversations/{}/turns/{}", conversation_id, turn_id);
        self.inner.client().get(&path).await
    }

    /// Soft delete: the gateway flips `isDeleted` and keeps the record.
    pub async fn delete_turn(&self, conversation_id: Uuid, turn_id: Uuid) -> ApiResult<()> {
        let path = format!("/conversations/{}/turns/{}", conversation_id, turn_id);
        self.inner.client().delete(&path).await
    }
}

#[derive(Debug, Clone)]
pub struct PresetService {
    inner: ResourceService<ParameterPreset>,
}

impl PresetService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            inner: ResourceService::new(
                client,
                ResourcePaths {
                    collection: "/conversations/parameter-presets",
                    item: "/conversations/parameter-presets",
                },
            ),
        }
    }

    pub async fn get_all(&self) -> ApiResult<Vec<ParameterPreset>> {
        self.inner.get_all(None).await
    }

    pub async fn create(&self, draft: &PresetDraft) -> ApiResult<ParameterPreset> {
        self.inner.create(None, draft).await
    }

    pub async fn delete(&self, id: Uuid) -> ApiResult<()> {
        self.inner.delete(&id.to_string()).await
    }
}
