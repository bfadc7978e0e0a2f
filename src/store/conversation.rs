//! Conversation and chat-turn state.
//!
//! Sending a message is optimistic: the turn appears immediately under a
//! temporary id and is reconciled (or rolled back) when the gateway answers.
//! Slow transitions are split into pure `begin_*`/`apply_*` halves so the
//! event loop can run the HTTP call on a spawned task; every `apply_*` carries
//! the generation the call was started under and is discarded when the user
//! has switched conversations since.

use uuid::Uuid;

use crate::api::types::{
    Conversation, ConversationDraft, ConversationTurn, ModelParameters, MultiChatRequest,
    MultiChatResponse,
};
use crate::api::Services;
use crate::error::{ApiError, ApiResult};
use crate::id;

/// One entry in the visible turn list.
#[derive(Debug, Clone)]
pub enum TurnState {
    /// Optimistically inserted, not yet confirmed by the gateway.
    Pending { temp_id: String, content: String },
    Confirmed(ConversationTurn),
}

impl TurnState {
    pub fn user_input(&self) -> &str {
        match self {
            TurnState::Pending { content, .. } => content,
            TurnState::Confirmed(turn) => &turn.user_input,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, TurnState::Pending { .. })
    }
}

#[derive(Debug, Default)]
pub struct ConversationStore {
    pub conversations: Vec<Conversation>,
    pub selected: Option<Uuid>,
    pub turns: Vec<TurnState>,
    /// Bumped on every conversation switch; stale async results are dropped.
    pub generation: u64,
    pub loading: bool,
    pub sending: bool,
    pub error: Option<String>,
}

impl ConversationStore {
    pub fn selected_conversation(&self) -> Option<&Conversation> {
        let id = self.selected?;
        self.conversations.iter().find(|c| c.id == id)
    }

    /// Fetch the conversation list. Selects the first conversation when
    /// nothing is selected yet and returns the generation to load turns
    /// under, or `None` when there is nothing to load.
    pub async fn fetch_conversations(&mut self, services: &Services) -> Option<u64> {
        self.loading = true;
        match services.conversations.get_all().await {
            Ok(conversations) => {
                self.conversations = conversations;
                self.error = None;
            }
            Err(e) => {
                self.error = Some(e.to_string());
                self.loading = false;
                return None;
            }
        }
        self.loading = false;

        let still_selected = self
            .selected
            .is_some_and(|id| self.conversations.iter().any(|c| c.id == id));
        if still_selected {
            return Some(self.generation);
        }
        let first = self.conversations.first().map(|c| c.id)?;
        Some(self.select(first))
    }

    /// Switch the active conversation. Clears the turn list and bumps the
    /// generation so in-flight loads and sends for the old one are dropped.
    pub fn select(&mut self, id: Uuid) -> u64 {
        self.selected = Some(id);
        self.turns.clear();
        self.generation += 1;
        self.loading = true;
        self.generation
    }

    /// Install the turns loaded for `generation`, unless the user has moved
    /// on since the load started.
    pub fn apply_load(&mut self, generation: u64, result: ApiResult<Vec<ConversationTurn>>) {
        if generation != self.generation {
            return;
        }
        match result {
            Ok(turns) => {
                self.turns = turns.into_iter().map(TurnState::Confirmed).collect();
                self.error = None;
            }
            Err(e) => self.error = Some(e.to_string()),
        }
        self.loading = false;
    }

    /// Validate and stage a multi-model send. On success the pending turn is
    /// already in `turns` and the returned request is ready to dispatch; the
    /// caller passes the temp id and current generation to [`apply_send`]
    /// with the outcome.
    ///
    /// Returns `None` without touching any state when the message is blank,
    /// no implementation is selected, or no conversation is active.
    pub fn begin_send(
        &mut self,
        message: &str,
        implementations: &[Uuid],
        parameters: ModelParameters,
    ) -> Option<(String, MultiChatRequest)> {
        let message = message.trim();
        if message.is_empty() || implementations.is_empty() || self.sending {
            return None;
        }
        let conversation_id = self.selected?;

        let temp_id = id::temp_id();
        self.turns.push(TurnState::Pending {
            temp_id: temp_id.clone(),
            content: message.to_string(),
        });
        self.sending = true;
        Some((
            temp_id,
            MultiChatRequest {
                conversation_id,
                model_implementations: implementations.to_vec(),
                message: message.to_string(),
                parameters,
            },
        ))
    }

    /// Reconcile a finished send. The pending turn identified by `temp_id`
    /// is replaced with the confirmed turn on success and removed on failure.
    pub fn apply_send(
        &mut self,
        generation: u64,
        temp_id: &str,
        result: ApiResult<MultiChatResponse>,
    ) {
        if generation != self.generation {
            // The pending turn was already cleared by the switch.
            return;
        }
        self.sending = false;

        let position = self.turns.iter().position(|t| {
            matches!(t, TurnState::Pending { temp_id: id, .. } if id == temp_id)
        });
        match result {
            Ok(response) => {
                let Some(position) = position else {
                    return;
                };
                let content = self.turns[position].user_input().to_string();
                let conversation_id = self.selected.unwrap_or_default();
                self.turns[position] = TurnState::Confirmed(ConversationTurn {
                    id: response.turn_id,
                    conversation_id,
                    user_input: content,
                    created_at: chrono::Utc::now(),
                    modified_at: None,
                    is_deleted: false,
                    model_parameters: None,
                    active_response_id: None,
                    responses: response.responses,
                    input_versions: Vec::new(),
                });
                self.error = None;
            }
            Err(e) => {
                if let Some(position) = position {
                    self.turns.remove(position);
                }
                self.error = Some(e.to_string());
            }
        }
    }

    /// Mark a response as the turn's active context. Local mutation applied
    /// after the gateway call succeeds.
    pub fn apply_select_response(&mut self, turn_id: Uuid, response_id: Uuid) {
        if let Some(turn) = self.confirmed_mut(turn_id) {
            turn.active_response_id = Some(response_id);
            for response in &mut turn.responses {
                response.is_selected = response.id == response_id;
            }
        }
    }

    /// Soft-delete a response locally after the gateway call succeeds.
    pub fn apply_delete_response(&mut self, turn_id: Uuid, response_id: Uuid) {
        if let Some(turn) = self.confirmed_mut(turn_id) {
            if let Some(response) = turn.responses.iter_mut().find(|r| r.id == response_id) {
                response.is_deleted = true;
            }
            if turn.active_response_id == Some(response_id) {
                turn.active_response_id = None;
            }
        }
    }

    pub async fn delete_turn(&mut self, services: &Services, turn_id: Uuid) -> ApiResult<()> {
        let conversation_id = self.require_conversation()?;
        services.conversations.delete_turn(conversation_id, turn_id).await?;
        if let Some(turn) = self.confirmed_mut(turn_id) {
            turn.is_deleted = true;
        }
        Ok(())
    }

    /// Create a conversation, refetch the list, and switch to it. Returns the
    /// generation to load turns under.
    pub async fn create_conversation(
        &mut self,
        services: &Services,
        draft: &ConversationDraft,
    ) -> ApiResult<u64> {
        self.loading = true;
        let result = services.conversations.create(draft).await;
        let created = match result {
            Ok(created) => created,
            Err(e) => {
                self.error = Some(e.to_string());
                self.loading = false;
                return Err(e);
            }
        };
        if let Ok(conversations) = services.conversations.get_all().await {
            self.conversations = conversations;
        }
        self.error = None;
        Ok(self.select(created.id))
    }

    /// Delete a conversation. When it was the selected one, selection falls
    /// back to the first remaining conversation; the returned generation, if
    /// any, belongs to the new selection.
    pub async fn delete_conversation(
        &mut self,
        services: &Services,
        conversation_id: Uuid,
    ) -> ApiResult<Option<u64>> {
        self.loading = true;
        if let Err(e) = services.conversations.delete(conversation_id).await {
            self.error = Some(e.to_string());
            self.loading = false;
            return Err(e);
        }
        if let Ok(conversations) = services.conversations.get_all().await {
            self.conversations = conversations;
        } else {
            self.conversations.retain(|c| c.id != conversation_id);
        }
        self.error = None;
        self.loading = false;

        if self.selected == Some(conversation_id) {
            self.selected = None;
            self.turns.clear();
            self.generation += 1;
            if let Some(first) = self.conversations.first().map(|c| c.id) {
                return Ok(Some(self.select(first)));
            }
        }
        Ok(None)
    }

    fn confirmed_mut(&mut self, turn_id: Uuid) -> Option<&mut ConversationTurn> {
        self.turns.iter_mut().find_map(|t| match t {
            TurnState::Confirmed(turn) if turn.id == turn_id => Some(turn),
            _ => None,
        })
    }

    fn require_conversation(&self) -> ApiResult<Uuid> {
        self.selected
            .ok_or_else(|| ApiError::InvalidInput("no conversation selected".into()))
    }
}

/// Load the full turn history for a conversation: summaries first, then each
/// non-deleted turn's detail in sequence to keep the gateway's ordering.
pub async fn load_turns(
    services: &Services,
    conversation_id: Uuid,
) -> ApiResult<Vec<ConversationTurn>> {
    let summaries = services.conversations.get_turns(conversation_id).await?;
    let mut turns = Vec::with_capacity(summaries.len());
    for summary in summaries {
        if summary.is_deleted {
            turns.push(summary);
            continue;
        }
        let detail = services.conversations.get_turn(conversation_id, summary.id).await?;
        turns.push(detail);
    }
    Ok(turns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{ModelResponse, ResponseMetadata};
    use pretty_assertions::assert_eq;

    fn store_with_selection() -> ConversationStore {
        let mut store = ConversationStore::default();
        store.selected = Some(Uuid::from_u128(1));
        store.generation = 1;
        store
    }

    fn response(id: u128, implementation: u128) -> ModelResponse {
        ModelResponse {
            id: Uuid::from_u128(id),
            turn_id: Uuid::from_u128(99),
            model_implementation_id: Uuid::from_u128(implementation),
            model_implementation: None,
            content: "hi".to_string(),
            created_at: chrono::Utc::now(),
            is_selected: false,
            is_deleted: false,
            metadata: Some(ResponseMetadata::default()),
            input_version_id: None,
            error: None,
        }
    }

    #[test]
    fn test_begin_send_rejects_blank_message() {
        let mut store = store_with_selection();
        let impls = [Uuid::from_u128(10)];
        assert!(store.begin_send("   ", &impls, ModelParameters::default()).is_none());
        assert!(store.turns.is_empty());
        assert!(!store.sending);
    }

    #[test]
    fn test_begin_send_requires_implementations() {
        let mut store = store_with_selection();
        assert!(store.begin_send("hello", &[], ModelParameters::default()).is_none());
        assert!(store.turns.is_empty());
    }

    #[test]
    fn test_begin_send_inserts_pending_turn() {
        let mut store = store_with_selection();
        let impls = [Uuid::from_u128(10), Uuid::from_u128(11)];
        let (temp_id, request) = store
            .begin_send("  hello  ", &impls, ModelParameters::default())
            .unwrap();

        assert!(crate::id::is_temp(&temp_id));
        assert_eq!(request.message, "hello");
        assert_eq!(request.model_implementations, impls.to_vec());
        assert_eq!(store.turns.len(), 1);
        assert!(store.turns[0].is_pending());
        assert_eq!(store.turns[0].user_input(), "hello");
        assert!(store.sending);
    }

    #[test]
    fn test_apply_send_replaces_pending_with_confirmed() {
        let mut store = store_with_selection();
        let impls = [Uuid::from_u128(10), Uuid::from_u128(11)];
        let (temp_id, _) = store
            .begin_send("hello", &impls, ModelParameters::default())
            .unwrap();

        let result = MultiChatResponse {
            turn_id: Uuid::from_u128(99),
            responses: vec![response(1, 10), response(2, 11)],
        };
        store.apply_send(store.generation, &temp_id, Ok(result));

        assert!(!store.sending);
        assert_eq!(store.turns.len(), 1);
        let TurnState::Confirmed(turn) = &store.turns[0] else {
            panic!("turn not confirmed");
        };
        assert_eq!(turn.id, Uuid::from_u128(99));
        assert_eq!(turn.user_input, "hello");
        // one response per requested implementation
        let impl_ids: Vec<Uuid> = turn.responses.iter().map(|r| r.model_implementation_id).collect();
        assert_eq!(impl_ids, impls.to_vec());
    }

    #[test]
    fn test_apply_send_failure_rolls_back_pending() {
        let mut store = store_with_selection();
        let (temp_id, _) = store
            .begin_send("hello", &[Uuid::from_u128(10)], ModelParameters::default())
            .unwrap();

        store.apply_send(
            store.generation,
            &temp_id,
            Err(ApiError::Api {
                status: 502,
                message: "upstream unavailable".to_string(),
            }),
        );

        assert!(store.turns.is_empty());
        assert_eq!(store.error.as_deref(), Some("upstream unavailable"));
        assert!(!store.sending);
    }

    #[test]
    fn test_stale_send_is_discarded_after_switch() {
        let mut store = store_with_selection();
        let (temp_id, _) = store
            .begin_send("hello", &[Uuid::from_u128(10)], ModelParameters::default())
            .unwrap();
        let sent_under = store.generation;

        store.select(Uuid::from_u128(2));

        let result = MultiChatResponse {
            turn_id: Uuid::from_u128(99),
            responses: vec![response(1, 10)],
        };
        store.apply_send(sent_under, &temp_id, Ok(result));

        // Nothing from the old conversation leaks into the new one.
        assert!(store.turns.is_empty());
        assert!(store.error.is_none());
    }

    #[test]
    fn test_stale_load_is_discarded() {
        let mut store = store_with_selection();
        let old_generation = store.select(Uuid::from_u128(2));
        store.select(Uuid::from_u128(3));

        store.apply_load(
            old_generation,
            Ok(vec![ConversationTurn {
                id: Uuid::from_u128(50),
                conversation_id: Uuid::from_u128(2),
                user_input: "old".to_string(),
                created_at: chrono::Utc::now(),
                modified_at: None,
                is_deleted: false,
                model_parameters: None,
                active_response_id: None,
                responses: Vec::new(),
                input_versions: Vec::new(),
            }]),
        );

        assert!(store.turns.is_empty());
        assert!(store.loading);
    }

    #[test]
    fn test_select_response_updates_flags() {
        let mut store = store_with_selection();
        let turn = ConversationTurn {
            id: Uuid::from_u128(99),
            conversation_id: Uuid::from_u128(1),
            user_input: "hello".to_string(),
            created_at: chrono::Utc::now(),
            modified_at: None,
            is_deleted: false,
            model_parameters: None,
            active_response_id: None,
            responses: vec![response(1, 10), response(2, 11)],
            input_versions: Vec::new(),
        };
        store.turns.push(TurnState::Confirmed(turn));

        store.apply_select_response(Uuid::from_u128(99), Uuid::from_u128(2));

        let TurnState::Confirmed(turn) = &store.turns[0] else {
            panic!("turn not confirmed");
        };
        assert_eq!(turn.active_response_id, Some(Uuid::from_u128(2)));
        assert!(!turn.responses[0].is_selected);
        assert!(turn.responses[1].is_selected);
    }

    #[test]
    fn test_delete_response_clears_active_selection() {
        let mut store = store_with_selection();
        let mut turn = ConversationTurn {
            id: Uuid::from_u128(99),
            conversation_id: Uuid::from_u128(1),
            user_input: "hello".to_string(),
            created_at: chrono::Utc::now(),
            modified_at: None,
            is_deleted: false,
            model_parameters: None,
            active_response_id: Some(Uuid::from_u128(1)),
            responses: vec![response(1, 10)],
            input_versions: Vec::new(),
        };
        turn.responses[0].is_selected = true;
        store.turns.push(TurnState::Confirmed(turn));

        store.apply_delete_response(Uuid::from_u128(99), Uuid::from_u128(1));

        let TurnState::Confirmed(turn) = &store.turns[0] else {
            panic!("turn not confirmed");
        };
        assert!(turn.responses[0].is_deleted);
        assert_eq!(turn.active_response_id, None);
        assert_eq!(turn.visible_responses().count(), 0);
    }
}
