//! Domain entity definitions for the gateway API.
//!
//! Types are defined once, in the UI's casing (camelCase). The recursive
//! casing converter in [`crate::casing`] is the only translation point to the
//! gateway's snake_case wire format; nothing below should ever see a
//! snake_case key.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How a provider's free allowance is granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FreeQuotaType {
    /// A credit amount in cash terms
    Credit,
    /// A token allowance shared across all models
    SharedTokens,
    /// An independent token allowance per model implementation
    PerModelTokens,
}

/// How often a free quota resets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResetPeriod {
    #[default]
    Never,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl ResetPeriod {
    pub const ALL: [ResetPeriod; 5] = [
        ResetPeriod::Never,
        ResetPeriod::Daily,
        ResetPeriod::Weekly,
        ResetPeriod::Monthly,
        ResetPeriod::Yearly,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ResetPeriod::Never => "永不重置",
            ResetPeriod::Daily => "每天重置",
            ResetPeriod::Weekly => "每周重置",
            ResetPeriod::Monthly => "每月重置",
            ResetPeriod::Yearly => "每年重置",
        }
    }
}

/// Free allowance attached to a provider. The UI shows at most one active
/// quota per provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreeQuota {
    pub id: Uuid,
    pub provider_id: Uuid,
    /// Required when the owning provider's quota type is PER_MODEL_TOKENS.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_implementation_id: Option<Uuid>,
    pub amount: f64,
    pub reset_period: ResetPeriod,
}

/// Credential owned by exactly one provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKey {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub alias: String,
    /// Masked form returned on reads (e.g. "sk-...abc").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_preview: Option<String>,
    /// Write-only: present on create/update payloads, never returned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Display position; a dense permutation of the provider's key list.
    #[serde(default)]
    pub sort_order: usize,
}

/// A registered model provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provider {
    pub id: Uuid,
    pub name: String,
    pub base_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub free_quota_type: Option<FreeQuotaType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub free_quota: Option<FreeQuota>,
    /// Only populated in detailed responses.
    #[serde(default)]
    pub api_keys: Vec<ApiKey>,
    #[serde(default)]
    pub api_keys_count: usize,
}

/// Capability tags a logical model can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModelCapability {
    TextGeneration,
    FunctionCalling,
    Vision,
    Audio,
    Embedding,
}

impl ModelCapability {
    pub const ALL: [ModelCapability; 5] = [
        ModelCapability::TextGeneration,
        ModelCapability::FunctionCalling,
        ModelCapability::Vision,
        ModelCapability::Audio,
        ModelCapability::Embedding,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelCapability::TextGeneration => "text-generation",
            ModelCapability::FunctionCalling => "function-calling",
            ModelCapability::Vision => "vision",
            ModelCapability::Audio => "audio",
            ModelCapability::Embedding => "embedding",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.as_str() == s.trim())
    }
}

/// A logical model, independent of any provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub capabilities: Vec<ModelCapability>,
    /// Free-text series name (e.g. "GPT-4", "Claude 3").
    pub family: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingMode {
    #[default]
    Token,
    Request,
    Minute,
    Hybrid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingTier {
    pub tier_name: String,
    pub volume_threshold: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_price: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeaturePricing {
    pub feature_name: String,
    pub additional_price: f64,
    pub price_unit: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Allowance {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requests: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_period: Option<String>,
}

/// Pricing details embedded in a model implementation; not independently
/// addressable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingInfo {
    pub currency: String,
    pub billing_mode: BillingMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minute_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tiers: Option<Vec<PricingTier>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special_features: Option<Vec<FeaturePricing>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub free_allowance: Option<Allowance>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_charge: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A provider-specific implementation of a logical model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelImplementation {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub model_id: Uuid,
    /// The provider's own model identifier string.
    pub provider_model_id: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_window: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pricing_info: Option<PricingInfo>,
    pub is_available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_parameters: Option<serde_json::Value>,
    /// Per-model display ordering; same reorder contract as API keys.
    #[serde(default)]
    pub sort_order: usize,
}

/// Sampling parameters sent with a chat request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ModelParameters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f64>,
}

/// Saved parameter set, optionally scoped to one implementation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterPreset {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    pub parameters: ModelParameters,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_implementation_id: Option<Uuid>,
}

/// Token/latency metadata attached to a model response.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_count: Option<u64>,
    /// Seconds from dispatch to completion, as reported by the gateway.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time: Option<f64>,
}

/// One model's answer within a conversation turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelResponse {
    pub id: Uuid,
    pub turn_id: Uuid,
    pub model_implementation_id: Uuid,
    /// Denormalized implementation details, when the gateway includes them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_implementation: Option<ModelImplementation>,
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub is_selected: bool,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ResponseMetadata>,
    /// Which edited version of the user input produced this response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_version_id: Option<Uuid>,
    /// Per-model failure reported by the gateway's fan-out.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Edit-history entry for a turn's user message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInputVersion {
    pub id: Uuid,
    pub turn_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// One user message plus the responses it produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationTurn {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub user_input: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
    /// Soft delete: deleted turns stay in the list but are skipped by the UI.
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_parameters: Option<ModelParameters>,
    /// Which response is the selected context for follow-up turns.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_response_id: Option<Uuid>,
    #[serde(default)]
    pub responses: Vec<ModelResponse>,
    #[serde(default)]
    pub input_versions: Vec<UserInputVersion>,
}

impl ConversationTurn {
    /// Responses that are visible in the UI (not soft-deleted).
    pub fn visible_responses(&self) -> impl Iterator<Item = &ModelResponse> {
        self.responses.iter().filter(|r| !r.is_deleted)
    }
}

/// A chat conversation owning an ordered list of turns.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    #[serde(default)]
    pub turns: Vec<ConversationTurn>,
}

/// Payload for `POST /chat/multi`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiChatRequest {
    pub conversation_id: Uuid,
    /// Implementation ids to fan the message out to (server-side).
    pub model_implementations: Vec<Uuid>,
    pub message: String,
    pub parameters: ModelParameters,
}

/// Result of `POST /chat/multi`: the confirmed turn id plus one response per
/// requested implementation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiChatResponse {
    pub turn_id: Uuid,
    pub responses: Vec<ModelResponse>,
}

/// Draft payloads for creates/updates. The gateway assigns ids, so drafts
/// carry only the writable fields.
#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProviderDraft {
    pub name: String,
    pub base_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub free_quota_type: Option<FreeQuotaType>,
}

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyDraft {
    pub alias: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FreeQuotaDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_implementation_id: Option<Uuid>,
    pub amount: f64,
    pub reset_period: ResetPeriod,
}

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ModelDraft {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub capabilities: Vec<ModelCapability>,
    pub family: String,
}

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ImplementationDraft {
    pub provider_id: Option<Uuid>,
    pub provider_model_id: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_window: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pricing_info: Option<PricingInfo>,
    pub is_available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_parameters: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ConversationDraft {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PresetDraft {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub parameters: ModelParameters,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_implementation_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_capability_wire_form() {
        assert_eq!(
            serde_json::to_value(ModelCapability::TextGeneration).unwrap(),
            json!("text-generation")
        );
        assert_eq!(ModelCapability::parse("function-calling"), Some(ModelCapability::FunctionCalling));
        assert_eq!(ModelCapability::parse("nope"), None);
    }

    #[test]
    fn test_quota_enums_wire_form() {
        assert_eq!(
            serde_json::to_value(FreeQuotaType::PerModelTokens).unwrap(),
            json!("PER_MODEL_TOKENS")
        );
        assert_eq!(serde_json::to_value(ResetPeriod::Monthly).unwrap(), json!("MONTHLY"));
    }

    #[test]
    fn test_provider_deserializes_from_camel() {
        let ui = json!({
            "id": "4a3c9b1e-0000-0000-0000-000000000001",
            "name": "Claude",
            "baseUrl": "https://api.claude.ai",
            "apiKeysCount": 2,
        });
        let provider: Provider = serde_json::from_value(ui).unwrap();
        assert_eq!(provider.name, "Claude");
        assert_eq!(provider.base_url, "https://api.claude.ai");
        assert_eq!(provider.api_keys_count, 2);
        assert!(provider.api_keys.is_empty());
    }

    #[test]
    fn test_api_key_omits_write_only_key_when_unset() {
        let key = ApiKey {
            id: Uuid::nil(),
            provider_id: Uuid::nil(),
            alias: "默认".to_string(),
            key_preview: Some("sk-...abc".to_string()),
            key: None,
            sort_order: 0,
        };
        let value = serde_json::to_value(&key).unwrap();
        assert!(value.get("key").is_none());
        assert_eq!(value["keyPreview"], json!("sk-...abc"));
    }

    #[test]
    fn test_model_parameters_camel_fields() {
        let params = ModelParameters {
            temperature: Some(0.7),
            top_p: Some(0.9),
            max_tokens: Some(1024),
            ..Default::default()
        };
        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(value, json!({"temperature": 0.7, "topP": 0.9, "maxTokens": 1024}));
    }
}
