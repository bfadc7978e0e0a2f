//! Form state for create/edit dialogs.
//!
//! The admin pages in the browser console validate with field-level required
//! messages before submitting; the same messages are kept here. A form is a
//! flat list of text fields; option-typed fields (capabilities, reset period,
//! billing mode) are entered as text and parsed when the draft is built.

use uuid::Uuid;

use crate::api::types::{
    ApiKey, ApiKeyDraft, BillingMode, ConversationDraft, FreeQuota, FreeQuotaDraft,
    ImplementationDraft, Model, ModelCapability, ModelDraft, ModelImplementation, ModelParameters,
    PresetDraft, PricingInfo, Provider, ProviderDraft, ResetPeriod,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Provider,
    ApiKey,
    Quota,
    Model,
    Implementation,
    Conversation,
    Preset,
}

#[derive(Debug, Clone)]
pub struct FormField {
    pub key: &'static str,
    pub label: &'static str,
    pub value: String,
    /// Validation message shown when the field is required and left blank.
    pub required_message: Option<&'static str>,
    /// Masked in the UI (API keys).
    pub secret: bool,
}

impl FormField {
    fn new(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            value: String::new(),
            required_message: None,
            secret: false,
        }
    }

    fn required(mut self, message: &'static str) -> Self {
        self.required_message = Some(message);
        self
    }

    fn secret(mut self) -> Self {
        self.secret = true;
        self
    }

    fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }
}

#[derive(Debug, Clone)]
pub struct FormState {
    pub kind: FormKind,
    pub title: String,
    pub fields: Vec<FormField>,
    pub focus: usize,
    /// Id of the entity being edited; `None` when creating.
    pub editing: Option<Uuid>,
    pub error: Option<String>,
}

impl FormState {
    fn new(kind: FormKind, title: impl Into<String>, fields: Vec<FormField>) -> Self {
        Self {
            kind,
            title: title.into(),
            fields,
            focus: 0,
            editing: None,
            error: None,
        }
    }

    pub fn focused_field(&self) -> Option<&FormField> {
        self.fields.get(self.focus)
    }

    pub fn focused_field_mut(&mut self) -> Option<&mut FormField> {
        self.fields.get_mut(self.focus)
    }

    pub fn next_field(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + 1) % self.fields.len();
        }
    }

    pub fn prev_field(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
        }
    }

    pub fn insert_char(&mut self, c: char) {
        if let Some(field) = self.focused_field_mut() {
            field.value.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(field) = self.focused_field_mut() {
            field.value.pop();
        }
    }

    fn value(&self, key: &str) -> &str {
        self.fields
            .iter()
            .find(|f| f.key == key)
            .map(|f| f.value.trim())
            .unwrap_or("")
    }

    fn optional(&self, key: &str) -> Option<String> {
        let value = self.value(key);
        (!value.is_empty()).then(|| value.to_string())
    }

    /// Validate required fields in display order. Returns every missing
    /// field's message so the operator sees the full list at once.
    pub fn validate(&self) -> Result<(), Vec<&'static str>> {
        let missing: Vec<&'static str> = self
            .fields
            .iter()
            .filter(|f| f.value.trim().is_empty())
            .filter_map(|f| f.required_message)
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(missing)
        }
    }

    // -- constructors --------------------------------------------------

    pub fn provider(existing: Option<&Provider>) -> Self {
        let mut fields = vec![
            FormField::new("name", "名称").required("请输入提供商名称"),
            FormField::new("baseUrl", "接口地址").required("请输入接口地址"),
            FormField::new("description", "描述"),
            FormField::new("freeQuotaType", "免费额度类型 (CREDIT/SHARED_TOKENS/PER_MODEL_TOKENS)"),
        ];
        let mut form = if let Some(provider) = existing {
            fields[0].value = provider.name.clone();
            fields[1].value = provider.base_url.clone();
            fields[2].value = provider.description.clone().unwrap_or_default();
            if let Some(quota_type) = provider.free_quota_type {
                fields[3].value = serde_json::to_value(quota_type)
                    .ok()
                    .and_then(|v| v.as_str().map(String::from))
                    .unwrap_or_default();
            }
            FormState::new(FormKind::Provider, "编辑提供商", fields)
        } else {
            // Creating: an initial key can be bundled in the same dialog.
            fields.push(FormField::new("keyAlias", "初始密钥别名"));
            fields.push(FormField::new("key", "初始API密钥").secret());
            FormState::new(FormKind::Provider, "添加提供商", fields)
        };
        form.editing = existing.map(|p| p.id);
        form
    }

    pub fn api_key(existing: Option<&ApiKey>) -> Self {
        let mut fields = vec![FormField::new("alias", "别名").required("请输入密钥别名")];
        let mut form = if let Some(key) = existing {
            fields[0].value = key.alias.clone();
            // On edit the key itself is optional; blank keeps the stored one.
            fields.push(FormField::new("key", "API密钥 (留空保持不变)").secret());
            FormState::new(FormKind::ApiKey, "编辑密钥", fields)
        } else {
            fields.push(FormField::new("key", "API密钥").required("请输入API密钥").secret());
            FormState::new(FormKind::ApiKey, "添加密钥", fields)
        };
        form.editing = existing.map(|k| k.id);
        form
    }

    pub fn quota(existing: Option<&FreeQuota>, per_model: bool) -> Self {
        let mut fields = vec![
            FormField::new("amount", "额度").required("请输入额度"),
            FormField::new("resetPeriod", "重置周期 (NEVER/DAILY/WEEKLY/MONTHLY/YEARLY)")
                .with_value("NEVER"),
        ];
        if per_model {
            fields.push(
                FormField::new("modelImplementationId", "模型实现ID").required("请选择模型实现"),
            );
        }
        if let Some(quota) = existing {
            fields[0].value = quota.amount.to_string();
            fields[1].value = serde_json::to_value(quota.reset_period)
                .ok()
                .and_then(|v| v.as_str().map(String::from))
                .unwrap_or_default();
            if per_model {
                if let Some(id) = quota.model_implementation_id {
                    fields[2].value = id.to_string();
                }
            }
        }
        let mut form = FormState::new(FormKind::Quota, "免费额度", fields);
        form.editing = existing.map(|q| q.id);
        form
    }

    pub fn model(existing: Option<&Model>) -> Self {
        let mut fields = vec![
            FormField::new("name", "名称").required("请输入模型名称"),
            FormField::new("capabilities", "能力 (逗号分隔)").required("请选择模型能力"),
            FormField::new("family", "系列").required("请输入模型系列"),
            FormField::new("description", "描述"),
        ];
        let mut form = if let Some(model) = existing {
            fields[0].value = model.name.clone();
            fields[1].value = model
                .capabilities
                .iter()
                .map(|c| c.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            fields[2].value = model.family.clone();
            fields[3].value = model.description.clone().unwrap_or_default();
            FormState::new(FormKind::Model, "编辑模型", fields)
        } else {
            FormState::new(FormKind::Model, "添加模型", fields)
        };
        form.editing = existing.map(|m| m.id);
        form
    }

    pub fn implementation(existing: Option<&ModelImplementation>) -> Self {
        let mut fields = vec![
            FormField::new("providerId", "提供商ID").required("请选择提供商"),
            FormField::new("providerModelId", "提供商模型ID").required("请输入提供商模型ID"),
            FormField::new("version", "版本").required("请输入版本"),
            FormField::new("contextWindow", "上下文窗口"),
            FormField::new("currency", "货币").with_value("USD"),
            FormField::new("billingMode", "计费模式 (token/request/minute/hybrid)")
                .with_value("token"),
            FormField::new("inputPrice", "输入价格"),
            FormField::new("outputPrice", "输出价格"),
            FormField::new("isAvailable", "可用 (true/false)").with_value("true"),
        ];
        let mut form = if let Some(implementation) = existing {
            fields[0].value = implementation.provider_id.to_string();
            fields[1].value = implementation.provider_model_id.clone();
            fields[2].value = implementation.version.clone();
            if let Some(window) = implementation.context_window {
                fields[3].value = window.to_string();
            }
            if let Some(pricing) = &implementation.pricing_info {
                fields[4].value = pricing.currency.clone();
                fields[5].value = serde_json::to_value(pricing.billing_mode)
                    .ok()
                    .and_then(|v| v.as_str().map(String::from))
                    .unwrap_or_default();
                if let Some(price) = pricing.input_price {
                    fields[6].value = price.to_string();
                }
                if let Some(price) = pricing.output_price {
                    fields[7].value = price.to_string();
                }
            }
            fields[8].value = implementation.is_available.to_string();
            FormState::new(FormKind::Implementation, "编辑模型实现", fields)
        } else {
            FormState::new(FormKind::Implementation, "添加模型实现", fields)
        };
        form.editing = existing.map(|i| i.id);
        form
    }

    pub fn conversation() -> Self {
        FormState::new(
            FormKind::Conversation,
            "新建会话",
            vec![
                FormField::new("title", "标题").required("请输入会话标题"),
                FormField::new("systemPrompt", "系统提示词"),
            ],
        )
    }

    pub fn preset(parameters: &ModelParameters) -> Self {
        let mut fields = vec![
            FormField::new("name", "名称").required("请输入预设名称"),
            FormField::new("description", "描述"),
            FormField::new("temperature", "temperature"),
            FormField::new("topP", "topP"),
            FormField::new("maxTokens", "maxTokens"),
        ];
        if let Some(t) = parameters.temperature {
            fields[2].value = t.to_string();
        }
        if let Some(p) = parameters.top_p {
            fields[3].value = p.to_string();
        }
        if let Some(m) = parameters.max_tokens {
            fields[4].value = m.to_string();
        }
        FormState::new(FormKind::Preset, "保存参数预设", fields)
    }

    // -- draft builders ------------------------------------------------

    /// Build the provider draft plus the optional bundled initial key
    /// (create only; both alias and key must be present to bundle one).
    pub fn provider_draft(&self) -> Result<(ProviderDraft, Option<ApiKeyDraft>), String> {
        let free_quota_type = match self.optional("freeQuotaType") {
            Some(raw) => Some(
                serde_json::from_value(serde_json::Value::String(raw.to_uppercase()))
                    .map_err(|_| "无效的免费额度类型".to_string())?,
            ),
            None => None,
        };
        let draft = ProviderDraft {
            name: self.value("name").to_string(),
            base_url: self.value("baseUrl").to_string(),
            description: self.optional("description"),
            free_quota_type,
        };
        let initial_key = match (self.optional("keyAlias"), self.optional("key")) {
            (Some(alias), Some(key)) => Some(ApiKeyDraft {
                alias,
                key: Some(key),
            }),
            _ => None,
        };
        Ok((draft, initial_key))
    }

    pub fn api_key_draft(&self) -> ApiKeyDraft {
        ApiKeyDraft {
            alias: self.value("alias").to_string(),
            key: self.optional("key"),
        }
    }

    pub fn quota_draft(&self) -> Result<FreeQuotaDraft, String> {
        let amount: f64 = self
            .value("amount")
            .parse()
            .map_err(|_| "请输入有效的额度数值".to_string())?;
        let reset_period: ResetPeriod = serde_json::from_value(serde_json::Value::String(
            self.value("resetPeriod").to_uppercase(),
        ))
        .map_err(|_| "无效的重置周期".to_string())?;
        let model_implementation_id = match self.optional("modelImplementationId") {
            Some(raw) => Some(raw.parse::<Uuid>().map_err(|_| "无效的模型实现ID".to_string())?),
            None => None,
        };
        Ok(FreeQuotaDraft {
            model_implementation_id,
            amount,
            reset_period,
        })
    }

    pub fn model_draft(&self) -> Result<ModelDraft, String> {
        let capabilities: Vec<ModelCapability> = self
            .value("capabilities")
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(|s| ModelCapability::parse(s).ok_or_else(|| format!("未知的模型能力: {}", s.trim())))
            .collect::<Result<_, _>>()?;
        if capabilities.is_empty() {
            return Err("请选择模型能力".to_string());
        }
        Ok(ModelDraft {
            name: self.value("name").to_string(),
            description: self.optional("description"),
            capabilities,
            family: self.value("family").to_string(),
        })
    }

    pub fn implementation_draft(&self) -> Result<ImplementationDraft, String> {
        let provider_id: Uuid = self
            .value("providerId")
            .parse()
            .map_err(|_| "请选择提供商".to_string())?;
        let context_window = match self.optional("contextWindow") {
            Some(raw) => Some(raw.parse::<u64>().map_err(|_| "无效的上下文窗口".to_string())?),
            None => None,
        };
        let billing_mode: BillingMode = serde_json::from_value(serde_json::Value::String(
            self.value("billingMode").to_lowercase(),
        ))
        .map_err(|_| "无效的计费模式".to_string())?;
        let input_price = self.parse_price("inputPrice")?;
        let output_price = self.parse_price("outputPrice")?;

        // Pricing is assembled only when at least one price is given.
        let pricing_info = if input_price.is_some() || output_price.is_some() {
            Some(PricingInfo {
                currency: self.value("currency").to_string(),
                billing_mode,
                input_price,
                output_price,
                request_price: None,
                minute_price: None,
                tiers: None,
                special_features: None,
                free_allowance: None,
                minimum_charge: None,
                effective_date: None,
                notes: None,
            })
        } else {
            None
        };

        Ok(ImplementationDraft {
            provider_id: Some(provider_id),
            provider_model_id: self.value("providerModelId").to_string(),
            version: self.value("version").to_string(),
            context_window,
            pricing_info,
            is_available: self.value("isAvailable") != "false",
            custom_parameters: None,
        })
    }

    pub fn conversation_draft(&self) -> ConversationDraft {
        ConversationDraft {
            title: self.value("title").to_string(),
            system_prompt: self.optional("systemPrompt"),
        }
    }

    pub fn preset_draft(&self) -> Result<PresetDraft, String> {
        let parameters = ModelParameters {
            temperature: self.parse_price("temperature")?,
            top_p: self.parse_price("topP")?,
            max_tokens: match self.optional("maxTokens") {
                Some(raw) => Some(raw.parse::<u32>().map_err(|_| "无效的 maxTokens".to_string())?),
                None => None,
            },
            frequency_penalty: None,
            presence_penalty: None,
        };
        Ok(PresetDraft {
            name: self.value("name").to_string(),
            description: self.optional("description"),
            parameters,
            model_implementation_id: None,
        })
    }

    fn parse_price(&self, key: &str) -> Result<Option<f64>, String> {
        match self.optional(key) {
            Some(raw) => raw
                .parse::<f64>()
                .map(Some)
                .map_err(|_| format!("无效的数值: {}", key)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn set(form: &mut FormState, key: &str, value: &str) {
        let field = form.fields.iter_mut().find(|f| f.key == key).unwrap();
        field.value = value.to_string();
    }

    #[test]
    fn test_provider_form_reports_every_missing_field() {
        // Submitting an empty add form lists both the name and the base URL.
        let form = FormState::provider(None);
        assert_eq!(form.validate(), Err(vec!["请输入提供商名称", "请输入接口地址"]));

        let mut form = FormState::provider(None);
        set(&mut form, "name", "OpenAI");
        assert_eq!(form.validate(), Err(vec!["请输入接口地址"]));

        set(&mut form, "baseUrl", "https://api.openai.com/v1");
        assert_eq!(form.validate(), Ok(()));
    }

    #[test]
    fn test_provider_draft_bundles_initial_key_only_when_complete() {
        let mut form = FormState::provider(None);
        set(&mut form, "name", "OpenAI");
        set(&mut form, "baseUrl", "https://api.openai.com/v1");
        set(&mut form, "keyAlias", "default");
        let (_, key) = form.provider_draft().unwrap();
        assert!(key.is_none());

        set(&mut form, "key", "sk-secret");
        let (draft, key) = form.provider_draft().unwrap();
        assert_eq!(draft.name, "OpenAI");
        let key = key.unwrap();
        assert_eq!(key.alias, "default");
        assert_eq!(key.key.as_deref(), Some("sk-secret"));
    }

    #[test]
    fn test_api_key_form_requires_key_only_on_create() {
        let mut create = FormState::api_key(None);
        set(&mut create, "alias", "prod");
        assert_eq!(create.validate(), Err(vec!["请输入API密钥"]));

        let existing = ApiKey {
            id: Uuid::nil(),
            provider_id: Uuid::nil(),
            alias: "prod".to_string(),
            key_preview: None,
            key: None,
            sort_order: 0,
        };
        let edit = FormState::api_key(Some(&existing));
        assert_eq!(edit.validate(), Ok(()));
        assert!(edit.api_key_draft().key.is_none());
    }

    #[test]
    fn test_model_draft_parses_capabilities() {
        let mut form = FormState::model(None);
        set(&mut form, "name", "GPT-4");
        set(&mut form, "capabilities", "text-generation, vision");
        set(&mut form, "family", "GPT-4");
        let draft = form.model_draft().unwrap();
        assert_eq!(
            draft.capabilities,
            vec![ModelCapability::TextGeneration, ModelCapability::Vision]
        );

        set(&mut form, "capabilities", "telepathy");
        assert!(form.model_draft().is_err());
    }

    #[test]
    fn test_implementation_form_messages() {
        let form = FormState::implementation(None);
        assert_eq!(
            form.validate(),
            Err(vec!["请选择提供商", "请输入提供商模型ID", "请输入版本"])
        );

        let mut form = FormState::implementation(None);
        set(&mut form, "providerId", Uuid::from_u128(7).to_string().as_str());
        assert_eq!(form.validate(), Err(vec!["请输入提供商模型ID", "请输入版本"]));
        set(&mut form, "providerModelId", "gpt-4o");
        assert_eq!(form.validate(), Err(vec!["请输入版本"]));
    }

    #[test]
    fn test_implementation_pricing_assembled_at_submit() {
        let mut form = FormState::implementation(None);
        set(&mut form, "providerId", Uuid::from_u128(7).to_string().as_str());
        set(&mut form, "providerModelId", "gpt-4o");
        set(&mut form, "version", "2024-08-06");
        let draft = form.implementation_draft().unwrap();
        assert!(draft.pricing_info.is_none());

        set(&mut form, "inputPrice", "2.5");
        set(&mut form, "outputPrice", "10");
        let draft = form.implementation_draft().unwrap();
        let pricing = draft.pricing_info.unwrap();
        assert_eq!(pricing.input_price, Some(2.5));
        assert_eq!(pricing.output_price, Some(10.0));
        assert_eq!(pricing.billing_mode, BillingMode::Token);
    }

    #[test]
    fn test_quota_draft_parses_period() {
        let mut form = FormState::quota(None, false);
        set(&mut form, "amount", "10000");
        set(&mut form, "resetPeriod", "monthly");
        let draft = form.quota_draft().unwrap();
        assert_eq!(draft.amount, 10000.0);
        assert_eq!(draft.reset_period, ResetPeriod::Monthly);

        set(&mut form, "amount", "lots");
        assert!(form.quota_draft().is_err());
    }
}
