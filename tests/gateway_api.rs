//! Integration tests against a mock gateway.

use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use modelhub::api::client::ApiClient;
use modelhub::api::types::{
    ApiKeyDraft, FreeQuotaDraft, ModelParameters, MultiChatRequest, ProviderDraft, ResetPeriod,
};
use modelhub::api::Services;
use modelhub::store::{KeyStore, MoveDirection};

async fn services(server: &MockServer) -> Services {
    let client = Arc::new(ApiClient::new(&server.uri()).unwrap());
    Services::new(client)
}

#[tokio::test]
async fn error_message_is_extracted_from_detail_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/providers/"))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({"detail": "名称不能为空"})),
        )
        .mount(&server)
        .await;

    let services = services(&server).await;
    let err = services.providers.get_all().await.unwrap_err();
    assert_eq!(err.to_string(), "名称不能为空");
}

#[tokio::test]
async fn error_without_body_falls_back_to_status_reason() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let services = services(&server).await;
    let err = services.models.get_all().await.unwrap_err();
    assert_eq!(err.to_string(), "Internal Server Error");
}

#[tokio::test]
async fn delete_resolves_on_204_without_body() {
    let server = MockServer::start().await;
    let id = Uuid::from_u128(7);
    Mock::given(method("DELETE"))
        .and(path(format!("/providers/{}", id)))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let services = services(&server).await;
    services.providers.delete(id).await.unwrap();
}

#[tokio::test]
async fn provider_create_bundles_initial_key_in_snake_case() {
    let server = MockServer::start().await;
    let id = Uuid::from_u128(1);

    // The wire payload is snake_case with the key nested under
    // initial_api_key.
    Mock::given(method("POST"))
        .and(path("/providers/"))
        .and(body_json(json!({
            "name": "OpenAI",
            "base_url": "https://api.openai.com/v1",
            "initial_api_key": {"alias": "default", "key": "sk-secret"}
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": id,
            "name": "OpenAI",
            "base_url": "https://api.openai.com/v1",
            "api_keys_count": 1
        })))
        .expect(1)
        .mount(&server)
        .await;

    let services = services(&server).await;
    let draft = ProviderDraft {
        name: "OpenAI".to_string(),
        base_url: "https://api.openai.com/v1".to_string(),
        ..Default::default()
    };
    let key = ApiKeyDraft {
        alias: "default".to_string(),
        key: Some("sk-secret".to_string()),
    };
    let provider = services.providers.create(&draft, Some(&key)).await.unwrap();

    assert_eq!(provider.id, id);
    assert_eq!(provider.base_url, "https://api.openai.com/v1");
    assert_eq!(provider.api_keys_count, 1);
}

#[tokio::test]
async fn key_reorder_submits_the_full_order_map() {
    let server = MockServer::start().await;
    let provider_id = Uuid::from_u128(1);
    let first = Uuid::from_u128(10);
    let second = Uuid::from_u128(11);

    let keys_body = json!([
        {"id": first, "provider_id": provider_id, "alias": "a", "sort_order": 0},
        {"id": second, "provider_id": provider_id, "alias": "b", "sort_order": 1}
    ]);
    Mock::given(method("GET"))
        .and(path(format!("/providers/{}/keys", provider_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(keys_body))
        .mount(&server)
        .await;

    // Moving the first key down swaps both entries; every key appears in the
    // submitted map.
    Mock::given(method("PUT"))
        .and(path(format!("/providers/{}/keys/reorder", provider_id)))
        .and(body_json(json!({
            "order": {(first.to_string()): 1, (second.to_string()): 0}
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let services = services(&server).await;
    let mut store = KeyStore::default();
    store.fetch(&services, provider_id).await;
    assert_eq!(store.keys.len(), 2);

    let moved = store.reorder(&services, first, MoveDirection::Down).await.unwrap();
    assert!(moved);

    // An edge move issues no request (the reorder mock expects exactly one).
    let moved = store.reorder(&services, second, MoveDirection::Down).await.unwrap();
    assert!(!moved);
}

#[tokio::test]
async fn quota_update_and_delete_address_the_quota_item() {
    let server = MockServer::start().await;
    let provider_id = Uuid::from_u128(1);
    let quota_id = Uuid::from_u128(20);

    // Only create goes to the collection path; update and delete carry the
    // quota id.
    Mock::given(method("PUT"))
        .and(path(format!("/providers/{}/free-quota/{}", provider_id, quota_id)))
        .and(body_json(json!({"amount": 50.0, "reset_period": "MONTHLY"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": quota_id,
            "provider_id": provider_id,
            "amount": 50.0,
            "reset_period": "MONTHLY"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(format!("/providers/{}/free-quota/{}", provider_id, quota_id)))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let services = services(&server).await;
    let draft = FreeQuotaDraft {
        model_implementation_id: None,
        amount: 50.0,
        reset_period: ResetPeriod::Monthly,
    };
    let quota = services.quotas.update(provider_id, quota_id, &draft).await.unwrap();
    assert_eq!(quota.id, quota_id);

    services.quotas.delete(provider_id, quota_id).await.unwrap();
}

#[tokio::test]
async fn chat_multi_returns_one_response_per_implementation() {
    let server = MockServer::start().await;
    let conversation_id = Uuid::from_u128(1);
    let turn_id = Uuid::from_u128(99);
    let impls = [Uuid::from_u128(10), Uuid::from_u128(11)];

    Mock::given(method("POST"))
        .and(path("/chat/multi"))
        .and(body_json(json!({
            "conversation_id": conversation_id,
            "model_implementations": impls,
            "message": "hello",
            "parameters": {"temperature": 0.7}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "turn_id": turn_id,
            "responses": [
                {
                    "id": Uuid::from_u128(100),
                    "turn_id": turn_id,
                    "model_implementation_id": impls[0],
                    "content": "hi from gpt",
                    "created_at": "2026-08-26T08:00:00Z",
                    "metadata": {"token_count": 12, "response_time": 1.4}
                },
                {
                    "id": Uuid::from_u128(101),
                    "turn_id": turn_id,
                    "model_implementation_id": impls[1],
                    "content": "",
                    "created_at": "2026-08-26T08:00:00Z",
                    "error": "rate limited"
                }
            ]
        })))
        .mount(&server)
        .await;

    let services = services(&server).await;
    let request = MultiChatRequest {
        conversation_id,
        model_implementations: impls.to_vec(),
        message: "hello".to_string(),
        parameters: ModelParameters {
            temperature: Some(0.7),
            ..Default::default()
        },
    };
    let response = services.chat.send_multi(&request).await.unwrap();

    assert_eq!(response.turn_id, turn_id);
    assert_eq!(response.responses.len(), impls.len());
    let ids: Vec<Uuid> = response
        .responses
        .iter()
        .map(|r| r.model_implementation_id)
        .collect();
    assert_eq!(ids, impls.to_vec());

    // Per-model failures come back as data, not a failed request.
    assert_eq!(response.responses[1].error.as_deref(), Some("rate limited"));
    assert_eq!(
        response.responses[0].metadata.as_ref().unwrap().token_count,
        Some(12)
    );
}

#[tokio::test]
async fn response_bodies_are_rewritten_to_camel_case() {
    let server = MockServer::start().await;
    let model_id = Uuid::from_u128(5);
    let impl_id = Uuid::from_u128(50);

    Mock::given(method("GET"))
        .and(path(format!("/models/{}/implementations", model_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": impl_id,
            "provider_id": Uuid::from_u128(1),
            "model_id": model_id,
            "provider_model_id": "claude-3-5-sonnet",
            "version": "20240620",
            "context_window": 200000,
            "is_available": true,
            "pricing_info": {
                "currency": "USD",
                "billing_mode": "token",
                "input_price": 3.0,
                "output_price": 15.0
            },
            "sort_order": 0
        }])))
        .mount(&server)
        .await;

    let services = services(&server).await;
    let implementations = services.implementations.get_all(model_id).await.unwrap();

    assert_eq!(implementations.len(), 1);
    let implementation = &implementations[0];
    assert_eq!(implementation.provider_model_id, "claude-3-5-sonnet");
    assert_eq!(implementation.context_window, Some(200_000));
    let pricing = implementation.pricing_info.as_ref().unwrap();
    assert_eq!(pricing.input_price, Some(3.0));
    assert_eq!(pricing.output_price, Some(15.0));
}
