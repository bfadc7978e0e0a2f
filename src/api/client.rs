//! HTTP request wrapper around the gateway REST API.
//!
//! All traffic goes through [`ApiClient::send`]: JSON in, JSON out, with the
//! casing conversion applied in both directions so the rest of the crate only
//! ever sees camelCase keys. Non-2xx responses become [`ApiError::Api`] with
//! the message extracted from the error body; a 204 resolves to no value.

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use crate::casing::{value_to_camel, value_to_snake};
use crate::error::{ApiError, ApiResult};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the gateway API at a configurable base URL.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> ApiResult<Self> {
        if base_url.trim().is_empty() {
            return Err(ApiError::InvalidInput("API base URL is empty".to_string()));
        }
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Perform one request. The body (if any) is rewritten to snake_case
    /// before sending; a JSON response body is rewritten to camelCase.
    async fn send(&self, method: Method, path: &str, body: Option<Value>) -> ApiResult<Option<Value>> {
        let url = self.url(path);
        tracing::debug!(%method, %url, "gateway request");

        let mut request = self.http.request(method, &url);
        if let Some(body) = body {
            request = request.json(&value_to_snake(body));
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or("API request failed");
            let text = response.text().await.unwrap_or_default();
            let err = ApiError::from_response(status.as_u16(), &text, reason);
            tracing::debug!(%url, status = status.as_u16(), "gateway error: {}", err);
            return Err(err);
        }

        if status.as_u16() == 204 {
            return Ok(None);
        }

        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(None);
        }
        let value: Value = serde_json::from_str(&text)?;
        Ok(Some(value_to_camel(value)))
    }

    fn decode<T: DeserializeOwned>(path: &str, value: Option<Value>) -> ApiResult<T> {
        let value = value.ok_or_else(|| ApiError::EmptyBody(path.to_string()))?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let value = self.send(Method::GET, path, None).await?;
        Self::decode(path, value)
    }

    pub async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> ApiResult<T> {
        let body = serde_json::to_value(body)?;
        let value = self.send(Method::POST, path, Some(body)).await?;
        Self::decode(path, value)
    }

    pub async fn put<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> ApiResult<T> {
        let body = serde_json::to_value(body)?;
        let value = self.send(Method::PUT, path, Some(body)).await?;
        Self::decode(path, value)
    }

    /// PUT whose response body the caller does not need (e.g. reorder,
    /// select-response). A 204 or an ignored body both succeed.
    pub async fn put_unit<B: Serialize>(&self, path: &str, body: &B) -> ApiResult<()> {
        let body = serde_json::to_value(body)?;
        self.send(Method::PUT, path, Some(body)).await?;
        Ok(())
    }

    /// Bodyless PUT (e.g. select-response).
    pub async fn put_empty(&self, path: &str) -> ApiResult<()> {
        self.send(Method::PUT, path, None).await?;
        Ok(())
    }

    pub async fn delete(&self, path: &str) -> ApiResult<()> {
        self.send(Method::DELETE, path, None).await?;
        Ok(())
    }
}
