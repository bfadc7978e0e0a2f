//! Generic per-resource service factory.
//!
//! Most gateway resources follow the same CRUD shape; this factory
//! parameterizes it by a collection path and an item path, producing
//! `get_all/get_one/create/update/delete` with consistent casing conversion
//! (done by the client). Nested resources (e.g. keys under a provider) use a
//! `{}` placeholder in the collection path for the parent id while items are
//! addressed flat (`/keys/{id}`).
//!
//! Endpoints with custom payload shaping (provider create with a bundled
//! initial key, the reorder order-map submissions, the chat calls) live in
//! their resource modules instead.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::api::client::ApiClient;
use crate::error::{ApiError, ApiResult};

#[derive(Debug, Clone)]
pub struct ResourcePaths {
    /// Collection path; may contain one `{}` placeholder for the parent id.
    pub collection: &'static str,
    /// Item path prefix; the id is appended as `{item}/{id}`.
    pub item: &'static str,
}

#[derive(Debug, Clone)]
pub struct ResourceService<T> {
    client: Arc<ApiClient>,
    paths: ResourcePaths,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Serialize + DeserializeOwned> ResourceService<T> {
    pub fn new(client: Arc<ApiClient>, paths: ResourcePaths) -> Self {
        Self {
            client,
            paths,
            _entity: PhantomData,
        }
    }

    pub fn client(&self) -> &Arc<ApiClient> {
        &self.client
    }

    fn collection_path(&self, parent: Option<&str>) -> ApiResult<String> {
        if self.paths.collection.contains("{}") {
            let parent = parent.ok_or_else(|| {
                ApiError::InvalidInput(format!(
                    "resource {} requires a parent id",
                    self.paths.collection
                ))
            })?;
            Ok(self.paths.collection.replacen("{}", parent, 1))
        } else {
            Ok(self.paths.collection.to_string())
        }
    }

    fn item_path(&self, id: &str) -> String {
        format!("{}/{}", self.paths.item, id)
    }

    pub async fn get_all(&self, parent: Option<&str>) -> ApiResult<Vec<T>> {
        let path = self.collection_path(parent)?;
        self.client.get(&path).await
    }

    pub async fn get_one(&self, id: &str) -> ApiResult<T> {
        self.client.get(&self.item_path(id)).await
    }

    pub async fn create<B: Serialize>(&self, parent: Option<&str>, body: &B) -> ApiResult<T> {
        let path = self.collection_path(parent)?;
        self.client.post(&path, body).await
    }

    pub async fn update<B: Serialize>(&self, id: &str, body: &B) -> ApiResult<T> {
        self.client.put(&self.item_path(id), body).await
    }

    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        self.client.delete(&self.item_path(id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::ApiKey;

    fn service() -> ResourceService<ApiKey> {
        let client = Arc::new(ApiClient::new("http://localhost:8000").unwrap());
        ResourceService::new(
            client,
            ResourcePaths {
                collection: "/providers/{}/keys",
                item: "/keys",
            },
        )
    }

    #[test]
    fn test_nested_collection_path() {
        let svc = service();
        assert_eq!(svc.collection_path(Some("p1")).unwrap(), "/providers/p1/keys");
        assert_eq!(svc.item_path("k1"), "/keys/k1");
    }

    #[test]
    fn test_missing_parent_is_an_error() {
        let svc = service();
        assert!(svc.collection_path(None).is_err());
    }
}
