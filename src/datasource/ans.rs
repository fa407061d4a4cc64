//! Name-service (ANS) client and its best-effort wrapper.

use super::http::get_optional_json;
use super::{DataSourceError, NameService};
use crate::domain::registry::truncate_address;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

pub const DEFAULT_ANS_URL: &str = "https://testnet-api.aleonames.id";

/// A name resolved from its hash, with the balance the API reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameBalance {
    pub name: String,
    #[serde(default)]
    pub balance: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct NameBody {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AddressBody {
    address: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentBody {
    content: Option<String>,
}

/// HTTP client for the name-service REST API.
#[derive(Debug, Clone)]
pub struct AnsClient {
    client: Client,
    base_url: String,
}

impl AnsClient {
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl NameService for AnsClient {
    async fn primary_name(&self, address: &str) -> Result<Option<String>, DataSourceError> {
        let url = format!("{}/primary_name/{}", self.base_url, address);
        let body: Option<NameBody> = get_optional_json(&self.client, &url, &[]).await?;
        Ok(body.and_then(|b| b.name))
    }

    async fn address_of(&self, name: &str) -> Result<Option<String>, DataSourceError> {
        let url = format!("{}/address/{}", self.base_url, name);
        let body: Option<AddressBody> = get_optional_json(&self.client, &url, &[]).await?;
        Ok(body.and_then(|b| b.address))
    }

    async fn name_from_hash(
        &self,
        name_hash: &str,
    ) -> Result<Option<NameBalance>, DataSourceError> {
        let url = format!("{}/hash_to_name/{}", self.base_url, name_hash);
        get_optional_json(&self.client, &url, &[]).await
    }

    async fn resolver_content(
        &self,
        name: &str,
        category: &str,
    ) -> Result<Option<String>, DataSourceError> {
        let url = format!("{}/resolver", self.base_url);
        let query = [("name", name.to_string()), ("category", category.to_string())];
        let body: Option<ContentBody> = get_optional_json(&self.client, &url, &query).await?;
        Ok(body.and_then(|b| b.content))
    }
}

/// Name lookups for display. Failures are logged and read as "not found".
#[derive(Debug, Clone)]
pub struct AnsService {
    inner: Arc<dyn NameService>,
}

impl AnsService {
    pub fn new(inner: Arc<dyn NameService>) -> Self {
        Self { inner }
    }

    pub async fn primary_name(&self, address: &str) -> Option<String> {
        degrade("primary name", self.inner.primary_name(address).await)
    }

    pub async fn address_of(&self, name: &str) -> Option<String> {
        degrade("address from name", self.inner.address_of(name).await)
    }

    pub async fn name_from_hash(&self, name_hash: &str) -> Option<NameBalance> {
        degrade("name from hash", self.inner.name_from_hash(name_hash).await)
    }

    pub async fn resolver_content(&self, name: &str, category: &str) -> Option<String> {
        degrade(
            "resolver content",
            self.inner.resolver_content(name, category).await,
        )
    }

    pub async fn avatar(&self, name: &str) -> Option<String> {
        self.resolver_content(name, "avatar").await
    }

    /// Primary name if one is set, otherwise the truncated address.
    pub async fn format_address(&self, address: &str) -> String {
        match self.primary_name(address).await {
            Some(name) => name,
            None => truncate_address(address),
        }
    }
}

fn degrade<T>(what: &str, result: Result<Option<T>, DataSourceError>) -> Option<T> {
    match result {
        Ok(value) => value,
        Err(e) => {
            warn!("Error fetching {}: {}", what, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasource::http::test_server;
    use crate::datasource::MockNameService;
    use axum::{
        extract::{Path, Query},
        http::StatusCode,
        response::IntoResponse,
        routing::get,
        Json, Router,
    };
    use std::collections::HashMap;

    async fn ans_router() -> String {
        let router = Router::new()
            .route(
                "/primary_name/:address",
                get(|Path(address): Path<String>| async move {
                    if address == "aleo1known" {
                        Json(serde_json::json!({"name": "alice.ans"})).into_response()
                    } else if address == "aleo1broken" {
                        StatusCode::INTERNAL_SERVER_ERROR.into_response()
                    } else {
                        StatusCode::NOT_FOUND.into_response()
                    }
                }),
            )
            .route(
                "/address/:name",
                get(|| async { Json(serde_json::json!({"address": "aleo1known"})) }),
            )
            .route(
                "/hash_to_name/:hash",
                get(|| async { Json(serde_json::json!({"name": "bob.ans", "balance": "12"})) }),
            )
            .route(
                "/resolver",
                get(|Query(q): Query<HashMap<String, String>>| async move {
                    if q.get("category").map(String::as_str) == Some("avatar") {
                        Json(serde_json::json!({"content": format!("https://img/{}", q["name"])}))
                            .into_response()
                    } else {
                        StatusCode::NOT_FOUND.into_response()
                    }
                }),
            );
        test_server::spawn(router).await
    }

    #[tokio::test]
    async fn test_client_lookups() {
        let client = AnsClient::new(ans_router().await);

        assert_eq!(
            client.primary_name("aleo1known").await.unwrap(),
            Some("alice.ans".to_string())
        );
        assert_eq!(client.primary_name("aleo1nobody").await.unwrap(), None);
        assert_eq!(
            client.address_of("alice.ans").await.unwrap(),
            Some("aleo1known".to_string())
        );
        let named = client.name_from_hash("123field").await.unwrap().unwrap();
        assert_eq!(named.name, "bob.ans");
        assert_eq!(named.balance, serde_json::json!("12"));
        assert_eq!(
            client.resolver_content("alice.ans", "avatar").await.unwrap(),
            Some("https://img/alice.ans".to_string())
        );
        assert_eq!(client.resolver_content("alice.ans", "btc").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_client_server_error_propagates() {
        let client = AnsClient::new(ans_router().await);
        match client.primary_name("aleo1broken").await {
            Err(DataSourceError::HttpError { status, .. }) => assert_eq!(status, 500),
            other => panic!("Expected HttpError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_service_degrades_errors_to_none() {
        let service = AnsService::new(Arc::new(AnsClient::new(ans_router().await)));
        assert_eq!(service.primary_name("aleo1broken").await, None);
        assert_eq!(
            service.avatar("alice.ans").await,
            Some("https://img/alice.ans".to_string())
        );
    }

    #[tokio::test]
    async fn test_format_address_prefers_name() {
        let service = AnsService::new(Arc::new(
            MockNameService::new().with_primary_name("aleo1abcdefghijklmnop", "carol.ans"),
        ));
        assert_eq!(
            service.format_address("aleo1abcdefghijklmnop").await,
            "carol.ans"
        );
        assert_eq!(
            service.format_address("aleo1zzzzzzzzzzzzwxyz").await,
            "aleo1z...wxyz"
        );
    }
}
