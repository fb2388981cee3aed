//! Hosted row store client
//!
//! Talks to a PostgREST-style endpoint (`<url>/rest/v1/<table>`), the REST
//! surface hosted database services expose for their tables.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::domain::api_key::{ApiKeyChanges, ApiKeyId, ApiKeyRecord, ApiKeyStore, NewApiKey};
use crate::domain::{DomainError, SessionProvider};

/// Default table holding the keys
pub const DEFAULT_TABLE: &str = "api_keys";

/// Error body returned by the backend
#[derive(Debug, Deserialize)]
struct BackendError {
    #[serde(default)]
    message: Option<String>,
}

/// ApiKeyStore backed by the hosted REST endpoint
#[derive(Clone)]
pub struct RestApiKeyStore {
    client: reqwest::Client,
    base_url: String,
    endpoint: String,
    anon_key: String,
    session: Option<Arc<dyn SessionProvider>>,
}

impl std::fmt::Debug for RestApiKeyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestApiKeyStore")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl RestApiKeyStore {
    /// Create a client for `<base_url>/rest/v1/api_keys`
    pub fn new(
        base_url: &str,
        anon_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::configuration(format!("Failed to build HTTP client: {}", e)))?;

        let base_url = base_url.trim_end_matches('/').to_string();

        Ok(Self {
            client,
            endpoint: table_endpoint(&base_url, DEFAULT_TABLE),
            base_url,
            anon_key: anon_key.into(),
            session: None,
        })
    }

    /// Use a different table name
    pub fn with_table(mut self, table: &str) -> Self {
        self.endpoint = table_endpoint(&self.base_url, table);
        self
    }

    /// Authorize requests with the signed-in user's access token
    pub fn with_session(mut self, session: Arc<dyn SessionProvider>) -> Self {
        self.session = Some(session);
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let token = match &self.session {
            Some(provider) => provider.current_session().await.map(|s| s.access_token),
            None => None,
        };

        request
            .header("apikey", &self.anon_key)
            .bearer_auth(token.unwrap_or_else(|| self.anon_key.clone()))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, DomainError> {
        let response = self
            .authorize(request)
            .await
            .send()
            .await
            .map_err(|e| DomainError::store(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DomainError::store(backend_message(status, &body)));
        }

        Ok(response)
    }

    async fn rows(response: Response) -> Result<Vec<ApiKeyRecord>, DomainError> {
        response
            .json()
            .await
            .map_err(|e| DomainError::store(format!("Failed to parse response: {}", e)))
    }

    async fn patch(
        &self,
        id: &ApiKeyId,
        changes: &ApiKeyChanges,
    ) -> Result<ApiKeyRecord, DomainError> {
        let request = self
            .client
            .patch(&self.endpoint)
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=representation")
            .json(changes);

        let response = self.send(request).await?;
        Self::rows(response)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::store("No data returned from update"))
    }
}

fn table_endpoint(base_url: &str, table: &str) -> String {
    format!("{}/rest/v1/{}", base_url, table)
}

fn backend_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<BackendError>(body)
        .ok()
        .and_then(|e| e.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| format!("HTTP {}", status))
}

#[async_trait]
impl ApiKeyStore for RestApiKeyStore {
    async fn list(&self) -> Result<Vec<ApiKeyRecord>, DomainError> {
        debug!(endpoint = %self.endpoint, "Listing API keys");

        let request = self
            .client
            .get(&self.endpoint)
            .query(&[("select", "*"), ("order", "created_at.desc")]);

        let response = self.send(request).await?;
        Self::rows(response).await
    }

    async fn create(&self, new_key: NewApiKey) -> Result<ApiKeyRecord, DomainError> {
        debug!(name = %new_key.name, key_type = %new_key.key_type, "Inserting API key");

        let request = self
            .client
            .post(&self.endpoint)
            .header("Prefer", "return=representation")
            .json(&new_key);

        let response = self.send(request).await?;
        Self::rows(response)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::store("No data returned from insert"))
    }

    async fn update(
        &self,
        id: &ApiKeyId,
        changes: ApiKeyChanges,
    ) -> Result<ApiKeyRecord, DomainError> {
        debug!(id = %id, "Updating API key");
        self.patch(id, &changes).await
    }

    async fn delete(&self, id: &ApiKeyId) -> Result<(), DomainError> {
        debug!(id = %id, "Deleting API key");

        let request = self
            .client
            .delete(&self.endpoint)
            .query(&[("id", format!("eq.{}", id))]);

        self.send(request).await?;
        Ok(())
    }

    async fn set_usage(&self, id: &ApiKeyId, usage: u64) -> Result<(), DomainError> {
        debug!(id = %id, usage, "Setting API key usage");
        self.patch(id, &ApiKeyChanges::new().with_usage(usage))
            .await
            .map(|_| ())
    }

    async fn find_by_key(&self, key: &str) -> Result<Option<ApiKeyRecord>, DomainError> {
        let request = self.client.get(&self.endpoint).query(&[
            ("select", "*".to_string()),
            ("key", format!("eq.{}", key)),
            ("limit", "1".to_string()),
        ]);

        let response = self.send(request).await?;
        Ok(Self::rows(response).await?.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{KeyType, Session};
    use crate::infrastructure::session::StaticSessionProvider;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TABLE_PATH: &str = "/rest/v1/api_keys";

    fn row(id: &str, name: &str, key: &str) -> serde_json::Value {
        json!({
            "id": id,
            "name": name,
            "key": key,
            "type": "dev",
            "usage": 0,
            "limits": null,
            "created_at": "2024-11-02T10:15:30.123456+00:00"
        })
    }

    fn store(server: &MockServer) -> RestApiKeyStore {
        RestApiKeyStore::new(&server.uri(), "anon-key", Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_list_orders_by_created_at_desc() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(TABLE_PATH))
            .and(query_param("select", "*"))
            .and(query_param("order", "created_at.desc"))
            .and(header("apikey", "anon-key"))
            .and(header("authorization", "Bearer anon-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                row("2", "newer", "tvly-dev-b"),
                row("1", "older", "tvly-dev-a"),
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let keys = store(&server).list().await.unwrap();

        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0].name(), "newer");
    }

    #[tokio::test]
    async fn test_list_empty_is_not_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(TABLE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        assert!(store(&server).list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_backend_message_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(TABLE_PATH))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "code": "PGRST301",
                "message": "JWT expired"
            })))
            .mount(&server)
            .await;

        let err = store(&server).list().await.unwrap_err();
        assert_eq!(err, DomainError::store("JWT expired"));
    }

    #[tokio::test]
    async fn test_generic_message_without_backend_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(TABLE_PATH))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = store(&server).list().await.unwrap_err();
        assert!(err.is_store());
        assert!(err.message().contains("503"));
    }

    #[tokio::test]
    async fn test_create_returns_stored_row() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(TABLE_PATH))
            .and(header("prefer", "return=representation"))
            .and(body_json(json!({
                "name": "k1",
                "key": "tvly-dev-abc",
                "type": "dev",
                "usage": 0,
                "limits": null
            })))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(json!([row("9", "k1", "tvly-dev-abc")])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let created = store(&server)
            .create(NewApiKey {
                name: "k1".to_string(),
                key: "tvly-dev-abc".to_string(),
                key_type: KeyType::Dev,
                usage: 0,
                limits: None,
            })
            .await
            .unwrap();

        assert_eq!(created.id().as_str(), "9");
    }

    #[tokio::test]
    async fn test_create_without_row_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(TABLE_PATH))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
            .mount(&server)
            .await;

        let err = store(&server)
            .create(NewApiKey {
                name: "k1".to_string(),
                key: "tvly-dev-abc".to_string(),
                key_type: KeyType::Dev,
                usage: 0,
                limits: None,
            })
            .await
            .unwrap_err();

        assert_eq!(err, DomainError::store("No data returned from insert"));
    }

    #[tokio::test]
    async fn test_update_filters_by_id() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path(TABLE_PATH))
            .and(query_param("id", "eq.1"))
            .and(body_json(json!({ "limits": 500 })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([row("1", "k1", "tvly-dev-a")])))
            .expect(1)
            .mount(&server)
            .await;

        let updated = store(&server)
            .update(&ApiKeyId::new("1"), ApiKeyChanges::new().with_limits(Some(500)))
            .await
            .unwrap();

        assert_eq!(updated.id().as_str(), "1");
    }

    #[tokio::test]
    async fn test_update_unknown_id_fails() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path(TABLE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let err = store(&server)
            .set_usage(&ApiKeyId::new("missing"), 10)
            .await
            .unwrap_err();

        assert_eq!(err, DomainError::store("No data returned from update"));
    }

    #[tokio::test]
    async fn test_set_usage_sends_counter_only() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path(TABLE_PATH))
            .and(query_param("id", "eq.7"))
            .and(body_json(json!({ "usage": 420 })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([row("7", "k", "tvly-dev-x")])))
            .expect(1)
            .mount(&server)
            .await;

        store(&server).set_usage(&ApiKeyId::new("7"), 420).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_with_no_matching_row_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path(TABLE_PATH))
            .and(query_param("id", "eq.nonexistent-id"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        store(&server)
            .delete(&ApiKeyId::new("nonexistent-id"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_find_by_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(TABLE_PATH))
            .and(query_param("key", "eq.tvly-dev-abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([row("3", "k3", "tvly-dev-abc")])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(TABLE_PATH))
            .and(query_param("key", "eq.tvly-dev-unknown"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let store = store(&server);
        let found = store.find_by_key("tvly-dev-abc").await.unwrap();
        assert_eq!(found.unwrap().id().as_str(), "3");
        assert!(store.find_by_key("tvly-dev-unknown").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_session_token_used_as_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(TABLE_PATH))
            .and(header("apikey", "anon-key"))
            .and(header("authorization", "Bearer user-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let provider = StaticSessionProvider::new(Some(Session::new("user-1", "user-token")));
        let store = store(&server).with_session(Arc::new(provider));

        store.list().await.unwrap();
    }

    #[tokio::test]
    async fn test_transport_failure_is_store_error() {
        let store =
            RestApiKeyStore::new("http://127.0.0.1:1", "anon-key", Duration::from_millis(500))
                .unwrap();

        let err = store.list().await.unwrap_err();
        assert!(err.is_store());
    }

    #[test]
    fn test_custom_table_endpoint() {
        let store = RestApiKeyStore::new("https://db.example.com/", "anon", Duration::from_secs(1))
            .unwrap()
            .with_table("keys");
        assert_eq!(store.endpoint(), "https://db.example.com/rest/v1/keys");
    }
}
