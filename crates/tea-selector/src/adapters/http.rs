//! HTTP Catalog Client
//!
//! `CatalogApi` over the tea catalog REST service using reqwest.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::{
    CatalogError, EntityId, Owner, OwnerTeas, Session, Tea, TeaOwners, TeaType, TypeTeas,
};
use crate::ports::CatalogApi;

/// Header carrying the session token on authenticated calls
pub const TOKEN_HEADER: &str = "Token";

/// Connection settings for the catalog service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub base_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_user_agent() -> String {
    format!("tea-selector/{}", env!("CARGO_PKG_VERSION"))
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            user_agent: default_user_agent(),
        }
    }
}

/// API client for the tea catalog.
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Clone)]
pub struct RemoteCatalogClient {
    client: Client,
    base_url: String,
    session: Option<Session>,
}

// ============================================
// Request Bodies
// ============================================

#[derive(Debug, Serialize)]
struct NameRequest<'a> {
    name: &'a str,
}

#[derive(Debug, Serialize)]
struct IdRef {
    id: EntityId,
}

#[derive(Debug, Serialize)]
struct CreateTeaRequest<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    tea_type: IdRef,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct ChangePasswordRequest<'a> {
    old: &'a str,
    new: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: String,
}

impl RemoteCatalogClient {
    /// Create a client without a session
    pub fn new(config: ClientConfig) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| CatalogError::Network(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session: None,
        })
    }

    /// Same client, sending `session`'s token on every call
    pub fn with_session(mut self, session: Option<Session>) -> Self {
        self.session = session;
        self
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str, session: Option<&Session>) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!(method = %method, path = %path, authenticated = session.is_some(), "Catalog request");

        let request = self.client.request(method, url);
        match session {
            Some(s) => request.header(TOKEN_HEADER, s.token()),
            None => request,
        }
    }

    /// Send and return the raw body of a successful response
    async fn execute(&self, request: RequestBuilder, path: &str) -> Result<String, CatalogError> {
        let resp = request.send().await.map_err(|e| {
            warn!(path = %path, error = %e, "Catalog request failed to send");
            CatalogError::Network(e.to_string())
        })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| {
            warn!(path = %path, error = %e, "Failed to read catalog response body");
            CatalogError::Network(e.to_string())
        })?;

        if !status.is_success() {
            warn!(path = %path, status = status.as_u16(), "Catalog service rejected request");
            return Err(CatalogError::Server {
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        path: &str,
    ) -> Result<T, CatalogError> {
        let body = self.execute(request, path).await?;
        serde_json::from_str(&body).map_err(|e| {
            warn!(path = %path, error = %e, "Failed to decode catalog response");
            CatalogError::Decode(format!("{path}: {e}"))
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, CatalogError> {
        let request = self.request(Method::GET, path, self.session.as_ref());
        self.fetch(request, path).await
    }

    async fn post<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, CatalogError> {
        let request = self
            .request(Method::POST, path, self.session.as_ref())
            .json(body);
        self.fetch(request, path).await
    }

    async fn delete(&self, path: &str) -> Result<(), CatalogError> {
        let request = self.request(Method::DELETE, path, self.session.as_ref());
        self.execute(request, path).await.map(|_| ())
    }
}

#[async_trait]
impl CatalogApi for RemoteCatalogClient {
    async fn list_teas(&self) -> Result<Vec<Tea>, CatalogError> {
        self.get("/teas").await
    }

    async fn list_types(&self) -> Result<Vec<TeaType>, CatalogError> {
        self.get("/types").await
    }

    async fn list_owners(&self) -> Result<Vec<Owner>, CatalogError> {
        self.get("/owners").await
    }

    async fn list_ownerships(&self) -> Result<Vec<OwnerTeas>, CatalogError> {
        self.get("/owners/teas").await
    }

    async fn list_types_with_teas(&self) -> Result<Vec<TypeTeas>, CatalogError> {
        self.get("/types/teas").await
    }

    async fn list_teas_with_owners(&self) -> Result<Vec<TeaOwners>, CatalogError> {
        self.get("/teas/owners").await
    }

    async fn create_tea(&self, name: &str, type_id: EntityId) -> Result<Tea, CatalogError> {
        let request = CreateTeaRequest {
            name,
            tea_type: IdRef { id: type_id },
        };
        self.post("/tea", &request).await
    }

    async fn delete_tea(&self, id: EntityId) -> Result<(), CatalogError> {
        self.delete(&format!("/tea/{id}")).await
    }

    async fn create_type(&self, name: &str) -> Result<TeaType, CatalogError> {
        self.post("/type", &NameRequest { name }).await
    }

    async fn delete_type(&self, id: EntityId) -> Result<(), CatalogError> {
        self.delete(&format!("/type/{id}")).await
    }

    async fn create_owner(&self, name: &str) -> Result<Owner, CatalogError> {
        self.post("/owner", &NameRequest { name }).await
    }

    async fn delete_owner(&self, id: EntityId) -> Result<(), CatalogError> {
        self.delete(&format!("/owner/{id}")).await
    }

    async fn add_ownership(
        &self,
        tea_id: EntityId,
        owner_id: EntityId,
    ) -> Result<Tea, CatalogError> {
        self.post(&format!("/tea/{tea_id}/owner"), &IdRef { id: owner_id })
            .await
    }

    async fn remove_ownership(
        &self,
        tea_id: EntityId,
        owner_id: EntityId,
    ) -> Result<(), CatalogError> {
        self.delete(&format!("/tea/{tea_id}/owner/{owner_id}"))
            .await
    }

    async fn login(&self, username: &str, password: &str) -> Result<Session, CatalogError> {
        let resp: TokenResponse = self
            .post("/login", &LoginRequest { username, password })
            .await?;
        Ok(Session::new(resp.token))
    }

    async fn change_password(&self, old: &str, new: &str) -> Result<(), CatalogError> {
        let path = "/changepassword";
        let request = self
            .request(Method::POST, path, self.session.as_ref())
            .json(&ChangePasswordRequest { old, new });
        self.execute(request, path).await.map(|_| ())
    }

    async fn verify_session(&self, session: &Session) -> Result<(), CatalogError> {
        let path = "/types";
        let request = self.request(Method::GET, path, Some(session));
        self.execute(request, path).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = RemoteCatalogClient::new(ClientConfig::new("http://tea.example/")).unwrap();
        assert_eq!(client.base_url(), "http://tea.example");
    }

    #[test]
    fn test_with_session() {
        let client = RemoteCatalogClient::new(ClientConfig::new("http://tea.example")).unwrap();
        assert!(client.session().is_none());

        let client = client.with_session(Some(Session::new("abc")));
        assert_eq!(client.session().map(|s| s.token()), Some("abc"));
    }

    #[test]
    fn test_create_tea_body() {
        let body = serde_json::to_value(CreateTeaRequest {
            name: "Sencha",
            tea_type: IdRef { id: 2 },
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"name": "Sencha", "type": {"id": 2}}));
    }
}
