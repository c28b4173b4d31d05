//! REST API Client
//!
//! HTTP client for the business desk backend. One `ApiClient` covers every
//! resource; the per-resource operations live in sibling modules:
//!
//! - [`auth`]: login, logout, register, profile, auth check
//! - [`tasks`]: task CRUD, status toggle, stats, overdue list
//! - [`schedules`]: schedule CRUD, calendar window, daily agenda
//! - [`customers`]: customers, business cards, documents
//! - [`expenses`]: expenses, categories, payment methods, recurring costs
//!
//! Every request carries `Authorization: Token <token>` while the session
//! holds a token. Every successful mutation publishes an invalidation on the
//! client's [`InvalidationBus`].

mod auth;
mod customers;
mod error;
mod expenses;
mod schedules;
mod tasks;

pub use error::{extract_message, ClientError, ClientResult};

use crate::events::{InvalidationBus, Mutation, ResourceKind};
use crate::model::Id;
use crate::session::Session;
use reqwest::{multipart, Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use std::time::Duration;

/// Default backend location (local development server)
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api";

/// Configuration for the API client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL including the `/api` prefix
    pub base_url: String,
    /// Per-request timeout; `None` waits indefinitely
    pub request_timeout: Option<Duration>,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: None,
            user_agent: format!("bizdesk/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// REST client bound to a session
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    session: Session,
    events: InvalidationBus,
}

impl ApiClient {
    /// Create a client; fails only if the HTTP stack cannot be initialized
    pub fn new(config: ClientConfig, session: Session) -> ClientResult<Self> {
        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(ClientError::Network)?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session,
            events: InvalidationBus::default(),
        })
    }

    /// Publish invalidations on a bus shared with other components
    pub fn with_events(mut self, events: InvalidationBus) -> Self {
        self.events = events;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn events(&self) -> &InvalidationBus {
        &self.events
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Request with the session token attached (if any)
    async fn authed(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.public(method, path);
        match self.session.token().await {
            Some(token) => builder.header(reqwest::header::AUTHORIZATION, format!("Token {}", token)),
            None => builder,
        }
    }

    /// Request without credentials (login, register)
    fn public(&self, method: Method, path: &str) -> RequestBuilder {
        tracing::debug!(method = %method, path = %path, "API request");
        self.http.request(method, self.url(path))
    }

    /// Send a request and turn any non-2xx status into `ClientError::Api`
    ///
    /// `fallback` is the message used when the body carries none.
    async fn send(&self, builder: RequestBuilder, fallback: &str) -> ClientResult<Response> {
        let response = builder.send().await.map_err(ClientError::from_reqwest)?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = extract_message(&body).unwrap_or_else(|| fallback.to_string());

        tracing::warn!(status = status.as_u16(), message = %message, "API error");

        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
        let bytes = response.bytes().await.map_err(ClientError::from_reqwest)?;
        serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        fallback: &str,
    ) -> ClientResult<T> {
        let mut builder = self.authed(Method::GET, path).await;
        if !query.is_empty() {
            builder = builder.query(query);
        }
        let response = self.send(builder, fallback).await?;
        Self::decode(response).await
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        fallback: &str,
    ) -> ClientResult<T> {
        let builder = self.authed(method, path).await.json(body);
        let response = self.send(builder, fallback).await?;
        Self::decode(response).await
    }

    async fn send_multipart<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        form: multipart::Form,
        fallback: &str,
    ) -> ClientResult<T> {
        let builder = self.authed(method, path).await.multipart(form);
        let response = self.send(builder, fallback).await?;
        Self::decode(response).await
    }

    async fn delete(&self, path: &str, fallback: &str) -> ClientResult<()> {
        let builder = self.authed(Method::DELETE, path).await;
        self.send(builder, fallback).await?;
        Ok(())
    }

    fn notify(&self, kind: ResourceKind, mutation: Mutation, id: Option<Id>) {
        self.events.publish(kind, mutation, id);
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// Multipart file part named after the file on disk
async fn file_part(path: &Path) -> ClientResult<multipart::Part> {
    let bytes = tokio::fs::read(path).await?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "upload".to_string());
    Ok(multipart::Part::bytes(bytes).file_name(file_name))
}
