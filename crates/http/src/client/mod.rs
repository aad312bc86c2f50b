//! Luxe backend API client
//!
//! Every call goes through [`LuxeClient::request`], which attaches the stored
//! bearer token and recovers from an expired token by refreshing the session
//! once and reissuing the call. Concurrent calls that hit the expiry share a
//! single refresh.

pub mod account;
pub mod auth;
pub mod bookings;
pub mod catalog;
pub mod credentials;
pub mod error;
pub mod messages;
pub mod orders;
mod refresh;
pub mod reviews;
pub mod shop;

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, ClientBuilder, Method, header};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::ApiTarget;
use crate::types::RefreshResponse;
use credentials::{CredentialStore, MemoryCredentialStore};
use error::{ClientError, RefreshError};
use refresh::{RefreshCoordinator, RefreshTicket};

/// Path of the session refresh endpoint, relative to the API base
pub const REFRESH_PATH: &str = "/auth/refresh";

const USER_AGENT: &str = concat!("luxe-client/", env!("CARGO_PKG_VERSION"));

/// Luxe API client
///
/// Clones share the credential store and the refresh state, so at most one
/// refresh is in flight across all of them.
#[derive(Clone)]
pub struct LuxeClient {
    inner: Arc<Inner>,
}

struct Inner {
    client: Client,
    base_url: String,
    credentials: Arc<dyn CredentialStore>,
    refresh: RefreshCoordinator,
}

/// An outbound API call that can be reissued after a session refresh
#[derive(Debug, Clone)]
pub struct ApiCall {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<Value>,
    retried: bool,
    refreshable: bool,
}

impl ApiCall {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            retried: false,
            refreshable: true,
        }
    }

    /// Attach a JSON body
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ClientError> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Attach query parameters from any struct or map; `None` fields are skipped
    pub fn query<Q: Serialize + ?Sized>(mut self, params: &Q) -> Result<Self, ClientError> {
        match serde_json::to_value(params)? {
            Value::Object(map) => {
                for (key, value) in map {
                    match value {
                        Value::Null => {}
                        Value::String(s) => self.query.push((key, s)),
                        other => self.query.push((key, other.to_string())),
                    }
                }
                Ok(self)
            }
            Value::Null => Ok(self),
            other => Err(ClientError::Configuration(format!(
                "query parameters must be an object, got {other}"
            ))),
        }
    }

    /// Credential exchanges (sign-in, registration, sign-out) must surface
    /// their own 401 instead of refreshing a session that does not exist yet
    pub fn without_refresh(mut self) -> Self {
        self.refreshable = false;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl LuxeClient {
    /// Create a new client with default configuration
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::builder().base_url(base_url).build()
    }

    /// Create a new client builder
    pub fn builder() -> LuxeClientBuilder {
        LuxeClientBuilder::default()
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// The store holding the session's bearer token
    pub fn credentials(&self) -> &Arc<dyn CredentialStore> {
        &self.inner.credentials
    }

    /// Issue a call and decode the `data` envelope of its response
    ///
    /// A 401 on a call that has not been retried yet triggers the refresh
    /// protocol: the call waits for (or performs) a single session refresh and
    /// is reissued once with the new token. Every other failure, including a
    /// second 401, is returned untouched.
    pub async fn request<T: DeserializeOwned>(&self, mut call: ApiCall) -> Result<T, ClientError> {
        let token = self.inner.credentials.load();

        match self.send(&call, token.as_deref()).await {
            Err(err) if err.is_unauthorized() && call.refreshable && !call.retried => {
                call.retried = true;
                debug!(path = %call.path, "Token rejected, refreshing session");
                let token = self.refresh_session().await?;
                self.send(&call, Some(&token)).await
            }
            result => result,
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.request(ApiCall::new(Method::GET, path)).await
    }

    pub async fn get_with<T, Q>(&self, path: &str, params: &Q) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.request(ApiCall::new(Method::GET, path).query(params)?)
            .await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(ApiCall::new(Method::POST, path).json(body)?)
            .await
    }

    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(ApiCall::new(Method::PUT, path).json(body)?)
            .await
    }

    pub async fn patch<T, B>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(ApiCall::new(Method::PATCH, path).json(body)?)
            .await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.request(ApiCall::new(Method::DELETE, path)).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.inner.base_url, path)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        call: &ApiCall,
        token: Option<&str>,
    ) -> Result<T, ClientError> {
        debug!(
            method = %call.method,
            path = %call.path,
            authenticated = token.is_some(),
            retried = call.retried,
            "Sending API request"
        );

        let mut request = self.inner.client.request(call.method.clone(), self.url(&call.path));
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        if !call.query.is_empty() {
            request = request.query(&call.query);
        }
        if let Some(body) = &call.body {
            request = request.json(body);
        }

        Self::execute(request).await
    }

    /// Execute a request and unwrap the `data` envelope
    async fn execute<T: DeserializeOwned>(
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            let bytes = response.bytes().await?;
            let mut payload: Value = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes)?
            };
            let data = payload
                .get_mut("data")
                .map(Value::take)
                .unwrap_or(Value::Null);
            Ok(serde_json::from_value(data)?)
        } else {
            let body = response.text().await?;
            Err(ClientError::from_status(status, &body))
        }
    }

    /// Obtain a fresh token, sharing one refresh call among concurrent callers
    async fn refresh_session(&self) -> Result<String, ClientError> {
        match self.inner.refresh.begin() {
            RefreshTicket::Wait(wait) => {
                debug!("Session refresh already in flight, queueing request");
                Ok(wait.outcome().await?)
            }
            RefreshTicket::Lead(lead) => {
                let outcome = self.call_refresh_endpoint().await;

                match &outcome {
                    Ok(token) => {
                        info!("Session refreshed");
                        if let Err(err) = self.inner.credentials.store(token) {
                            warn!(error = %err, "Failed to persist refreshed token");
                        }
                    }
                    Err(err) => {
                        warn!(error = %err, "Session refresh failed, clearing credential");
                        if let Err(err) = self.inner.credentials.clear() {
                            warn!(error = %err, "Failed to clear stored credential");
                        }
                    }
                }

                lead.settle(&outcome);
                Ok(outcome?)
            }
        }
    }

    /// Call the refresh endpoint with cookie credentials only
    async fn call_refresh_endpoint(&self) -> Result<String, RefreshError> {
        let response = self
            .inner
            .client
            .post(self.url(REFRESH_PATH))
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(|err| RefreshError::Transport(err.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| RefreshError::Transport(err.to_string()))?;

        if !status.is_success() {
            return Err(RefreshError::from_status(status, &body));
        }

        let envelope: crate::types::Envelope<RefreshResponse> = serde_json::from_str(&body)
            .map_err(|err| RefreshError::MalformedResponse(err.to_string()))?;
        let token = envelope.data.access_token;
        if token.is_empty() {
            return Err(RefreshError::MalformedResponse("empty access token".into()));
        }

        Ok(token)
    }
}

/// Builder for LuxeClient
#[derive(Default)]
pub struct LuxeClientBuilder {
    base_url: Option<String>,
    target: Option<ApiTarget>,
    credentials: Option<Arc<dyn CredentialStore>>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl LuxeClientBuilder {
    /// Set the base URL, including the versioned API prefix
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Derive the base URL from an environment target
    ///
    /// An explicit [`base_url`](Self::base_url) takes precedence.
    pub fn target(mut self, target: ApiTarget) -> Self {
        self.target = Some(target);
        self
    }

    /// Set where the bearer token is kept
    pub fn credentials(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.credentials = Some(store);
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the client
    pub fn build(self) -> Result<LuxeClient, ClientError> {
        let base_url = match (self.base_url, self.target) {
            (Some(url), _) => url,
            (None, Some(target)) => target.base_url()?,
            (None, None) => {
                return Err(ClientError::Configuration("base_url is required".into()));
            }
        };

        // Ensure base_url ends without a trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();

        // The refresh endpoint authenticates with the session cookie
        let mut client_builder = ClientBuilder::new().cookie_store(true);

        if let Some(timeout) = self.timeout {
            client_builder = client_builder.timeout(timeout);
        }

        client_builder =
            client_builder.user_agent(self.user_agent.unwrap_or_else(|| USER_AGENT.to_string()));

        let client = client_builder.build()?;
        let credentials = self
            .credentials
            .unwrap_or_else(|| Arc::new(MemoryCredentialStore::new()));

        Ok(LuxeClient {
            inner: Arc::new(Inner {
                client,
                base_url,
                credentials,
                refresh: RefreshCoordinator::new(),
            }),
        })
    }
}
