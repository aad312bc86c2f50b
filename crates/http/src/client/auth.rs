//! Authentication API client methods

use reqwest::Method;
use serde_json::Value;
use tracing::{debug, warn};

use super::{ApiCall, ClientError, LuxeClient};
use crate::types::{AuthResponse, LoginRequest, RegisterRequest};

impl LuxeClient {
    /// Sign in and store the issued bearer token
    ///
    /// Staff accounts are turned away: the storefront is for customers only,
    /// and their token is never stored.
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ClientError> {
        let call = ApiCall::new(Method::POST, "/auth/login")
            .json(request)?
            .without_refresh();
        let response: AuthResponse = self.request(call).await?;

        if !response.user.is_customer() {
            return Err(ClientError::Forbidden(
                "this portal is for customers only; staff sign in through the dashboard".into(),
            ));
        }

        self.adopt_token(&response.access_token);
        Ok(response)
    }

    /// Create a customer account and store the issued bearer token
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ClientError> {
        let call = ApiCall::new(Method::POST, "/auth/register")
            .json(request)?
            .without_refresh();
        let response: AuthResponse = self.request(call).await?;

        self.adopt_token(&response.access_token);
        Ok(response)
    }

    /// Drop the stored token, then tell the backend to end the session
    ///
    /// The token is removed before the call goes out, so the backend sees only
    /// the session cookie.
    pub async fn logout(&self) -> Result<(), ClientError> {
        if let Err(err) = self.credentials().clear() {
            warn!(error = %err, "Failed to clear stored credential");
        }

        let call = ApiCall::new(Method::POST, "/auth/logout").without_refresh();
        let _: Value = self.request(call).await?;
        debug!("Backend session ended");
        Ok(())
    }

    fn adopt_token(&self, token: &str) {
        if let Err(err) = self.credentials().store(token) {
            warn!(error = %err, "Failed to persist bearer token");
        }
    }
}
