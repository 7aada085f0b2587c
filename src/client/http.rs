//! Strategy service HTTP client
//!
//! Each endpoint carries its own error-body convention and fallback message;
//! see [`Endpoint`].

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::error::{ApiError, ApiResult};
use super::types::{
    Credentials, ErrorBody, LoginResponse, PortfolioSummary, StrategyRecord, UserProfile,
};
use super::API_BASE_URL;
use crate::submission::CleanedStrategy;

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: API_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// One service route and how it reports failure
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub method: Method,
    pub path: &'static str,
    pub errors: ErrorBody,
    pub fallback: &'static str,
    /// Sends the bearer token; 401/403 then mean the session is gone
    pub authenticated: bool,
}

pub const CREATE_STRATEGY: Endpoint = Endpoint {
    method: Method::POST,
    path: "/api/strategies",
    errors: ErrorBody::JsonMessage,
    fallback: "Failed to create strategy.",
    authenticated: true,
};

pub const LIST_STRATEGIES: Endpoint = Endpoint {
    method: Method::GET,
    path: "/api/strategies",
    errors: ErrorBody::Ignored,
    fallback: "Failed to fetch strategies",
    authenticated: true,
};

pub const CURRENT_USER: Endpoint = Endpoint {
    method: Method::GET,
    path: "/api/users/me",
    errors: ErrorBody::Ignored,
    fallback: "Failed to fetch user data",
    authenticated: true,
};

pub const LIST_PORTFOLIOS: Endpoint = Endpoint {
    method: Method::GET,
    path: "/api/portfolios",
    errors: ErrorBody::Ignored,
    fallback: "Failed to fetch portfolios",
    authenticated: true,
};

pub const REGISTER: Endpoint = Endpoint {
    method: Method::POST,
    path: "/api/auth/register",
    errors: ErrorBody::PlainText,
    fallback: "Registration failed",
    authenticated: false,
};

pub const LOGIN: Endpoint = Endpoint {
    method: Method::POST,
    path: "/api/auth/login",
    errors: ErrorBody::PlainText,
    fallback: "Login failed",
    authenticated: false,
};

/// Map a non-success response to the error the caller sees
pub fn failure(endpoint: &Endpoint, status: u16, body: &str) -> ApiError {
    if endpoint.authenticated && (status == 401 || status == 403) {
        return ApiError::Unauthorized {
            status: Some(status),
        };
    }
    ApiError::Http {
        status,
        message: endpoint.errors.message(body, endpoint.fallback),
    }
}

/// Strategy service client
#[derive(Debug, Clone)]
pub struct StrategyApiClient {
    http_client: Client,
    base_url: String,
}

impl StrategyApiClient {
    pub fn new() -> ApiResult<Self> {
        Self::with_config(ClientConfig::default())
    }

    pub fn with_config(config: ClientConfig) -> ApiResult<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ApiError::Transport)?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, endpoint: &Endpoint, token: Option<&str>) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, endpoint.path);
        let request = self.http_client.request(endpoint.method.clone(), url);
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, endpoint: &Endpoint, request: RequestBuilder) -> ApiResult<Response> {
        let response = request.send().await.map_err(|e| {
            warn!("{} {} transport error: {}", endpoint.method, endpoint.path, e);
            ApiError::Transport(e)
        })?;

        let status = response.status();
        debug!("{} {} -> {}", endpoint.method, endpoint.path, status);
        if status.is_success() {
            return Ok(response);
        }

        let body = match endpoint.errors {
            ErrorBody::Ignored => String::new(),
            _ => response.text().await.unwrap_or_default(),
        };
        Err(failure(endpoint, status.as_u16(), &body))
    }

    async fn call_json<B, T>(
        &self,
        endpoint: &Endpoint,
        token: Option<&str>,
        body: Option<&B>,
    ) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut request = self.request(endpoint, token);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = self.send(endpoint, request).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// POST a cleaned strategy; returns the server's copy
    pub async fn create_strategy(
        &self,
        token: &str,
        strategy: &CleanedStrategy,
    ) -> ApiResult<StrategyRecord> {
        self.call_json(&CREATE_STRATEGY, Some(token), Some(strategy)).await
    }

    pub async fn list_strategies(&self, token: &str) -> ApiResult<Vec<StrategyRecord>> {
        self.call_json::<(), _>(&LIST_STRATEGIES, Some(token), None).await
    }

    pub async fn current_user(&self, token: &str) -> ApiResult<UserProfile> {
        self.call_json::<(), _>(&CURRENT_USER, Some(token), None).await
    }

    pub async fn list_portfolios(&self, token: &str) -> ApiResult<Vec<PortfolioSummary>> {
        self.call_json::<(), _>(&LIST_PORTFOLIOS, Some(token), None).await
    }

    /// Create an account; returns the server's plain-text confirmation
    pub async fn register(&self, credentials: &Credentials) -> ApiResult<String> {
        let request = self.request(&REGISTER, None).json(credentials);
        let response = self.send(&REGISTER, request).await?;
        response.text().await.map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Exchange credentials for a bearer token
    pub async fn login(&self, credentials: &Credentials) -> ApiResult<String> {
        let response: LoginResponse = self.call_json(&LOGIN, None, Some(credentials)).await?;
        Ok(response.token)
    }
}
