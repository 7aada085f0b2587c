//! Authenticated session
//!
//! Pairs the HTTP client with the token store. Any 401/403 from an
//! authenticated endpoint clears the stored token.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

use super::auth::TokenStore;
use super::error::{ApiError, ApiResult};
use super::http::StrategyApiClient;
use super::types::{Credentials, PortfolioSummary, StrategyRecord, UserProfile};
use crate::draft::DraftStore;
use crate::indicators::IndicatorRegistry;
use crate::submission::{clean_for_submission, lint, CleanedStrategy};

/// Submission failed; the draft is handed back for another attempt
#[derive(Debug, Error)]
#[error("{error}")]
pub struct SubmitError {
    pub store: DraftStore,
    #[source]
    pub error: ApiError,
}

/// Resets the in-flight flag when a submission finishes either way
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct Session {
    client: StrategyApiClient,
    tokens: Arc<dyn TokenStore>,
    registry: Arc<IndicatorRegistry>,
    submitting: AtomicBool,
}

impl Session {
    pub fn new(client: StrategyApiClient, tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            client,
            tokens,
            registry: IndicatorRegistry::shared(),
            submitting: AtomicBool::new(false),
        }
    }

    pub fn with_registry(mut self, registry: Arc<IndicatorRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn client(&self) -> &StrategyApiClient {
        &self.client
    }

    pub fn is_logged_in(&self) -> ApiResult<bool> {
        Ok(self.tokens.get()?.is_some())
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::SeqCst)
    }

    fn token(&self) -> ApiResult<String> {
        match self.tokens.get()? {
            Some(token) => Ok(token),
            None => {
                warn!("No session token; log in first");
                Err(ApiError::Unauthorized { status: None })
            }
        }
    }

    /// Clear the token when the server rejected it. The rejection is
    /// returned even if clearing fails.
    fn settle<T>(&self, result: ApiResult<T>) -> ApiResult<T> {
        if let Err(ApiError::Unauthorized { status: Some(status) }) = &result {
            warn!("Server rejected token ({}), clearing session", status);
            if let Err(e) = self.tokens.clear() {
                error!("Failed to clear rejected token: {}", e);
            }
        }
        result
    }

    /// Post an already cleaned payload
    pub async fn create_strategy(&self, strategy: &CleanedStrategy) -> ApiResult<StrategyRecord> {
        let token = self.token()?;
        let result = self.client.create_strategy(&token, strategy).await;
        self.settle(result)
    }

    /// Clean, lint and submit the draft. On success the draft is consumed;
    /// on failure it is returned unchanged inside [`SubmitError`].
    pub async fn submit(&self, store: DraftStore) -> Result<StrategyRecord, SubmitError> {
        if self.submitting.swap(true, Ordering::SeqCst) {
            warn!("A submission is already in flight");
        }
        let _in_flight = InFlight(&self.submitting);

        let payload = clean_for_submission(store.draft());
        for issue in lint(&payload, &self.registry) {
            warn!("Draft check: {}", issue);
        }

        match self.create_strategy(&payload).await {
            Ok(record) => {
                info!("Strategy '{}' created ({} rules)", payload.name, payload.rules.len());
                Ok(record)
            }
            Err(error) => {
                warn!("Submission failed: {}", error);
                Err(SubmitError { store, error })
            }
        }
    }

    pub async fn list_strategies(&self) -> ApiResult<Vec<StrategyRecord>> {
        let token = self.token()?;
        let result = self.client.list_strategies(&token).await;
        self.settle(result)
    }

    pub async fn current_user(&self) -> ApiResult<UserProfile> {
        let token = self.token()?;
        let result = self.client.current_user(&token).await;
        self.settle(result)
    }

    pub async fn list_portfolios(&self) -> ApiResult<Vec<PortfolioSummary>> {
        let token = self.token()?;
        let result = self.client.list_portfolios(&token).await;
        self.settle(result)
    }

    /// Log in and persist the returned token
    pub async fn login(&self, credentials: &Credentials) -> ApiResult<()> {
        let token = self.client.login(credentials).await?;
        self.tokens.set(&token)?;
        info!("Logged in as {}", credentials.email);
        Ok(())
    }

    pub async fn register(&self, credentials: &Credentials) -> ApiResult<String> {
        let message = self.client.register(credentials).await?;
        info!("Registered {}", credentials.email);
        Ok(message)
    }

    pub fn logout(&self) -> ApiResult<()> {
        self.tokens.clear()?;
        info!("Logged out");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ClientConfig, MemoryTokenStore, TokenStoreError};
    use crate::draft::DraftField;
    use std::time::Duration;

    fn offline_session(tokens: Arc<dyn TokenStore>) -> Session {
        let config = ClientConfig::default()
            .with_base_url("http://127.0.0.1:1")
            .with_timeout(Duration::from_secs(2));
        Session::new(StrategyApiClient::with_config(config).unwrap(), tokens)
    }

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() {
        let session = offline_session(Arc::new(MemoryTokenStore::new()));
        assert!(!session.is_logged_in().unwrap());
        let err = session.list_strategies().await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized { status: None }));
    }

    #[tokio::test]
    async fn test_failed_submit_returns_draft() {
        let tokens = Arc::new(MemoryTokenStore::with_token("abc"));
        let session = offline_session(tokens.clone());

        let mut store = DraftStore::new();
        store.set_field(DraftField::Name("Keep me".to_string()));
        store.add_rule();
        let before = store.draft().clone();

        let err = session.submit(store).await.unwrap_err();
        assert!(matches!(err.error, ApiError::Transport(_)));
        assert_eq!(err.to_string(), "Failed to connect to the server.");
        assert_eq!(err.store.draft(), &before);
        assert!(!session.is_submitting());
        // Transport failures leave the session alone
        assert_eq!(tokens.get().unwrap().as_deref(), Some("abc"));
    }

    #[test]
    fn test_rejected_token_is_cleared() {
        let tokens = Arc::new(MemoryTokenStore::with_token("stale"));
        let session = offline_session(tokens.clone());

        let rejected = ApiError::Unauthorized { status: Some(401) };
        let result: ApiResult<()> = session.settle(Err(rejected));
        assert!(result.unwrap_err().is_unauthorized());
        assert_eq!(tokens.get().unwrap(), None);
    }

    /// Holds a token but cannot forget it
    struct StuckTokenStore;

    impl TokenStore for StuckTokenStore {
        fn get(&self) -> Result<Option<String>, TokenStoreError> {
            Ok(Some("stale".to_string()))
        }

        fn set(&self, _token: &str) -> Result<(), TokenStoreError> {
            Ok(())
        }

        fn clear(&self) -> Result<(), TokenStoreError> {
            Err(TokenStoreError::Poisoned)
        }
    }

    #[test]
    fn test_rejection_survives_failed_clear() {
        let session = offline_session(Arc::new(StuckTokenStore));

        let rejected = ApiError::Unauthorized { status: Some(403) };
        let result: ApiResult<()> = session.settle(Err(rejected));
        let err = result.unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(err.status(), Some(403));
    }

    #[test]
    fn test_other_errors_keep_token() {
        let tokens = Arc::new(MemoryTokenStore::with_token("fine"));
        let session = offline_session(tokens.clone());

        let result: ApiResult<()> = session.settle(Err(ApiError::Http {
            status: 500,
            message: "Failed to fetch strategies".to_string(),
        }));
        assert!(result.is_err());
        assert_eq!(tokens.get().unwrap().as_deref(), Some("fine"));

        session.logout().unwrap();
        assert_eq!(tokens.get().unwrap(), None);
    }
}
