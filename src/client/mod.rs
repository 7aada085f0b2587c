//! Strategy service client
//!
//! Talks to the REST service that stores strategies:
//! - `POST /api/strategies` creates a strategy from a cleaned draft
//! - `GET /api/strategies`, `/api/users/me`, `/api/portfolios` read account data
//! - `POST /api/auth/register` and `/api/auth/login` manage the account
//!
//! All authenticated calls send `Authorization: Bearer <token>` with the
//! token kept in a [`TokenStore`].

pub mod auth;
pub mod error;
pub mod http;
pub mod session;
pub mod types;

pub use auth::{MemoryTokenStore, SqliteTokenStore, TokenStore, TokenStoreError, TOKEN_KEY};
pub use error::{ApiError, ApiResult};
pub use http::{ClientConfig, Endpoint, StrategyApiClient};
pub use session::{Session, SubmitError};
pub use types::*;

/// Default service address
pub const API_BASE_URL: &str = "http://localhost:8080";
