//! Bearer-token storage
//!
//! The token lives under a single fixed key. The CLI keeps it in a small
//! SQLite file so it survives between invocations.

use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;
use tracing::{debug, info};

/// Storage key of the bearer token
pub const TOKEN_KEY: &str = "token";

#[derive(Debug, Error)]
pub enum TokenStoreError {
    #[error("token database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("token database path error: {0}")]
    Io(#[from] std::io::Error),

    #[error("token store lock poisoned")]
    Poisoned,
}

/// Persisted client storage for the session token
pub trait TokenStore: Send + Sync {
    fn get(&self) -> Result<Option<String>, TokenStoreError>;
    fn set(&self, token: &str) -> Result<(), TokenStoreError>;
    fn clear(&self) -> Result<(), TokenStoreError>;
}

/// Process-local store, nothing persisted
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }

    fn slot(&self) -> Result<MutexGuard<'_, Option<String>>, TokenStoreError> {
        self.token.lock().map_err(|_| TokenStoreError::Poisoned)
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> Result<Option<String>, TokenStoreError> {
        Ok(self.slot()?.clone())
    }

    fn set(&self, token: &str) -> Result<(), TokenStoreError> {
        *self.slot()? = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        *self.slot()? = None;
        Ok(())
    }
}

/// SQLite-backed key-value store holding the token
pub struct SqliteTokenStore {
    conn: Mutex<Connection>,
}

impl SqliteTokenStore {
    /// Open (creating if needed) the database at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self, TokenStoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        let store = Self::with_connection(conn)?;
        info!("Token store opened: {}", path.display());
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self, TokenStoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, TokenStoreError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT DEFAULT CURRENT_TIMESTAMP
            )",
            [],
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, TokenStoreError> {
        self.conn.lock().map_err(|_| TokenStoreError::Poisoned)
    }
}

impl TokenStore for SqliteTokenStore {
    fn get(&self) -> Result<Option<String>, TokenStoreError> {
        let conn = self.conn()?;
        let token = conn
            .query_row(
                "SELECT value FROM kv WHERE key = ?1",
                params![TOKEN_KEY],
                |row| row.get(0),
            )
            .optional()?;
        Ok(token)
    }

    fn set(&self, token: &str) -> Result<(), TokenStoreError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR REPLACE INTO kv (key, value, updated_at)
             VALUES (?1, ?2, CURRENT_TIMESTAMP)",
            params![TOKEN_KEY, token],
        )?;
        debug!("Token stored");
        Ok(())
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        let conn = self.conn()?;
        let removed = conn.execute("DELETE FROM kv WHERE key = ?1", params![TOKEN_KEY])?;
        debug!(removed, "Token cleared");
        Ok(())
    }
}
