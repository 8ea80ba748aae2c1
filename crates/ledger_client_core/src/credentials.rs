//! Credential storage: access/refresh token pair under fixed keys.
//!
//! The client never touches ambient global storage; a [`CredentialStore`] is
//! injected so tests can use [`MemoryCredentialStore`].

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection};

use crate::error::ApiError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CredentialKey {
    AccessToken,
    RefreshToken,
}

impl CredentialKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialKey::AccessToken => "access_token",
            CredentialKey::RefreshToken => "refresh_token",
        }
    }
}

pub trait CredentialStore: Send + Sync {
    fn get(&self, key: CredentialKey) -> Result<Option<String>, ApiError>;
    fn set(&self, key: CredentialKey, value: &str) -> Result<(), ApiError>;
    fn remove(&self, key: CredentialKey) -> Result<(), ApiError>;

    /// Drop both tokens.
    fn clear(&self) -> Result<(), ApiError> {
        self.remove(CredentialKey::AccessToken)?;
        self.remove(CredentialKey::RefreshToken)
    }
}

impl<S: CredentialStore + ?Sized> CredentialStore for std::sync::Arc<S> {
    fn get(&self, key: CredentialKey) -> Result<Option<String>, ApiError> {
        (**self).get(key)
    }

    fn set(&self, key: CredentialKey, value: &str) -> Result<(), ApiError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: CredentialKey) -> Result<(), ApiError> {
        (**self).remove(key)
    }
}

#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    values: Mutex<HashMap<CredentialKey, String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tokens(access: Option<&str>, refresh: Option<&str>) -> Self {
        let mut values = HashMap::new();
        if let Some(a) = access {
            values.insert(CredentialKey::AccessToken, a.to_string());
        }
        if let Some(r) = refresh {
            values.insert(CredentialKey::RefreshToken, r.to_string());
        }
        Self {
            values: Mutex::new(values),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<CredentialKey, String>>, ApiError> {
        self.values
            .lock()
            .map_err(|_| ApiError::Storage("credential store lock poisoned".to_string()))
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, key: CredentialKey) -> Result<Option<String>, ApiError> {
        Ok(self.lock()?.get(&key).cloned())
    }

    fn set(&self, key: CredentialKey, value: &str) -> Result<(), ApiError> {
        self.lock()?.insert(key, value.to_string());
        Ok(())
    }

    fn remove(&self, key: CredentialKey) -> Result<(), ApiError> {
        self.lock()?.remove(&key);
        Ok(())
    }
}

/// Persistent store: a `config (key, value)` table in a local SQLite file.
pub struct SqliteCredentialStore {
    conn: Mutex<Connection>,
}

impl SqliteCredentialStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ApiError> {
        let path = path.as_ref();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|e| ApiError::Storage(e.to_string()))?;
        }
        log::debug!("credentials: opening {:?}", path);
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, ApiError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, ApiError> {
        conn.execute_batch("CREATE TABLE IF NOT EXISTS config (key TEXT PRIMARY KEY, value TEXT);")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn with_conn<F, T>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&Connection) -> Result<T, rusqlite::Error>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|_| ApiError::Storage("credential store lock poisoned".to_string()))?;
        Ok(f(&conn)?)
    }
}

impl CredentialStore for SqliteCredentialStore {
    fn get(&self, key: CredentialKey) -> Result<Option<String>, ApiError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT value FROM config WHERE key = ?1")?;
            let mut rows = stmt.query(params![key.as_str()])?;
            if let Some(row) = rows.next()? {
                return row.get(0);
            }
            Ok(None)
        })
    }

    fn set(&self, key: CredentialKey, value: &str) -> Result<(), ApiError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO config (key, value) VALUES (?1, ?2) ON CONFLICT(key) DO UPDATE SET value = ?2",
                params![key.as_str(), value],
            )?;
            Ok(())
        })
    }

    fn remove(&self, key: CredentialKey) -> Result<(), ApiError> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM config WHERE key = ?1", params![key.as_str()])?;
            Ok(())
        })
    }
}
