use std::path::Path;
use std::sync::{Arc, Mutex};

use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, error};

use crate::error::{ClientError, Result};
use crate::models::SessionToken;

const TOKEN_KEY: &str = "token";
const USERNAME_KEY: &str = "username";

/// Persistent string key-value storage.
pub trait CredentialStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Credentials remembered between runs so the user stays logged in.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredCredentials {
    pub token: SessionToken,
    pub username: String,
}

impl StoredCredentials {
    /// `None` unless both the token and the username are present.
    pub fn load(store: &dyn CredentialStore) -> Result<Option<Self>> {
        let token = store.get(TOKEN_KEY)?;
        let username = store.get(USERNAME_KEY)?;

        Ok(match (token, username) {
            (Some(token), Some(username)) => Some(Self {
                token: SessionToken::new(token),
                username,
            }),
            _ => None,
        })
    }

    pub fn save(&self, store: &dyn CredentialStore) -> Result<()> {
        store.set(TOKEN_KEY, self.token.as_str())?;
        store.set(USERNAME_KEY, &self.username)?;
        debug!(username = %self.username, "Saved credentials");
        Ok(())
    }

    pub fn clear(store: &dyn CredentialStore) -> Result<()> {
        store.remove(TOKEN_KEY)?;
        store.remove(USERNAME_KEY)?;
        debug!("Cleared stored credentials");
        Ok(())
    }
}

/// SQLite backed `CredentialStore`.
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(dir) = path.parent() {
            if !dir.exists() {
                std::fs::create_dir_all(dir)?;
            }
        }

        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        // Create the settings table if it doesn't exist
        conn.execute(
            "CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> rusqlite::Result<T>) -> Result<T> {
        let conn = self.conn.lock().map_err(|_| {
            error!("Database connection lock poisoned");
            ClientError::StoreUnavailable
        })?;
        Ok(f(&*conn)?)
    }
}

impl CredentialStore for Database {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT value FROM settings WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
        })
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
                params![key, value],
            )
            .map(|_| ())
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM settings WHERE key = ?1", params![key])
                .map(|_| ())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_remove() {
        let db = Database::open_in_memory().unwrap();

        assert_eq!(db.get("token").unwrap(), None);
        db.set("token", "abc").unwrap();
        db.set("token", "def").unwrap();
        assert_eq!(db.get("token").unwrap().as_deref(), Some("def"));

        db.remove("token").unwrap();
        db.remove("token").unwrap();
        assert_eq!(db.get("token").unwrap(), None);
    }

    #[test]
    fn credentials_need_both_keys() {
        let db = Database::open_in_memory().unwrap();
        db.set(TOKEN_KEY, "abc").unwrap();
        assert_eq!(StoredCredentials::load(&db).unwrap(), None);

        db.set(USERNAME_KEY, "ada").unwrap();
        let creds = StoredCredentials::load(&db).unwrap().unwrap();
        assert_eq!(creds.username, "ada");
        assert_eq!(creds.token.as_str(), "abc");

        StoredCredentials::clear(&db).unwrap();
        assert_eq!(StoredCredentials::load(&db).unwrap(), None);
    }

    #[test]
    fn credentials_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("client.db");

        let creds = StoredCredentials {
            token: SessionToken::new("tok"),
            username: "ada".into(),
        };
        creds.save(&Database::open(&path).unwrap()).unwrap();

        let reopened = Database::open(&path).unwrap();
        assert_eq!(StoredCredentials::load(&reopened).unwrap(), Some(creds));
    }
}
