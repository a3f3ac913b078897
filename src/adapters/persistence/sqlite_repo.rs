//! SQLite-backed credential store via libsql. Implements UserRepoPort.
//!
//! Single `users` table; UNIQUE constraints on username and email are the only
//! arbiter of duplicates, so concurrent registrations cannot both succeed.
//! Every operation opens its own connection and drops it on return (including `?` exits).

use crate::domain::{DomainError, UserRecord};
use crate::ports::UserRepoPort;
use libsql::{Connection, Database, params};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

const USERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT UNIQUE NOT NULL,
    email TEXT UNIQUE NOT NULL,
    password_hash TEXT NOT NULL
)"#;

/// Database file name inside the data directory.
pub const USERS_DB_FILE: &str = "users.db";

/// SQLite credential store. One database file (users.db) in the given base directory.
pub struct SqliteUserRepo {
    db: Database,
    db_path: PathBuf,
    busy_timeout: Duration,
}

impl SqliteUserRepo {
    /// Open (or create) the database file. Does not touch the schema; call
    /// [`UserRepoPort::initialize`] before use. The returned repo is safe to share via Arc.
    pub async fn open(
        base_dir: impl AsRef<Path>,
        busy_timeout: Duration,
    ) -> Result<Self, DomainError> {
        let base = base_dir.as_ref();
        std::fs::create_dir_all(base).map_err(|e| DomainError::Repo(e.to_string()))?;
        let db_path = base.join(USERS_DB_FILE);
        let path_str = db_path.to_string_lossy();
        let db = libsql::Builder::new_local(path_str.as_ref())
            .build()
            .await
            .map_err(|e| DomainError::Repo(e.to_string()))?;

        let repo = Self {
            db,
            db_path,
            busy_timeout,
        };
        // WAL lets readers proceed while a registration commits.
        let conn = repo.connect().await?;
        drain_pragma(&conn, "PRAGMA journal_mode=WAL").await?;

        info!(path = %repo.db_path.display(), "SQLite credential store opened (WAL)");
        Ok(repo)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Fresh connection with the busy timeout applied, so concurrent writers
    /// queue instead of failing with SQLITE_BUSY.
    async fn connect(&self) -> Result<Connection, DomainError> {
        let conn = self
            .db
            .connect()
            .map_err(|e| DomainError::Repo(e.to_string()))?;
        let pragma = format!("PRAGMA busy_timeout = {}", self.busy_timeout.as_millis());
        drain_pragma(&conn, &pragma).await?;
        Ok(conn)
    }
}

/// PRAGMA returns a row (the new value), so run it through query and consume
/// the rows; execute fails when rows come back.
async fn drain_pragma(conn: &Connection, pragma: &str) -> Result<(), DomainError> {
    let mut rows = conn
        .query(pragma, ())
        .await
        .map_err(|e| DomainError::Repo(format!("{pragma} failed: {e}")))?;
    while rows
        .next()
        .await
        .map_err(|e| DomainError::Repo(e.to_string()))?
        .is_some()
    {}
    Ok(())
}

/// Maps a UNIQUE violation to `DuplicateKey` naming the offending column.
fn map_insert_error(e: libsql::Error) -> DomainError {
    let msg = e.to_string();
    if let Some(pos) = msg.find("UNIQUE constraint failed") {
        let column = if msg[pos..].contains("users.email") {
            "email"
        } else if msg[pos..].contains("users.username") {
            "username"
        } else {
            "user"
        };
        DomainError::DuplicateKey(column.to_string())
    } else {
        DomainError::Repo(msg)
    }
}

#[async_trait::async_trait]
impl UserRepoPort for SqliteUserRepo {
    async fn initialize(&self) -> Result<(), DomainError> {
        let conn = self.connect().await?;
        conn.execute(USERS_TABLE, ())
            .await
            .map_err(|e| DomainError::Repo(e.to_string()))?;
        debug!("users table ensured");
        Ok(())
    }

    async fn insert(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<(), DomainError> {
        let conn = self.connect().await?;
        conn.execute(
            "INSERT INTO users (username, email, password_hash) VALUES (?1, ?2, ?3)",
            params![username, email, password_hash],
        )
        .await
        .map_err(map_insert_error)?;
        info!(username, email, "user stored");
        Ok(())
    }

    async fn find_password_hash(&self, email: &str) -> Result<Option<String>, DomainError> {
        let conn = self.connect().await?;
        let mut rows = conn
            .query(
                "SELECT password_hash FROM users WHERE email = ?1",
                params![email],
            )
            .await
            .map_err(|e| DomainError::Repo(e.to_string()))?;

        if let Some(row) = rows
            .next()
            .await
            .map_err(|e| DomainError::Repo(e.to_string()))?
        {
            let hash: String = row.get(0).map_err(|e| DomainError::Repo(e.to_string()))?;
            Ok(Some(hash))
        } else {
            Ok(None)
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, DomainError> {
        let conn = self.connect().await?;
        let mut rows = conn
            .query(
                "SELECT id, username, email, password_hash FROM users WHERE email = ?1",
                params![email],
            )
            .await
            .map_err(|e| DomainError::Repo(e.to_string()))?;

        let Some(row) = rows
            .next()
            .await
            .map_err(|e| DomainError::Repo(e.to_string()))?
        else {
            return Ok(None);
        };
        Ok(Some(UserRecord {
            id: row.get(0).map_err(|e| DomainError::Repo(e.to_string()))?,
            username: row.get(1).map_err(|e| DomainError::Repo(e.to_string()))?,
            email: row.get(2).map_err(|e| DomainError::Repo(e.to_string()))?,
            password_hash: row.get(3).map_err(|e| DomainError::Repo(e.to_string()))?,
        }))
    }
}
