//! Favorites store contract and SQLite implementation.
//!
//! # Responsibility
//! - Record which catalog items the user saved, durably across restarts.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Entries are keyed by `(namespace, item_id)`.
//! - `put` is an upsert; the stored payload is the full item record.
//! - `delete` of a missing key succeeds without error.
//! - Each operation is atomic on its own; no cross-call locking is offered.

use crate::db::{open_db, open_db_in_memory, DbError};
use crate::model::item::{ItemId, ItemRecord};
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::runtime::Handle;

/// Namespace used when no explicit configuration is supplied.
pub const DEFAULT_FAVORITES_NAMESPACE: &str = "@catalog";

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage error for favorites operations.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    /// Record payload could not be encoded or decoded.
    Payload(serde_json::Error),
    /// Connection guard was poisoned by a panicking holder.
    LockPoisoned,
    MissingRequiredTable(&'static str),
    /// Store-specific failure reported by non-SQLite implementations.
    Backend(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Payload(err) => write!(f, "invalid favorite payload: {err}"),
            Self::LockPoisoned => write!(f, "favorites connection lock poisoned"),
            Self::MissingRequiredTable(table) => {
                write!(f, "favorites schema is missing table `{table}`")
            }
            Self::Backend(message) => write!(f, "favorites backend error: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Payload(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Payload(value)
    }
}

/// Key prefix grouping every favorite saved by this application.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FavoritesNamespace(String);

impl FavoritesNamespace {
    /// Builds a namespace, rejecting blank values.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Default for FavoritesNamespace {
    fn default() -> Self {
        Self(DEFAULT_FAVORITES_NAMESPACE.to_string())
    }
}

impl Display for FavoritesNamespace {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0.as_str())
    }
}

/// Durable key-value store of saved items.
#[async_trait]
pub trait FavoritesStore: Send + Sync {
    /// Returns whether `item_id` is saved under `namespace`.
    async fn exists(&self, namespace: &FavoritesNamespace, item_id: ItemId) -> StoreResult<bool>;
    /// Saves the full record under `namespace`, replacing any previous entry.
    async fn put(&self, namespace: &FavoritesNamespace, item: &ItemRecord) -> StoreResult<()>;
    /// Removes `item_id` from `namespace`.
    async fn delete(&self, namespace: &FavoritesNamespace, item_id: ItemId) -> StoreResult<()>;
}

/// SQLite-backed favorites store.
///
/// Async operations run on the blocking pool when a tokio runtime is
/// present, and inline otherwise.
pub struct SqliteFavoritesStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteFavoritesStore {
    /// Opens (and migrates) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::try_new(open_db(path)?)
    }

    /// Opens a migrated in-memory database, mainly for tests and probes.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::try_new(open_db_in_memory()?)
    }

    /// Wraps a migrated/ready connection.
    pub fn try_new(conn: Connection) -> StoreResult<Self> {
        ensure_favorites_table(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Loads the saved payload for one item, if present.
    pub fn get(
        &self,
        namespace: &FavoritesNamespace,
        item_id: ItemId,
    ) -> StoreResult<Option<ItemRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT payload
             FROM favorites
             WHERE namespace = ?1
               AND item_id = ?2;",
        )?;
        let mut rows = stmt.query(params![namespace.as_str(), item_id_to_db(item_id)?])?;
        if let Some(row) = rows.next()? {
            let payload: String = row.get("payload")?;
            return Ok(Some(serde_json::from_str(payload.as_str())?));
        }
        Ok(None)
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }

    async fn run<T, F>(&self, op: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> StoreResult<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        let task = move || {
            let guard = conn.lock().map_err(|_| StoreError::LockPoisoned)?;
            op(&*guard)
        };
        match Handle::try_current() {
            Ok(handle) => handle
                .spawn_blocking(task)
                .await
                .map_err(|err| StoreError::Backend(format!("favorites task failed: {err}")))?,
            Err(_) => task(),
        }
    }
}

#[async_trait]
impl FavoritesStore for SqliteFavoritesStore {
    async fn exists(&self, namespace: &FavoritesNamespace, item_id: ItemId) -> StoreResult<bool> {
        let namespace = namespace.as_str().to_string();
        let item_id = item_id_to_db(item_id)?;
        self.run(move |conn| {
            let exists: i64 = conn.query_row(
                "SELECT EXISTS(
                    SELECT 1
                    FROM favorites
                    WHERE namespace = ?1
                      AND item_id = ?2
                );",
                params![namespace, item_id],
                |row| row.get(0),
            )?;
            Ok(exists == 1)
        })
        .await
    }

    async fn put(&self, namespace: &FavoritesNamespace, item: &ItemRecord) -> StoreResult<()> {
        let namespace = namespace.as_str().to_string();
        let item_id = item_id_to_db(item.id)?;
        let payload = serde_json::to_string(item)?;
        self.run(move |conn| {
            conn.execute(
                "INSERT INTO favorites (namespace, item_id, payload)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(namespace, item_id) DO UPDATE SET
                    payload = excluded.payload,
                    saved_at = (strftime('%s', 'now') * 1000);",
                params![namespace, item_id, payload],
            )?;
            Ok(())
        })
        .await
    }

    async fn delete(&self, namespace: &FavoritesNamespace, item_id: ItemId) -> StoreResult<()> {
        let namespace = namespace.as_str().to_string();
        let item_id = item_id_to_db(item_id)?;
        self.run(move |conn| {
            conn.execute(
                "DELETE FROM favorites WHERE namespace = ?1 AND item_id = ?2;",
                params![namespace, item_id],
            )?;
            Ok(())
        })
        .await
    }
}

// SQLite integers are signed; ids beyond i64::MAX cannot be stored.
fn item_id_to_db(item_id: ItemId) -> StoreResult<i64> {
    i64::try_from(item_id)
        .map_err(|_| StoreError::Backend(format!("item id {item_id} exceeds storage range")))
}

fn ensure_favorites_table(conn: &Connection) -> StoreResult<()> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = 'favorites'
        );",
        [],
        |row| row.get(0),
    )?;
    if exists != 1 {
        return Err(StoreError::MissingRequiredTable("favorites"));
    }
    Ok(())
}
