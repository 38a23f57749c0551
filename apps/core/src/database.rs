use crate::actors::traits::CountStore;
use crate::error::AppError;
use crate::fs_manager::PortablePathManager;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::path::Path;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{info, warn};

/// Storage key of the rejection counter
pub const COUNT_KEY: &str = "rejectionCount";

pub async fn init_db(db_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    let db_url = format!("sqlite://{}", db_path.to_string_lossy());

    info!("Initializing database at: {}", db_url);

    let options = SqliteConnectOptions::from_str(&db_url)?.create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(2)
        .connect_with(options)
        .await?;

    migrate(&pool).await?;
    Ok(pool)
}

pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS counters (
            key TEXT PRIMARY KEY,
            value INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    info!("Database initialized and migrations applied.");
    Ok(())
}

// --- Counters ---

pub async fn get_counter(pool: &SqlitePool, key: &str) -> Result<Option<i64>, sqlx::Error> {
    let row = sqlx::query("SELECT value FROM counters WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await?;
    row.map(|r| r.try_get::<i64, _>("value")).transpose()
}

pub async fn set_counter(pool: &SqlitePool, key: &str, value: i64) -> Result<(), sqlx::Error> {
    let updated_at = Utc::now().timestamp();

    sqlx::query(
        r#"
        INSERT INTO counters (key, value, updated_at)
        VALUES (?, ?, ?)
        ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
        "#,
    )
    .bind(key)
    .bind(value)
    .bind(updated_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// Counter persisted in SQLite under [`COUNT_KEY`].
#[derive(Clone)]
pub struct SqliteCountStore {
    pool: SqlitePool,
}

impl SqliteCountStore {
    /// Wraps an already migrated pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens (or creates) the database file and migrates it.
    pub async fn open(db_path: &Path) -> Result<Self, AppError> {
        Ok(Self::new(init_db(db_path).await?))
    }

    /// Creates the data layout under `data_dir` and opens its counter database.
    pub async fn open_in(data_dir: &Path) -> Result<Self, AppError> {
        PortablePathManager::init(data_dir)?;
        Self::open(&PortablePathManager::db_path(data_dir)).await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl CountStore for SqliteCountStore {
    async fn load_count(&self) -> Result<u64, AppError> {
        let value = get_counter(&self.pool, COUNT_KEY).await?.unwrap_or(0);
        u64::try_from(value)
            .map_err(|_| AppError::Validation(format!("Negative stored count: {}", value)))
    }

    async fn persist_count(&self, count: u64) -> Result<(), AppError> {
        let value = i64::try_from(count)
            .map_err(|_| AppError::Validation(format!("Count out of range: {}", count)))?;
        set_counter(&self.pool, COUNT_KEY, value).await?;
        Ok(())
    }
}

/// Process-local counter, used when no database is available.
#[derive(Debug, Default)]
pub struct MemoryCountStore {
    count: AtomicU64,
}

impl MemoryCountStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_count(count: u64) -> Self {
        Self {
            count: AtomicU64::new(count),
        }
    }

    pub fn get(&self) -> u64 {
        self.count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CountStore for MemoryCountStore {
    async fn load_count(&self) -> Result<u64, AppError> {
        Ok(self.get())
    }

    async fn persist_count(&self, count: u64) -> Result<(), AppError> {
        self.count.store(count, Ordering::SeqCst);
        Ok(())
    }
}

/// Store chosen at startup: SQLite when the database opens, memory otherwise.
pub enum CounterBackend {
    Sqlite(SqliteCountStore),
    Memory(MemoryCountStore),
}

impl CounterBackend {
    /// Opens the SQLite store, falling back to memory so detection keeps working.
    pub async fn open_or_memory(db_path: &Path) -> Self {
        match SqliteCountStore::open(db_path).await {
            Ok(store) => CounterBackend::Sqlite(store),
            Err(e) => {
                warn!("Counter database unavailable, using memory: {}", e);
                CounterBackend::Memory(MemoryCountStore::new())
            }
        }
    }

    /// Same as [`CounterBackend::open_or_memory`] for the layout under `data_dir`.
    pub async fn open_in_or_memory(data_dir: &Path) -> Self {
        if let Err(e) = PortablePathManager::init(data_dir) {
            warn!("Failed to initialize data directory, using memory: {}", e);
            return CounterBackend::Memory(MemoryCountStore::new());
        }
        Self::open_or_memory(&PortablePathManager::db_path(data_dir)).await
    }
}

#[async_trait]
impl CountStore for CounterBackend {
    async fn load_count(&self) -> Result<u64, AppError> {
        match self {
            CounterBackend::Sqlite(store) => store.load_count().await,
            CounterBackend::Memory(store) => store.load_count().await,
        }
    }

    async fn persist_count(&self, count: u64) -> Result<(), AppError> {
        match self {
            CounterBackend::Sqlite(store) => store.persist_count(count).await,
            CounterBackend::Memory(store) => store.persist_count(count).await,
        }
    }
}
