#![cfg_attr(
    not(any(feature = "pg", feature = "sqlite")),
    allow(
        unused_imports,
        unused_variables,
        dead_code,
        unreachable_code,
        unused_lifetimes
    )
)]

//! Explicitly-constructed database handle for the Stockroom server.
//!
//! [`DbHandle`] owns one sqlx pool (SQLite or PostgreSQL, detected from the
//! DSN scheme) with an explicit open/close lifecycle: the binary connects at
//! startup, passes the handle into the modules, and closes it after the HTTP
//! server drains. With the `sea-orm` feature the same pool is exposed as a
//! SeaORM [`DatabaseConnection`] for the module repositories.
//!
//! ```rust,no_run
//! #[tokio::main]
//! async fn main() -> db::Result<()> {
//!     use db::{ConnectOpts, DbHandle};
//!
//!     let db = DbHandle::connect("sqlite://data/app.db", ConnectOpts::default()).await?;
//!     #[cfg(feature = "sea-orm")]
//!     let _conn = db.sea();
//!     db.close().await;
//!     Ok(())
//! }
//! ```

use std::time::Duration;

#[cfg(feature = "pg")]
use sqlx::{postgres::PgPoolOptions, PgPool};
#[cfg(feature = "sqlite")]
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

#[cfg(feature = "sea-orm")]
use sea_orm::DatabaseConnection;
#[cfg(all(feature = "sea-orm", feature = "pg"))]
use sea_orm::SqlxPostgresConnector;
#[cfg(all(feature = "sea-orm", feature = "sqlite"))]
use sea_orm::SqlxSqliteConnector;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DbError>;

/// Errors produced while detecting, connecting to, or preparing a database.
#[derive(Debug, Error)]
pub enum DbError {
    /// DSN scheme matched none of the supported engines.
    #[error("Unknown DSN: {0}")]
    UnknownDsn(String),

    /// DSN named an engine whose cargo feature is compiled out.
    #[error("Feature not enabled: {0}")]
    FeatureDisabled(&'static str),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[cfg(feature = "sea-orm")]
    #[error(transparent)]
    Sea(#[from] sea_orm::DbErr),

    /// Failed to create parent directories for a sqlite file.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Supported engines.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DbEngine {
    Postgres,
    Sqlite,
}

/// Pool knobs; each driver applies the subset it supports. `None` leaves the
/// sqlx builder default in place.
#[derive(Clone, Debug)]
pub struct ConnectOpts {
    pub max_conns: Option<u32>,
    pub min_conns: Option<u32>,
    pub acquire_timeout: Option<Duration>,
    pub idle_timeout: Option<Duration>,
    pub max_lifetime: Option<Duration>,
    pub test_before_acquire: bool,

    /// sqlite only: PRAGMA busy_timeout applied to every new connection.
    pub sqlite_busy_timeout: Option<Duration>,
    /// sqlite only: create missing parent directories for file DSNs.
    pub create_sqlite_dirs: bool,
}

impl Default for ConnectOpts {
    fn default() -> Self {
        Self {
            max_conns: Some(10),
            min_conns: None,
            acquire_timeout: Some(Duration::from_secs(30)),
            idle_timeout: None,
            max_lifetime: None,
            test_before_acquire: false,
            sqlite_busy_timeout: Some(Duration::from_millis(5_000)),
            create_sqlite_dirs: true,
        }
    }
}

/// One concrete sqlx pool.
#[derive(Clone)]
pub enum DbPool {
    #[cfg(feature = "pg")]
    Postgres(PgPool),
    #[cfg(feature = "sqlite")]
    Sqlite(SqlitePool),
}

/// Main handle: engine tag, sqlx pool, and (optionally) a SeaORM view of it.
pub struct DbHandle {
    engine: DbEngine,
    pool: DbPool,
    #[cfg(feature = "sea-orm")]
    sea: DatabaseConnection,
}

impl DbHandle {
    /// Detect engine by DSN scheme prefix. The tail (credentials, query
    /// string) is never inspected or mutated.
    pub fn detect(dsn: &str) -> Result<DbEngine> {
        // Forgiving with env-file artifacts: leading whitespace is ignored.
        let s = dsn.trim_start();

        if s.starts_with("postgres://") || s.starts_with("postgresql://") {
            Ok(DbEngine::Postgres)
        } else if s.starts_with("sqlite:") {
            Ok(DbEngine::Sqlite)
        } else {
            Err(DbError::UnknownDsn(dsn.to_string()))
        }
    }

    /// Connect and build the handle for whichever engine the DSN names.
    pub async fn connect(dsn: &str, opts: ConnectOpts) -> Result<Self> {
        match Self::detect(dsn)? {
            #[cfg(feature = "pg")]
            DbEngine::Postgres => Self::connect_postgres(dsn, &opts).await,
            #[cfg(feature = "sqlite")]
            DbEngine::Sqlite => Self::connect_sqlite(dsn, &opts).await,
            #[cfg(not(feature = "pg"))]
            DbEngine::Postgres => Err(DbError::FeatureDisabled("PostgreSQL feature not enabled")),
            #[cfg(not(feature = "sqlite"))]
            DbEngine::Sqlite => Err(DbError::FeatureDisabled("SQLite feature not enabled")),
        }
    }

    #[cfg(feature = "pg")]
    async fn connect_postgres(dsn: &str, opts: &ConnectOpts) -> Result<Self> {
        let mut o = PgPoolOptions::new();
        if let Some(n) = opts.max_conns {
            o = o.max_connections(n);
        }
        if let Some(n) = opts.min_conns {
            o = o.min_connections(n);
        }
        if let Some(t) = opts.acquire_timeout {
            o = o.acquire_timeout(t);
        }
        if let Some(t) = opts.idle_timeout {
            o = o.idle_timeout(t);
        }
        if let Some(t) = opts.max_lifetime {
            o = o.max_lifetime(t);
        }
        if opts.test_before_acquire {
            o = o.test_before_acquire(true);
        }

        let pool = o.connect(dsn).await?;
        tracing::debug!("postgres pool established");

        #[cfg(feature = "sea-orm")]
        let sea = SqlxPostgresConnector::from_sqlx_postgres_pool(pool.clone());
        Ok(Self {
            engine: DbEngine::Postgres,
            pool: DbPool::Postgres(pool),
            #[cfg(feature = "sea-orm")]
            sea,
        })
    }

    #[cfg(feature = "sqlite")]
    async fn connect_sqlite(dsn: &str, opts: &ConnectOpts) -> Result<Self> {
        let dsn = prepare_sqlite_path(dsn, opts.create_sqlite_dirs)?;

        let mut o = SqlitePoolOptions::new();
        if let Some(n) = opts.max_conns {
            o = o.max_connections(n);
        }
        if let Some(n) = opts.min_conns {
            o = o.min_connections(n);
        }
        if let Some(t) = opts.acquire_timeout {
            o = o.acquire_timeout(t);
        }
        if let Some(t) = opts.idle_timeout {
            o = o.idle_timeout(t);
        }
        if let Some(t) = opts.max_lifetime {
            o = o.max_lifetime(t);
        }
        if opts.test_before_acquire {
            o = o.test_before_acquire(true);
        }

        // PRAGMAs are per-connection, so they run in after_connect for every
        // pooled connection, not once per pool.
        let busy = opts.sqlite_busy_timeout;
        o = o.after_connect(move |conn, _meta| {
            Box::pin(async move {
                sqlx::query("PRAGMA journal_mode = WAL")
                    .execute(&mut *conn)
                    .await?;
                sqlx::query("PRAGMA synchronous = NORMAL")
                    .execute(&mut *conn)
                    .await?;
                if let Some(ms) = busy {
                    // PRAGMA can't take bind parameters; inline the literal.
                    let ms = std::cmp::min(ms.as_millis(), i64::MAX as u128) as i64;
                    sqlx::query(&format!("PRAGMA busy_timeout = {ms}"))
                        .execute(&mut *conn)
                        .await?;
                }
                Ok(())
            })
        });

        let pool = o.connect(&dsn).await?;
        tracing::debug!("sqlite pool established");

        #[cfg(feature = "sea-orm")]
        let sea = SqlxSqliteConnector::from_sqlx_sqlite_pool(pool.clone());
        Ok(Self {
            engine: DbEngine::Sqlite,
            pool: DbPool::Sqlite(pool),
            #[cfg(feature = "sea-orm")]
            sea,
        })
    }

    /// Graceful pool close. Dropping the pool would also close it; this makes
    /// the shutdown ordering explicit in the binary.
    pub async fn close(self) {
        match self.pool {
            #[cfg(feature = "pg")]
            DbPool::Postgres(p) => p.close().await,
            #[cfg(feature = "sqlite")]
            DbPool::Sqlite(p) => p.close().await,
        }
        tracing::debug!("database pool closed");
    }

    pub fn engine(&self) -> DbEngine {
        self.engine
    }

    #[cfg(feature = "pg")]
    pub fn sqlx_postgres(&self) -> Option<&PgPool> {
        match self.pool {
            DbPool::Postgres(ref p) => Some(p),
            #[cfg(feature = "sqlite")]
            _ => None,
        }
    }

    #[cfg(feature = "sqlite")]
    pub fn sqlx_sqlite(&self) -> Option<&SqlitePool> {
        match self.pool {
            DbPool::Sqlite(ref p) => Some(p),
            #[cfg(feature = "pg")]
            _ => None,
        }
    }

    /// SeaORM view of the pool (clone; cheap handle).
    #[cfg(feature = "sea-orm")]
    pub fn sea(&self) -> DatabaseConnection {
        self.sea.clone()
    }
}

/// For plain file DSNs, create the parent directory so sqlite can create the
/// database file itself. `:memory:` and URI forms pass through untouched.
#[cfg(feature = "sqlite")]
fn prepare_sqlite_path(dsn: &str, create_dirs: bool) -> Result<String> {
    if !create_dirs || dsn.contains(":memory:") {
        return Ok(dsn.to_string());
    }

    let raw = dsn
        .strip_prefix("sqlite://")
        .or_else(|| dsn.strip_prefix("sqlite:"))
        .unwrap_or(dsn);

    // "file:" URIs and DSNs with query strings have no plain path to prepare.
    if !raw.starts_with("file:") && !raw.contains('?') {
        if let Some(parent) = std::path::Path::new(raw).parent() {
            if !parent.as_os_str().is_empty() {
                // One-time blocking call during startup.
                std::fs::create_dir_all(parent)?;
            }
        }
    }

    Ok(dsn.to_string())
}
