//! Storage handle: SQLite pool creation and schema provisioning

use std::{str::FromStr, time::Duration};

use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Sqlite, Transaction,
};

use crate::{config::DatabaseConfig, error::AppResult};

/// Open a connection pool with foreign keys enforced.
///
/// In-memory databases live and die with their connection, so they get a
/// single connection that is never recycled.
pub async fn connect(config: &DatabaseConfig) -> AppResult<Pool<Sqlite>> {
    let options = SqliteConnectOptions::from_str(&config.url)?
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(config.busy_timeout_secs))
        .create_if_missing(true);

    let pool = if config.is_in_memory() {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?
    } else {
        SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_with(options)
            .await?
    };

    tracing::debug!(url = %config.url, "Opened database pool");
    Ok(pool)
}

/// Begin a transaction that holds the database write lock from its first
/// statement.
///
/// A plain `BEGIN` only takes the write lock at the first write, after the
/// transaction's checks have read under a shared lock. SQLite refuses that
/// upgrade with `SQLITE_BUSY` when another writer got there first, without
/// consulting the busy timeout. Taking the lock up front makes concurrent
/// writers queue on the busy timeout instead, so each one runs its checks
/// against the committed state of the one before it.
pub async fn begin_write(pool: &Pool<Sqlite>) -> AppResult<Transaction<'static, Sqlite>> {
    let mut tx = pool.begin().await?;
    // Any write statement acquires RESERVED, even one that matches no rows
    sqlx::query("UPDATE members SET id = id WHERE 0")
        .execute(&mut *tx)
        .await?;
    Ok(tx)
}

/// Apply the embedded migrations
pub async fn migrate(pool: &Pool<Sqlite>) -> AppResult<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("Database migrations completed");
    Ok(())
}
