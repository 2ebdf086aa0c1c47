use async_trait::async_trait;
use jiff::Timestamp;
use snaplink_core::repository::{Mapping, Repository, Result};
use snaplink_core::{ShortCode, StorageError};
use sqlx::mysql::{MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::Row;
use std::time::Duration;
use tracing::{debug, error};

/// Schema of the `url_mappings` table.
pub const SCHEMA: &str = include_str!("../ddl/mysql/url_mappings.sql");

const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// MySQL implementation of the repository contract.
///
/// Short codes are unique through `uk_url_mappings_short_code`; the
/// database assigns `id` and `created_at` on insert. Timestamps are read
/// back as microseconds since the Unix epoch.
#[derive(Debug, Clone)]
pub struct MySqlRepository {
    pool: MySqlPool,
}

impl MySqlRepository {
    /// Creates a repository from an existing MySQL connection pool.
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Creates a repository by opening a new MySQL connection pool.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = MySqlPoolOptions::new()
            .max_connections(DEFAULT_MAX_CONNECTIONS)
            .acquire_timeout(DEFAULT_ACQUIRE_TIMEOUT)
            .connect(database_url)
            .await
            .map_err(map_sqlx_error)?;
        Ok(Self::new(pool))
    }

    /// Creates the `url_mappings` table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        debug!("url_mappings schema is in place");
        Ok(())
    }

    /// Returns a reference to the underlying pool.
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }
}

fn parse_created_at(micros: i64) -> Result<Timestamp> {
    Timestamp::from_microsecond(micros).map_err(|e| {
        StorageError::InvalidData(format!("invalid created_at timestamp '{}': {e}", micros))
    })
}

fn mapping_from_row(row: &MySqlRow) -> Result<Mapping> {
    let short_code: String = row.try_get("short_code").map_err(map_sqlx_error)?;
    let original_url: String = row.try_get("original_url").map_err(map_sqlx_error)?;
    let created_at: i64 = row.try_get("created_at_us").map_err(map_sqlx_error)?;
    let access_count: u64 = row.try_get("access_count").map_err(map_sqlx_error)?;

    Ok(Mapping {
        code: ShortCode::new(short_code)
            .map_err(|e| StorageError::InvalidData(e.to_string()))?,
        original_url,
        created_at: parse_created_at(created_at)?,
        access_count,
    })
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(sqlx::error::DatabaseError::is_unique_violation)
}

fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    let message = err.to_string();

    match err {
        sqlx::Error::PoolTimedOut => StorageError::Timeout(message),
        sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StorageError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::RowNotFound => StorageError::InvalidData(message),
        _ => StorageError::Query(message),
    }
}

#[async_trait]
impl Repository for MySqlRepository {
    async fn create(&self, code: &ShortCode, original_url: &str) -> Result<Mapping> {
        let result = sqlx::query(
            r#"
            INSERT INTO url_mappings (short_code, original_url)
            VALUES (?, ?)
            "#,
        )
        .bind(code.as_str())
        .bind(original_url)
        .execute(&self.pool)
        .await;

        let id = match result {
            Ok(done) => done.last_insert_id(),
            Err(err) if is_unique_violation(&err) => {
                return Err(StorageError::Conflict(code.to_string()))
            }
            Err(err) => {
                error!(code = %code, error = %err, "failed to insert url mapping");
                return Err(map_sqlx_error(err));
            }
        };

        let row = sqlx::query(
            r#"
            SELECT short_code,
                   original_url,
                   CAST(UNIX_TIMESTAMP(created_at) * 1000000 AS SIGNED) AS created_at_us,
                   access_count
            FROM url_mappings
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        mapping_from_row(&row)
    }

    async fn get_by_code(&self, code: &ShortCode) -> Result<String> {
        let row = sqlx::query(
            r#"
            SELECT original_url
            FROM url_mappings
            WHERE short_code = ?
            LIMIT 1
            "#,
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let Some(row) = row else {
            return Err(StorageError::NotFound(code.to_string()));
        };

        row.try_get("original_url").map_err(map_sqlx_error)
    }

    async fn list_all(&self) -> Result<Vec<Mapping>> {
        let rows = sqlx::query(
            r#"
            SELECT short_code,
                   original_url,
                   CAST(UNIX_TIMESTAMP(created_at) * 1000000 AS SIGNED) AS created_at_us,
                   access_count
            FROM url_mappings
            ORDER BY id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.iter().map(mapping_from_row).collect()
    }

    async fn increment_access(&self, code: &ShortCode, by: u64) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE url_mappings
            SET access_count = access_count + ?
            WHERE short_code = ?
            "#,
        )
        .bind(by)
        .bind(code.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }
}
