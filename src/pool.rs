use std::path::Path;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::Result;
use crate::config::SqlitePoolConfig;
use crate::error::Error;

/// Open a connection pool for the SQLite database at `path`.
///
/// Pass `None` to use the defaults (6 connections, 30 second idle timeout,
/// file created when missing).
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> Result<(), sqlx_sqlite_diagnostics::Error> {
/// use sqlx_sqlite_diagnostics::{DiagnosticExt, connect_pool};
///
/// let mut pool = connect_pool("app.db", None).await?;
/// let rows: Vec<serde_json::Value> = pool.query_sql("SELECT 1 AS one").await?;
/// # Ok(())
/// # }
/// ```
pub async fn connect_pool(
   path: impl AsRef<Path>,
   custom_config: Option<SqlitePoolConfig>,
) -> Result<SqlitePool> {
   let config = custom_config.unwrap_or_default();
   let path = path.as_ref();

   if path.as_os_str().is_empty() {
      return Err(Error::Io(std::io::Error::new(
         std::io::ErrorKind::InvalidInput,
         "Database path cannot be empty",
      )));
   }

   let options = SqliteConnectOptions::new()
      .filename(path)
      .create_if_missing(config.create_if_missing);

   let pool = SqlitePoolOptions::new()
      .max_connections(config.max_connections)
      .min_connections(0)
      .idle_timeout(Some(Duration::from_secs(config.idle_timeout_secs)))
      .connect_with(options)
      .await?;

   Ok(pool)
}
