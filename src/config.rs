//! Configuration for SQLite connection pools

use serde::{Deserialize, Serialize};

/// Configuration for pools opened with [`connect_pool`](crate::connect_pool)
///
/// # Examples
///
/// ```
/// use sqlx_sqlite_diagnostics::SqlitePoolConfig;
///
/// // Use defaults
/// let config = SqlitePoolConfig::default();
///
/// // Override just one field
/// let config = SqlitePoolConfig {
///     max_connections: 2,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SqlitePoolConfig {
   /// Maximum number of pooled connections
   ///
   /// Default: 6
   pub max_connections: u32,

   /// Idle timeout for pooled connections (in seconds)
   ///
   /// Connections that remain idle for this duration will be closed automatically.
   ///
   /// Default: 30
   pub idle_timeout_secs: u64,

   /// Create the database file if it does not exist
   ///
   /// Default: true
   pub create_if_missing: bool,
}

impl Default for SqlitePoolConfig {
   fn default() -> Self {
      Self {
         max_connections: 6,
         idle_timeout_secs: 30,
         create_if_missing: true,
      }
   }
}
