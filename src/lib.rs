//! Query and procedure wrappers for SQLx that report the failing command.
//!
//! When a wrapped call fails, the error returned is a [`DiagnosticError`] that
//! keeps the original failure as its source and carries the SQL text (under
//! `InlineSql`) or procedure name (under `Procedure`), followed by every
//! parameter name and value. On success the wrappers return exactly what the
//! underlying call produced.
//!
//! - [`DiagnosticExt`] — `query_sql`, `query_procedure` and `execute_procedure`
//! - [`ParameterSource`] — a [`NamedParameters`] bag or the fields of a record
//! - [`CommandExecutor`] — the capability being wrapped, implemented for SQLite
//!   connections and pools
//!
//! # Example
//!
//! ```no_run
//! use sqlx_sqlite_diagnostics::{DiagnosticExt, ParameterSource, connect_pool};
//!
//! #[derive(serde::Serialize)]
//! struct ById {
//!    id: i64,
//! }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut pool = connect_pool("mydb.db", None).await?;
//! let params = ParameterSource::record(&ById { id: 1 })?;
//!
//! match pool
//!    .query_sql::<serde_json::Value>("SELECT * FROM missing_table WHERE id = :id")
//!    .params(&params)
//!    .await
//! {
//!    Ok(rows) => println!("{} rows", rows.len()),
//!    Err(e) => {
//!       // InlineSql = SELECT * FROM missing_table WHERE id = :id
//!       // id = 1
//!       for (key, value) in e.diagnostics().iter() {
//!          eprintln!("{key} = {value}");
//!       }
//!    }
//! }
//! # Ok(())
//! # }
//! ```

pub mod builders;
pub mod command;
mod config;
pub mod decode;
pub mod enrich;
pub mod error;
mod extensions;
pub mod params;
mod pool;
pub mod sqlite;

pub use builders::{ExecuteBuilder, QueryBuilder};
pub use command::{Command, CommandExecutor, CommandKind, JsonRow};
pub use config::SqlitePoolConfig;
pub use enrich::Diagnostics;
pub use error::{DiagnosticError, EnrichmentError, Error, Result};
pub use extensions::DiagnosticExt;
pub use params::{NamedParameters, ParameterSource, RecordParameters};
pub use pool::connect_pool;
pub use sqlite::bind_value;
