//! [`CommandExecutor`] for SQLite connections and pools.

use std::fmt::Write as _;
use std::future::Future;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde_json::Value as JsonValue;
use sqlx::sqlite::{SqliteArguments, SqliteConnection, SqlitePool};
use sqlx::{Sqlite, query::Query};
use tracing::{debug, trace};

use crate::Error;
use crate::command::{Command, CommandExecutor, CommandKind, JsonRow};
use crate::decode::decode_rows;
use crate::params::ParameterSource;

/// Quoted literals and comments are matched first so that placeholders inside
/// them are skipped; only capture group 1 is a real placeholder name.
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
   Regex::new(
      r#"'(?:[^']|'')*'|"(?:[^"]|"")*"|--[^\n]*|/\*(?s:.*?)\*/|[:@$]([A-Za-z_][A-Za-z0-9_]*)"#,
   )
   .expect("placeholder pattern is valid")
});

/// SQL text with its parameters in bind order.
#[derive(Debug, PartialEq)]
pub(crate) struct BoundSql {
   pub sql: String,
   pub values: Vec<JsonValue>,
}

/// Rewrite named placeholders to numbered ones and order the values to match.
///
/// Each `:name`, `@name` or `$name` becomes `?N`, where `N` is the parameter's
/// 1-based position in the source, and every value is bound in source order.
/// SQL with no named placeholders binds the values positionally.
pub(crate) fn bind_parameters(
   sql: &str,
   params: Option<&ParameterSource>,
) -> Result<BoundSql, Error> {
   let Some(params) = params else {
      return Ok(BoundSql {
         sql: sql.to_string(),
         values: Vec::new(),
      });
   };

   let mut rewritten = String::with_capacity(sql.len());
   let mut last = 0;
   for caps in PLACEHOLDER.captures_iter(sql) {
      let Some(name) = caps.get(1) else {
         continue;
      };
      let index = params
         .index_of(name.as_str())
         .ok_or_else(|| Error::UnknownParameter(name.as_str().to_string()))?;

      // The sigil is a single ASCII byte in front of the name.
      rewritten.push_str(&sql[last..name.start() - 1]);
      let _ = write!(rewritten, "?{}", index + 1);
      last = name.end();
   }

   let sql = if last == 0 {
      sql.to_string()
   } else {
      rewritten.push_str(&sql[last..]);
      rewritten
   };

   Ok(BoundSql {
      sql,
      values: params.values().cloned().collect(),
   })
}

/// Bind a JSON value to a SQLx query.
pub fn bind_value<'a>(
   query: Query<'a, Sqlite, SqliteArguments<'a>>,
   value: JsonValue,
) -> Query<'a, Sqlite, SqliteArguments<'a>> {
   match value {
      JsonValue::Null => query.bind(None::<JsonValue>),
      JsonValue::String(s) => query.bind(s),
      JsonValue::Number(number) => {
         // Preserve integer precision by binding as i64 when possible
         if let Some(int_val) = number.as_i64() {
            query.bind(int_val)
         } else if let Some(uint_val) = number.as_u64() {
            // u64 only lands here above i64::MAX; SQLite INTEGER can't hold it
            query.bind(uint_val as f64)
         } else {
            query.bind(number.as_f64().unwrap_or_default())
         }
      }
      other => query.bind(other),
   }
}

fn build_query(bound: &BoundSql) -> Query<'_, Sqlite, SqliteArguments<'_>> {
   let mut q = sqlx::query(&bound.sql);
   for value in &bound.values {
      q = bind_value(q, value.clone());
   }
   q
}

fn prepare(command: &Command<'_>) -> Result<BoundSql, sqlx::Error> {
   if command.kind == CommandKind::StoredProcedure {
      return Err(sqlx::Error::Configuration(
         format!(
            "SQLite does not support stored procedures (requested '{}')",
            command.text
         )
         .into(),
      ));
   }

   bind_parameters(command.text, command.params).map_err(|e| sqlx::Error::Encode(Box::new(e)))
}

/// Run `fut`, failing with `ErrorKind::TimedOut` once `limit` elapses.
pub(crate) async fn with_timeout<F, T>(limit: Option<Duration>, fut: F) -> Result<T, sqlx::Error>
where
   F: Future<Output = Result<T, sqlx::Error>>,
{
   let Some(limit) = limit else {
      return fut.await;
   };

   match tokio::time::timeout(limit, fut).await {
      Ok(result) => result,
      Err(_) => {
         debug!(?limit, "command timed out");
         Err(sqlx::Error::Io(std::io::Error::new(
            std::io::ErrorKind::TimedOut,
            format!("command timed out after {limit:?}"),
         )))
      }
   }
}

impl CommandExecutor for SqliteConnection {
   async fn query(&mut self, command: &Command<'_>) -> Result<Vec<JsonRow>, sqlx::Error> {
      let bound = prepare(command)?;
      trace!(sql = %bound.sql, params = bound.values.len(), "query");

      with_timeout(command.timeout, async {
         let rows = build_query(&bound).fetch_all(&mut *self).await?;
         decode_rows(rows)
      })
      .await
   }

   async fn execute(&mut self, command: &Command<'_>) -> Result<u64, sqlx::Error> {
      let bound = prepare(command)?;
      trace!(sql = %bound.sql, params = bound.values.len(), "execute");

      with_timeout(command.timeout, async {
         let result = build_query(&bound).execute(&mut *self).await?;
         Ok(result.rows_affected())
      })
      .await
   }
}

/// Each command runs on a connection acquired from the pool for its duration.
impl CommandExecutor for SqlitePool {
   async fn query(&mut self, command: &Command<'_>) -> Result<Vec<JsonRow>, sqlx::Error> {
      let mut conn = self.acquire().await?;
      CommandExecutor::query(&mut *conn, command).await
   }

   async fn execute(&mut self, command: &Command<'_>) -> Result<u64, sqlx::Error> {
      let mut conn = self.acquire().await?;
      CommandExecutor::execute(&mut *conn, command).await
   }
}
