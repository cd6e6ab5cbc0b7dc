use serde::de::DeserializeOwned;

use crate::builders::{ExecuteBuilder, QueryBuilder};
use crate::command::{CommandExecutor, CommandKind};

/// Query and procedure wrappers that report the failing command.
///
/// Each wrapper behaves exactly like the underlying [`CommandExecutor`] call
/// on success. On failure it returns a [`DiagnosticError`](crate::DiagnosticError)
/// whose source is the original error and whose
/// [`diagnostics`](crate::DiagnosticError::diagnostics) hold the SQL text or
/// procedure name followed by every parameter.
///
/// Wrappers are builders: add `.params(..)` or `.timeout(..)` as needed, then
/// `.await`. A transaction is passed by using it as the executor
/// (`(&mut *tx).query_sql(..)`).
///
/// # Examples
///
/// ```no_run
/// # async fn example(pool: &sqlx::SqlitePool) -> Result<(), sqlx_sqlite_diagnostics::Error> {
/// use sqlx_sqlite_diagnostics::{DiagnosticExt, NamedParameters, ParameterSource};
///
/// #[derive(serde::Deserialize)]
/// struct User {
///    id: i64,
///    name: String,
/// }
///
/// let mut conn = pool.acquire().await?;
/// let params = ParameterSource::from(NamedParameters::new().with("name", "Alice"));
///
/// let users: Vec<User> = conn
///    .query_sql("SELECT id, name FROM users WHERE name = :name")
///    .params(&params)
///    .await?;
///
/// for user in users {
///    println!("{}: {}", user.id, user.name);
/// }
/// # Ok(())
/// # }
/// ```
pub trait DiagnosticExt: CommandExecutor {
   /// Run SQL text and map the rows to `T`.
   fn query_sql<T: DeserializeOwned>(&mut self, sql: impl Into<String>) -> QueryBuilder<'_, Self, T> {
      QueryBuilder::new(self, sql.into(), CommandKind::Text)
   }

   /// Run a stored procedure and map the rows to `T`.
   fn query_procedure<T: DeserializeOwned>(
      &mut self,
      name: impl Into<String>,
   ) -> QueryBuilder<'_, Self, T> {
      QueryBuilder::new(self, name.into(), CommandKind::StoredProcedure)
   }

   /// Run a stored procedure and return the number of affected rows.
   fn execute_procedure(&mut self, name: impl Into<String>) -> ExecuteBuilder<'_, Self> {
      ExecuteBuilder::new(self, name.into(), CommandKind::StoredProcedure)
   }
}

impl<E: CommandExecutor + ?Sized> DiagnosticExt for E {}
