//! Commands and the execution capability the wrappers delegate to.

use std::future::Future;
use std::time::Duration;

use indexmap::IndexMap;
use serde_json::Value as JsonValue;

use crate::params::ParameterSource;

/// A result row keyed by column name, in column order.
pub type JsonRow = IndexMap<String, JsonValue>;

/// How the command text is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
   /// The text is SQL.
   Text,
   /// The text is the name of a stored procedure.
   StoredProcedure,
}

impl CommandKind {
   /// Diagnostic key under which the command text is recorded.
   pub fn diagnostic_key(self) -> &'static str {
      match self {
         CommandKind::Text => "InlineSql",
         CommandKind::StoredProcedure => "Procedure",
      }
   }

   /// Message of the [`DiagnosticError`](crate::DiagnosticError) raised when
   /// a command of this kind fails.
   pub fn failure_message(self) -> &'static str {
      match self {
         CommandKind::Text => "Dapper sql execution failed!",
         CommandKind::StoredProcedure => "Dapper proc execution failed!",
      }
   }
}

/// A single command as handed to a [`CommandExecutor`].
#[derive(Debug, Clone, Copy)]
pub struct Command<'a> {
   /// SQL text or procedure name.
   pub text: &'a str,
   pub kind: CommandKind,
   pub params: Option<&'a ParameterSource>,
   /// Upper bound on how long the executor may spend on the command.
   pub timeout: Option<Duration>,
}

impl<'a> Command<'a> {
   pub fn new(text: &'a str, kind: CommandKind) -> Self {
      Self {
         text,
         kind,
         params: None,
         timeout: None,
      }
   }
}

/// The database capability wrapped by [`DiagnosticExt`](crate::DiagnosticExt).
///
/// Implemented for [`SqliteConnection`](sqlx::SqliteConnection), which also
/// covers pooled connections and open transactions through `&mut *conn`, and
/// for [`SqlitePool`](sqlx::SqlitePool). Other backends plug in by
/// implementing this trait.
pub trait CommandExecutor: Send {
   /// Run a command and return every row it produces.
   fn query(
      &mut self,
      command: &Command<'_>,
   ) -> impl Future<Output = Result<Vec<JsonRow>, sqlx::Error>> + Send;

   /// Run a command and return the number of rows it affected.
   fn execute(
      &mut self,
      command: &Command<'_>,
   ) -> impl Future<Output = Result<u64, sqlx::Error>> + Send;
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_command_kind_keys_and_messages() {
      assert_eq!(CommandKind::Text.diagnostic_key(), "InlineSql");
      assert_eq!(CommandKind::StoredProcedure.diagnostic_key(), "Procedure");
      assert_eq!(
         CommandKind::Text.failure_message(),
         "Dapper sql execution failed!"
      );
      assert_eq!(
         CommandKind::StoredProcedure.failure_message(),
         "Dapper proc execution failed!"
      );
   }

   #[test]
   fn test_command_new_has_no_params_or_timeout() {
      let command = Command::new("SELECT 1", CommandKind::Text);
      assert!(command.params.is_none());
      assert!(command.timeout.is_none());
   }
}
