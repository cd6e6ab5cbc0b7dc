//! Builders behind the [`DiagnosticExt`](crate::DiagnosticExt) wrappers

use std::future::{Future, IntoFuture};
use std::marker::PhantomData;
use std::pin::Pin;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value as JsonValue};

use crate::DiagnosticError;
use crate::command::{Command, CommandExecutor, CommandKind, JsonRow};
use crate::enrich::diagnostic_error;
use crate::params::ParameterSource;

/// Builder for commands returning rows mapped to `T`
#[must_use = "the command does not run until awaited"]
pub struct QueryBuilder<'a, E: ?Sized, T> {
   executor: &'a mut E,
   text: String,
   kind: CommandKind,
   params: Option<&'a ParameterSource>,
   timeout: Option<Duration>,
   _row: PhantomData<fn() -> T>,
}

impl<'a, E, T> QueryBuilder<'a, E, T>
where
   E: CommandExecutor + ?Sized,
   T: DeserializeOwned,
{
   pub(crate) fn new(executor: &'a mut E, text: String, kind: CommandKind) -> Self {
      Self {
         executor,
         text,
         kind,
         params: None,
         timeout: None,
         _row: PhantomData,
      }
   }

   /// Parameters to bind and to report if the command fails
   pub fn params(mut self, params: &'a ParameterSource) -> Self {
      self.params = Some(params);
      self
   }

   /// Give up on the command after `timeout`
   pub fn timeout(mut self, timeout: Duration) -> Self {
      self.timeout = Some(timeout);
      self
   }

   /// Run the command and map every row to `T`
   pub async fn execute(self) -> Result<Vec<T>, DiagnosticError> {
      let Self {
         executor,
         text,
         kind,
         params,
         timeout,
         ..
      } = self;
      let command = Command {
         text: &text,
         kind,
         params,
         timeout,
      };

      let result = async {
         let rows = executor.query(&command).await?;
         rows.into_iter().map(map_row).collect::<Result<Vec<T>, sqlx::Error>>()
      }
      .await;

      result.map_err(|cause| diagnostic_error(&command, cause))
   }
}

impl<'a, E, T> IntoFuture for QueryBuilder<'a, E, T>
where
   E: CommandExecutor + ?Sized,
   T: DeserializeOwned + Send + 'a,
{
   type Output = Result<Vec<T>, DiagnosticError>;
   type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send + 'a>>;

   fn into_future(self) -> Self::IntoFuture {
      Box::pin(self.execute())
   }
}

/// Builder for commands returning an affected-row count
#[must_use = "the command does not run until awaited"]
pub struct ExecuteBuilder<'a, E: ?Sized> {
   executor: &'a mut E,
   text: String,
   kind: CommandKind,
   params: Option<&'a ParameterSource>,
   timeout: Option<Duration>,
}

impl<'a, E> ExecuteBuilder<'a, E>
where
   E: CommandExecutor + ?Sized,
{
   pub(crate) fn new(executor: &'a mut E, text: String, kind: CommandKind) -> Self {
      Self {
         executor,
         text,
         kind,
         params: None,
         timeout: None,
      }
   }

   /// Parameters to bind and to report if the command fails
   pub fn params(mut self, params: &'a ParameterSource) -> Self {
      self.params = Some(params);
      self
   }

   /// Give up on the command after `timeout`
   pub fn timeout(mut self, timeout: Duration) -> Self {
      self.timeout = Some(timeout);
      self
   }

   /// Run the command and return the number of affected rows
   pub async fn execute(self) -> Result<u64, DiagnosticError> {
      let Self {
         executor,
         text,
         kind,
         params,
         timeout,
      } = self;
      let command = Command {
         text: &text,
         kind,
         params,
         timeout,
      };

      executor
         .execute(&command)
         .await
         .map_err(|cause| diagnostic_error(&command, cause))
   }
}

impl<'a, E> IntoFuture for ExecuteBuilder<'a, E>
where
   E: CommandExecutor + ?Sized,
{
   type Output = Result<u64, DiagnosticError>;
   type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send + 'a>>;

   fn into_future(self) -> Self::IntoFuture {
      Box::pin(self.execute())
   }
}

/// Map a JSON row onto `T` by column name
fn map_row<T: DeserializeOwned>(row: JsonRow) -> Result<T, sqlx::Error> {
   let object: Map<String, JsonValue> = row.into_iter().collect();
   serde_json::from_value(JsonValue::Object(object)).map_err(|e| sqlx::Error::Decode(Box::new(e)))
}
