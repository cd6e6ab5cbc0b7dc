use crate::enrich::Diagnostics;

/// Result type alias for operations that are not command wrappers.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for parameter handling, pooling and row decoding.
///
/// The command wrappers themselves return [`DiagnosticError`], which converts
/// into this type so callers can use `?` across both.
#[derive(Debug, thiserror::Error)]
pub enum Error {
   /// Error from SQLx operations.
   #[error(transparent)]
   Sqlx(#[from] sqlx::Error),

   /// A wrapped command failed; carries the command and its parameters.
   #[error(transparent)]
   Diagnostic(#[from] DiagnosticError),

   /// A value handed to [`ParameterSource::record`](crate::ParameterSource::record)
   /// that does not serialize to a map of named fields.
   #[error("unsupported parameter source: {0}")]
   UnsupportedParameterSource(String),

   /// A named placeholder in the SQL text has no matching parameter.
   #[error("no parameter named '{0}' was supplied")]
   UnknownParameter(String),

   /// SQLite type that cannot be mapped to JSON.
   #[error("unsupported datatype: {0}")]
   UnsupportedDatatype(String),

   /// I/O error when accessing database files.
   #[error("io error: {0}")]
   Io(#[from] std::io::Error),
}

impl Error {
   /// Extract a structured error code from the error type.
   ///
   /// A [`DiagnosticError`] reports the code of the failure it wraps.
   pub fn error_code(&self) -> String {
      match self {
         Error::Sqlx(e) => sqlx_error_code(e),
         Error::Diagnostic(e) => sqlx_error_code(e.cause()),
         Error::UnsupportedParameterSource(_) => "UNSUPPORTED_PARAMETER_SOURCE".to_string(),
         Error::UnknownParameter(_) => "UNKNOWN_PARAMETER".to_string(),
         Error::UnsupportedDatatype(_) => "UNSUPPORTED_DATATYPE".to_string(),
         Error::Io(_) => "IO_ERROR".to_string(),
      }
   }
}

fn sqlx_error_code(e: &sqlx::Error) -> String {
   if let Some(code) = e.as_database_error().and_then(|db_err| db_err.code()) {
      return format!("SQLITE_{}", code);
   }
   "SQLX_ERROR".to_string()
}

/// A command failure annotated with the command identifier and its parameters.
///
/// The original failure is kept as the error [`source`](std::error::Error::source)
/// and is never replaced: if collecting diagnostics goes wrong, the problem is
/// recorded in [`enrichment_error`](Self::enrichment_error) and the entries
/// gathered up to that point are kept.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct DiagnosticError {
   message: &'static str,
   diagnostics: Diagnostics,
   enrichment_error: Option<EnrichmentError>,
   #[source]
   cause: sqlx::Error,
}

impl DiagnosticError {
   pub(crate) fn new(
      message: &'static str,
      cause: sqlx::Error,
      diagnostics: Diagnostics,
      enrichment_error: Option<EnrichmentError>,
   ) -> Self {
      Self {
         message,
         diagnostics,
         enrichment_error,
         cause,
      }
   }

   /// The fixed failure message for the call path that produced this error.
   pub fn message(&self) -> &'static str {
      self.message
   }

   /// Ordered diagnostic entries: the command identifier first, then one
   /// entry per parameter.
   pub fn diagnostics(&self) -> &Diagnostics {
      &self.diagnostics
   }

   /// Why diagnostics are incomplete, if they are.
   pub fn enrichment_error(&self) -> Option<&EnrichmentError> {
      self.enrichment_error.as_ref()
   }

   /// The failure raised by the delegated call.
   pub fn cause(&self) -> &sqlx::Error {
      &self.cause
   }

   /// Take ownership of the delegated call's failure.
   pub fn into_cause(self) -> sqlx::Error {
      self.cause
   }
}

/// Reasons diagnostic collection stopped before every parameter was recorded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnrichmentError {
   /// The parameter value is null and has no display text.
   #[error("parameter '{name}' has no value")]
   NullValue { name: String },

   /// A parameter name collides with a key that is already recorded.
   #[error("diagnostic key '{key}' is already present")]
   DuplicateKey { key: String },
}
