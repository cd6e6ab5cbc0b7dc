//! Builds the diagnostic entries attached to a failed command.

use indexmap::IndexMap;
use indexmap::map::Entry;
use serde::Serialize;

use crate::command::Command;
use crate::error::{DiagnosticError, EnrichmentError};
use crate::params::display_text;

/// Ordered diagnostic entries of a [`DiagnosticError`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics(IndexMap<String, String>);

impl Diagnostics {
   pub fn get(&self, key: &str) -> Option<&str> {
      self.0.get(key).map(String::as_str)
   }

   pub fn keys(&self) -> impl Iterator<Item = &str> {
      self.0.keys().map(String::as_str)
   }

   pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
      self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
   }

   pub fn len(&self) -> usize {
      self.0.len()
   }

   pub fn is_empty(&self) -> bool {
      self.0.is_empty()
   }

   fn insert_unique(&mut self, key: &str, value: String) -> Result<(), EnrichmentError> {
      match self.0.entry(key.to_string()) {
         Entry::Occupied(_) => Err(EnrichmentError::DuplicateKey {
            key: key.to_string(),
         }),
         Entry::Vacant(slot) => {
            slot.insert(value);
            Ok(())
         }
      }
   }
}

/// Collect the diagnostic entries for `command`.
///
/// The command text goes in first under [`CommandKind::diagnostic_key`], then
/// each parameter in source order. Collection stops at the first parameter
/// that cannot be recorded; the entries gathered so far are returned together
/// with the reason.
///
/// [`CommandKind::diagnostic_key`]: crate::CommandKind::diagnostic_key
pub fn collect(command: &Command<'_>) -> (Diagnostics, Option<EnrichmentError>) {
   let mut diagnostics = Diagnostics::default();

   // Always the first entry, so it cannot collide.
   diagnostics
      .0
      .insert(command.kind.diagnostic_key().to_string(), command.text.to_string());

   let Some(params) = command.params else {
      return (diagnostics, None);
   };

   for (name, value) in params.names_and_values() {
      let Some(text) = display_text(value) else {
         return (
            diagnostics,
            Some(EnrichmentError::NullValue {
               name: name.to_string(),
            }),
         );
      };
      if let Err(e) = diagnostics.insert_unique(name, text) {
         return (diagnostics, Some(e));
      }
   }

   (diagnostics, None)
}

/// Wrap `cause` in a [`DiagnosticError`] describing `command`.
pub fn diagnostic_error(command: &Command<'_>, cause: sqlx::Error) -> DiagnosticError {
   let (diagnostics, enrichment_error) = collect(command);
   DiagnosticError::new(
      command.kind.failure_message(),
      cause,
      diagnostics,
      enrichment_error,
   )
}
