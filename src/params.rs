//! Parameter sources for wrapped commands.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::Error;

/// An ordered bag of named parameters.
///
/// Names are stored without a leading `@`, `:` or `$`, so `add("@id", 1)` and
/// `add("id", 1)` refer to the same parameter. Adding a name that already exists
/// replaces its value and keeps its original position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NamedParameters {
   values: IndexMap<String, JsonValue>,
}

impl NamedParameters {
   pub fn new() -> Self {
      Self::default()
   }

   /// Add a parameter, replacing any existing value with the same name.
   pub fn add(&mut self, name: impl AsRef<str>, value: impl Into<JsonValue>) -> &mut Self {
      self
         .values
         .insert(clean_name(name.as_ref()).to_string(), value.into());
      self
   }

   /// Builder-style variant of [`add`](Self::add).
   pub fn with(mut self, name: impl AsRef<str>, value: impl Into<JsonValue>) -> Self {
      self.add(name, value);
      self
   }

   pub fn get(&self, name: &str) -> Option<&JsonValue> {
      self.values.get(clean_name(name))
   }

   /// Parameter names in insertion order.
   pub fn parameter_names(&self) -> impl Iterator<Item = &str> {
      self.values.keys().map(String::as_str)
   }

   pub fn len(&self) -> usize {
      self.values.len()
   }

   pub fn is_empty(&self) -> bool {
      self.values.is_empty()
   }
}

impl<K, V> FromIterator<(K, V)> for NamedParameters
where
   K: AsRef<str>,
   V: Into<JsonValue>,
{
   fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
      let mut params = Self::new();
      for (name, value) in iter {
         params.add(name, value);
      }
      params
   }
}

/// The public fields of a plain record, captured through its `Serialize` impl.
///
/// Fields keep the order in which the record serializes them, which for a
/// derived impl is the declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordParameters {
   type_name: &'static str,
   fields: IndexMap<String, JsonValue>,
}

impl RecordParameters {
   /// Capture the fields of `record`.
   ///
   /// Fails with [`Error::UnsupportedParameterSource`] unless the record
   /// serializes to a map of named fields.
   pub fn from_serialize<T: Serialize + ?Sized>(record: &T) -> Result<Self, Error> {
      let type_name = std::any::type_name::<T>();
      let value = serde_json::to_value(record)
         .map_err(|e| Error::UnsupportedParameterSource(format!("{type_name}: {e}")))?;

      match value {
         JsonValue::Object(map) => Ok(Self {
            type_name,
            fields: map.into_iter().collect(),
         }),
         other => Err(Error::UnsupportedParameterSource(format!(
            "{type_name} serializes to {}, expected named fields",
            json_kind(&other)
         ))),
      }
   }

   /// Rust type name of the record the fields were read from.
   pub fn type_name(&self) -> &'static str {
      self.type_name
   }

   pub fn get(&self, name: &str) -> Option<&JsonValue> {
      self.fields.get(name)
   }

   pub fn len(&self) -> usize {
      self.fields.len()
   }

   pub fn is_empty(&self) -> bool {
      self.fields.is_empty()
   }
}

/// Parameters supplied to a wrapped command.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterSource {
   /// A bag of named parameters built by the caller.
   Named(NamedParameters),
   /// The fields of a plain record.
   Record(RecordParameters),
}

impl ParameterSource {
   /// Build a source from the fields of a serializable record.
   ///
   /// # Examples
   ///
   /// ```
   /// use sqlx_sqlite_diagnostics::ParameterSource;
   ///
   /// #[derive(serde::Serialize)]
   /// struct ById {
   ///    id: i64,
   /// }
   ///
   /// let params = ParameterSource::record(&ById { id: 5 }).unwrap();
   /// assert_eq!(params.get("id"), Some(&serde_json::json!(5)));
   /// ```
   pub fn record<T: Serialize + ?Sized>(record: &T) -> Result<Self, Error> {
      RecordParameters::from_serialize(record).map(ParameterSource::Record)
   }

   /// Every `(name, value)` pair, in bag insertion order or record field order.
   pub fn names_and_values(&self) -> impl Iterator<Item = (&str, &JsonValue)> {
      self.entries().iter().map(|(k, v)| (k.as_str(), v))
   }

   pub fn get(&self, name: &str) -> Option<&JsonValue> {
      match self {
         ParameterSource::Named(p) => p.get(name),
         ParameterSource::Record(r) => r.get(name),
      }
   }

   pub fn len(&self) -> usize {
      self.entries().len()
   }

   pub fn is_empty(&self) -> bool {
      self.entries().is_empty()
   }

   /// Zero-based position of `name` in iteration order.
   pub(crate) fn index_of(&self, name: &str) -> Option<usize> {
      self.entries().get_index_of(name)
   }

   pub(crate) fn values(&self) -> impl Iterator<Item = &JsonValue> {
      self.entries().values()
   }

   fn entries(&self) -> &IndexMap<String, JsonValue> {
      match self {
         ParameterSource::Named(p) => &p.values,
         ParameterSource::Record(r) => &r.fields,
      }
   }
}

impl From<NamedParameters> for ParameterSource {
   fn from(params: NamedParameters) -> Self {
      ParameterSource::Named(params)
   }
}

impl From<RecordParameters> for ParameterSource {
   fn from(record: RecordParameters) -> Self {
      ParameterSource::Record(record)
   }
}

/// Human-readable text for a parameter value.
///
/// Strings are returned verbatim, numbers and booleans in their usual form,
/// arrays and objects as compact JSON. `null` has no text.
pub fn display_text(value: &JsonValue) -> Option<String> {
   match value {
      JsonValue::Null => None,
      JsonValue::String(s) => Some(s.clone()),
      JsonValue::Bool(b) => Some(b.to_string()),
      JsonValue::Number(n) => Some(n.to_string()),
      JsonValue::Array(_) | JsonValue::Object(_) => Some(value.to_string()),
   }
}

fn clean_name(name: &str) -> &str {
   name
      .strip_prefix(['@', ':', '$'])
      .unwrap_or(name)
}

fn json_kind(value: &JsonValue) -> &'static str {
   match value {
      JsonValue::Null => "null",
      JsonValue::Bool(_) => "a boolean",
      JsonValue::Number(_) => "a number",
      JsonValue::String(_) => "a string",
      JsonValue::Array(_) => "a sequence",
      JsonValue::Object(_) => "a map",
   }
}
