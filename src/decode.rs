use serde_json::Value as JsonValue;
use sqlx::sqlite::{SqliteRow, SqliteValueRef};
use sqlx::{Column, Row, TypeInfo, Value, ValueRef};
use time::PrimitiveDateTime;

use crate::Error;
use crate::command::JsonRow;

/// Convert a SQLite value to a JSON value.
///
/// BLOB values are returned as base64-encoded strings since JSON has no
/// native binary type. Boolean values are stored as INTEGER in SQLite.
pub fn to_json(value: SqliteValueRef) -> Result<JsonValue, Error> {
   if value.is_null() {
      return Ok(JsonValue::Null);
   }

   let column_type = value.type_info();

   let result = match column_type.name() {
      // SQLite stores DATE and TIME as TEXT in ISO 8601 format
      "TEXT" | "DATE" | "TIME" => value
         .to_owned()
         .try_decode::<String>()
         .map(JsonValue::String)
         .unwrap_or(JsonValue::Null),

      "REAL" => value
         .to_owned()
         .try_decode::<f64>()
         .map(JsonValue::from)
         .unwrap_or(JsonValue::Null),

      "INTEGER" | "NUMERIC" => value
         .to_owned()
         .try_decode::<i64>()
         .map(|v| JsonValue::Number(v.into()))
         .unwrap_or(JsonValue::Null),

      "BOOLEAN" => value
         .to_owned()
         .try_decode::<bool>()
         .map(JsonValue::Bool)
         .unwrap_or(JsonValue::Null),

      "DATETIME" => {
         let owned = value.to_owned();
         if let Ok(dt) = owned.try_decode::<PrimitiveDateTime>() {
            JsonValue::String(dt.to_string())
         } else if let Ok(v) = owned.try_decode::<String>() {
            JsonValue::String(v)
         } else {
            JsonValue::Null
         }
      }

      "BLOB" => value
         .to_owned()
         .try_decode::<Vec<u8>>()
         .map(|blob| JsonValue::String(base64_encode(&blob)))
         .unwrap_or(JsonValue::Null),

      "NULL" => JsonValue::Null,

      _ => {
         // For unknown types, try to decode as text
         if let Ok(text) = value.to_owned().try_decode::<String>() {
            JsonValue::String(text)
         } else {
            return Err(Error::UnsupportedDatatype(format!(
               "Unknown SQLite type: {}",
               column_type.name()
            )));
         }
      }
   };

   Ok(result)
}

/// Decode SQLite rows into column-ordered JSON rows.
///
/// A column that cannot be decoded is reported as `sqlx::Error::ColumnDecode`
/// so it surfaces like any other driver failure.
pub fn decode_rows(rows: Vec<SqliteRow>) -> Result<Vec<JsonRow>, sqlx::Error> {
   let mut values = Vec::with_capacity(rows.len());
   for row in rows {
      let mut value = JsonRow::default();
      for (i, column) in row.columns().iter().enumerate() {
         let raw = row.try_get_raw(i)?;
         let decoded = to_json(raw).map_err(|e| sqlx::Error::ColumnDecode {
            index: column.name().to_string(),
            source: Box::new(e),
         })?;
         value.insert(column.name().to_string(), decoded);
      }
      values.push(value);
   }
   Ok(values)
}

fn base64_encode(data: &[u8]) -> String {
   use base64::Engine;
   base64::engine::general_purpose::STANDARD.encode(data)
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_base64_encode() {
      assert_eq!(base64_encode(b"hello"), "aGVsbG8=");
      assert_eq!(base64_encode(&[1, 2, 3, 4, 5]), "AQIDBAU=");
      assert_eq!(base64_encode(&[]), "");
   }

   #[test]
   fn test_base64_encode_binary() {
      assert_eq!(base64_encode(&[0, 0, 0]), "AAAA");
      assert_eq!(base64_encode(&[255, 255, 255]), "////");
   }
}
