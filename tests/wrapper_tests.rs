use serde::{Deserialize, Serialize};
use serde_json::{Value as JsonValue, json};
use sqlx::SqlitePool;
use sqlx_sqlite_diagnostics::{
   DiagnosticExt, Error, JsonRow, NamedParameters, ParameterSource, SqlitePoolConfig, connect_pool,
};
use tempfile::TempDir;

async fn create_test_db() -> (SqlitePool, TempDir) {
   let temp_dir = TempDir::new().expect("Failed to create temp directory");
   let db_path = temp_dir.path().join("test.db");
   let pool = connect_pool(&db_path, None)
      .await
      .expect("Failed to connect to test database");

   sqlx::query("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL, age INTEGER)")
      .execute(&pool)
      .await
      .expect("Failed to create table");

   for (name, age) in [("Alice", 30), ("Bob", 25), ("Carol", 41)] {
      sqlx::query("INSERT INTO users (name, age) VALUES (?, ?)")
         .bind(name)
         .bind(age)
         .execute(&pool)
         .await
         .expect("Failed to insert row");
   }

   (pool, temp_dir)
}

#[derive(Debug, Deserialize, PartialEq)]
struct User {
   id: i64,
   name: String,
   age: Option<i64>,
}

#[derive(Serialize)]
struct AgeRange {
   min_age: i64,
   max_age: i64,
}

#[tokio::test]
async fn test_query_sql_maps_rows() {
   let (mut pool, _temp) = create_test_db().await;

   let users: Vec<User> = pool
      .query_sql("SELECT id, name, age FROM users ORDER BY id")
      .await
      .unwrap();

   assert_eq!(users.len(), 3);
   assert_eq!(
      users[0],
      User {
         id: 1,
         name: "Alice".into(),
         age: Some(30)
      }
   );
}

#[tokio::test]
async fn test_query_sql_binds_named_bag() {
   let (mut pool, _temp) = create_test_db().await;
   let params = ParameterSource::from(NamedParameters::new().with("@name", "Bob"));

   let rows = pool
      .query_sql::<JsonRow>("SELECT name, age FROM users WHERE name = @name")
      .params(&params)
      .await
      .unwrap();

   assert_eq!(rows.len(), 1);
   assert_eq!(rows[0]["age"], json!(25));
}

#[tokio::test]
async fn test_query_sql_binds_record_fields_by_name() {
   let (mut pool, _temp) = create_test_db().await;
   // Placeholders appear in the reverse of field order.
   let params = ParameterSource::record(&AgeRange {
      min_age: 26,
      max_age: 50,
   })
   .unwrap();

   let names: Vec<JsonValue> = pool
      .query_sql::<JsonRow>(
         "SELECT name FROM users WHERE age <= :max_age AND age >= :min_age ORDER BY name",
      )
      .params(&params)
      .await
      .unwrap()
      .into_iter()
      .map(|row| row["name"].clone())
      .collect();

   assert_eq!(names, vec![json!("Alice"), json!("Carol")]);
}

#[tokio::test]
async fn test_query_sql_binds_positionally() {
   let (mut pool, _temp) = create_test_db().await;
   let params = ParameterSource::from(NamedParameters::new().with("first", 2).with("second", 3));

   let rows = pool
      .query_sql::<JsonRow>("SELECT id FROM users WHERE id IN (?, ?) ORDER BY id")
      .params(&params)
      .await
      .unwrap();

   let ids: Vec<&JsonValue> = rows.iter().map(|r| &r["id"]).collect();
   assert_eq!(ids, vec![&json!(2), &json!(3)]);
}

#[tokio::test]
async fn test_failed_sql_is_enriched() {
   let (mut pool, _temp) = create_test_db().await;
   let params = ParameterSource::from(NamedParameters::new().with("id", 1).with("tag", "vip"));

   let err = pool
      .query_sql::<JsonRow>("SELECT * FROM no_such_table WHERE id = :id AND tag = :tag")
      .params(&params)
      .await
      .unwrap_err();

   assert_eq!(err.message(), "Dapper sql execution failed!");
   let entries: Vec<(&str, &str)> = err.diagnostics().iter().collect();
   assert_eq!(
      entries,
      vec![
         (
            "InlineSql",
            "SELECT * FROM no_such_table WHERE id = :id AND tag = :tag"
         ),
         ("id", "1"),
         ("tag", "vip"),
      ]
   );
   assert!(err.cause().as_database_error().is_some());
   assert!(err.cause().to_string().contains("no_such_table"));

   // Callers working with the crate error keep the SQLite code.
   let err = Error::from(err);
   assert_eq!(err.error_code(), "SQLITE_1");
}

#[tokio::test]
async fn test_unknown_placeholder_is_enriched() {
   let (mut pool, _temp) = create_test_db().await;
   let params = ParameterSource::from(NamedParameters::new().with("id", 1));

   let err = pool
      .query_sql::<JsonRow>("SELECT * FROM users WHERE name = :name")
      .params(&params)
      .await
      .unwrap_err();

   assert!(matches!(err.cause(), sqlx::Error::Encode(_)));
   assert_eq!(err.diagnostics().get("id"), Some("1"));
}

#[tokio::test]
async fn test_procedures_fail_on_sqlite_with_diagnostics() {
   let (mut pool, _temp) = create_test_db().await;
   let params = ParameterSource::from(NamedParameters::new().with("Id", 5).with("Name", "x"));

   let err = pool
      .execute_procedure("sp_Test")
      .params(&params)
      .await
      .unwrap_err();

   assert_eq!(err.message(), "Dapper proc execution failed!");
   let entries: Vec<(&str, &str)> = err.diagnostics().iter().collect();
   assert_eq!(
      entries,
      vec![("Procedure", "sp_Test"), ("Id", "5"), ("Name", "x")]
   );
   assert!(matches!(err.cause(), sqlx::Error::Configuration(_)));

   let err = pool
      .query_procedure::<JsonRow>("sp_Test")
      .await
      .unwrap_err();
   assert_eq!(err.diagnostics().len(), 1);
}

#[tokio::test]
async fn test_transaction_is_passed_through() {
   let (pool, _temp) = create_test_db().await;
   let params = ParameterSource::from(NamedParameters::new().with("name", "Dave"));

   let mut tx = pool.begin().await.unwrap();
   sqlx::query("INSERT INTO users (name) VALUES ('Dave')")
      .execute(&mut *tx)
      .await
      .unwrap();

   // Uncommitted row is visible inside the transaction
   let rows = (&mut *tx)
      .query_sql::<JsonRow>("SELECT id FROM users WHERE name = :name")
      .params(&params)
      .await
      .unwrap();
   assert_eq!(rows.len(), 1);

   tx.rollback().await.unwrap();

   let mut pool = pool;
   let rows = pool
      .query_sql::<JsonRow>("SELECT id FROM users WHERE name = :name")
      .params(&params)
      .await
      .unwrap();
   assert!(rows.is_empty());
}

#[tokio::test]
async fn test_decodes_sqlite_types() {
   let (mut pool, _temp) = create_test_db().await;

   let rows = pool
      .query_sql::<JsonRow>("SELECT 1.5 AS r, 'txt' AS t, x'68656c6c6f' AS b, NULL AS n")
      .await
      .unwrap();

   assert_eq!(rows[0]["r"], json!(1.5));
   assert_eq!(rows[0]["t"], json!("txt"));
   assert_eq!(rows[0]["b"], json!("aGVsbG8="));
   assert_eq!(rows[0]["n"], JsonValue::Null);
}

#[tokio::test]
async fn test_connect_pool_rejects_empty_path() {
   let err = connect_pool("", None).await.unwrap_err();
   assert_eq!(err.error_code(), "IO_ERROR");
}

#[tokio::test]
async fn test_connect_pool_without_create_fails_for_missing_file() {
   let temp_dir = TempDir::new().unwrap();
   let config = SqlitePoolConfig {
      create_if_missing: false,
      ..Default::default()
   };

   let err = connect_pool(temp_dir.path().join("absent.db"), Some(config))
      .await
      .unwrap_err();
   assert!(matches!(err, Error::Sqlx(_)));
}
