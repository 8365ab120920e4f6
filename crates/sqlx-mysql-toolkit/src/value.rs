//! Positional parameter binding

use serde_json::Value as JsonValue;
use sqlx::MySql;
use sqlx::mysql::MySqlArguments;
use sqlx::query::Query;

/// A query with MySQL positional arguments
pub type MySqlQuery<'q> = Query<'q, MySql, MySqlArguments>;

/// Bind a JSON value as the next positional parameter of `query`.
///
/// The value travels to the server as data in the binary protocol; it is
/// never spliced into the statement text, whatever quotes or comment
/// markers it contains.
pub fn bind_value(query: MySqlQuery<'_>, value: JsonValue) -> MySqlQuery<'_> {
   match value {
      JsonValue::Null => query.bind(None::<String>),
      JsonValue::Bool(flag) => query.bind(flag),
      JsonValue::String(text) => query.bind(text),
      JsonValue::Number(number) => {
         // Preserve integer precision by binding as i64/u64 when possible
         if let Some(int_val) = number.as_i64() {
            query.bind(int_val)
         } else if let Some(uint_val) = number.as_u64() {
            query.bind(uint_val)
         } else {
            query.bind(number.as_f64().unwrap_or_default())
         }
      }
      // Arrays and objects go over as JSON text
      other => query.bind(other),
   }
}

/// Bind every value in order.
pub fn bind_values(mut query: MySqlQuery<'_>, values: Vec<JsonValue>) -> MySqlQuery<'_> {
   for value in values {
      query = bind_value(query, value);
   }
   query
}
