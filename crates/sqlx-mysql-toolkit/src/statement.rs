//! Prepared statements

use serde_json::Value as JsonValue;
use sqlx::mysql::{MySqlConnection, MySqlStatement};
use sqlx::{Connection, Executor, Statement};
use tracing::debug;

use crate::value::bind_values;
use crate::{Error, Result, RowStream, WriteQueryResult};

/// A statement compiled once on the server and executed many times.
///
/// Each [`execute`](Self::execute) is independent and returns its own
/// [`WriteQueryResult`]. The statement holds its connection exclusively until
/// it is closed or dropped.
#[must_use = "a prepared statement should be executed and then closed"]
pub struct PreparedStatement<'c> {
   conn: &'c mut MySqlConnection,
   /// `None` once closed
   statement: Option<MySqlStatement<'static>>,
   executions: u64,
}

impl<'c> PreparedStatement<'c> {
   pub(crate) async fn prepare(conn: &'c mut MySqlConnection, query: &str) -> Result<Self> {
      let prepared = (&mut *conn).prepare(query).await?;
      let statement = Statement::to_owned(&prepared);
      debug!("Prepared statement: {}", statement.sql());

      Ok(Self {
         conn,
         statement: Some(statement),
         executions: 0,
      })
   }

   /// Statement text as prepared
   pub fn sql(&self) -> Option<&str> {
      self.statement.as_ref().map(|s| s.sql())
   }

   /// Number of `?` placeholders, or `None` once closed
   pub fn parameter_count(&self) -> Option<usize> {
      self
         .statement
         .as_ref()
         .and_then(|s| s.parameters())
         .map(|params| params.either(|types| types.len(), |count| count))
   }

   /// How many times this statement has been executed
   pub fn executions(&self) -> u64 {
      self.executions
   }

   /// Execute once with `values` bound to the placeholders.
   pub async fn execute(&mut self, values: Vec<JsonValue>) -> Result<WriteQueryResult> {
      let statement = self.statement.as_ref().ok_or(Error::StatementClosed)?;
      let result = bind_values(statement.query(), values)
         .execute(&mut *self.conn)
         .await?;
      self.executions += 1;
      Ok(result.into())
   }

   /// Execute once and stream the resulting rows.
   pub fn query(&mut self, values: Vec<JsonValue>) -> Result<RowStream<'_>> {
      let statement = self.statement.as_ref().ok_or(Error::StatementClosed)?;
      let stream = bind_values(statement.query(), values).fetch(&mut *self.conn);
      self.executions += 1;
      Ok(RowStream::new(stream))
   }

   /// Release the statement on the server.
   ///
   /// Closing twice returns [`Error::StatementClosed`].
   pub async fn close(&mut self) -> Result<()> {
      let statement = self.statement.take().ok_or(Error::StatementClosed)?;
      // The driver keeps prepared statements in a per-connection cache;
      // clearing it sends COM_STMT_CLOSE for each of them.
      self.conn.clear_cached_statements().await?;
      debug!(
         "Closed prepared statement after {} execution(s): {}",
         self.executions,
         statement.sql()
      );
      Ok(())
   }
}

impl Drop for PreparedStatement<'_> {
   fn drop(&mut self) {
      if let Some(statement) = &self.statement {
         // Still cached on the connection; freed when the session ends.
         debug!("Dropping unclosed prepared statement: {}", statement.sql());
      }
   }
}
