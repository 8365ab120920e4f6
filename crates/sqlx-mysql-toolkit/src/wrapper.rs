use serde_json::Value as JsonValue;
use sqlx::Executor;
use sqlx::mysql::{MySqlConnection, MySqlQueryResult};
use sqlx_mysql_conn_mgr::{MySqlDatabaseConfig, MySqlHandle};
use tracing::debug;

use crate::value::bind_values;
use crate::{Error, PreparedStatement, Result, Row, RowStream, Transaction};

/// Result returned from write operations (e.g. INSERT, UPDATE, DELETE).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteQueryResult {
   /// The number of rows affected by the write operation.
   pub rows_affected: u64,
   /// The last generated AUTO_INCREMENT value.
   ///
   /// Only set for INSERT operations on tables with an AUTO_INCREMENT column;
   /// 0 otherwise.
   pub last_insert_id: u64,
}

impl From<MySqlQueryResult> for WriteQueryResult {
   fn from(result: MySqlQueryResult) -> Self {
      Self {
         rows_affected: result.rows_affected(),
         last_insert_id: result.last_insert_id(),
      }
   }
}

/// Wrapper around a MySqlHandle exposing statement-level operations
#[derive(Debug)]
pub struct DatabaseWrapper {
   handle: MySqlHandle,
}

impl DatabaseWrapper {
   /// Open a new session via the connection manager
   pub async fn connect(config: &MySqlDatabaseConfig) -> Result<Self> {
      let handle = MySqlHandle::connect(config).await?;
      Ok(Self { handle })
   }

   /// Wrap an already-open handle
   pub fn from_handle(handle: MySqlHandle) -> Self {
      Self { handle }
   }

   pub fn handle(&self) -> &MySqlHandle {
      &self.handle
   }

   /// Execute a statement that returns no rows (INSERT/UPDATE/DELETE/DDL).
   ///
   /// Without values the statement text is sent as-is over the text
   /// protocol; with values it is prepared and `values` are bound to its
   /// `?` placeholders in order.
   pub async fn execute(&mut self, query: &str, values: Vec<JsonValue>) -> Result<WriteQueryResult> {
      let conn = self.handle.connection()?;
      execute_on(conn, query, values).await
   }

   /// Execute a SELECT and return its rows as a lazy stream.
   ///
   /// No statement is sent until the first [`RowStream::next`].
   pub fn query<'c>(&'c mut self, query: &'c str, values: Vec<JsonValue>) -> Result<RowStream<'c>> {
      let conn = self.handle.connection()?;
      Ok(fetch_on(conn, query, values))
   }

   /// Execute a SELECT, possibly returning multiple rows
   pub async fn fetch_all(&mut self, query: &str, values: Vec<JsonValue>) -> Result<Vec<Row>> {
      self.query(query, values)?.collect().await
   }

   /// Execute a SELECT and return its first row, if any.
   ///
   /// Remaining rows are discarded.
   pub async fn fetch_optional(
      &mut self,
      query: &str,
      values: Vec<JsonValue>,
   ) -> Result<Option<Row>> {
      let mut rows = self.query(query, values)?;
      let first = rows.next().await?;
      rows.close();
      Ok(first)
   }

   /// Prepare `query` once for repeated execution.
   pub async fn prepare(&mut self, query: &str) -> Result<PreparedStatement<'_>> {
      let conn = self.handle.connection()?;
      PreparedStatement::prepare(conn, query).await
   }

   /// Begin a transaction on this session.
   pub async fn begin(&mut self) -> Result<Transaction<'_>> {
      let conn = self.handle.connection()?;
      Transaction::begin(conn).await
   }

   /// Execute multiple write statements atomically within a transaction.
   ///
   /// This method:
   /// 1. Begins a transaction
   /// 2. Executes all statements in order
   /// 3. Commits on success
   /// 4. Rolls back on any error, reporting a failed rollback alongside the
   ///    original error
   ///
   /// Returns the result of each statement execution.
   pub async fn execute_transaction(
      &mut self,
      statements: Vec<(String, Vec<JsonValue>)>,
   ) -> Result<Vec<WriteQueryResult>> {
      let mut tx = self.begin().await?;

      // Execute all statements, collecting results
      let result = async {
         let mut results = Vec::with_capacity(statements.len());
         for (query, values) in statements {
            results.push(tx.execute(&query, values).await?);
         }
         Ok::<Vec<WriteQueryResult>, Error>(results)
      }
      .await;

      // Commit or rollback based on result
      match result {
         Ok(results) => {
            tx.commit().await?;
            Ok(results)
         }
         Err(e) => match tx.rollback().await {
            // Rollback succeeded, return original error
            Ok(()) => Err(e),

            // Rollback also failed, return the rollback error and the original error
            Err(rollback_err) => Err(Error::TransactionRollbackFailed {
               transaction_error: e.to_string(),
               rollback_error: rollback_err.to_string(),
            }),
         },
      }
   }

   pub fn is_closed(&self) -> bool {
      self.handle.is_closed()
   }

   /// Close the session. Closing twice is a state error.
   pub async fn close(&mut self) -> Result<()> {
      self.handle.close().await?;
      debug!("Database wrapper closed");
      Ok(())
   }
}

/// Run a non-query statement on `conn`, prepared when values are given.
pub(crate) async fn execute_on(
   conn: &mut MySqlConnection,
   query: &str,
   values: Vec<JsonValue>,
) -> Result<WriteQueryResult> {
   let result = if values.is_empty() {
      conn.execute(query).await?
   } else {
      bind_values(sqlx::query(query), values).execute(conn).await?
   };
   Ok(result.into())
}

/// Start streaming the rows of `query` from `conn`.
pub(crate) fn fetch_on<'c>(
   conn: &'c mut MySqlConnection,
   query: &'c str,
   values: Vec<JsonValue>,
) -> RowStream<'c> {
   let stream = if values.is_empty() {
      conn.fetch(query)
   } else {
      bind_values(sqlx::query(query), values).fetch(conn)
   };
   RowStream::new(stream)
}
