//! Transaction demarcation

use serde_json::Value as JsonValue;
use sqlx::mysql::{MySql, MySqlConnection};
use tracing::debug;

use crate::wrapper::{execute_on, fetch_on};
use crate::{Error, Result, Row, RowStream, WriteQueryResult};

/// An open transaction on a single session.
///
/// Terminated exactly once by [`commit`](Self::commit) or
/// [`rollback`](Self::rollback). Any later call, including a second
/// commit or rollback, fails with [`Error::TransactionAlreadyFinalized`].
/// Dropping an unterminated transaction rolls it back.
#[must_use = "if unused, the transaction is immediately rolled back"]
pub struct Transaction<'c> {
   inner: Option<sqlx::Transaction<'c, MySql>>,
   executed: usize,
}

impl<'c> Transaction<'c> {
   pub(crate) async fn begin(conn: &'c mut MySqlConnection) -> Result<Self> {
      let tx = sqlx::Connection::begin(conn).await?;
      debug!("Transaction started");

      Ok(Self {
         inner: Some(tx),
         executed: 0,
      })
   }

   fn active(&mut self) -> Result<&mut MySqlConnection> {
      self
         .inner
         .as_deref_mut()
         .ok_or(Error::TransactionAlreadyFinalized)
   }

   /// Whether commit or rollback has already been called
   pub fn is_finalized(&self) -> bool {
      self.inner.is_none()
   }

   /// Number of statements executed so far
   pub fn executed(&self) -> usize {
      self.executed
   }

   /// Execute a statement within this transaction.
   ///
   /// Its effects stay invisible to other sessions until commit.
   pub async fn execute(&mut self, query: &str, values: Vec<JsonValue>) -> Result<WriteQueryResult> {
      let conn = self.active()?;
      let result = execute_on(conn, query, values).await?;
      self.executed += 1;
      Ok(result)
   }

   /// Execute a read query within this transaction and stream its rows
   pub fn query<'t>(&'t mut self, query: &'t str, values: Vec<JsonValue>) -> Result<RowStream<'t>> {
      let conn = self.active()?;
      Ok(fetch_on(conn, query, values))
   }

   /// Execute a read query within this transaction and collect its rows
   pub async fn fetch_all(&mut self, query: &str, values: Vec<JsonValue>) -> Result<Vec<Row>> {
      self.query(query, values)?.collect().await
   }

   /// Commit this transaction
   pub async fn commit(&mut self) -> Result<()> {
      let tx = self.inner.take().ok_or(Error::TransactionAlreadyFinalized)?;
      tx.commit().await?;
      debug!("Transaction committed after {} statement(s)", self.executed);
      Ok(())
   }

   /// Rollback this transaction.
   ///
   /// A failed rollback is returned, never swallowed.
   pub async fn rollback(&mut self) -> Result<()> {
      let tx = self.inner.take().ok_or(Error::TransactionAlreadyFinalized)?;
      tx.rollback().await?;
      debug!("Transaction rolled back after {} statement(s)", self.executed);
      Ok(())
   }
}

impl Drop for Transaction<'_> {
   fn drop(&mut self) {
      if self.inner.is_some() {
         // sqlx queues a ROLLBACK that runs before the connection's next command.
         debug!(
            "Dropping unfinalized transaction after {} statement(s) (will auto-rollback)",
            self.executed
         );
      }
   }
}
