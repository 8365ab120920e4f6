//! Forward-only row streams

use futures::TryStreamExt;
use futures::stream::BoxStream;
use sqlx::mysql::MySqlRow;
use tracing::debug;

use crate::{Result, Row};

/// Lazy, forward-only, single-pass sequence of rows.
///
/// Rows are pulled from the server one [`next`](Self::next) at a time. Once
/// the stream is exhausted it keeps returning `None`; it cannot be
/// restarted. The stream borrows its connection mutably, so the connection
/// is unusable until the stream is exhausted, closed, or dropped. Unread
/// rows are drained by the driver before the connection's next command.
pub struct RowStream<'c> {
   /// `None` once exhausted, failed, or closed
   inner: Option<BoxStream<'c, std::result::Result<MySqlRow, sqlx::Error>>>,
   rows_read: u64,
}

impl<'c> RowStream<'c> {
   pub(crate) fn new(inner: BoxStream<'c, std::result::Result<MySqlRow, sqlx::Error>>) -> Self {
      Self {
         inner: Some(inner),
         rows_read: 0,
      }
   }

   /// Pull the next row, or `None` when the result set is exhausted.
   ///
   /// An error ends the stream.
   pub async fn next(&mut self) -> Result<Option<Row>> {
      let Some(stream) = self.inner.as_mut() else {
         return Ok(None);
      };

      match stream.try_next().await {
         Ok(Some(row)) => {
            self.rows_read += 1;
            Ok(Some(Row::new(row)))
         }
         Ok(None) => {
            self.inner = None;
            debug!("Row stream exhausted after {} row(s)", self.rows_read);
            Ok(None)
         }
         Err(e) => {
            self.inner = None;
            Err(e.into())
         }
      }
   }

   /// Number of rows handed out so far
   pub fn rows_read(&self) -> u64 {
      self.rows_read
   }

   /// Whether the stream has ended (exhausted, failed or closed)
   pub fn is_finished(&self) -> bool {
      self.inner.is_none()
   }

   /// Read every remaining row.
   pub async fn collect(mut self) -> Result<Vec<Row>> {
      let mut rows = Vec::new();
      while let Some(row) = self.next().await? {
         rows.push(row);
      }
      Ok(rows)
   }

   /// Stop reading and release the stream.
   pub fn close(mut self) {
      if self.inner.take().is_some() {
         debug!("Row stream closed after {} row(s)", self.rows_read);
      }
   }
}
