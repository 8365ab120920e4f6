//! Owned MySQL session

use std::fmt;

use sqlx::Connection;
use sqlx::mysql::MySqlConnection;
use tracing::debug;

use crate::{Error, MySqlDatabaseConfig, Result};

/// A single live MySQL session with the configured schema selected.
///
/// ## Lifecycle
///
/// ```text
/// 1. connect()       opens the session (no retry on failure)
/// 2. connection()    borrows it for execute / query / prepare / begin
/// 3. close()         sends QUIT and releases it, exactly once
/// ```
///
/// A handle dropped without `close()` still releases its socket; the drop is
/// logged so unclosed handles are visible in debug output.
pub struct MySqlHandle {
   /// `None` once the handle has been closed
   conn: Option<MySqlConnection>,

   /// `user@host:port/schema`, used for log messages
   target: String,
}

impl MySqlHandle {
   /// Open a new session described by `config`.
   ///
   /// Fails with [`Error::Sqlx`] when the server is unreachable, the
   /// credentials are rejected, or the schema does not exist.
   pub async fn connect(config: &MySqlDatabaseConfig) -> Result<Self> {
      let conn = MySqlConnection::connect_with(&config.connect_options()).await?;
      debug!("Opened MySQL session: {}", config);

      Ok(Self {
         conn: Some(conn),
         target: config.to_string(),
      })
   }

   /// Borrow the underlying connection.
   ///
   /// Returns [`Error::DatabaseClosed`] after [`close`](Self::close).
   pub fn connection(&mut self) -> Result<&mut MySqlConnection> {
      self.conn.as_mut().ok_or(Error::DatabaseClosed)
   }

   /// Whether [`close`](Self::close) has already been called
   pub fn is_closed(&self) -> bool {
      self.conn.is_none()
   }

   /// `user@host:port/schema` of this session
   pub fn target(&self) -> &str {
      &self.target
   }

   /// Close the session.
   ///
   /// The connection is released even if the server does not acknowledge the
   /// QUIT; that failure is still returned. Closing twice returns
   /// [`Error::DatabaseClosed`].
   pub async fn close(&mut self) -> Result<()> {
      let conn = self.conn.take().ok_or(Error::DatabaseClosed)?;
      conn.close().await?;
      debug!("Closed MySQL session: {}", self.target);
      Ok(())
   }
}

impl fmt::Debug for MySqlHandle {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.debug_struct("MySqlHandle")
         .field("target", &self.target)
         .field("closed", &self.is_closed())
         .finish()
   }
}

impl Drop for MySqlHandle {
   fn drop(&mut self) {
      if self.conn.is_some() {
         // Dropping MySqlConnection shuts the socket down without a QUIT.
         debug!("Dropping unclosed MySQL session: {}", self.target);
      }
   }
}
