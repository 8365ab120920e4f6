/// Result type alias for toolkit operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The four failure classes every toolkit error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
   /// The session could not be established or was lost.
   Connection,
   /// The server rejected a statement (syntax, constraint, missing table...).
   Execution,
   /// A column value could not be converted to the requested type.
   Decode,
   /// An operation was issued against a finalized or closed resource.
   State,
}

/// Error types for MySQL toolkit operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
   /// Error from SQLx operations.
   #[error(transparent)]
   Sqlx(sqlx::Error),

   /// Error from the connection manager.
   #[error(transparent)]
   ConnectionManager(#[from] sqlx_mysql_conn_mgr::Error),

   /// A column could not be decoded into the requested Rust type.
   #[error("cannot decode column '{column}': {source}")]
   Decode {
      column: String,
      #[source]
      source: sqlx::Error,
   },

   /// Transaction failed and rollback also failed.
   #[error("transaction failed: {transaction_error}; rollback also failed: {rollback_error}")]
   TransactionRollbackFailed {
      transaction_error: String,
      rollback_error: String,
   },

   /// Transaction has already been committed or rolled back.
   #[error("transaction has already been finalized (committed or rolled back)")]
   TransactionAlreadyFinalized,

   /// Prepared statement has already been closed.
   #[error("prepared statement has already been closed")]
   StatementClosed,
}

impl From<sqlx::Error> for Error {
   fn from(err: sqlx::Error) -> Self {
      let column = match &err {
         sqlx::Error::ColumnDecode { index, .. } => Some(index.trim_matches('"').to_string()),
         sqlx::Error::ColumnNotFound(name) => Some(name.clone()),
         sqlx::Error::ColumnIndexOutOfBounds { index, .. } => Some(index.to_string()),
         _ => None,
      };

      match column {
         Some(column) => Error::Decode {
            column,
            source: err,
         },
         None => Error::Sqlx(err),
      }
   }
}

impl Error {
   /// Which of the four failure classes this error belongs to.
   pub fn kind(&self) -> ErrorKind {
      match self {
         Error::Sqlx(e) => sqlx_error_kind(e),
         Error::ConnectionManager(sqlx_mysql_conn_mgr::Error::DatabaseClosed) => ErrorKind::State,
         Error::ConnectionManager(sqlx_mysql_conn_mgr::Error::Sqlx(e)) => match sqlx_error_kind(e) {
            // Rejections during the handshake (bad credentials, unknown schema)
            // still mean no session was established.
            ErrorKind::Execution => ErrorKind::Connection,
            kind => kind,
         },
         Error::ConnectionManager(_) => ErrorKind::Connection,
         Error::Decode { .. } => ErrorKind::Decode,
         Error::TransactionRollbackFailed { .. } => ErrorKind::Execution,
         Error::TransactionAlreadyFinalized | Error::StatementClosed => ErrorKind::State,
      }
   }

   /// Extract a structured error code from the error type.
   ///
   /// This provides machine-readable error codes for error handling.
   pub fn error_code(&self) -> String {
      match self {
         Error::Sqlx(e) => {
            if let Some(code) = e.as_database_error().and_then(|db_err| db_err.code()) {
               return format!("MYSQL_{}", code);
            }
            "SQLX_ERROR".to_string()
         }
         Error::ConnectionManager(sqlx_mysql_conn_mgr::Error::DatabaseClosed) => {
            "DATABASE_CLOSED".to_string()
         }
         Error::ConnectionManager(_) => "CONNECTION_ERROR".to_string(),
         Error::Decode { .. } => "DECODE_ERROR".to_string(),
         Error::TransactionRollbackFailed { .. } => "TRANSACTION_ROLLBACK_FAILED".to_string(),
         Error::TransactionAlreadyFinalized => "TRANSACTION_ALREADY_FINALIZED".to_string(),
         Error::StatementClosed => "STATEMENT_CLOSED".to_string(),
      }
   }
}

fn sqlx_error_kind(err: &sqlx::Error) -> ErrorKind {
   match err {
      sqlx::Error::Io(_)
      | sqlx::Error::Tls(_)
      | sqlx::Error::Protocol(_)
      | sqlx::Error::Configuration(_)
      | sqlx::Error::PoolTimedOut
      | sqlx::Error::PoolClosed
      | sqlx::Error::WorkerCrashed => ErrorKind::Connection,
      sqlx::Error::ColumnDecode { .. }
      | sqlx::Error::ColumnNotFound(_)
      | sqlx::Error::ColumnIndexOutOfBounds { .. }
      | sqlx::Error::Decode(_) => ErrorKind::Decode,
      _ => ErrorKind::Execution,
   }
}
