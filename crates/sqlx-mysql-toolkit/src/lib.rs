//! # sqlx-mysql-toolkit
//!
//! Statement-level MySQL API built on sqlx and [`sqlx_mysql_conn_mgr`].
//!
//! ## Core Types
//!
//! - **[`DatabaseWrapper`]**: an open session; execute, query, prepare, begin
//! - **[`RowStream`]** / **[`Row`]**: lazy forward-only results with typed decoding
//! - **[`Nullable`]**: `Absent` / `Present(value)` for nullable columns
//! - **[`PreparedStatement`]**: compiled once, executed many times
//! - **[`Transaction`]**: commit or rollback, exactly once
//! - **[`Error`]** / **[`ErrorKind`]**: connection, execution, decode and state failures
//!
//! ## Parameters
//!
//! Positional `?` parameters are passed as `serde_json::Value`s and are always
//! bound as data, never interpolated into the statement text.
//!
//! ```no_run
//! use serde_json::json;
//! use sqlx_mysql_conn_mgr::MySqlDatabaseConfig;
//! use sqlx_mysql_toolkit::DatabaseWrapper;
//!
//! # async fn example() -> sqlx_mysql_toolkit::Result<()> {
//! let mut db = DatabaseWrapper::connect(&MySqlDatabaseConfig::from_env()?).await?;
//! let result = db
//!    .execute(
//!       "INSERT INTO comments(email, comment) VALUES(?, ?)",
//!       vec![json!("eko@example.com"), json!("Hello")],
//!    )
//!    .await?;
//! println!("new comment id {}", result.last_insert_id);
//! db.close().await?;
//! # Ok(())
//! # }
//! ```

mod error;
mod nullable;
mod row;
mod statement;
mod stream;
mod transactions;
pub mod value;
mod wrapper;

pub use error::{Error, ErrorKind, Result};
pub use nullable::Nullable;
pub use row::Row;
pub use statement::PreparedStatement;
pub use stream::RowStream;
pub use transactions::Transaction;
pub use wrapper::{DatabaseWrapper, WriteQueryResult};

// Re-exported so callers can name configuration without a direct dependency.
pub use sqlx_mysql_conn_mgr::{MySqlDatabaseConfig, MySqlHandle};
