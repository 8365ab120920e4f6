//! # sqlx-mysql-conn-mgr
//!
//! A minimal wrapper around SQLx that hands out owned MySQL sessions.
//!
//! ## Core Types
//!
//! - **[`MySqlHandle`]**: One live session, owned by the caller until closed
//! - **[`MySqlDatabaseConfig`]**: Host, port, credentials and schema for a session
//! - **[`Error`]**: Error type for connection operations
//!
//! ## Policy
//!
//! - **No pooling**: every [`MySqlHandle::connect`] opens a fresh session
//! - **Explicit release**: [`MySqlHandle::close`] ends the session exactly once;
//!   a handle dropped while still open is released by `Drop`
//! - **Fail fast**: connection failures are returned as-is, never retried

mod config;
mod database;
mod error;

// Re-export public types
pub use config::MySqlDatabaseConfig;
pub use database::MySqlHandle;
pub use error::{Error, Result};
