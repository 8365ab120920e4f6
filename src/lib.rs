//! Relational database access patterns, one runnable example each.
//!
//! - [`walkthrough`]: the examples themselves (raw and parameterized
//!   statements, nullable columns, SQL injection, prepared statements,
//!   auto-increment ids, transaction rollback)
//! - [`schema`]: the tables they use and the fixture rows they expect
//! - [`harness`]: runs every example on its own session and reports each
//!   outcome without stopping at the first failure
//!
//! The database layer lives in `sqlx-mysql-conn-mgr` (sessions and
//! configuration) and `sqlx-mysql-toolkit` (statements, rows, transactions).

pub mod harness;
pub mod schema;
pub mod walkthrough;

pub use harness::{Example, ExampleOutcome, Report, run_all, run_example};
pub use sqlx_mysql_toolkit::{Error, ErrorKind, MySqlDatabaseConfig, Result};
