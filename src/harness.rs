//! Runs every example on its own session and records what happened

use std::future::Future;
use std::pin::Pin;

use sqlx_mysql_toolkit::{DatabaseWrapper, Error, ErrorKind, MySqlDatabaseConfig, Result};
use tracing::{info, warn};

use crate::schema::{ensure_schema, reset_fixtures};
use crate::walkthrough::{self, LoginOutcome, keep_first_error};

/// One runnable example
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Example {
   OpenConnection,
   ExecSql,
   QuerySql,
   QuerySqlComplex,
   SqlInjection,
   SqlInjectionSafe,
   ExecSqlParameter,
   AutoIncrement,
   PrepareStatement,
   Transaction,
}

impl Example {
   /// Every example, in the order the harness runs them
   pub const ALL: [Example; 10] = [
      Example::OpenConnection,
      Example::ExecSql,
      Example::QuerySql,
      Example::QuerySqlComplex,
      Example::SqlInjection,
      Example::SqlInjectionSafe,
      Example::ExecSqlParameter,
      Example::AutoIncrement,
      Example::PrepareStatement,
      Example::Transaction,
   ];

   pub fn name(self) -> &'static str {
      match self {
         Example::OpenConnection => "open_connection",
         Example::ExecSql => "exec_sql",
         Example::QuerySql => "query_sql",
         Example::QuerySqlComplex => "query_sql_complex",
         Example::SqlInjection => "sql_injection",
         Example::SqlInjectionSafe => "sql_injection_safe",
         Example::ExecSqlParameter => "exec_sql_parameter",
         Example::AutoIncrement => "auto_increment",
         Example::PrepareStatement => "prepare_statement",
         Example::Transaction => "transaction",
      }
   }

   /// Run this example on `db` and describe the result in one line.
   pub async fn run(self, db: &mut DatabaseWrapper) -> Result<String> {
      let summary = match self {
         Example::OpenConnection => format!("connected to {}", db.handle().target()),
         Example::ExecSql => {
            let result = walkthrough::exec_sql(db).await?;
            format!("inserted {} customer row(s)", result.rows_affected)
         }
         Example::QuerySql => {
            let customers = walkthrough::query_sql(db).await?;
            format!("read {} customer(s)", customers.len())
         }
         Example::QuerySqlComplex => {
            let customers = walkthrough::query_sql_complex(db).await?;
            let with_email = customers.iter().filter(|c| c.email.is_present()).count();
            format!(
               "read {} customer(s), {} with an email",
               customers.len(),
               with_email
            )
         }
         Example::SqlInjection | Example::SqlInjectionSafe => {
            let outcome = if self == Example::SqlInjection {
               walkthrough::sql_injection(db).await?
            } else {
               walkthrough::sql_injection_safe(db).await?
            };
            match outcome {
               LoginOutcome::Success(username) => format!("logged in as {username}"),
               LoginOutcome::Failed => "login rejected".to_string(),
            }
         }
         Example::ExecSqlParameter => {
            let result = walkthrough::exec_sql_parameter(db).await?;
            format!("inserted {} user row(s)", result.rows_affected)
         }
         Example::AutoIncrement => {
            let id = walkthrough::auto_increment(db).await?;
            format!("inserted comment {id}")
         }
         Example::PrepareStatement => {
            let ids = walkthrough::prepare_statement(db).await?;
            format!("inserted comments {ids:?}")
         }
         Example::Transaction => {
            let ids = walkthrough::transaction(db).await?;
            format!("rolled back comments {ids:?}")
         }
      };
      Ok(summary)
   }
}

/// What happened to one step of the run
#[derive(Debug)]
pub struct ExampleOutcome {
   pub name: &'static str,
   pub result: Result<String>,
}

impl ExampleOutcome {
   pub fn is_success(&self) -> bool {
      self.result.is_ok()
   }

   pub fn error_kind(&self) -> Option<ErrorKind> {
      self.result.as_ref().err().map(Error::kind)
   }
}

/// Outcomes of a full run, in execution order
#[derive(Debug, Default)]
pub struct Report {
   pub outcomes: Vec<ExampleOutcome>,
}

impl Report {
   pub fn passed(&self) -> usize {
      self.outcomes.iter().filter(|o| o.is_success()).count()
   }

   pub fn failed(&self) -> impl Iterator<Item = &ExampleOutcome> {
      self.outcomes.iter().filter(|o| !o.is_success())
   }

   pub fn is_success(&self) -> bool {
      !self.outcomes.is_empty() && self.failed().next().is_none()
   }

   pub fn outcome(&self, name: &str) -> Option<&ExampleOutcome> {
      self.outcomes.iter().find(|o| o.name == name)
   }

   pub fn log_summary(&self) {
      for outcome in &self.outcomes {
         match &outcome.result {
            Ok(summary) => info!("[ ok ] {}: {}", outcome.name, summary),
            Err(e) => warn!(
               "[FAIL] {}: {} ({:?}, {})",
               outcome.name,
               e,
               e.kind(),
               e.error_code()
            ),
         }
      }
      info!(
         "{} passed, {} failed",
         self.passed(),
         self.outcomes.len() - self.passed()
      );
   }
}

/// Open a session, run `example`, and close the session again.
///
/// The session is closed whether or not the example succeeded. An example
/// error takes precedence over an error from closing, which is then logged.
pub async fn run_example(example: Example, config: &MySqlDatabaseConfig) -> ExampleOutcome {
   ExampleOutcome {
      name: example.name(),
      result: with_session(config, |db| Box::pin(example.run(db))).await,
   }
}

/// Create missing tables and reset the fixture rows on a dedicated session.
pub async fn prepare_fixtures(config: &MySqlDatabaseConfig) -> Result<()> {
   with_session(config, |db| {
      Box::pin(async move {
         ensure_schema(db).await?;
         reset_fixtures(db).await
      })
   })
   .await
}

/// Prepare the fixtures, then run every example in [`Example::ALL`].
///
/// Each example gets its own session; a failing example is recorded and the
/// run moves on. If the fixtures cannot be prepared, no example is run.
pub async fn run_all(config: &MySqlDatabaseConfig) -> Report {
   let mut report = Report::default();

   let fixtures = prepare_fixtures(config).await;
   let fixtures_ok = fixtures.is_ok();
   report.outcomes.push(ExampleOutcome {
      name: "fixtures",
      result: fixtures.map(|()| "schema and fixture rows ready".to_string()),
   });
   if !fixtures_ok {
      return report;
   }

   for example in Example::ALL {
      report.outcomes.push(run_example(example, config).await);
   }

   report
}

type SessionFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a>>;

async fn with_session<T, F>(config: &MySqlDatabaseConfig, f: F) -> Result<T>
where
   F: for<'a> FnOnce(&'a mut DatabaseWrapper) -> SessionFuture<'a, T>,
{
   let mut db = DatabaseWrapper::connect(config).await?;
   let result = f(&mut db).await;
   let closed = db.close().await;
   keep_first_error(result, closed, "session")
}
