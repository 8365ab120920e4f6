//! The example routines.
//!
//! Each function takes an open session and performs one access pattern end
//! to end. None of them retries or recovers: the first error is returned
//! unchanged.

use serde_json::json;
use sqlx_mysql_toolkit::{DatabaseWrapper, Error, Nullable, Result, Transaction, WriteQueryResult};
use time::{Date, PrimitiveDateTime};
use tracing::{info, warn};

/// Raw insert, no parameters
pub const INSERT_CUSTOMER: &str = "INSERT INTO customer(id, name) VALUES('joko', 'Joko')";
pub const SELECT_CUSTOMERS: &str = "SELECT id, name FROM customer";
pub const SELECT_CUSTOMER_DETAILS: &str =
   "SELECT id, name, email, balance, rating, birth_date, married, created_at FROM customer";
/// Login lookup with both inputs bound as parameters
pub const LOGIN_STATEMENT: &str =
   "SELECT username FROM user WHERE username = ? AND password = ? LIMIT 1";
pub const INSERT_USER: &str = "INSERT INTO user(username, password) VALUES(?, ?)";
pub const INSERT_COMMENT: &str = "INSERT INTO comments(email, comment) VALUES(?, ?)";

/// Username that closes the string literal and comments out the password check
pub const INJECTION_USERNAME: &str = "admin';#";
pub const INJECTION_PASSWORD: &str = "min";

#[derive(Debug, Clone, PartialEq)]
pub struct Customer {
   pub id: String,
   pub name: String,
}

/// Every column of `customer`, nullable ones as [`Nullable`]
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerDetail {
   pub id: String,
   pub name: String,
   pub email: Nullable<String>,
   pub balance: i32,
   pub rating: f64,
   pub birth_date: Nullable<Date>,
   pub married: bool,
   pub created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
   /// A row matched; carries the username the database returned
   Success(String),
   Failed,
}

/// `INSERT INTO customer` with the values written into the statement text
pub async fn exec_sql(db: &mut DatabaseWrapper) -> Result<WriteQueryResult> {
   let result = db.execute(INSERT_CUSTOMER, vec![]).await?;
   info!("Success insert new customer");
   Ok(result)
}

/// Stream `id, name` from every customer
pub async fn query_sql(db: &mut DatabaseWrapper) -> Result<Vec<Customer>> {
   let mut rows = db.query(SELECT_CUSTOMERS, vec![])?;
   let mut customers = Vec::new();

   while let Some(row) = rows.next().await? {
      let customer = Customer {
         id: row.get(0)?,
         name: row.get(1)?,
      };
      info!(id = %customer.id, name = %customer.name, "customer");
      customers.push(customer);
   }

   Ok(customers)
}

/// Stream every customer column, branching on the nullable ones
pub async fn query_sql_complex(db: &mut DatabaseWrapper) -> Result<Vec<CustomerDetail>> {
   let mut rows = db.query(SELECT_CUSTOMER_DETAILS, vec![])?;
   let mut customers = Vec::new();

   while let Some(row) = rows.next().await? {
      let customer = CustomerDetail {
         id: row.get(0)?,
         name: row.get(1)?,
         email: row.get_nullable(2)?,
         balance: row.get(3)?,
         rating: row.get(4)?,
         birth_date: row.get_nullable(5)?,
         married: row.get(6)?,
         created_at: row.get(7)?,
      };

      info!(
         id = %customer.id,
         name = %customer.name,
         balance = customer.balance,
         rating = customer.rating,
         married = customer.married,
         created_at = %customer.created_at,
         "customer"
      );
      if let Nullable::Present(email) = &customer.email {
         info!(id = %customer.id, %email, "customer email");
      }
      if let Nullable::Present(birth_date) = &customer.birth_date {
         info!(id = %customer.id, %birth_date, "customer birth date");
      }

      customers.push(customer);
   }

   Ok(customers)
}

/// The login statement built by string concatenation.
///
/// Quotes in either input end the string literal early, so the input can
/// rewrite the statement. Shown for contrast with [`LOGIN_STATEMENT`].
pub fn unsafe_login_statement(username: &str, password: &str) -> String {
   format!(
      "SELECT username FROM user WHERE username = '{username}' AND password = '{password}' LIMIT 1"
   )
}

/// Look a user up with the inputs concatenated into the statement text.
pub async fn login_unsafe(
   db: &mut DatabaseWrapper,
   username: &str,
   password: &str,
) -> Result<LoginOutcome> {
   let script = unsafe_login_statement(username, password);
   info!("{script}");
   let row = db.fetch_optional(&script, vec![]).await?;
   login_outcome(row)
}

/// Look a user up with the inputs bound as positional parameters.
pub async fn login(
   db: &mut DatabaseWrapper,
   username: &str,
   password: &str,
) -> Result<LoginOutcome> {
   let row = db
      .fetch_optional(LOGIN_STATEMENT, vec![json!(username), json!(password)])
      .await?;
   login_outcome(row)
}

fn login_outcome(row: Option<sqlx_mysql_toolkit::Row>) -> Result<LoginOutcome> {
   let outcome = match row {
      Some(row) => LoginOutcome::Success(row.get(0)?),
      None => LoginOutcome::Failed,
   };
   match &outcome {
      LoginOutcome::Success(username) => info!("Login succeeded as {username}"),
      LoginOutcome::Failed => info!("Login failed"),
   }
   Ok(outcome)
}

/// Injected username against the concatenating login: logs in as `admin`
pub async fn sql_injection(db: &mut DatabaseWrapper) -> Result<LoginOutcome> {
   login_unsafe(db, INJECTION_USERNAME, INJECTION_PASSWORD).await
}

/// Same username against the parameterized login: no match
pub async fn sql_injection_safe(db: &mut DatabaseWrapper) -> Result<LoginOutcome> {
   login(db, INJECTION_USERNAME, INJECTION_PASSWORD).await
}

/// `INSERT INTO user` with both values bound as parameters
pub async fn exec_sql_parameter(db: &mut DatabaseWrapper) -> Result<WriteQueryResult> {
   let result = db
      .execute(INSERT_USER, vec![json!("p00"), json!("p00")])
      .await?;
   info!("Success insert new user");
   Ok(result)
}

/// Insert one comment and return the id the database generated for it
pub async fn auto_increment(db: &mut DatabaseWrapper) -> Result<u64> {
   let result = db
      .execute(
         INSERT_COMMENT,
         vec![json!("tegarp00@gmail.com"), json!("Test")],
      )
      .await?;
   info!("Success insert new comment with id {}", result.last_insert_id);
   Ok(result.last_insert_id)
}

fn numbered_comment(i: usize) -> (String, String) {
   (format!("eko{i}@gmail.com"), format!("Komentar ke {i}"))
}

/// Prepare one insert and execute it ten times, returning each generated id
pub async fn prepare_statement(db: &mut DatabaseWrapper) -> Result<Vec<u64>> {
   let mut stmt = db.prepare(INSERT_COMMENT).await?;

   let mut ids = Vec::with_capacity(10);
   for i in 0..10 {
      let (email, comment) = numbered_comment(i);
      match stmt.execute(vec![json!(email), json!(comment)]).await {
         Ok(result) => {
            info!("Comment Id {}", result.last_insert_id);
            ids.push(result.last_insert_id);
         }
         Err(e) => {
            let closed = stmt.close().await;
            return keep_first_error(Err(e), closed, "prepared statement");
         }
      }
   }

   stmt.close().await?;
   Ok(ids)
}

/// Combine the outcome of some work with the outcome of releasing what it
/// used.
///
/// An error from the work wins; a release error that loses to it is logged
/// at warn level. A release error after successful work is returned.
pub(crate) fn keep_first_error<T>(
   work: Result<T>,
   released: Result<()>,
   resource: &str,
) -> Result<T> {
   match (work, released) {
      (Ok(value), Ok(())) => Ok(value),
      (Ok(_), Err(release_err)) => Err(release_err),
      (Err(e), Ok(())) => Err(e),
      (Err(e), Err(release_err)) => {
         warn!("Failed to release {resource} after error ({e}): {release_err}");
         Err(e)
      }
   }
}

async fn insert_comments(tx: &mut Transaction<'_>, count: usize) -> Result<Vec<u64>> {
   let mut ids = Vec::with_capacity(count);
   for i in 0..count {
      let (email, comment) = numbered_comment(i);
      let result = tx
         .execute(INSERT_COMMENT, vec![json!(email), json!(comment)])
         .await?;
      info!("Comment Id {}", result.last_insert_id);
      ids.push(result.last_insert_id);
   }
   Ok(ids)
}

/// Insert ten comments in a transaction, then roll all of them back.
///
/// Returns the ids that were generated and discarded. A failing rollback is
/// reported, never ignored.
pub async fn transaction(db: &mut DatabaseWrapper) -> Result<Vec<u64>> {
   let mut tx = db.begin().await?;

   match insert_comments(&mut tx, 10).await {
      Ok(ids) => {
         tx.rollback().await?;
         info!("Rolled back {} comment(s)", ids.len());
         Ok(ids)
      }
      Err(e) => match tx.rollback().await {
         Ok(()) => Err(e),
         Err(rollback_err) => Err(Error::TransactionRollbackFailed {
            transaction_error: e.to_string(),
            rollback_error: rollback_err.to_string(),
         }),
      },
   }
}

#[cfg(test)]
mod tests {
   use std::sync::{Arc, Mutex};

   use proptest::prelude::*;

   use super::*;

   /// Text of the first single-quoted literal in `sql`, if it is closed.
   fn first_literal(sql: &str) -> Option<&str> {
      let start = sql.find('\'')? + 1;
      let len = sql[start..].find('\'')?;
      Some(&sql[start..start + len])
   }

   #[test]
   fn test_injection_comments_out_password_check() {
      let sql = unsafe_login_statement(INJECTION_USERNAME, INJECTION_PASSWORD);
      assert_eq!(
         sql,
         "SELECT username FROM user WHERE username = 'admin';#' AND password = 'min' LIMIT 1"
      );

      // Everything the server evaluates comes before the `#` comment marker
      let evaluated = &sql[..sql.find('#').unwrap()];
      assert!(!evaluated.contains("password"));
      assert_eq!(first_literal(&sql), Some("admin"));
   }

   #[test]
   fn test_parameterized_statement_has_two_placeholders() {
      assert_eq!(LOGIN_STATEMENT.matches('?').count(), 2);
      assert!(!LOGIN_STATEMENT.contains('\''));
   }

   #[derive(Clone, Default)]
   struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

   impl std::io::Write for CapturedLogs {
      fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
         self.0.lock().unwrap().extend_from_slice(buf);
         Ok(buf.len())
      }

      fn flush(&mut self) -> std::io::Result<()> {
         Ok(())
      }
   }

   impl CapturedLogs {
      fn contents(&self) -> String {
         String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
      }
   }

   #[test]
   fn test_release_error_after_success_is_returned() {
      let result = keep_first_error(Ok(7), Err(Error::StatementClosed), "statement");
      assert!(matches!(result, Err(Error::StatementClosed)));
      assert_eq!(keep_first_error(Ok(7), Ok(()), "statement").unwrap(), 7);
   }

   #[test]
   fn test_release_error_after_failure_is_logged_not_dropped() {
      let logs = CapturedLogs::default();
      let writer = logs.clone();
      let subscriber = tracing_subscriber::fmt()
         .with_ansi(false)
         .with_writer(move || writer.clone())
         .finish();

      let result = tracing::subscriber::with_default(subscriber, || {
         keep_first_error::<()>(
            Err(Error::TransactionAlreadyFinalized),
            Err(Error::StatementClosed),
            "prepared statement",
         )
      });

      // The work's error is the one reported
      assert!(matches!(result, Err(Error::TransactionAlreadyFinalized)));

      let output = logs.contents();
      assert!(output.contains("WARN"), "no warning logged: {output}");
      assert!(output.contains("prepared statement"));
      assert!(output.contains(&Error::StatementClosed.to_string()));
   }

   #[test]
   fn test_numbered_comment() {
      assert_eq!(
         numbered_comment(3),
         ("eko3@gmail.com".to_string(), "Komentar ke 3".to_string())
      );
   }

   proptest! {
      #[test]
      fn quote_free_input_stays_a_literal(username in "[a-zA-Z0-9_ ;#-]{0,16}") {
         let sql = unsafe_login_statement(&username, "secret");
         prop_assert_eq!(first_literal(&sql), Some(username.as_str()));
      }

      #[test]
      fn quoted_input_escapes_the_literal(
         prefix in "[a-z]{0,8}",
         suffix in "[ -~]{0,12}",
      ) {
         let username = format!("{prefix}'{suffix}");
         let sql = unsafe_login_statement(&username, "secret");
         // The literal the server sees is cut at the injected quote
         prop_assert_eq!(first_literal(&sql), Some(prefix.as_str()));
         prop_assert_ne!(first_literal(&sql), Some(username.as_str()));
      }
   }
}
