//! Walkthrough tests.
//!
//! The live tests are `#[ignore]`d. Run them with `cargo test -- --ignored`
//! against the server described by `MYSQL_HOST`, `MYSQL_PORT`, `MYSQL_USER`,
//! `MYSQL_PASSWORD` and `MYSQL_DATABASE`. They share the walkthrough tables,
//! so everything that depends on row counts runs inside one test; the others
//! only touch rows they create themselves.

use mysql_walkthrough::harness::{Example, prepare_fixtures, run_all};
use mysql_walkthrough::schema::ensure_schema;
use mysql_walkthrough::walkthrough::{self, LoginOutcome};
use mysql_walkthrough::{ErrorKind, MySqlDatabaseConfig};
use proptest::prelude::*;
use serde_json::json;
use sqlx_mysql_toolkit::{DatabaseWrapper, Nullable};

fn live_config() -> MySqlDatabaseConfig {
   MySqlDatabaseConfig::from_env().expect("invalid MYSQL_* environment")
}

async fn count_comments(db: &mut DatabaseWrapper) -> i64 {
   let row = db
      .fetch_optional("SELECT COUNT(*) FROM comments", vec![])
      .await
      .unwrap()
      .unwrap();
   row.get::<i64>(0).unwrap()
}

#[tokio::test]
async fn run_all_stops_when_fixtures_cannot_be_prepared() {
   let config = MySqlDatabaseConfig {
      host: "127.0.0.1".into(),
      port: 1,
      ..Default::default()
   };

   let report = run_all(&config).await;

   assert!(!report.is_success());
   assert_eq!(report.outcomes.len(), 1);
   let fixtures = report.outcome("fixtures").unwrap();
   assert!(!fixtures.is_success());
   assert_eq!(fixtures.error_kind(), Some(ErrorKind::Connection));
   assert!(report.outcome("exec_sql").is_none());
}

#[test]
fn example_names_are_unique() {
   let mut names: Vec<_> = Example::ALL.iter().map(|e| e.name()).collect();
   names.sort_unstable();
   names.dedup();
   assert_eq!(names.len(), Example::ALL.len());
}

#[tokio::test]
#[ignore = "needs a MySQL server (MYSQL_* environment)"]
async fn walkthrough_against_live_server() {
   let config = live_config();
   prepare_fixtures(&config).await.unwrap();

   let mut db = DatabaseWrapper::connect(&config).await.unwrap();

   // Raw insert; a second run hits the primary key
   let inserted = walkthrough::exec_sql(&mut db).await.unwrap();
   assert_eq!(inserted.rows_affected, 1);
   let err = walkthrough::exec_sql(&mut db).await.unwrap_err();
   assert_eq!(err.kind(), ErrorKind::Execution);

   let customers = walkthrough::query_sql(&mut db).await.unwrap();
   assert!(customers.iter().any(|c| c.id == "joko" && c.name == "Joko"));

   let details = walkthrough::query_sql_complex(&mut db).await.unwrap();
   let budi = details.iter().find(|c| c.id == "budi").unwrap();
   assert_eq!(budi.email, Nullable::Absent);
   assert_eq!(budi.birth_date, Nullable::Absent);
   let eko = details.iter().find(|c| c.id == "eko").unwrap();
   assert_eq!(eko.email, Nullable::Present("eko@example.com".to_string()));
   assert!(eko.birth_date.is_present());
   assert!(eko.married);

   // Concatenation lets the username rewrite the statement; binding does not
   assert_eq!(
      walkthrough::sql_injection(&mut db).await.unwrap(),
      LoginOutcome::Success("admin".to_string())
   );
   assert_eq!(
      walkthrough::sql_injection_safe(&mut db).await.unwrap(),
      LoginOutcome::Failed
   );
   assert_eq!(
      walkthrough::login(&mut db, "admin", "admin").await.unwrap(),
      LoginOutcome::Success("admin".to_string())
   );

   let inserted = walkthrough::exec_sql_parameter(&mut db).await.unwrap();
   assert_eq!(inserted.rows_affected, 1);

   let first = walkthrough::auto_increment(&mut db).await.unwrap();
   let second = walkthrough::auto_increment(&mut db).await.unwrap();
   assert!(first > 0);
   assert!(second > first);

   let ids = walkthrough::prepare_statement(&mut db).await.unwrap();
   assert_eq!(ids.len(), 10);
   assert!(ids.windows(2).all(|w| w[0] < w[1]), "ids not increasing: {ids:?}");
   assert!(ids[0] > second);

   // Rolled-back inserts leave the table as it was
   let before = count_comments(&mut db).await;
   let discarded = walkthrough::transaction(&mut db).await.unwrap();
   assert_eq!(discarded.len(), 10);
   assert_eq!(count_comments(&mut db).await, before);

   db.close().await.unwrap();
   assert!(db.is_closed());

   // The full run resets its own fixtures, so it passes after the above
   let report = run_all(&config).await;
   report.log_summary();
   assert!(report.is_success(), "failed: {:?}", report.failed().collect::<Vec<_>>());
   assert_eq!(report.passed(), Example::ALL.len() + 1);
}

#[tokio::test]
#[ignore = "needs a MySQL server (MYSQL_* environment)"]
async fn bound_login_matches_hostile_username_as_literal_data() {
   const PASSWORD: &str = "literal-only";
   let config = live_config();
   let mut db = DatabaseWrapper::connect(&config).await.unwrap();
   ensure_schema(&mut db).await.unwrap();

   let hostile = walkthrough::INJECTION_USERNAME;
   db.execute("DELETE FROM user WHERE username = ?", vec![json!(hostile)])
      .await
      .unwrap();
   db.execute(
      walkthrough::INSERT_USER,
      vec![json!(hostile), json!(PASSWORD)],
   )
   .await
   .unwrap();

   // Bound, the whole string is compared, quote and comment marker included
   assert_eq!(
      walkthrough::login(&mut db, hostile, PASSWORD).await.unwrap(),
      LoginOutcome::Success(hostile.to_string())
   );
   assert_eq!(
      walkthrough::login(&mut db, hostile, "other").await.unwrap(),
      LoginOutcome::Failed
   );

   // Concatenated, the quote ends the literal and the stored row is never
   // the one matched
   let unsafe_outcome = walkthrough::login_unsafe(&mut db, hostile, PASSWORD)
      .await
      .unwrap();
   assert_ne!(unsafe_outcome, LoginOutcome::Success(hostile.to_string()));

   db.execute("DELETE FROM user WHERE username = ?", vec![json!(hostile)])
      .await
      .unwrap();
   db.close().await.unwrap();
}

proptest! {
   #![proptest_config(ProptestConfig::with_cases(16))]

   #[test]
   #[ignore = "needs a MySQL server (MYSQL_* environment)"]
   fn bound_login_never_matches_hostile_input(
      prefix in "[a-z]{0,6}",
      hostile in prop::sample::select(vec!["'", "';#", "' OR '1'='1", "'; -- ", "\\'", "admin';#"]),
      suffix in "[a-z0-9 ]{0,6}",
   ) {
      let config = live_config();
      let username = format!("{prefix}{hostile}{suffix}");

      let rt = tokio::runtime::Runtime::new().unwrap();
      let outcome = rt.block_on(async {
         let mut db = DatabaseWrapper::connect(&config).await.unwrap();
         ensure_schema(&mut db).await.unwrap();
         let outcome = walkthrough::login(&mut db, &username, "min").await.unwrap();
         db.close().await.unwrap();
         outcome
      });

      prop_assert_eq!(outcome, LoginOutcome::Failed);
   }
}
