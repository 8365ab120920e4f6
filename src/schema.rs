//! Tables used by the walkthrough and the fixture rows the examples expect

use sqlx_mysql_toolkit::{DatabaseWrapper, Result};
use tracing::debug;

/// `customer`: string key, nullable `email` and `birth_date`
pub const CREATE_CUSTOMER: &str = r#"
CREATE TABLE IF NOT EXISTS customer (
   id VARCHAR(100) NOT NULL,
   name VARCHAR(100) NOT NULL,
   email VARCHAR(100),
   balance INT NOT NULL DEFAULT 0,
   rating DOUBLE NOT NULL DEFAULT 0.0,
   created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
   birth_date DATE,
   married BOOLEAN NOT NULL DEFAULT false,
   PRIMARY KEY (id)
) ENGINE = InnoDB
"#;

/// `comments`: auto-increment key
pub const CREATE_COMMENTS: &str = r#"
CREATE TABLE IF NOT EXISTS comments (
   id INT NOT NULL AUTO_INCREMENT,
   email VARCHAR(100) NOT NULL,
   comment TEXT,
   PRIMARY KEY (id)
) ENGINE = InnoDB
"#;

/// `user`: plaintext passwords, for the injection example only
pub const CREATE_USER: &str = r#"
CREATE TABLE IF NOT EXISTS user (
   username VARCHAR(100) NOT NULL,
   password VARCHAR(100) NOT NULL,
   PRIMARY KEY (username)
) ENGINE = InnoDB
"#;

/// Create any missing walkthrough table. Existing tables are left untouched.
pub async fn ensure_schema(db: &mut DatabaseWrapper) -> Result<()> {
   for ddl in [CREATE_CUSTOMER, CREATE_COMMENTS, CREATE_USER] {
      db.execute(ddl, vec![]).await?;
   }
   debug!("Walkthrough schema ready");
   Ok(())
}

/// Put the example rows into the state the examples expect.
///
/// - the rows inserted by `exec_sql` and `exec_sql_parameter` are removed so
///   those inserts can run again
/// - the `admin` account and two customers (one with every nullable column
///   NULL, one with all of them set) exist
pub async fn reset_fixtures(db: &mut DatabaseWrapper) -> Result<()> {
   db.execute_transaction(vec![
      ("DELETE FROM customer WHERE id = 'joko'".into(), vec![]),
      ("DELETE FROM user WHERE username = 'p00'".into(), vec![]),
      (
         "INSERT IGNORE INTO user(username, password) VALUES('admin', 'admin')".into(),
         vec![],
      ),
      (
         "INSERT IGNORE INTO customer(id, name) VALUES('budi', 'Budi')".into(),
         vec![],
      ),
      (
         "INSERT IGNORE INTO customer(id, name, email, balance, rating, birth_date, married) \
          VALUES('eko', 'Eko', 'eko@example.com', 100000, 5.0, '1999-09-09', true)"
            .into(),
         vec![],
      ),
   ])
   .await?;
   debug!("Walkthrough fixtures reset");
   Ok(())
}
