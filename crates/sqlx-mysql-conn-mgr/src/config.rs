//! Configuration for MySQL sessions

use std::fmt;

use serde::Deserialize;
use sqlx::mysql::MySqlConnectOptions;

use crate::{Error, Result};

/// Environment variable holding the server host name
pub const HOST_VAR: &str = "MYSQL_HOST";
/// Environment variable holding the server port
pub const PORT_VAR: &str = "MYSQL_PORT";
/// Environment variable holding the user name
pub const USER_VAR: &str = "MYSQL_USER";
/// Environment variable holding the password
pub const PASSWORD_VAR: &str = "MYSQL_PASSWORD";
/// Environment variable holding the schema (database) name
pub const SCHEMA_VAR: &str = "MYSQL_DATABASE";

/// Connection parameters for a MySQL session
///
/// # Examples
///
/// ```
/// use sqlx_mysql_conn_mgr::MySqlDatabaseConfig;
///
/// // Use defaults
/// let config = MySqlDatabaseConfig::default();
/// assert_eq!(config.port, 3306);
///
/// // Override just one field
/// let config = MySqlDatabaseConfig {
///     schema: "walkthrough_test".into(),
///     ..Default::default()
/// };
/// assert_eq!(config.host, "localhost");
/// ```
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MySqlDatabaseConfig {
   /// Server host name or address
   ///
   /// Default: `localhost`
   pub host: String,

   /// Server TCP port
   ///
   /// Default: 3306
   pub port: u16,

   /// User to authenticate as
   ///
   /// Default: `root`
   pub user: String,

   /// Password for `user`. Never printed by `Debug` or `Display`.
   ///
   /// Default: `root`
   pub password: String,

   /// Schema (database) selected once the session is open
   ///
   /// Default: `belajar_golang_database`
   pub schema: String,
}

impl Default for MySqlDatabaseConfig {
   fn default() -> Self {
      Self {
         host: "localhost".to_string(),
         port: 3306,
         user: "root".to_string(),
         password: "root".to_string(),
         schema: "belajar_golang_database".to_string(),
      }
   }
}

impl MySqlDatabaseConfig {
   /// Read the configuration from `MYSQL_*` environment variables.
   ///
   /// Unset variables keep their default value.
   pub fn from_env() -> Result<Self> {
      Self::from_lookup(|key| std::env::var(key).ok())
   }

   /// Build a configuration from an arbitrary key lookup, using the same keys
   /// as [`from_env`](Self::from_env).
   pub fn from_lookup<F>(lookup: F) -> Result<Self>
   where
      F: Fn(&str) -> Option<String>,
   {
      let mut config = Self::default();

      if let Some(host) = lookup(HOST_VAR) {
         config.host = host;
      }
      if let Some(port) = lookup(PORT_VAR) {
         config.port = port.trim().parse().map_err(|_| Error::InvalidConfig {
            key: PORT_VAR,
            value: port.clone(),
         })?;
      }
      if let Some(user) = lookup(USER_VAR) {
         config.user = user;
      }
      if let Some(password) = lookup(PASSWORD_VAR) {
         config.password = password;
      }
      if let Some(schema) = lookup(SCHEMA_VAR) {
         config.schema = schema;
      }

      Ok(config)
   }

   /// Driver-level options for this configuration
   pub fn connect_options(&self) -> MySqlConnectOptions {
      let options = MySqlConnectOptions::new()
         .host(&self.host)
         .port(self.port)
         .username(&self.user)
         .database(&self.schema);

      if self.password.is_empty() {
         options
      } else {
         options.password(&self.password)
      }
   }
}

impl fmt::Debug for MySqlDatabaseConfig {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.debug_struct("MySqlDatabaseConfig")
         .field("host", &self.host)
         .field("port", &self.port)
         .field("user", &self.user)
         .field("password", &"<redacted>")
         .field("schema", &self.schema)
         .finish()
   }
}

impl fmt::Display for MySqlDatabaseConfig {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      write!(f, "{}@{}:{}/{}", self.user, self.host, self.port, self.schema)
   }
}

#[cfg(test)]
mod tests {
   use std::collections::HashMap;

   use super::*;

   fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
      let map: HashMap<String, String> = pairs
         .iter()
         .map(|(k, v)| (k.to_string(), v.to_string()))
         .collect();
      move |key| map.get(key).cloned()
   }

   #[test]
   fn test_defaults_match_example_constants() {
      let config = MySqlDatabaseConfig::default();
      assert_eq!(config.host, "localhost");
      assert_eq!(config.port, 3306);
      assert_eq!(config.user, "root");
      assert_eq!(config.password, "root");
      assert_eq!(config.schema, "belajar_golang_database");
   }

   #[test]
   fn test_lookup_overrides_only_present_keys() {
      let config =
         MySqlDatabaseConfig::from_lookup(lookup_from(&[(HOST_VAR, "db"), (PORT_VAR, " 3307 ")]))
            .unwrap();
      assert_eq!(config.host, "db");
      assert_eq!(config.port, 3307);
      assert_eq!(config.user, "root");
      assert_eq!(config.schema, "belajar_golang_database");
   }

   #[test]
   fn test_lookup_rejects_bad_port() {
      let err = MySqlDatabaseConfig::from_lookup(lookup_from(&[(PORT_VAR, "mysql")])).unwrap_err();
      match err {
         Error::InvalidConfig { key, value } => {
            assert_eq!(key, PORT_VAR);
            assert_eq!(value, "mysql");
         }
         other => panic!("expected InvalidConfig, got {other:?}"),
      }
   }

   #[test]
   fn test_password_is_never_printed() {
      let config = MySqlDatabaseConfig {
         password: "hunter2".into(),
         ..Default::default()
      };
      assert!(!format!("{config:?}").contains("hunter2"));
      assert!(!config.to_string().contains("hunter2"));
      assert_eq!(
         config.to_string(),
         "root@localhost:3306/belajar_golang_database"
      );
   }
}
