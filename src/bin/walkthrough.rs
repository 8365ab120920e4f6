use std::process::ExitCode;

use mysql_walkthrough::{MySqlDatabaseConfig, run_all};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
   tracing_subscriber::fmt()
      .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
      .init();

   let config = match MySqlDatabaseConfig::from_env() {
      Ok(config) => config,
      Err(e) => {
         error!("Invalid MySQL configuration: {e}");
         return ExitCode::FAILURE;
      }
   };

   let report = run_all(&config).await;
   report.log_summary();

   if report.is_success() {
      ExitCode::SUCCESS
   } else {
      ExitCode::FAILURE
   }
}
