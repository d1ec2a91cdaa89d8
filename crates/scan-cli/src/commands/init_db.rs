use anyhow::{Context, Result};
use scan_database_sqlite::DatabaseContext;
use tracing::info;

use crate::config::Config;

/// Opening a context creates the file and runs pending migrations
pub fn execute(config: Config) -> Result<()> {
  DatabaseContext::new(&config.database_path)
    .with_context(|| format!("Failed to initialize database at {}", config.database_path))?;
  info!("Database ready at {}", config.database_path);
  println!("Database initialized: {}", config.database_path);
  Ok(())
}
