use anyhow::{Context, Result};
use scan_core::Config as CoreConfig;

/// Settings shared by every subcommand. Provider keys are only loaded by
/// the commands that call the providers, so the dashboard and `init-db`
/// work without them.
#[derive(Debug, Clone)]
pub struct Config {
  pub database_path: String,
}

impl Config {
  pub fn new(database_path: String) -> Self {
    Self { database_path }
  }

  /// Provider configuration from the environment, pointed at our database
  pub fn core_config(&self) -> Result<CoreConfig> {
    let mut core = CoreConfig::from_env().context("Failed to load API configuration")?;
    core.database_path = self.database_path.clone();
    Ok(core)
  }
}
