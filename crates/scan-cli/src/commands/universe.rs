use anyhow::Result;
use chrono::Utc;
use clap::{Args, Subcommand};
use std::sync::Arc;

use scan_client::MarketDataClient;
use scan_database_sqlite::{DatabaseContext, UniverseRepository};
use scan_loaders::{UniverseFilter, UniverseLoader};

use crate::config::Config;

#[derive(Args, Debug)]
pub struct UniverseCommand {
  #[command(subcommand)]
  command: UniverseSubcommands,
}

#[derive(Subcommand, Debug)]
enum UniverseSubcommands {
  /// Fetch the reference list and replace the stored universe
  Refresh {
    /// Refresh even when the universe was already refreshed today
    #[arg(short, long)]
    force: bool,
  },

  /// List the stored tickers
  List {
    /// Limit results
    #[arg(short, long)]
    limit: Option<usize>,
  },
}

pub async fn execute(cmd: UniverseCommand, config: Config) -> Result<()> {
  match cmd.command {
    UniverseSubcommands::Refresh { force } => refresh(config, force).await,
    UniverseSubcommands::List { limit } => list(config, limit).await,
  }
}

async fn refresh(config: Config, force: bool) -> Result<()> {
  let core = config.core_config()?;
  let db = DatabaseContext::new(&core.database_path)?;
  let client = Arc::new(MarketDataClient::new(&core)?);
  let loader =
    UniverseLoader::new(client, Arc::new(db.universe_repository()), UniverseFilter::default());

  let today = Utc::now().date_naive();
  if !force && !loader.needs_refresh(today).await? {
    let current = loader.current().await?;
    println!("Universe already refreshed on {} ({} tickers)", today, current.len());
    return Ok(());
  }

  let tickers = loader.refresh(today).await?;
  println!("Universe refreshed: {} tickers", tickers.len());
  Ok(())
}

async fn list(config: Config, limit: Option<usize>) -> Result<()> {
  let db = DatabaseContext::new(&config.database_path)?;
  let repo = db.universe_repository();

  let tickers = repo.tickers().await?;
  match repo.last_refresh_date().await? {
    Some(date) => println!("{} tickers, refreshed {}", tickers.len(), date),
    None => {
      println!("Universe is empty; run `scanner universe refresh`");
      return Ok(());
    }
  }

  let shown = limit.unwrap_or(tickers.len());
  for ticker in tickers.iter().take(shown) {
    println!("  {}", ticker);
  }
  if shown < tickers.len() {
    println!("  ... {} more", tickers.len() - shown);
  }
  Ok(())
}
