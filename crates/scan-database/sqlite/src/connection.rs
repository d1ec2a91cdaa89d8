use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::CustomizeConnection;
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use tracing::info;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Milliseconds a writer waits on a locked database before failing
const BUSY_TIMEOUT_MS: u32 = 5_000;

/// Establish a database connection
pub fn establish_connection(database_path: &str) -> Result<SqliteConnection, diesel::ConnectionError> {
  SqliteConnection::establish(database_path)
}

/// Apply any pending embedded migrations. Safe to call on every start.
pub fn run_migrations(
  conn: &mut SqliteConnection,
) -> Result<usize, Box<dyn std::error::Error + Send + Sync + 'static>> {
  let applied = conn.run_pending_migrations(MIGRATIONS)?;
  for version in &applied {
    info!("Applied migration {}", version);
  }
  Ok(applied.len())
}

/// Per-connection pragmas applied when the pool hands out a connection
#[derive(Debug, Clone, Copy)]
pub struct ConnectionOptions {
  pub enable_wal: bool,
  pub busy_timeout_ms: u32,
}

impl Default for ConnectionOptions {
  fn default() -> Self {
    Self { enable_wal: true, busy_timeout_ms: BUSY_TIMEOUT_MS }
  }
}

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionOptions {
  fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
    let mut pragmas = format!("PRAGMA busy_timeout = {};", self.busy_timeout_ms);
    if self.enable_wal {
      pragmas.push_str(" PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL;");
    }
    conn.batch_execute(&pragmas).map_err(diesel::r2d2::Error::QueryError)
  }
}
