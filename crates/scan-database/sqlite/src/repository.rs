/*
 *
 *
 *
 *
 * MIT License
 * Copyright (c) 2025. Dwight J. Browne
 * dwight[-at-]dwightjbrowne[-dot-]com
 *
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy
 * of this software and associated documentation files (the "Software"), to deal
 * in the Software without restriction, including without limitation the rights
 * to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all
 * copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
 * SOFTWARE.
 */

//! Database repository layer
//!
//! Two independent tables keyed by ticker: the universe (`tickers`) and the
//! latest signals (`signals`). All diesel work runs on the blocking pool.

use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};
use diesel::result::Error as DieselError;
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use crate::connection::{establish_connection, run_migrations, ConnectionOptions};
use crate::models::{NewSignal, NewTicker, Signal};

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;
pub type DbConnection = PooledConnection<ConnectionManager<SqliteConnection>>;

const MAX_POOL_SIZE: u32 = 8;
/// Connection timeout in seconds - pool will fail instead of retrying forever
const CONNECTION_TIMEOUT_SECS: u64 = 30;
/// Rows per INSERT statement when rebuilding the universe
const INSERT_CHUNK_SIZE: usize = 1_000;
/// `universe_meta` holds exactly one row
const META_ROW_ID: i32 = 1;

/// Default number of rows in each dashboard table
pub const DEFAULT_TOP_N: i64 = 10;

/// Database repository errors
#[derive(Error, Debug)]
pub enum RepositoryError {
  #[error("Connection pool error: {0}")]
  PoolError(String),

  #[error("Database query error: {0}")]
  QueryError(String),

  #[error("Migration error: {0}")]
  MigrationError(String),

  #[error("Not found: {0}")]
  NotFound(String),

  #[error("Constraint violation: {0}")]
  ConstraintViolation(String),

  #[error("Transaction error: {0}")]
  TransactionError(String),
}

impl From<DieselError> for RepositoryError {
  fn from(err: DieselError) -> Self {
    match err {
      DieselError::NotFound => RepositoryError::NotFound("Record not found".to_string()),
      DieselError::DatabaseError(kind, info) => match kind {
        diesel::result::DatabaseErrorKind::UniqueViolation => {
          RepositoryError::ConstraintViolation(info.message().to_string())
        }
        _ => RepositoryError::QueryError(info.message().to_string()),
      },
      _ => RepositoryError::QueryError(err.to_string()),
    }
  }
}

impl From<diesel::r2d2::PoolError> for RepositoryError {
  fn from(err: diesel::r2d2::PoolError) -> Self {
    RepositoryError::PoolError(err.to_string())
  }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Bounds for the dashboard tables: price strictly inside
/// (`min_price`, `max_price`) and volume strictly above `min_volume`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalFilter {
  pub min_price: f64,
  pub max_price: f64,
  pub min_volume: i64,
}

impl Default for SignalFilter {
  fn default() -> Self {
    Self { min_price: 1.0, max_price: 20.0, min_volume: 100_000 }
  }
}

/// Universe table access
#[async_trait]
pub trait UniverseRepository: Send + Sync {
  /// Delete every ticker, insert `tickers` and stamp `refreshed_on` as the
  /// last refresh date, all in one transaction
  async fn replace_universe(
    &self,
    tickers: Vec<NewTicker>,
    refreshed_on: NaiveDate,
  ) -> RepositoryResult<usize>;

  /// All ticker identifiers, ordered by identifier
  async fn tickers(&self) -> RepositoryResult<Vec<String>>;

  /// Date of the last completed refresh, `None` before the first one.
  /// Set even when the refresh produced no eligible tickers.
  async fn last_refresh_date(&self) -> RepositoryResult<Option<NaiveDate>>;

  async fn count(&self) -> RepositoryResult<i64>;
}

/// Signal table access, including the read-only dashboard queries
#[async_trait]
pub trait SignalRepository: Send + Sync {
  /// Insert or fully overwrite one row per ticker, in one transaction
  async fn upsert_signals(&self, rows: Vec<NewSignal>) -> RepositoryResult<usize>;

  async fn get_signal(&self, ticker: &str) -> RepositoryResult<Option<Signal>>;

  async fn count(&self) -> RepositoryResult<i64>;

  /// Top `n` rows inside `filter` ordered by percent change, largest first
  async fn top_by_percent_change(
    &self,
    filter: &SignalFilter,
    n: i64,
  ) -> RepositoryResult<Vec<Signal>>;

  /// Top `n` rows inside `filter` ordered by volume ratio, largest first
  async fn top_by_volume_ratio(&self, filter: &SignalFilter, n: i64) -> RepositoryResult<Vec<Signal>>;
}

/// Database context that provides access to repositories and connection pool
#[derive(Clone)]
pub struct DatabaseContext {
  pool: Arc<DbPool>,
}

impl DatabaseContext {
  /// Open (or create) the database file, apply migrations and build the pool.
  ///
  /// Migrations run on a dedicated connection before the pool exists so a
  /// broken file fails here instead of inside pool worker threads.
  pub fn new(database_path: &str) -> RepositoryResult<Self> {
    Self::with_pool_config(database_path, MAX_POOL_SIZE, ConnectionOptions::default())
  }

  /// Create with custom pool size and connection pragmas
  pub fn with_pool_config(
    database_path: &str,
    max_size: u32,
    options: ConnectionOptions,
  ) -> RepositoryResult<Self> {
    let mut conn = establish_connection(database_path).map_err(|e| {
      RepositoryError::PoolError(format!("Failed to open database {}: {}", database_path, e))
    })?;
    let applied =
      run_migrations(&mut conn).map_err(|e| RepositoryError::MigrationError(e.to_string()))?;
    debug!("{} migration(s) applied to {}", applied, database_path);
    drop(conn);

    let manager = ConnectionManager::<SqliteConnection>::new(database_path);
    let pool = Pool::builder()
      .max_size(max_size)
      .connection_timeout(Duration::from_secs(CONNECTION_TIMEOUT_SECS))
      .connection_customizer(Box::new(options))
      .build(manager)
      .map_err(|e| RepositoryError::PoolError(e.to_string()))?;

    info!("Opened database {}", database_path);
    Ok(Self { pool: Arc::new(pool) })
  }

  pub fn universe_repository(&self) -> impl UniverseRepository {
    UniverseRepositoryImpl { pool: Arc::clone(&self.pool) }
  }

  pub fn signal_repository(&self) -> impl SignalRepository {
    SignalRepositoryImpl { pool: Arc::clone(&self.pool) }
  }
}

async fn run_blocking<F, R>(pool: Arc<DbPool>, f: F) -> RepositoryResult<R>
where
  F: FnOnce(&mut DbConnection) -> RepositoryResult<R> + Send + 'static,
  R: Send + 'static,
{
  tokio::task::spawn_blocking(move || {
    let mut conn = pool.get()?;
    f(&mut conn)
  })
  .await
  .map_err(|e| RepositoryError::QueryError(format!("Task join error: {}", e)))?
}

struct UniverseRepositoryImpl {
  pool: Arc<DbPool>,
}

#[async_trait]
impl UniverseRepository for UniverseRepositoryImpl {
  async fn replace_universe(
    &self,
    rows: Vec<NewTicker>,
    refreshed_on: NaiveDate,
  ) -> RepositoryResult<usize> {
    run_blocking(Arc::clone(&self.pool), move |conn| {
      use crate::schema::{tickers, universe_meta};

      conn
        .transaction::<_, RepositoryError, _>(|conn| {
          let deleted = diesel::delete(tickers::table).execute(conn)?;
          let mut inserted = 0;
          for chunk in rows.chunks(INSERT_CHUNK_SIZE) {
            inserted += diesel::insert_into(tickers::table).values(chunk).execute(conn)?;
          }
          diesel::insert_into(universe_meta::table)
            .values((universe_meta::id.eq(META_ROW_ID), universe_meta::last_refresh.eq(refreshed_on)))
            .on_conflict(universe_meta::id)
            .do_update()
            .set(universe_meta::last_refresh.eq(refreshed_on))
            .execute(conn)?;
          debug!("Universe replaced: {} removed, {} inserted", deleted, inserted);
          Ok(inserted)
        })
        .map_err(|e| match e {
          RepositoryError::ConstraintViolation(_) => e,
          other => RepositoryError::TransactionError(other.to_string()),
        })
    })
    .await
  }

  async fn tickers(&self) -> RepositoryResult<Vec<String>> {
    run_blocking(Arc::clone(&self.pool), |conn| {
      use crate::schema::tickers::dsl::*;

      Ok(tickers.select(ticker).order(ticker.asc()).load::<String>(conn)?)
    })
    .await
  }

  async fn last_refresh_date(&self) -> RepositoryResult<Option<NaiveDate>> {
    run_blocking(Arc::clone(&self.pool), |conn| {
      use crate::schema::universe_meta::dsl::*;

      Ok(universe_meta.find(META_ROW_ID).select(last_refresh).first::<NaiveDate>(conn).optional()?)
    })
    .await
  }

  async fn count(&self) -> RepositoryResult<i64> {
    run_blocking(Arc::clone(&self.pool), |conn| {
      use crate::schema::tickers::dsl::*;

      Ok(tickers.count().get_result(conn)?)
    })
    .await
  }
}

struct SignalRepositoryImpl {
  pool: Arc<DbPool>,
}

#[derive(Clone, Copy)]
enum SignalOrder {
  PercentChange,
  VolumeRatio,
}

impl SignalRepositoryImpl {
  async fn top_by(
    &self,
    filter: &SignalFilter,
    n: i64,
    order: SignalOrder,
  ) -> RepositoryResult<Vec<Signal>> {
    let filter = *filter;

    run_blocking(Arc::clone(&self.pool), move |conn| {
      use crate::schema::signals::dsl::*;

      let mut query = signals
        .filter(latest_price.gt(filter.min_price))
        .filter(latest_price.lt(filter.max_price))
        .filter(daily_volume.gt(filter.min_volume))
        .select(Signal::as_select())
        .into_boxed();

      query = match order {
        SignalOrder::PercentChange => query.order(percent_change.desc()),
        SignalOrder::VolumeRatio => query.order(volume_ratio.desc()),
      };

      Ok(query.limit(n).load(conn)?)
    })
    .await
  }
}

#[async_trait]
impl SignalRepository for SignalRepositoryImpl {
  async fn upsert_signals(&self, rows: Vec<NewSignal>) -> RepositoryResult<usize> {
    if rows.is_empty() {
      return Ok(0);
    }

    run_blocking(Arc::clone(&self.pool), move |conn| {
      use crate::schema::signals;

      conn
        .transaction::<_, RepositoryError, _>(|conn| {
          let mut written = 0;
          for row in &rows {
            written += diesel::insert_into(signals::table)
              .values(row)
              .on_conflict(signals::ticker)
              .do_update()
              .set(row)
              .execute(conn)?;
          }
          Ok(written)
        })
        .map_err(|e| RepositoryError::TransactionError(e.to_string()))
    })
    .await
  }

  async fn get_signal(&self, symbol: &str) -> RepositoryResult<Option<Signal>> {
    let symbol = symbol.to_string();

    run_blocking(Arc::clone(&self.pool), move |conn| {
      use crate::schema::signals::dsl::*;

      Ok(signals.find(symbol).select(Signal::as_select()).first(conn).optional()?)
    })
    .await
  }

  async fn count(&self) -> RepositoryResult<i64> {
    run_blocking(Arc::clone(&self.pool), |conn| {
      use crate::schema::signals::dsl::*;

      Ok(signals.count().get_result(conn)?)
    })
    .await
  }

  async fn top_by_percent_change(
    &self,
    filter: &SignalFilter,
    n: i64,
  ) -> RepositoryResult<Vec<Signal>> {
    self.top_by(filter, n, SignalOrder::PercentChange).await
  }

  async fn top_by_volume_ratio(&self, filter: &SignalFilter, n: i64) -> RepositoryResult<Vec<Signal>> {
    self.top_by(filter, n, SignalOrder::VolumeRatio).await
  }
}
