//! SQLite persistence for the scanner
//!
//! Schema is created by embedded diesel migrations when a
//! [`DatabaseContext`] is opened.

pub mod connection;
pub mod models;
pub mod repository;
pub mod schema;

pub use connection::{establish_connection, run_migrations, ConnectionOptions};
pub use models::{NewSignal, NewTicker, Signal, Ticker};
pub use repository::{
  DatabaseContext, RepositoryError, RepositoryResult, SignalFilter, SignalRepository,
  UniverseRepository, DEFAULT_TOP_N,
};
