use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::signals;

/// Latest computed metrics for one ticker
#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[diesel(table_name = signals)]
#[diesel(primary_key(ticker))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Signal {
  pub ticker: String,
  pub latest_price: f64,
  pub percent_change: f64,
  pub volume_ratio: f64,
  pub daily_volume: i64,
  pub last_updated: NaiveDateTime,
}

/// Upsert payload. Used both as the insert row and as the conflict
/// changeset, so a later write replaces every column but the key.
#[derive(Insertable, AsChangeset, Debug, Clone, PartialEq)]
#[diesel(table_name = signals)]
#[diesel(primary_key(ticker))]
pub struct NewSignal {
  pub ticker: String,
  pub latest_price: f64,
  pub percent_change: f64,
  pub volume_ratio: f64,
  pub daily_volume: i64,
  pub last_updated: NaiveDateTime,
}
