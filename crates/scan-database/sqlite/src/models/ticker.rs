use chrono::NaiveDate;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::tickers;

/// Row of the universe table
#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[diesel(table_name = tickers)]
#[diesel(primary_key(ticker))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Ticker {
  pub ticker: String,
  pub category: String,
  pub market_cap: String,
  pub last_updated: NaiveDate,
}

#[derive(Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = tickers)]
pub struct NewTicker {
  pub ticker: String,
  pub category: String,
  pub market_cap: String,
  pub last_updated: NaiveDate,
}

impl NewTicker {
  pub fn new(ticker: &str, category: &str, market_cap: &str, last_updated: NaiveDate) -> Self {
    Self {
      ticker: ticker.to_string(),
      category: category.to_string(),
      market_cap: market_cap.to_string(),
      last_updated,
    }
  }
}
