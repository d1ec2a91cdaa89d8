//! Reference ticker metadata (Nasdaq Data Link `SHARADAR/TICKERS` datatable)

use crate::transport::Transport;
use scan_core::{Error, Result, SHARADAR_TICKERS_TABLE};
use scan_models::reference::{DatatableResponse, TickerRecord};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Upper bound on followed cursors; a cursor that never clears is an API fault
const MAX_PAGES: usize = 1_000;

pub struct ReferenceEndpoints {
  transport: Arc<Transport>,
}

impl ReferenceEndpoints {
  pub fn new(transport: Arc<Transport>) -> Self {
    Self { transport }
  }

  /// Fetch one page of the tickers table
  #[instrument(skip(self))]
  pub async fn tickers_page(&self, cursor: Option<&str>) -> Result<DatatableResponse> {
    let path = format!("datatables/{}.json", SHARADAR_TICKERS_TABLE);
    let mut params = Vec::new();
    if let Some(cursor) = cursor {
      params.push(("qopts.cursor_id", cursor.to_string()));
    }
    self.transport.get(&path, &params).await
  }

  /// Fetch every row of the tickers table, following `next_cursor_id`
  /// until the last page
  pub async fn all_tickers(&self) -> Result<Vec<TickerRecord>> {
    let mut records = Vec::new();
    let mut cursor: Option<String> = None;

    for page in 1..=MAX_PAGES {
      let response = self.tickers_page(cursor.as_deref()).await?;
      let rows: Vec<TickerRecord> = response.datatable.records()?;
      debug!("Page {}: {} ticker rows", page, rows.len());
      records.extend(rows);

      match response.next_cursor() {
        Some(next) => cursor = Some(next.to_string()),
        None => {
          info!("Fetched {} ticker rows in {} page(s)", records.len(), page);
          return Ok(records);
        }
      }
    }

    Err(Error::InvalidResponse(format!("ticker pagination exceeded {} pages", MAX_PAGES)))
  }
}
