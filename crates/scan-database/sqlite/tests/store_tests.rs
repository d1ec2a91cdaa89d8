use chrono::{NaiveDate, Utc};
use scan_database_sqlite::{
  DatabaseContext, NewSignal, NewTicker, SignalFilter, SignalRepository, UniverseRepository,
};

fn row(ticker: &str, price: f64, pct: f64) -> NewSignal {
  NewSignal {
    ticker: ticker.to_string(),
    latest_price: price,
    percent_change: pct,
    volume_ratio: 1.0,
    daily_volume: 250_000,
    last_updated: Utc::now().naive_utc(),
  }
}

#[tokio::test]
async fn test_reader_sees_writer_commits() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("shared.db");
  let path = path.to_str().unwrap();

  let writer = DatabaseContext::new(path).unwrap();
  let reader = DatabaseContext::new(path).unwrap();

  writer.signal_repository().upsert_signals(vec![row("AAA", 4.0, 12.0), row("BBB", 8.0, 40.0)]).await.unwrap();

  let top = reader
    .signal_repository()
    .top_by_percent_change(&SignalFilter::default(), 10)
    .await
    .unwrap();
  let names: Vec<String> = top.into_iter().map(|s| s.ticker).collect();
  assert_eq!(names, vec!["BBB".to_string(), "AAA".to_string()]);
}

#[tokio::test]
async fn test_signals_survive_universe_replacement() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("scanner.db");
  let ctx = DatabaseContext::new(path.to_str().unwrap()).unwrap();
  let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();

  ctx.signal_repository().upsert_signals(vec![row("GONE", 5.0, 1.0)]).await.unwrap();
  ctx
    .universe_repository()
    .replace_universe(vec![NewTicker::new("KEEP", "Domestic Common Stock", "4 - Mid", day)], day)
    .await
    .unwrap();

  assert!(ctx.signal_repository().get_signal("GONE").await.unwrap().is_some());
  assert_eq!(ctx.universe_repository().tickers().await.unwrap(), vec!["KEEP".to_string()]);
}
