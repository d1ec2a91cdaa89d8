//! # scan-loaders
//!
//! The scanning pipeline:
//! - Universe refresh from the reference ticker list, at most once per day
//! - Two-request quote fetch and signal computation per ticker
//! - Batched concurrent fetch with a request-quota cooldown
//! - The scan loop state machine tying them together

pub mod batch_scheduler;
pub mod error;
pub mod progress;
pub mod quote_fetcher;
pub mod scan_loop;
pub mod shutdown;
pub mod signal;
pub mod universe_loader;

// Re-export commonly used types
pub use batch_scheduler::{BatchConfig, BatchScheduler, PassSummary, QuotaGuard};
pub use error::{EmptyReason, FetchError, LoaderError, LoaderResult};
pub use progress::ProgressReporter;
pub use quote_fetcher::{FetchOutcome, QuoteFetcher, TimeSeriesSource};
pub use scan_loop::{ScanConfig, ScanLoop, ScanReport, ScanState};
pub use shutdown::{shutdown_channel, sleep_or_shutdown, Shutdown, ShutdownTrigger};
pub use signal::{compute_signal, round2, SessionStats, SignalData};
pub use universe_loader::{ReferenceSource, UniverseFilter, UniverseLoader};

// Prelude for convenient imports
pub mod prelude {
  pub use crate::{
    BatchConfig, BatchScheduler, LoaderError, LoaderResult, QuoteFetcher, ScanConfig, ScanLoop,
    Shutdown, UniverseFilter, UniverseLoader,
  };
}
