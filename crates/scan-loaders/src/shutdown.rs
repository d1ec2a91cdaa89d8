//! Cooperative stop request shared by the scan loop and the scheduler

use std::time::Duration;
use tokio::sync::watch;

/// Create a linked trigger/listener pair
pub fn shutdown_channel() -> (ShutdownTrigger, Shutdown) {
  let (tx, rx) = watch::channel(false);
  (ShutdownTrigger { tx }, Shutdown { rx })
}

/// Held by whoever receives the OS signal
#[derive(Debug)]
pub struct ShutdownTrigger {
  tx: watch::Sender<bool>,
}

impl ShutdownTrigger {
  pub fn trigger(&self) {
    self.tx.send_replace(true);
  }
}

/// Cloneable listener checked at safe points
#[derive(Debug, Clone)]
pub struct Shutdown {
  rx: watch::Receiver<bool>,
}

impl Shutdown {
  /// A listener that is never triggered
  pub fn never() -> Self {
    shutdown_channel().1
  }

  pub fn is_requested(&self) -> bool {
    *self.rx.borrow()
  }

  /// Resolve once a stop has been requested. Pends forever if the trigger
  /// is dropped without firing.
  pub async fn wait(&mut self) {
    loop {
      if *self.rx.borrow_and_update() {
        return;
      }
      if self.rx.changed().await.is_err() {
        futures::future::pending::<()>().await;
      }
    }
  }
}

/// Sleep for `duration` unless a stop is requested first.
///
/// Returns `true` when interrupted.
pub async fn sleep_or_shutdown(duration: Duration, shutdown: &Shutdown) -> bool {
  if shutdown.is_requested() {
    return true;
  }
  let mut listener = shutdown.clone();
  tokio::select! {
    _ = tokio::time::sleep(duration) => false,
    _ = listener.wait() => true,
  }
}
