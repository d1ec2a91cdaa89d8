pub mod signal;
pub mod ticker;

pub use signal::{NewSignal, Signal};
pub use ticker::{NewTicker, Ticker};
