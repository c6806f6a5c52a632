//! Trading Signals
//!
//! Advisory recommendations with a confidence score and an expiry.

pub mod errors;
pub mod repository;
mod signal;
mod signal_type;

pub use errors::SignalError;
pub use repository::SignalRepository;
pub use signal::{SignalParams, TradingSignal};
pub use signal_type::SignalType;
