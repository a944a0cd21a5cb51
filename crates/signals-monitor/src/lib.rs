//! Logging setup for the signals service.

mod logging;

pub use logging::{setup_logging, try_setup_logging, LogFormat};
