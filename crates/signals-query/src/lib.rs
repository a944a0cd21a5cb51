//! Signal query engine.
//!
//! Applies the caller tier's visibility delay, then filters, sorts and
//! truncates a signal collection.

mod engine;
mod query;

pub use engine::{QueryResult, SignalQueryEngine};
pub use query::{parse_limit, SignalQuery, DEFAULT_LIMIT, MAX_LIMIT};
