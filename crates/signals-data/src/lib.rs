//! Data sources for the signals service.
//!
//! Keys, signals, subscribers and the portfolio snapshot are owned by other
//! processes; this crate only reads them.

mod json_store;
mod memory;

pub use json_store::{DataPaths, JsonFileStore};
pub use memory::MemoryStore;

use signals_core::ApiKey;
use std::collections::HashSet;

/// Hashes shared by more than one active key, in first-seen order.
pub fn duplicate_key_hashes(keys: &[ApiKey]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    keys.iter()
        .filter(|k| k.active)
        .filter(|k| !seen.insert(k.hash.as_str()))
        .filter(|k| reported.insert(k.hash.as_str()))
        .map(|k| k.hash.clone())
        .collect()
}
