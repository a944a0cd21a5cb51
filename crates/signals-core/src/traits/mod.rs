//! Core traits for the signals service.

mod stores;

pub use stores::{KeyStore, PortfolioStore, SignalStore, SubscriberStore};
