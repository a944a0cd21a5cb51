//! Core types and traits for the signals service.
//!
//! This crate provides the foundational building blocks including:
//! - Access tiers and the injected tier policy table
//! - API keys, signals and webhook subscribers as loaded from storage
//! - Dispatch outcome records
//! - Store traits through which the service reads its collaborators' data

pub mod types;
pub mod traits;
pub mod error;

pub use error::{AccessError, SignalsError, StoreError, WebhookError};
pub use types::*;
pub use traits::*;
