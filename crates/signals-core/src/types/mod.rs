//! Core data types for the signals service.

mod api_key;
mod dispatch;
mod portfolio;
mod signal;
mod subscriber;
mod tier;

pub use api_key::{hash_token, ApiKey};
pub use dispatch::{DeliveryResult, DispatchOutcome, DispatchRecord, DispatchSkip};
pub use portfolio::{PortfolioPosition, PortfolioSnapshot, PortfolioView, PositionView};
pub use signal::Signal;
pub use subscriber::{Subscriber, TypeFilter};
pub use tier::{Tier, TierPolicy, TierTable};
