//! CLI command implementations.

pub mod check;
pub mod dispatch;
pub mod hash_key;
pub mod serve;
pub mod validate;
