//! Shared types for the messaging store.

pub mod errors;
pub mod pair;

pub use errors::{MessagingError, MessagingResult};
pub use pair::PairKey;
