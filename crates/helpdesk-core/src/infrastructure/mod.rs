//! Infrastructure adapters

pub mod clock;
pub mod persistence;

pub use clock::{ManualClock, SystemClock};
pub use persistence::InMemoryStorage;
