//! Domain module
//!
//! Entities, the authorization capability table, the ticket lifecycle
//! engine and the audit trail generator. Nothing here performs I/O.

pub mod aggregates;
pub mod audit;
pub mod authorization;
pub mod events;
pub mod lifecycle;
pub mod value_objects;

pub use aggregates::*;
pub use events::*;
pub use value_objects::*;
