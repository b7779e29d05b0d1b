//! Helpdesk Core
//!
//! Support-ticket lifecycle and authorization engine.
//!
//! ## Architecture
//!
//! - **Domain Layer**: Entities, capability table, lifecycle engine, audit trail
//! - **Application Layer**: Use case orchestration, DTOs
//! - **Ports Layer**: Hexagonal architecture interfaces
//! - **Infrastructure Layer**: Storage and clock adapters
//!
//! ## Guarantees
//!
//! - Every status change follows the transition table; `CLOSED` is terminal
//! - Every permission decision goes through [`domain::authorization`]
//! - Every successful mutation commits together with exactly one audit comment
//! - Bulk operations report per-item outcomes instead of aborting

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod ports;

// Re-exports for convenience
pub use application::dto::{
    BulkFailure, BulkOutcome, CreateTicketCommand, NewAttachment, RegisterUserCommand, UpdateTicketCommand,
};
pub use application::Helpdesk;
pub use config::{ConfigError, ContentLimits, HelpdeskConfig};
pub use domain::authorization::Capability;
pub use domain::{
    Attachment, AttachmentId, Comment, CommentId, Email, Rating, RatingId, RatingValue, Role, Sentiment, Ticket,
    TicketEvent, TicketId, TicketPriority, TicketStatus, User, UserId,
};
pub use error::{ErrorKind, HelpdeskError, HelpdeskResult};
pub use infrastructure::{InMemoryStorage, ManualClock, SystemClock};
pub use ports::inbound::{AdminUseCases, AttachmentUseCases, CommentUseCases, RatingUseCases, TicketUseCases};
pub use ports::outbound::{Clock, RepositoryError, Storage, UnitOfWork};
