//! Aggregates

pub mod attachment;
pub mod comment;
pub mod rating;
pub mod ticket;
pub mod user;

pub use attachment::Attachment;
pub use comment::{Comment, SYSTEM_MARKER};
pub use rating::{Rating, RatingValue, RatingValueError, Sentiment};
pub use ticket::{InvalidTransition, StatusChange, Ticket, TicketPriority, TicketStatus};
pub use user::{ParseEnumError, Role, User};
