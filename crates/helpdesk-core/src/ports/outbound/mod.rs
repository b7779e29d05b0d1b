//! Outbound ports (storage and clock)
//!
//! Hexagonal architecture: these are the interfaces that infrastructure must implement.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    Attachment, AttachmentId, Comment, CommentId, Rating, Ticket, TicketId, User, UserId,
};

/// Repository result type
pub type RepoResult<T> = Result<T, RepositoryError>;

/// Persistence collaborator.
///
/// Reads are typed finders. Every write goes through [`Storage::commit`],
/// which applies a whole [`UnitOfWork`] or none of it, so a mutation and its
/// audit comment become visible together. Filtered and paginated queries
/// belong to the adapter and are not part of this port.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn find_user(&self, id: &UserId) -> RepoResult<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>>;

    async fn list_users(&self) -> RepoResult<Vec<User>>;

    async fn find_ticket(&self, id: &TicketId) -> RepoResult<Option<Ticket>>;

    async fn find_comment(&self, id: &CommentId) -> RepoResult<Option<Comment>>;

    /// Comments of a ticket ordered by creation time, ties broken by
    /// insertion order.
    async fn comments_for_ticket(&self, ticket_id: &TicketId) -> RepoResult<Vec<Comment>>;

    async fn find_rating_for_ticket(&self, ticket_id: &TicketId) -> RepoResult<Option<Rating>>;

    async fn find_attachment(&self, id: &AttachmentId) -> RepoResult<Option<Attachment>>;

    async fn attachments_for_ticket(&self, ticket_id: &TicketId) -> RepoResult<Vec<Attachment>>;

    /// Apply all writes atomically, in order.
    ///
    /// Contract: deleting a ticket cascades to its comments, attachments and
    /// rating; user emails and (ticket, rater) pairs are unique keys and a
    /// violation fails with [`RepositoryError::DuplicateKey`].
    async fn commit(&self, unit: UnitOfWork) -> RepoResult<()>;
}

/// A single write inside a [`UnitOfWork`].
#[derive(Debug, Clone)]
pub enum Write {
    SaveUser(User),
    /// Fails with [`RepositoryError::Conflict`] unless the user table is empty.
    RequireNoUsers,
    SaveTicket(Ticket),
    /// Record activity on the ticket as currently stored, leaving its
    /// status and assignee alone.
    TouchTicket { id: TicketId, at: DateTime<Utc> },
    DeleteTicket(TicketId),
    SaveComment(Comment),
    DeleteComment(CommentId),
    SaveRating(Rating),
    SaveAttachment(Attachment),
    DeleteAttachment(AttachmentId),
}

/// Ordered batch of writes committed as one transaction.
#[derive(Debug, Clone, Default)]
pub struct UnitOfWork {
    writes: Vec<Write>,
}

impl UnitOfWork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, write: Write) -> Self {
        self.writes.push(write);
        self
    }

    pub fn save_user(self, user: User) -> Self {
        self.push(Write::SaveUser(user))
    }

    pub fn require_no_users(self) -> Self {
        self.push(Write::RequireNoUsers)
    }

    pub fn touch_ticket(self, id: TicketId, at: DateTime<Utc>) -> Self {
        self.push(Write::TouchTicket { id, at })
    }

    pub fn save_ticket(self, ticket: Ticket) -> Self {
        self.push(Write::SaveTicket(ticket))
    }

    pub fn delete_ticket(self, id: TicketId) -> Self {
        self.push(Write::DeleteTicket(id))
    }

    pub fn save_comment(self, comment: Comment) -> Self {
        self.push(Write::SaveComment(comment))
    }

    pub fn delete_comment(self, id: CommentId) -> Self {
        self.push(Write::DeleteComment(id))
    }

    pub fn save_rating(self, rating: Rating) -> Self {
        self.push(Write::SaveRating(rating))
    }

    pub fn save_attachment(self, attachment: Attachment) -> Self {
        self.push(Write::SaveAttachment(attachment))
    }

    pub fn delete_attachment(self, id: AttachmentId) -> Self {
        self.push(Write::DeleteAttachment(id))
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }
}

impl IntoIterator for UnitOfWork {
    type Item = Write;
    type IntoIter = std::vec::IntoIter<Write>;

    fn into_iter(self) -> Self::IntoIter {
        self.writes.into_iter()
    }
}

/// Time source
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Repository errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    /// A precondition of the unit no longer holds
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("storage error: {0}")]
    Storage(String),
}
