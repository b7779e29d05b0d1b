//! Inbound ports (Use case traits)
//!
//! Hexagonal architecture: application service interfaces. Every operation
//! takes the already-authenticated acting [`User`]; no authentication
//! happens behind these traits.

use async_trait::async_trait;

use crate::application::dto::*;
use crate::domain::{
    Attachment, AttachmentId, Comment, CommentId, Rating, Role, Ticket, TicketId, TicketStatus,
    User, UserId,
};
use crate::error::HelpdeskResult;

/// Ticket lifecycle use cases
#[async_trait]
pub trait TicketUseCases: Send + Sync {
    /// Open a new ticket on behalf of `creator`
    async fn create_ticket(&self, command: CreateTicketCommand, creator: &User) -> HelpdeskResult<Ticket>;

    async fn get_ticket(&self, id: &TicketId, actor: &User) -> HelpdeskResult<Ticket>;

    /// Apply a partial update, recorded as one composite audit entry
    async fn update_ticket(&self, id: &TicketId, command: UpdateTicketCommand, actor: &User) -> HelpdeskResult<Ticket>;

    async fn assign_ticket(&self, id: &TicketId, agent_id: &UserId, actor: &User) -> HelpdeskResult<Ticket>;

    async fn unassign_ticket(&self, id: &TicketId, actor: &User) -> HelpdeskResult<Ticket>;

    async fn change_status(&self, id: &TicketId, status: TicketStatus, actor: &User) -> HelpdeskResult<Ticket>;

    /// Delete a ticket together with its comments, attachments and rating
    async fn delete_ticket(&self, id: &TicketId, actor: &User) -> HelpdeskResult<()>;
}

/// Comment thread use cases
#[async_trait]
pub trait CommentUseCases: Send + Sync {
    async fn add_comment(&self, ticket_id: &TicketId, content: String, actor: &User) -> HelpdeskResult<Comment>;

    async fn update_comment(&self, id: &CommentId, content: String, actor: &User) -> HelpdeskResult<Comment>;

    async fn delete_comment(&self, id: &CommentId, actor: &User) -> HelpdeskResult<()>;

    async fn get_comment(&self, id: &CommentId, actor: &User) -> HelpdeskResult<Comment>;

    /// Thread in creation order
    async fn list_comments(&self, ticket_id: &TicketId, actor: &User) -> HelpdeskResult<Vec<Comment>>;
}

/// Satisfaction rating use cases
#[async_trait]
pub trait RatingUseCases: Send + Sync {
    async fn rate_ticket(
        &self,
        ticket_id: &TicketId,
        value: i64,
        feedback: Option<String>,
        actor: &User,
    ) -> HelpdeskResult<Rating>;

    async fn get_rating(&self, ticket_id: &TicketId, actor: &User) -> HelpdeskResult<Rating>;

    async fn revise_rating(
        &self,
        ticket_id: &TicketId,
        value: i64,
        feedback: Option<String>,
        actor: &User,
    ) -> HelpdeskResult<Rating>;
}

/// Attachment metadata use cases
#[async_trait]
pub trait AttachmentUseCases: Send + Sync {
    async fn attach(&self, ticket_id: &TicketId, file: NewAttachment, actor: &User) -> HelpdeskResult<Attachment>;

    /// Authorize a download and return the metadata locating the file
    async fn download(&self, id: &AttachmentId, actor: &User) -> HelpdeskResult<Attachment>;

    async fn list_attachments(&self, ticket_id: &TicketId, actor: &User) -> HelpdeskResult<Vec<Attachment>>;

    async fn remove_attachment(&self, id: &AttachmentId, actor: &User) -> HelpdeskResult<()>;
}

/// User administration and bulk operations
#[async_trait]
pub trait AdminUseCases: Send + Sync {
    /// Create the first administrator of an empty installation
    async fn bootstrap_admin(&self, command: RegisterUserCommand) -> HelpdeskResult<User>;

    async fn register_user(&self, command: RegisterUserCommand, actor: &User) -> HelpdeskResult<User>;

    /// Identity lookup for callers that authenticate by email
    async fn find_user_by_email(&self, email: &str) -> HelpdeskResult<User>;

    async fn list_users(&self, actor: &User) -> HelpdeskResult<Vec<User>>;

    async fn change_role(&self, user_id: &UserId, role: Role, actor: &User) -> HelpdeskResult<User>;

    async fn set_active(&self, user_id: &UserId, active: bool, actor: &User) -> HelpdeskResult<User>;

    async fn bulk_change_status(
        &self,
        ids: &[TicketId],
        status: TicketStatus,
        actor: &User,
    ) -> HelpdeskResult<BulkOutcome<TicketId>>;

    async fn bulk_delete_tickets(&self, ids: &[TicketId], actor: &User) -> HelpdeskResult<BulkOutcome<TicketId>>;

    async fn bulk_change_role(&self, ids: &[UserId], role: Role, actor: &User) -> HelpdeskResult<BulkOutcome<UserId>>;

    async fn bulk_set_active(&self, ids: &[UserId], active: bool, actor: &User) -> HelpdeskResult<BulkOutcome<UserId>>;
}
