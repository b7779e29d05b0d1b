//! Capability table
//!
//! Every permission decision in the crate is one of the predicates below.
//! They are pure functions of the acting user and the entity snapshot.
//! A deactivated account holds no capability at all.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::aggregates::{Attachment, Comment, Rating, Ticket, User};

/// A named permission evaluated per actor/entity pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    CreateTicket,
    ViewTicket,
    EditTicket,
    AssignTicket,
    ChangeStatus,
    DeleteTicket,
    ViewComment,
    EditComment,
    DeleteComment,
    DownloadAttachment,
    DeleteAttachment,
    ViewRating,
    EditRating,
    ListUsers,
    ManageUsers,
}

impl Capability {
    /// Turn a predicate outcome into a typed denial.
    pub fn check(self, granted: bool) -> Result<(), Denied> {
        if granted {
            Ok(())
        } else {
            Err(Denied(self))
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::CreateTicket => "create tickets",
            Self::ViewTicket => "view this ticket",
            Self::EditTicket => "edit this ticket",
            Self::AssignTicket => "assign tickets",
            Self::ChangeStatus => "change the status of this ticket",
            Self::DeleteTicket => "delete tickets",
            Self::ViewComment => "view this comment",
            Self::EditComment => "edit this comment",
            Self::DeleteComment => "delete this comment",
            Self::DownloadAttachment => "download this attachment",
            Self::DeleteAttachment => "delete this attachment",
            Self::ViewRating => "view this rating",
            Self::EditRating => "edit this rating",
            Self::ListUsers => "list users",
            Self::ManageUsers => "manage users",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("not permitted to {0}")]
pub struct Denied(pub Capability);

// =============================================================================
// Tickets
// =============================================================================

pub fn can_create(actor: &User) -> bool {
    actor.active
}

pub fn can_view(actor: &User, ticket: &Ticket) -> bool {
    actor.active
        && (actor.is_staff() || ticket.is_created_by(&actor.id) || ticket.is_assigned_to(&actor.id))
}

pub fn can_edit(actor: &User, ticket: &Ticket) -> bool {
    can_view(actor, ticket)
}

pub fn can_assign(actor: &User) -> bool {
    actor.active && actor.is_staff()
}

pub fn can_change_status(actor: &User, ticket: &Ticket) -> bool {
    actor.active && (actor.is_staff() || ticket.is_assigned_to(&actor.id))
}

pub fn can_delete(actor: &User) -> bool {
    actor.active && actor.is_admin()
}

// =============================================================================
// Comments
// =============================================================================

/// `ticket` is the ticket the comment belongs to.
pub fn can_view_comment(actor: &User, comment: &Comment, ticket: &Ticket) -> bool {
    can_view(actor, ticket) || (actor.active && comment.author_id == actor.id)
}

/// Audit narration is immutable, whoever its nominal author is.
pub fn can_edit_comment(actor: &User, comment: &Comment) -> bool {
    actor.active && !comment.is_system() && comment.author_id == actor.id
}

pub fn can_delete_comment(actor: &User, comment: &Comment) -> bool {
    actor.active && !comment.is_system() && (comment.author_id == actor.id || actor.is_admin())
}

// =============================================================================
// Attachments
// =============================================================================

pub fn can_download(actor: &User, attachment: &Attachment, ticket: &Ticket) -> bool {
    actor.active
        && (actor.is_staff() || ticket.is_created_by(&actor.id) || attachment.uploaded_by == actor.id)
}

pub fn can_delete_attachment(actor: &User, attachment: &Attachment) -> bool {
    actor.active && (actor.is_admin() || attachment.uploaded_by == actor.id)
}

// =============================================================================
// Ratings
// =============================================================================

pub fn can_edit_rating(actor: &User, rating: &Rating) -> bool {
    actor.active && rating.rater_id == actor.id
}

pub fn can_view_rating(actor: &User, rating: &Rating, ticket: &Ticket) -> bool {
    actor.active && (actor.is_staff() || rating.rater_id == actor.id || ticket.is_created_by(&actor.id))
}

// =============================================================================
// Users
// =============================================================================

pub fn can_list_users(actor: &User) -> bool {
    actor.active && actor.is_staff()
}

pub fn can_manage_users(actor: &User) -> bool {
    actor.active && actor.is_admin()
}
