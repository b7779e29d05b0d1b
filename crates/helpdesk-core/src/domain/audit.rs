//! Audit Trail Generator
//!
//! Renders a [`TicketEvent`] into narration and wraps it in a system
//! comment. Comments need a real author, so the ticket's creator is the
//! nominal author of every system comment.

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::domain::aggregates::{Comment, StatusChange, Ticket, User, SYSTEM_MARKER};
use crate::domain::events::{FieldChange, TicketEvent};
use crate::domain::value_objects::UserId;

/// Display names of the users an event mentions.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    names: HashMap<UserId, String>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, user: &User) -> Self {
        self.insert(user);
        self
    }

    pub fn insert(&mut self, user: &User) {
        self.names.insert(user.id, user.full_name());
    }

    /// Falls back to the raw id for users no longer on record.
    pub fn name_of(&self, id: &UserId) -> String {
        self.names
            .get(id)
            .cloned()
            .unwrap_or_else(|| format!("user {}", id))
    }
}

/// Build the system comment recording `message` on `ticket`.
pub fn record_system_event(ticket: &Ticket, message: &str, now: DateTime<Utc>) -> Comment {
    Comment::new(
        *ticket.id(),
        *ticket.creator_id(),
        format!("{}{}", SYSTEM_MARKER, message),
        now,
    )
}

/// Narrate `event` performed by `actor` and build its system comment.
pub fn record(ticket: &Ticket, actor: &User, event: &TicketEvent, roster: &Roster, now: DateTime<Utc>) -> Comment {
    let message = narrate(event, &actor.full_name(), roster);
    record_system_event(ticket, &message, now)
}

pub fn narrate(event: &TicketEvent, actor: &str, roster: &Roster) -> String {
    match event {
        TicketEvent::Created => format!("Ticket created by {}", actor),
        TicketEvent::Updated { changes } => {
            let parts: Vec<String> = changes.iter().map(|c| describe_change(c, roster)).collect();
            format!("Ticket updated by {}: {}", actor, parts.join("; "))
        }
        TicketEvent::StatusChanged(change) => {
            format!("Status changed from {} by {}", change, actor)
        }
        TicketEvent::Assigned { agent, previous, status } => format!(
            "{} by {}{}",
            describe_assignment(agent, previous.as_ref(), roster),
            actor,
            status_suffix(status)
        ),
        TicketEvent::Unassigned { previous, status } => format!(
            "Ticket unassigned from {} by {}{}",
            roster.name_of(previous),
            actor,
            status_suffix(status)
        ),
        TicketEvent::CommentEdited { comment_id } => {
            format!("Comment {} edited by {}", comment_id, actor)
        }
        TicketEvent::CommentDeleted { comment_id } => {
            format!("Comment {} deleted by {}", comment_id, actor)
        }
        TicketEvent::Rated { value } => format!("Ticket rated {} by {}", value, actor),
        TicketEvent::RatingRevised { from, to } if from == to => format!("Rating feedback updated by {}", actor),
        TicketEvent::RatingRevised { from, to } => {
            format!("Rating changed from {} to {} by {}", from, to, actor)
        }
        TicketEvent::AttachmentAdded { file_name, .. } => {
            format!("Attachment \"{}\" added by {}", file_name, actor)
        }
        TicketEvent::AttachmentRemoved { file_name, .. } => {
            format!("Attachment \"{}\" removed by {}", file_name, actor)
        }
    }
}

fn describe_change(change: &FieldChange, roster: &Roster) -> String {
    match change {
        FieldChange::Subject => "Subject changed".to_string(),
        FieldChange::Description => "Description updated".to_string(),
        FieldChange::Priority { from, to } => format!("Priority changed from {} to {}", from, to),
        FieldChange::Status(change) => format!("Status changed from {}", change),
        FieldChange::Assignee { agent, previous, status } => format!(
            "{}{}",
            describe_assignment(agent, previous.as_ref(), roster),
            status_suffix(status)
        ),
    }
}

fn describe_assignment(agent: &UserId, previous: Option<&UserId>, roster: &Roster) -> String {
    match previous {
        Some(previous) => format!(
            "Ticket reassigned from {} to {}",
            roster.name_of(previous),
            roster.name_of(agent)
        ),
        None => format!("Ticket assigned to {}", roster.name_of(agent)),
    }
}

fn status_suffix(status: &Option<StatusChange>) -> String {
    status
        .map(|change| format!(" (status changed from {})", change))
        .unwrap_or_default()
}
