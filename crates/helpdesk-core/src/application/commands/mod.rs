//! Command handlers
//!
//! Application services that orchestrate use cases. Each mutating
//! operation loads what it needs, runs the domain rules, and commits the
//! entity change together with its audit comment in one unit of work.

mod admin;
mod attachments;
mod comments;
mod ratings;
mod tickets;

#[cfg(test)]
pub(crate) mod fixtures;

pub use admin::AdminService;
pub use attachments::AttachmentService;
pub use comments::CommentService;
pub use ratings::RatingService;
pub use tickets::TicketService;

use chrono::{DateTime, Utc};

use crate::domain::audit::{self, Roster};
use crate::domain::authorization::Capability;
use crate::domain::lifecycle::LifecycleError;
use crate::domain::{Comment, Ticket, TicketEvent, TicketId, User, UserId, SYSTEM_MARKER};
use crate::error::{HelpdeskError, HelpdeskResult};
use crate::ports::outbound::Storage;

async fn load_ticket(storage: &dyn Storage, id: &TicketId) -> HelpdeskResult<Ticket> {
    storage
        .find_ticket(id)
        .await?
        .ok_or_else(|| HelpdeskError::not_found("ticket", id))
}

async fn load_user(storage: &dyn Storage, id: &UserId) -> HelpdeskResult<User> {
    storage
        .find_user(id)
        .await?
        .ok_or_else(|| HelpdeskError::not_found("user", id))
}

/// Build the audit comment for `event`, resolving the names it mentions.
async fn audit_entry(
    storage: &dyn Storage,
    ticket: &Ticket,
    actor: &User,
    event: &TicketEvent,
    now: DateTime<Utc>,
) -> HelpdeskResult<Comment> {
    let mut roster = Roster::new();
    for id in event.mentioned_users() {
        if let Some(user) = storage.find_user(&id).await? {
            roster.insert(&user);
        }
    }

    let entry = audit::record(ticket, actor, event, &roster, now);
    tracing::debug!(ticket_id = %ticket.id(), "Audit: {}", entry.content);
    Ok(entry)
}

fn authorize(capability: Capability, granted: bool, actor: &User) -> HelpdeskResult<()> {
    capability.check(granted).map_err(|denied| {
        tracing::warn!(actor = %actor.id, "Denied: {}", denied);
        denied.into()
    })
}

/// Convert a lifecycle failure, logging denials like [`authorize`] does.
fn lifecycle_failure(actor: &User) -> impl Fn(LifecycleError) -> HelpdeskError + '_ {
    move |err| {
        if let LifecycleError::Denied(denied) = &err {
            tracing::warn!(actor = %actor.id, "Denied: {}", denied);
        }
        err.into()
    }
}

/// Trimmed, non-empty text of at most `max` characters.
fn required_text(field: &str, value: &str, max: usize) -> HelpdeskResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(HelpdeskError::validation(format!("{} must not be empty", field)));
    }
    if value.chars().count() > max {
        return Err(HelpdeskError::validation(format!(
            "{} must be at most {} characters",
            field, max
        )));
    }
    Ok(value.to_string())
}

/// Like [`required_text`], but the audit marker may not be forged.
fn comment_text(value: &str, max: usize) -> HelpdeskResult<String> {
    let value = required_text("comment", value, max)?;
    if value.starts_with(SYSTEM_MARKER.trim_end()) {
        return Err(HelpdeskError::validation(format!(
            "comment may not start with the reserved marker {}",
            SYSTEM_MARKER.trim_end()
        )));
    }
    Ok(value)
}

/// Blank feedback counts as none.
fn optional_text(field: &str, value: Option<String>, max: usize) -> HelpdeskResult<Option<String>> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => required_text(field, text, max).map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text() {
        assert_eq!(required_text("subject", "  hi  ", 5).unwrap(), "hi");
        assert!(matches!(required_text("subject", "   ", 5), Err(HelpdeskError::Validation(_))));
        assert!(matches!(required_text("subject", "toolong", 5), Err(HelpdeskError::Validation(_))));
        // Limits count characters, not bytes.
        assert!(required_text("subject", "ééééé", 5).is_ok());
    }

    #[test]
    fn test_comment_text_rejects_forged_marker() {
        assert!(comment_text("[SYSTEM] Ticket closed by Admin", 100).is_err());
        assert!(comment_text("[SYSTEM]x", 100).is_err());
        assert!(comment_text("see [SYSTEM] log", 100).is_ok());
    }

    #[test]
    fn test_optional_text() {
        assert_eq!(optional_text("feedback", None, 10).unwrap(), None);
        assert_eq!(optional_text("feedback", Some("  ".into()), 10).unwrap(), None);
        assert_eq!(optional_text("feedback", Some(" ok ".into()), 10).unwrap(), Some("ok".into()));
        assert!(optional_text("feedback", Some("x".repeat(11)), 10).is_err());
    }
}
