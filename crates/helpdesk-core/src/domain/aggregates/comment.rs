//! Comment entity

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{CommentId, TicketId, UserId};

/// Content prefix reserved for audit narration.
pub const SYSTEM_MARKER: &str = "[SYSTEM] ";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub ticket_id: TicketId,
    pub author_id: UserId,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(ticket_id: TicketId, author_id: UserId, content: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: CommentId::new(),
            ticket_id,
            author_id,
            content: content.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Audit narration written by the system rather than a person.
    pub fn is_system(&self) -> bool {
        self.content.starts_with(SYSTEM_MARKER)
    }

    pub fn is_edited(&self) -> bool {
        self.updated_at != self.created_at
    }

    /// Replace the content. `updated_at` always moves strictly past
    /// `created_at`, even under a coarse or frozen clock.
    pub(crate) fn revise(&mut self, content: String, now: DateTime<Utc>) {
        self.content = content;
        let floor = self.updated_at.max(self.created_at) + Duration::microseconds(1);
        self.updated_at = now.max(floor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_comment_is_not_edited() {
        let c = Comment::new(TicketId::new(), UserId::new(), "hello", Utc::now());
        assert!(!c.is_edited());
        assert!(!c.is_system());
    }

    #[test]
    fn test_revise_marks_edited_even_with_frozen_clock() {
        let now = Utc::now();
        let mut c = Comment::new(TicketId::new(), UserId::new(), "hello", now);
        c.revise("hello again".into(), now);
        assert!(c.is_edited());
        assert!(c.updated_at > c.created_at);
        assert_eq!(c.content, "hello again");
    }

    #[test]
    fn test_system_marker() {
        let c = Comment::new(TicketId::new(), UserId::new(), format!("{}Ticket created by Ann", SYSTEM_MARKER), Utc::now());
        assert!(c.is_system());
    }
}
