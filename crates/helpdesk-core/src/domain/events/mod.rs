//! Ticket domain events
//!
//! Every successful mutation is described by exactly one [`TicketEvent`],
//! which the audit trail turns into a system comment.

use serde::{Deserialize, Serialize};

use crate::domain::aggregates::{RatingValue, StatusChange, TicketPriority};
use crate::domain::value_objects::{AttachmentId, CommentId, UserId};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TicketEvent {
    Created,
    /// Several fields changed in one call.
    Updated { changes: Vec<FieldChange> },
    StatusChanged(StatusChange),
    Assigned {
        agent: UserId,
        previous: Option<UserId>,
        status: Option<StatusChange>,
    },
    Unassigned {
        previous: UserId,
        status: Option<StatusChange>,
    },
    CommentEdited { comment_id: CommentId },
    CommentDeleted { comment_id: CommentId },
    Rated { value: RatingValue },
    RatingRevised { from: RatingValue, to: RatingValue },
    AttachmentAdded { attachment_id: AttachmentId, file_name: String },
    AttachmentRemoved { attachment_id: AttachmentId, file_name: String },
}

impl TicketEvent {
    /// Users, other than the actor, named in the narration.
    pub fn mentioned_users(&self) -> Vec<UserId> {
        fn assignee_ids(agent: &UserId, previous: &Option<UserId>) -> Vec<UserId> {
            std::iter::once(*agent).chain(*previous).collect()
        }

        match self {
            Self::Assigned { agent, previous, .. } => assignee_ids(agent, previous),
            Self::Unassigned { previous, .. } => vec![*previous],
            Self::Updated { changes } => changes
                .iter()
                .flat_map(|change| match change {
                    FieldChange::Assignee { agent, previous, .. } => assignee_ids(agent, previous),
                    _ => Vec::new(),
                })
                .collect(),
            _ => Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", rename_all = "snake_case")]
pub enum FieldChange {
    Subject,
    Description,
    Priority { from: TicketPriority, to: TicketPriority },
    Status(StatusChange),
    Assignee {
        agent: UserId,
        previous: Option<UserId>,
        status: Option<StatusChange>,
    },
}
