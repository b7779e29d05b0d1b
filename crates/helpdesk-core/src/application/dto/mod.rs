//! Data Transfer Objects

use serde::{Deserialize, Serialize};

use crate::domain::{Role, TicketPriority, TicketStatus, UserId};
use crate::error::{ErrorKind, HelpdeskError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTicketCommand {
    pub subject: String,
    pub description: String,
    #[serde(default)]
    pub priority: TicketPriority,
}

/// Partial ticket update; absent fields stay as they are.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTicketCommand {
    pub subject: Option<String>,
    pub description: Option<String>,
    pub priority: Option<TicketPriority>,
    pub status: Option<TicketStatus>,
    pub assignee_id: Option<UserId>,
}

impl UpdateTicketCommand {
    pub fn is_empty(&self) -> bool {
        self.subject.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.status.is_none()
            && self.assignee_id.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterUserCommand {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub role: Role,
}

/// Metadata of a file already placed in the file store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAttachment {
    pub file_name: String,
    pub original_file_name: String,
    pub size_bytes: u64,
    pub mime_type: String,
    pub storage_path: String,
}

/// Per-item result of a bulk operation. A failing item never aborts the
/// batch.
#[derive(Debug, Clone, Serialize)]
pub struct BulkOutcome<Id> {
    pub succeeded: Vec<Id>,
    pub failed: Vec<BulkFailure<Id>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BulkFailure<Id> {
    pub id: Id,
    pub kind: ErrorKind,
    pub reason: String,
}

impl<Id> BulkOutcome<Id> {
    pub fn record(&mut self, id: Id, result: Result<(), HelpdeskError>) {
        match result {
            Ok(()) => self.succeeded.push(id),
            Err(err) => self.failed.push(BulkFailure {
                id,
                kind: err.kind(),
                reason: err.to_string(),
            }),
        }
    }

    pub fn is_complete_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }
}

impl<Id> Default for BulkOutcome<Id> {
    fn default() -> Self {
        Self {
            succeeded: Vec::new(),
            failed: Vec::new(),
        }
    }
}
