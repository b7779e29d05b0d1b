//! Output formatting

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::Serialize;
use std::fmt::Display;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use helpdesk_core::{Attachment, BulkOutcome, Comment, Rating, Ticket, User};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Yaml,
}

/// How a value renders as one table row.
pub trait TableRow {
    type Row: Tabled;

    fn row(&self) -> Self::Row;
}

impl OutputFormat {
    pub fn print<T: Serialize + TableRow>(&self, item: &T) -> anyhow::Result<()> {
        match self {
            OutputFormat::Table => println!("{}", Table::new([item.row()]).with(Style::rounded())),
            _ => self.print_serialized(item)?,
        }
        Ok(())
    }

    pub fn print_all<T: Serialize + TableRow>(&self, items: &[T]) -> anyhow::Result<()> {
        match self {
            OutputFormat::Table if items.is_empty() => println!("(none)"),
            OutputFormat::Table => {
                println!("{}", Table::new(items.iter().map(|item| item.row())).with(Style::rounded()))
            }
            _ => self.print_serialized(&items)?,
        }
        Ok(())
    }

    pub fn print_outcome<Id: Serialize + Display>(&self, outcome: &BulkOutcome<Id>) -> anyhow::Result<()> {
        match self {
            OutputFormat::Table => {
                let mut rows: Vec<OutcomeRow> = outcome
                    .succeeded
                    .iter()
                    .map(|id| OutcomeRow {
                        id: id.to_string(),
                        result: "ok".into(),
                        reason: String::new(),
                    })
                    .collect();
                rows.extend(outcome.failed.iter().map(|failure| OutcomeRow {
                    id: failure.id.to_string(),
                    result: "failed".into(),
                    reason: failure.reason.clone(),
                }));
                println!("{}", Table::new(rows).with(Style::rounded()));
                println!("{} of {} succeeded", outcome.succeeded.len(), outcome.total());
            }
            _ => self.print_serialized(outcome)?,
        }
        Ok(())
    }

    fn print_serialized<T: Serialize + ?Sized>(&self, data: &T) -> anyhow::Result<()> {
        let text = match self {
            OutputFormat::Yaml => serde_yaml::to_string(data)?,
            _ => serde_json::to_string_pretty(data)?,
        };
        println!("{}", text.trim_end());
        Ok(())
    }
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}

fn optional(value: Option<impl Display>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".into())
}

/// Cut long text to `max` characters for table cells.
fn excerpt(text: &str, max: usize) -> String {
    let line = text.lines().next().unwrap_or_default();
    if line.chars().count() > max || line.len() < text.len() {
        let cut: String = line.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    } else {
        line.to_string()
    }
}

#[derive(Tabled)]
pub struct OutcomeRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Result")]
    result: String,
    #[tabled(rename = "Reason")]
    reason: String,
}

// =============================================================================
// Tickets
// =============================================================================

/// A ticket plus its read-time projections.
#[derive(Serialize)]
pub struct TicketView {
    #[serde(flatten)]
    pub ticket: Ticket,
    pub high_priority: bool,
    pub overdue: bool,
}

#[derive(Tabled)]
pub struct TicketRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Subject")]
    subject: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Assignee")]
    assignee: String,
    #[tabled(rename = "Updated")]
    updated: String,
}

impl TableRow for TicketView {
    type Row = TicketRow;

    fn row(&self) -> TicketRow {
        let t = &self.ticket;
        let status = if self.overdue {
            format!("{} (overdue)", t.status())
        } else {
            t.status().to_string()
        };
        TicketRow {
            id: t.id().to_string(),
            subject: excerpt(t.subject(), 40),
            status,
            priority: t.priority().to_string(),
            assignee: optional(t.assignee_id()),
            updated: timestamp(t.updated_at()),
        }
    }
}

// =============================================================================
// Comments
// =============================================================================

#[derive(Tabled)]
pub struct CommentRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Author")]
    author: String,
    #[tabled(rename = "Created")]
    created: String,
    #[tabled(rename = "Edited")]
    edited: String,
    #[tabled(rename = "Content")]
    content: String,
}

impl TableRow for Comment {
    type Row = CommentRow;

    fn row(&self) -> CommentRow {
        CommentRow {
            id: self.id.to_string(),
            author: if self.is_system() { "system".into() } else { self.author_id.to_string() },
            created: timestamp(self.created_at),
            edited: if self.is_edited() { "yes".into() } else { String::new() },
            content: excerpt(&self.content, 60),
        }
    }
}

// =============================================================================
// Ratings
// =============================================================================

#[derive(Tabled)]
pub struct RatingRow {
    #[tabled(rename = "Rating")]
    stars: String,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Feedback")]
    feedback: String,
    #[tabled(rename = "Rater")]
    rater: String,
    #[tabled(rename = "Created")]
    created: String,
}

impl TableRow for Rating {
    type Row = RatingRow;

    fn row(&self) -> RatingRow {
        RatingRow {
            stars: self.stars(),
            label: self.label().to_string(),
            feedback: optional(self.feedback.as_deref().map(|f| excerpt(f, 60))),
            rater: self.rater_id.to_string(),
            created: timestamp(self.created_at),
        }
    }
}

// =============================================================================
// Attachments
// =============================================================================

#[derive(Tabled)]
pub struct AttachmentRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Type")]
    mime_type: String,
    #[tabled(rename = "Path")]
    path: String,
}

impl TableRow for Attachment {
    type Row = AttachmentRow;

    fn row(&self) -> AttachmentRow {
        AttachmentRow {
            id: self.id.to_string(),
            name: self.original_file_name.clone(),
            size: self.formatted_size(),
            mime_type: self.mime_type.clone(),
            path: self.storage_path.clone(),
        }
    }
}

// =============================================================================
// Users
// =============================================================================

#[derive(Tabled)]
pub struct UserRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Role")]
    role: String,
    #[tabled(rename = "Active")]
    active: String,
}

impl TableRow for User {
    type Row = UserRow;

    fn row(&self) -> UserRow {
        UserRow {
            id: self.id.to_string(),
            email: self.email.to_string(),
            name: self.full_name(),
            role: self.role.to_string(),
            active: if self.active { "yes".into() } else { "no".into() },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excerpt() {
        assert_eq!(excerpt("short", 10), "short");
        assert_eq!(excerpt("exactly ten", 11), "exactly ten");
        assert_eq!(excerpt("a much longer line", 6), "a muc…");
        assert_eq!(excerpt("first\nsecond", 20), "first…");
    }
}
