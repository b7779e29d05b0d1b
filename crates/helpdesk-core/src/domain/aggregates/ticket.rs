//! Ticket Aggregate
//!
//! Status and assignment fields are only writable inside the crate; the
//! lifecycle engine in [`crate::domain::lifecycle`] is the sole caller of
//! the mutators below.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::user::{normalize, ParseEnumError};
use crate::domain::value_objects::{TicketId, UserId};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    id: TicketId,
    subject: String,
    description: String,
    status: TicketStatus,
    priority: TicketPriority,
    creator_id: UserId,
    assignee_id: Option<UserId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    resolved_at: Option<DateTime<Utc>>,
    closed_at: Option<DateTime<Utc>>,
}

impl Ticket {
    /// Create a new ticket in the `Open` state.
    pub fn open(
        subject: impl Into<String>,
        description: impl Into<String>,
        priority: TicketPriority,
        creator_id: UserId,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: TicketId::new(),
            subject: subject.into(),
            description: description.into(),
            status: TicketStatus::Open,
            priority,
            creator_id,
            assignee_id: None,
            created_at: now,
            updated_at: now,
            resolved_at: None,
            closed_at: None,
        }
    }

    // =========================================================================
    // Getters
    // =========================================================================

    pub fn id(&self) -> &TicketId { &self.id }
    pub fn subject(&self) -> &str { &self.subject }
    pub fn description(&self) -> &str { &self.description }
    pub fn status(&self) -> TicketStatus { self.status }
    pub fn priority(&self) -> TicketPriority { self.priority }
    pub fn creator_id(&self) -> &UserId { &self.creator_id }
    pub fn assignee_id(&self) -> Option<&UserId> { self.assignee_id.as_ref() }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }
    pub fn updated_at(&self) -> DateTime<Utc> { self.updated_at }
    pub fn resolved_at(&self) -> Option<DateTime<Utc>> { self.resolved_at }
    pub fn closed_at(&self) -> Option<DateTime<Utc>> { self.closed_at }

    // =========================================================================
    // Projections
    // =========================================================================

    pub fn is_assigned(&self) -> bool {
        self.assignee_id.is_some()
    }

    pub fn is_assigned_to(&self, user_id: &UserId) -> bool {
        self.assignee_id.as_ref() == Some(user_id)
    }

    pub fn is_created_by(&self, user_id: &UserId) -> bool {
        &self.creator_id == user_id
    }

    pub fn is_high_priority(&self) -> bool {
        self.priority >= TicketPriority::High
    }

    /// In progress with no activity for at least `after_days` days. A
    /// threshold too large to represent is never reached.
    pub fn is_overdue(&self, now: DateTime<Utc>, after_days: i64) -> bool {
        match Duration::try_days(after_days) {
            Some(threshold) => self.status == TicketStatus::InProgress && now - self.updated_at >= threshold,
            None => false,
        }
    }

    // =========================================================================
    // Lifecycle mutators
    // =========================================================================

    pub(crate) fn transition_to(
        &mut self,
        target: TicketStatus,
        now: DateTime<Utc>,
    ) -> Result<StatusChange, InvalidTransition> {
        let from = self.status;
        if !from.can_transition_to(target) {
            return Err(InvalidTransition { from, to: target });
        }

        self.status = target;
        match target {
            TicketStatus::Resolved => {
                self.resolved_at.get_or_insert(now);
            }
            TicketStatus::Closed => {
                self.closed_at.get_or_insert(now);
                self.resolved_at.get_or_insert(now);
            }
            TicketStatus::Open | TicketStatus::InProgress => {}
        }
        self.touch(now);

        Ok(StatusChange { from, to: target })
    }

    /// Set the assignee; an `Open` ticket moves to `InProgress`.
    pub(crate) fn set_assignee(&mut self, agent_id: UserId, now: DateTime<Utc>) -> Option<StatusChange> {
        self.assignee_id = Some(agent_id);
        self.touch(now);
        match self.status {
            TicketStatus::Open => self.transition_to(TicketStatus::InProgress, now).ok(),
            _ => None,
        }
    }

    /// Clear the assignee; an `InProgress` ticket falls back to `Open`.
    pub(crate) fn clear_assignee(&mut self, now: DateTime<Utc>) -> Option<StatusChange> {
        self.assignee_id = None;
        self.touch(now);
        match self.status {
            TicketStatus::InProgress => self.transition_to(TicketStatus::Open, now).ok(),
            _ => None,
        }
    }

    pub(crate) fn set_subject(&mut self, subject: String, now: DateTime<Utc>) {
        self.subject = subject;
        self.touch(now);
    }

    pub(crate) fn set_description(&mut self, description: String, now: DateTime<Utc>) {
        self.description = description;
        self.touch(now);
    }

    pub(crate) fn set_priority(&mut self, priority: TicketPriority, now: DateTime<Utc>) {
        self.priority = priority;
        self.touch(now);
    }

    /// Record activity (comments, ratings, attachments); never moves back.
    pub(crate) fn touch(&mut self, now: DateTime<Utc>) {
        if now > self.updated_at {
            self.updated_at = now;
        }
    }
}

// =============================================================================
// Supporting Types
// =============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
    #[default]
    Open,
    InProgress,
    Resolved,
    Closed,
}

impl TicketStatus {
    pub const ALL: [TicketStatus; 4] = [
        TicketStatus::Open,
        TicketStatus::InProgress,
        TicketStatus::Resolved,
        TicketStatus::Closed,
    ];

    /// The transition table. `Closed` is terminal.
    pub fn allowed_targets(&self) -> &'static [TicketStatus] {
        use TicketStatus::*;
        match self {
            Open => &[InProgress, Closed],
            InProgress => &[Resolved, Open, Closed],
            Resolved => &[Closed, InProgress],
            Closed => &[],
        }
    }

    pub fn can_transition_to(&self, target: TicketStatus) -> bool {
        self.allowed_targets().contains(&target)
    }

    pub fn is_terminal(&self) -> bool {
        self.allowed_targets().is_empty()
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Open | Self::InProgress)
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Resolved | Self::Closed)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::InProgress => "In Progress",
            Self::Resolved => "Resolved",
            Self::Closed => "Closed",
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for TicketStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "open" => Ok(Self::Open),
            "in_progress" | "inprogress" => Ok(Self::InProgress),
            "resolved" => Ok(Self::Resolved),
            "closed" => Ok(Self::Closed),
            _ => Err(ParseEnumError::new("status", s)),
        }
    }
}

/// Ordered by increasing urgency.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl TicketPriority {
    pub fn level(&self) -> u8 {
        match self {
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
            Self::Urgent => 4,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Urgent => "Urgent",
        }
    }
}

impl fmt::Display for TicketPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for TicketPriority {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "low" => Ok(Self::Low),
            "medium" | "normal" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            _ => Err(ParseEnumError::new("priority", s)),
        }
    }
}

/// A status move that actually happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    pub from: TicketStatus,
    pub to: TicketStatus,
}

impl fmt::Display for StatusChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.from, self.to)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("cannot transition from {from} to {to}")]
pub struct InvalidTransition {
    pub from: TicketStatus,
    pub to: TicketStatus,
}
