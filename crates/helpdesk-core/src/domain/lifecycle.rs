//! Ticket Lifecycle Engine
//!
//! The only code that moves a ticket between statuses or changes its
//! assignee. Each operation checks the capability table first, mutates the
//! ticket in place on success and returns the event describing what
//! happened. On any error the ticket is left exactly as it was.

use chrono::{DateTime, Utc};

use crate::domain::aggregates::{InvalidTransition, Ticket, TicketPriority, TicketStatus, User};
use crate::domain::authorization::{self as authz, Capability, Denied};
use crate::domain::events::{FieldChange, TicketEvent};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Denied(#[from] Denied),

    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),

    #[error("{0} must be a support agent or administrator to be assigned tickets")]
    AgentNotStaff(String),

    #[error("{0} is deactivated and cannot be assigned tickets")]
    AgentInactive(String),

    #[error("ticket is not assigned to anyone")]
    NotAssigned,
}

/// Requested field changes; `None` leaves a field alone.
#[derive(Debug, Clone, Default)]
pub struct TicketPatch<'a> {
    pub subject: Option<String>,
    pub description: Option<String>,
    pub priority: Option<TicketPriority>,
    pub status: Option<TicketStatus>,
    pub assignee: Option<&'a User>,
}

pub fn change_status(
    ticket: &mut Ticket,
    target: TicketStatus,
    actor: &User,
    now: DateTime<Utc>,
) -> Result<TicketEvent, LifecycleError> {
    Capability::ChangeStatus.check(authz::can_change_status(actor, ticket))?;
    let change = ticket.transition_to(target, now)?;
    Ok(TicketEvent::StatusChanged(change))
}

/// Assign (or reassign) `agent`. An `Open` ticket moves to `InProgress`.
pub fn assign(
    ticket: &mut Ticket,
    agent: &User,
    actor: &User,
    now: DateTime<Utc>,
) -> Result<TicketEvent, LifecycleError> {
    Capability::AssignTicket.check(authz::can_assign(actor))?;
    ensure_assignable(agent)?;

    let previous = ticket.assignee_id().copied();
    let status = ticket.set_assignee(agent.id, now);
    Ok(TicketEvent::Assigned {
        agent: agent.id,
        previous,
        status,
    })
}

/// Clear the assignee. Only an `InProgress` ticket changes status (back to
/// `Open`); resolved and closed tickets keep theirs.
pub fn unassign(ticket: &mut Ticket, actor: &User, now: DateTime<Utc>) -> Result<TicketEvent, LifecycleError> {
    Capability::AssignTicket.check(authz::can_assign(actor))?;
    let previous = ticket.assignee_id().copied().ok_or(LifecycleError::NotAssigned)?;

    let status = ticket.clear_assignee(now);
    Ok(TicketEvent::Unassigned { previous, status })
}

/// Apply every field of `patch` that differs from the current ticket.
///
/// Each field is gated by its own capability. Returns `Ok(None)` when the
/// patch changes nothing. Status is applied before assignment.
pub fn update(
    ticket: &mut Ticket,
    patch: TicketPatch<'_>,
    actor: &User,
    now: DateTime<Utc>,
) -> Result<Option<TicketEvent>, LifecycleError> {
    let mut next = ticket.clone();
    let mut changes = Vec::new();

    if let Some(subject) = patch.subject.filter(|s| s != ticket.subject()) {
        Capability::EditTicket.check(authz::can_edit(actor, ticket))?;
        next.set_subject(subject, now);
        changes.push(FieldChange::Subject);
    }

    if let Some(description) = patch.description.filter(|d| d != ticket.description()) {
        Capability::EditTicket.check(authz::can_edit(actor, ticket))?;
        next.set_description(description, now);
        changes.push(FieldChange::Description);
    }

    if let Some(priority) = patch.priority.filter(|p| *p != ticket.priority()) {
        Capability::EditTicket.check(authz::can_edit(actor, ticket))?;
        next.set_priority(priority, now);
        changes.push(FieldChange::Priority {
            from: ticket.priority(),
            to: priority,
        });
    }

    if let Some(status) = patch.status.filter(|s| *s != ticket.status()) {
        Capability::ChangeStatus.check(authz::can_change_status(actor, ticket))?;
        changes.push(FieldChange::Status(next.transition_to(status, now)?));
    }

    if let Some(agent) = patch.assignee.filter(|a| !ticket.is_assigned_to(&a.id)) {
        Capability::AssignTicket.check(authz::can_assign(actor))?;
        ensure_assignable(agent)?;
        let previous = next.assignee_id().copied();
        let status = next.set_assignee(agent.id, now);
        changes.push(FieldChange::Assignee {
            agent: agent.id,
            previous,
            status,
        });
    }

    if changes.is_empty() {
        return Ok(None);
    }

    *ticket = next;
    Ok(Some(TicketEvent::Updated { changes }))
}

fn ensure_assignable(agent: &User) -> Result<(), LifecycleError> {
    if !agent.is_staff() {
        return Err(LifecycleError::AgentNotStaff(agent.full_name()));
    }
    if !agent.active {
        return Err(LifecycleError::AgentInactive(agent.full_name()));
    }
    Ok(())
}
