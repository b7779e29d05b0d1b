//! Ticket application service

use async_trait::async_trait;
use std::sync::Arc;

use super::{audit_entry, authorize, lifecycle_failure, load_ticket, load_user, required_text};
use crate::application::dto::{CreateTicketCommand, UpdateTicketCommand};
use crate::config::ContentLimits;
use crate::domain::authorization::{self as authz, Capability};
use crate::domain::lifecycle::{self, TicketPatch};
use crate::domain::{Ticket, TicketEvent, TicketId, TicketStatus, User, UserId};
use crate::error::HelpdeskResult;
use crate::ports::inbound::TicketUseCases;
use crate::ports::outbound::{Clock, Storage, UnitOfWork};

/// Ticket application service
pub struct TicketService {
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
    limits: ContentLimits,
}

impl TicketService {
    pub fn new(storage: Arc<dyn Storage>, clock: Arc<dyn Clock>, limits: ContentLimits) -> Self {
        Self { storage, clock, limits }
    }

    /// Persist `ticket` together with the audit comment for `event`.
    async fn commit_event(&self, ticket: Ticket, actor: &User, event: TicketEvent) -> HelpdeskResult<Ticket> {
        let entry = audit_entry(&*self.storage, &ticket, actor, &event, ticket.updated_at()).await?;
        self.storage
            .commit(UnitOfWork::new().save_ticket(ticket.clone()).save_comment(entry))
            .await?;
        Ok(ticket)
    }
}

#[async_trait]
impl TicketUseCases for TicketService {
    async fn create_ticket(&self, command: CreateTicketCommand, creator: &User) -> HelpdeskResult<Ticket> {
        authorize(Capability::CreateTicket, authz::can_create(creator), creator)?;
        let subject = required_text("subject", &command.subject, self.limits.subject_max_len)?;
        let description = required_text("description", &command.description, self.limits.description_max_len)?;

        let ticket = Ticket::open(subject, description, command.priority, creator.id, self.clock.now());
        let ticket = self.commit_event(ticket, creator, TicketEvent::Created).await?;

        tracing::info!(ticket_id = %ticket.id(), actor = %creator.id, priority = %ticket.priority(), "Ticket created");
        Ok(ticket)
    }

    async fn get_ticket(&self, id: &TicketId, actor: &User) -> HelpdeskResult<Ticket> {
        let ticket = load_ticket(&*self.storage, id).await?;
        authorize(Capability::ViewTicket, authz::can_view(actor, &ticket), actor)?;
        Ok(ticket)
    }

    async fn update_ticket(&self, id: &TicketId, command: UpdateTicketCommand, actor: &User) -> HelpdeskResult<Ticket> {
        let mut ticket = load_ticket(&*self.storage, id).await?;
        authorize(Capability::ViewTicket, authz::can_view(actor, &ticket), actor)?;

        let subject = command
            .subject
            .map(|s| required_text("subject", &s, self.limits.subject_max_len))
            .transpose()?;
        let description = command
            .description
            .map(|d| required_text("description", &d, self.limits.description_max_len))
            .transpose()?;
        let agent = match command.assignee_id {
            Some(agent_id) => Some(load_user(&*self.storage, &agent_id).await?),
            None => None,
        };

        let patch = TicketPatch {
            subject,
            description,
            priority: command.priority,
            status: command.status,
            assignee: agent.as_ref(),
        };
        let event = lifecycle::update(&mut ticket, patch, actor, self.clock.now()).map_err(lifecycle_failure(actor))?;

        match event {
            Some(event) => {
                let ticket = self.commit_event(ticket, actor, event).await?;
                tracing::info!(ticket_id = %id, actor = %actor.id, "Ticket updated");
                Ok(ticket)
            }
            None => Ok(ticket),
        }
    }

    async fn assign_ticket(&self, id: &TicketId, agent_id: &UserId, actor: &User) -> HelpdeskResult<Ticket> {
        let mut ticket = load_ticket(&*self.storage, id).await?;
        authorize(Capability::AssignTicket, authz::can_assign(actor), actor)?;
        let agent = load_user(&*self.storage, agent_id).await?;

        let event = lifecycle::assign(&mut ticket, &agent, actor, self.clock.now()).map_err(lifecycle_failure(actor))?;
        let ticket = self.commit_event(ticket, actor, event).await?;

        tracing::info!(ticket_id = %id, agent = %agent_id, actor = %actor.id, status = %ticket.status(), "Ticket assigned");
        Ok(ticket)
    }

    async fn unassign_ticket(&self, id: &TicketId, actor: &User) -> HelpdeskResult<Ticket> {
        let mut ticket = load_ticket(&*self.storage, id).await?;

        let event = lifecycle::unassign(&mut ticket, actor, self.clock.now()).map_err(lifecycle_failure(actor))?;
        let ticket = self.commit_event(ticket, actor, event).await?;

        tracing::info!(ticket_id = %id, actor = %actor.id, status = %ticket.status(), "Ticket unassigned");
        Ok(ticket)
    }

    async fn change_status(&self, id: &TicketId, status: TicketStatus, actor: &User) -> HelpdeskResult<Ticket> {
        let mut ticket = load_ticket(&*self.storage, id).await?;

        let event =
            lifecycle::change_status(&mut ticket, status, actor, self.clock.now()).map_err(lifecycle_failure(actor))?;
        let ticket = self.commit_event(ticket, actor, event).await?;

        tracing::info!(ticket_id = %id, actor = %actor.id, status = %status, "Ticket status changed");
        Ok(ticket)
    }

    async fn delete_ticket(&self, id: &TicketId, actor: &User) -> HelpdeskResult<()> {
        load_ticket(&*self.storage, id).await?;
        authorize(Capability::DeleteTicket, authz::can_delete(actor), actor)?;

        self.storage.commit(UnitOfWork::new().delete_ticket(*id)).await?;
        tracing::info!(ticket_id = %id, actor = %actor.id, "Ticket deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::commands::fixtures::Fixture;
    use crate::error::{ErrorKind, HelpdeskError};
    use crate::application::dto::NewAttachment;
    use crate::config::HelpdeskConfig;
    use crate::ports::inbound::{AttachmentUseCases, CommentUseCases, RatingUseCases};
    use chrono::Duration;
    use tokio_test::{assert_err, assert_ok};

    #[tokio::test]
    async fn test_create_opens_ticket_with_one_audit_comment() {
        let fx = Fixture::new().await;
        let ticket = fx.ticket().await;

        assert_eq!(ticket.status(), TicketStatus::Open);
        assert!(ticket.is_high_priority());
        assert!(ticket.is_created_by(&fx.customer.id));

        let thread = fx.thread(ticket.id()).await;
        assert_eq!(thread.len(), 1);
        assert!(thread[0].is_system());
        assert_eq!(thread[0].author_id, fx.customer.id);
        assert!(thread[0].content.contains("Dee Tester"));
    }

    #[tokio::test]
    async fn test_create_validates_content() {
        let fx = Fixture::new().await;
        let command = |subject: &str| CreateTicketCommand {
            subject: subject.into(),
            description: "d".into(),
            priority: Default::default(),
        };

        let err = fx.helpdesk.tickets.create_ticket(command("  "), &fx.customer).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = fx
            .helpdesk
            .tickets
            .create_ticket(command(&"x".repeat(256)), &fx.customer)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        assert_ok!(fx.helpdesk.tickets.create_ticket(command(&"x".repeat(255)), &fx.customer).await);
    }

    #[tokio::test]
    async fn test_deactivated_user_cannot_create() {
        let fx = Fixture::new().await;
        let mut gone = fx.customer.clone();
        gone.active = false;
        let err = fx
            .helpdesk
            .tickets
            .create_ticket(
                CreateTicketCommand {
                    subject: "s".into(),
                    description: "d".into(),
                    priority: Default::default(),
                },
                &gone,
            )
            .await
            .unwrap_err();
        assert_eq!(err, HelpdeskError::Unauthorized(Capability::CreateTicket));
    }

    #[tokio::test]
    async fn test_lifecycle_scenario() {
        let fx = Fixture::new().await;
        let tickets = &fx.helpdesk.tickets;
        let ticket = fx.ticket().await;
        let id = *ticket.id();

        fx.clock.advance(Duration::minutes(5));
        let ticket = tickets.assign_ticket(&id, &fx.agent.id, &fx.other_agent).await.unwrap();
        assert_eq!(ticket.status(), TicketStatus::InProgress);
        assert_eq!(fx.thread(&id).await.len(), 2);

        fx.clock.advance(Duration::minutes(5));
        let ticket = tickets.change_status(&id, TicketStatus::Resolved, &fx.agent).await.unwrap();
        assert_eq!(ticket.resolved_at(), Some(fx.clock.now()));
        assert_eq!(fx.thread(&id).await.len(), 3);

        tickets.change_status(&id, TicketStatus::Closed, &fx.agent).await.unwrap();
        assert_eq!(fx.thread(&id).await.len(), 4);

        let err = tickets.change_status(&id, TicketStatus::Open, &fx.agent).await.unwrap_err();
        assert_eq!(
            err,
            HelpdeskError::InvalidStateTransition { from: TicketStatus::Closed, to: TicketStatus::Open }
        );
        assert_eq!(fx.thread(&id).await.len(), 4);

        let stored = tickets.get_ticket(&id, &fx.admin).await.unwrap();
        assert_eq!(stored.status(), TicketStatus::Closed);
        assert_eq!(stored.resolved_at(), Some(ticket.resolved_at().unwrap()));
    }

    #[tokio::test]
    async fn test_every_mutation_adds_exactly_one_system_comment_naming_the_actor() {
        let fx = Fixture::new().await;
        let tickets = &fx.helpdesk.tickets;
        let id = *fx.ticket().await.id();

        tickets.assign_ticket(&id, &fx.agent.id, &fx.admin).await.unwrap();
        tickets.assign_ticket(&id, &fx.other_agent.id, &fx.admin).await.unwrap();
        tickets.unassign_ticket(&id, &fx.agent).await.unwrap();
        tickets.change_status(&id, TicketStatus::Closed, &fx.admin).await.unwrap();

        let narration: Vec<String> = fx.system_comments(&id).await.into_iter().map(|c| c.content).collect();
        assert_eq!(
            narration,
            [
                "[SYSTEM] Ticket created by Dee Tester",
                "[SYSTEM] Ticket assigned to Bo Tester by Ada Tester (status changed from Open to In Progress)",
                "[SYSTEM] Ticket reassigned from Bo Tester to Cy Tester by Ada Tester",
                "[SYSTEM] Ticket unassigned from Cy Tester by Bo Tester (status changed from In Progress to Open)",
                "[SYSTEM] Status changed from Open to Closed by Ada Tester",
            ]
        );
    }

    #[tokio::test]
    async fn test_closing_directly_backfills_resolved_at() {
        let fx = Fixture::new().await;
        let id = *fx.ticket().await.id();

        let ticket = fx.helpdesk.tickets.change_status(&id, TicketStatus::Closed, &fx.agent).await.unwrap();
        assert_eq!(ticket.closed_at(), Some(fx.clock.now()));
        assert_eq!(ticket.resolved_at(), ticket.closed_at());
    }

    #[tokio::test]
    async fn test_assign_keeps_resolved_status() {
        let fx = Fixture::new().await;
        let tickets = &fx.helpdesk.tickets;
        let id = *fx.ticket().await.id();

        tickets.assign_ticket(&id, &fx.agent.id, &fx.agent).await.unwrap();
        tickets.change_status(&id, TicketStatus::Resolved, &fx.agent).await.unwrap();
        let ticket = tickets.assign_ticket(&id, &fx.other_agent.id, &fx.agent).await.unwrap();

        assert_eq!(ticket.status(), TicketStatus::Resolved);
        assert!(ticket.is_assigned_to(&fx.other_agent.id));
    }

    #[tokio::test]
    async fn test_assign_to_customer_is_a_validation_error() {
        let fx = Fixture::new().await;
        let id = *fx.ticket().await.id();

        let err = fx
            .helpdesk
            .tickets
            .assign_ticket(&id, &fx.customer.id, &fx.admin)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(fx.thread(&id).await.len(), 1);
    }

    #[tokio::test]
    async fn test_unassign_outside_in_progress_keeps_status() {
        let fx = Fixture::new().await;
        let tickets = &fx.helpdesk.tickets;
        let reopened = *fx.ticket().await.id();
        let closed = *fx.ticket().await.id();

        tickets.assign_ticket(&reopened, &fx.agent.id, &fx.admin).await.unwrap();
        let ticket = tickets.change_status(&reopened, TicketStatus::Open, &fx.agent).await.unwrap();
        assert!(ticket.is_assigned_to(&fx.agent.id));
        let ticket = tickets.unassign_ticket(&reopened, &fx.admin).await.unwrap();
        assert_eq!(ticket.status(), TicketStatus::Open);
        assert!(!ticket.is_assigned());

        tickets.assign_ticket(&closed, &fx.agent.id, &fx.admin).await.unwrap();
        tickets.change_status(&closed, TicketStatus::Closed, &fx.agent).await.unwrap();
        let ticket = tickets.unassign_ticket(&closed, &fx.admin).await.unwrap();
        assert_eq!(ticket.status(), TicketStatus::Closed);
        assert!(!ticket.is_assigned());
        assert_eq!(
            fx.system_comments(&closed).await.last().unwrap().content,
            "[SYSTEM] Ticket unassigned from Bo Tester by Ada Tester"
        );
    }

    #[tokio::test]
    async fn test_unassign_unassigned_ticket_conflicts() {
        let fx = Fixture::new().await;
        let id = *fx.ticket().await.id();

        let err = fx.helpdesk.tickets.unassign_ticket(&id, &fx.agent).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_stranger_cannot_view() {
        let fx = Fixture::new().await;
        let id = *fx.ticket().await.id();

        let err = fx.helpdesk.tickets.get_ticket(&id, &fx.stranger).await.unwrap_err();
        assert_eq!(err, HelpdeskError::Unauthorized(Capability::ViewTicket));
        assert_ok!(fx.helpdesk.tickets.get_ticket(&id, &fx.customer).await);
        assert_ok!(fx.helpdesk.tickets.get_ticket(&id, &fx.agent).await);
    }

    #[tokio::test]
    async fn test_unknown_ticket_is_not_found() {
        let fx = Fixture::new().await;
        let err = fx.helpdesk.tickets.get_ticket(&TicketId::new(), &fx.admin).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_composite_update_writes_one_comment() {
        let fx = Fixture::new().await;
        let id = *fx.ticket().await.id();

        let command = UpdateTicketCommand {
            subject: Some("Cannot log in from mobile".into()),
            priority: Some(crate::domain::TicketPriority::Urgent),
            assignee_id: Some(fx.agent.id),
            ..Default::default()
        };
        let ticket = fx.helpdesk.tickets.update_ticket(&id, command, &fx.admin).await.unwrap();
        assert_eq!(ticket.subject(), "Cannot log in from mobile");
        assert_eq!(ticket.status(), TicketStatus::InProgress);

        let audit = fx.system_comments(&id).await;
        assert_eq!(audit.len(), 2);
        assert_eq!(
            audit[1].content,
            "[SYSTEM] Ticket updated by Ada Tester: Subject changed; Priority changed from High to Urgent; \
             Ticket assigned to Bo Tester (status changed from Open to In Progress)"
        );
    }

    #[tokio::test]
    async fn test_no_op_update_writes_nothing() {
        let fx = Fixture::new().await;
        let original = fx.ticket().await;
        let id = *original.id();
        fx.clock.advance(Duration::hours(1));

        let command = UpdateTicketCommand {
            subject: Some(format!("  {}  ", original.subject())),
            status: Some(TicketStatus::Open),
            ..Default::default()
        };
        let ticket = fx.helpdesk.tickets.update_ticket(&id, command, &fx.customer).await.unwrap();
        assert_eq!(ticket, original);
        assert_eq!(fx.thread(&id).await.len(), 1);
    }

    #[tokio::test]
    async fn test_update_denied_field_changes_nothing() {
        let fx = Fixture::new().await;
        let original = fx.ticket().await;
        let id = *original.id();

        let command = UpdateTicketCommand {
            description: Some("more detail".into()),
            status: Some(TicketStatus::Closed),
            ..Default::default()
        };
        let err = fx.helpdesk.tickets.update_ticket(&id, command, &fx.customer).await.unwrap_err();
        assert_eq!(err, HelpdeskError::Unauthorized(Capability::ChangeStatus));
        assert_eq!(fx.helpdesk.tickets.get_ticket(&id, &fx.customer).await.unwrap(), original);
    }

    #[tokio::test]
    async fn test_delete_cascades() {
        let fx = Fixture::new().await;
        let id = *fx.ticket().await.id();
        fx.helpdesk.comments.add_comment(&id, "first".into(), &fx.customer).await.unwrap();
        fx.helpdesk.comments.add_comment(&id, "second".into(), &fx.agent).await.unwrap();
        fx.helpdesk.ratings.rate_ticket(&id, 5, None, &fx.customer).await.unwrap();
        let file = fx
            .helpdesk
            .attachments
            .attach(
                &id,
                NewAttachment {
                    file_name: "9b1e.log".into(),
                    original_file_name: "client.log".into(),
                    size_bytes: 512,
                    mime_type: "text/plain".into(),
                    storage_path: "/var/helpdesk/files/9b1e.log".into(),
                },
                &fx.customer,
            )
            .await
            .unwrap();

        let err = fx.helpdesk.tickets.delete_ticket(&id, &fx.agent).await.unwrap_err();
        assert_eq!(err, HelpdeskError::Unauthorized(Capability::DeleteTicket));

        assert_ok!(fx.helpdesk.tickets.delete_ticket(&id, &fx.admin).await);
        let err = assert_err!(fx.helpdesk.tickets.get_ticket(&id, &fx.admin).await);
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(fx.thread(&id).await.is_empty());
        assert_eq!(fx.storage.find_rating_for_ticket(&id).await.unwrap(), None);
        assert!(fx.storage.attachments_for_ticket(&id).await.unwrap().is_empty());
        assert_eq!(fx.storage.find_attachment(&file.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_overdue_after_inactivity() {
        let fx = Fixture::new().await;
        let id = *fx.ticket().await.id();
        let ticket = fx.helpdesk.tickets.assign_ticket(&id, &fx.agent.id, &fx.agent).await.unwrap();

        let days = fx.helpdesk.config().overdue_after_days;
        assert!(!fx.helpdesk.is_overdue(&ticket));
        fx.clock.advance(Duration::days(days));
        assert!(fx.helpdesk.is_overdue(&ticket));
    }

    #[tokio::test]
    async fn test_unrepresentable_overdue_threshold_is_never_reached() {
        let config = HelpdeskConfig {
            overdue_after_days: i64::MAX,
            ..Default::default()
        };
        let fx = Fixture::with_config(config).await;
        let id = *fx.ticket().await.id();
        let ticket = fx.helpdesk.tickets.assign_ticket(&id, &fx.agent.id, &fx.agent).await.unwrap();

        fx.clock.advance(Duration::days(3650));
        assert!(!fx.helpdesk.is_overdue(&ticket));
    }
}
