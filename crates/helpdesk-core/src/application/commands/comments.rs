//! Comment application service

use async_trait::async_trait;
use std::sync::Arc;

use super::{audit_entry, authorize, comment_text, load_ticket};
use crate::config::ContentLimits;
use crate::domain::authorization::{self as authz, Capability};
use crate::domain::{Comment, CommentId, TicketEvent, TicketId, User};
use crate::error::{HelpdeskError, HelpdeskResult};
use crate::ports::inbound::CommentUseCases;
use crate::ports::outbound::{Clock, Storage, UnitOfWork};

/// Comment application service
pub struct CommentService {
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
    limits: ContentLimits,
}

impl CommentService {
    pub fn new(storage: Arc<dyn Storage>, clock: Arc<dyn Clock>, limits: ContentLimits) -> Self {
        Self { storage, clock, limits }
    }

    async fn load_comment(&self, id: &CommentId) -> HelpdeskResult<Comment> {
        self.storage
            .find_comment(id)
            .await?
            .ok_or_else(|| HelpdeskError::not_found("comment", id))
    }
}

#[async_trait]
impl CommentUseCases for CommentService {
    /// Any viewer of the ticket may comment. The comment is its own record,
    /// so no audit entry is written.
    async fn add_comment(&self, ticket_id: &TicketId, content: String, actor: &User) -> HelpdeskResult<Comment> {
        let ticket = load_ticket(&*self.storage, ticket_id).await?;
        authorize(Capability::ViewTicket, authz::can_view(actor, &ticket), actor)?;
        let content = comment_text(&content, self.limits.comment_max_len)?;

        let now = self.clock.now();
        let comment = Comment::new(*ticket_id, actor.id, content, now);
        self.storage
            .commit(UnitOfWork::new().touch_ticket(*ticket_id, now).save_comment(comment.clone()))
            .await?;

        tracing::info!(ticket_id = %ticket_id, comment_id = %comment.id, actor = %actor.id, "Comment added");
        Ok(comment)
    }

    async fn update_comment(&self, id: &CommentId, content: String, actor: &User) -> HelpdeskResult<Comment> {
        let mut comment = self.load_comment(id).await?;
        authorize(Capability::EditComment, authz::can_edit_comment(actor, &comment), actor)?;
        let content = comment_text(&content, self.limits.comment_max_len)?;
        let ticket = load_ticket(&*self.storage, &comment.ticket_id).await?;

        let now = self.clock.now();
        comment.revise(content, now);
        let entry = audit_entry(&*self.storage, &ticket, actor, &TicketEvent::CommentEdited { comment_id: *id }, now).await?;
        self.storage
            .commit(
                UnitOfWork::new()
                    .save_comment(comment.clone())
                    .touch_ticket(*ticket.id(), now)
                    .save_comment(entry),
            )
            .await?;

        tracing::info!(comment_id = %id, actor = %actor.id, "Comment edited");
        Ok(comment)
    }

    async fn delete_comment(&self, id: &CommentId, actor: &User) -> HelpdeskResult<()> {
        let comment = self.load_comment(id).await?;
        authorize(Capability::DeleteComment, authz::can_delete_comment(actor, &comment), actor)?;
        let ticket = load_ticket(&*self.storage, &comment.ticket_id).await?;

        let now = self.clock.now();
        let entry = audit_entry(&*self.storage, &ticket, actor, &TicketEvent::CommentDeleted { comment_id: *id }, now).await?;
        self.storage
            .commit(
                UnitOfWork::new()
                    .delete_comment(*id)
                    .touch_ticket(*ticket.id(), now)
                    .save_comment(entry),
            )
            .await?;

        tracing::info!(comment_id = %id, actor = %actor.id, "Comment deleted");
        Ok(())
    }

    async fn get_comment(&self, id: &CommentId, actor: &User) -> HelpdeskResult<Comment> {
        let comment = self.load_comment(id).await?;
        let ticket = load_ticket(&*self.storage, &comment.ticket_id).await?;
        authorize(Capability::ViewComment, authz::can_view_comment(actor, &comment, &ticket), actor)?;
        Ok(comment)
    }

    async fn list_comments(&self, ticket_id: &TicketId, actor: &User) -> HelpdeskResult<Vec<Comment>> {
        let ticket = load_ticket(&*self.storage, ticket_id).await?;
        authorize(Capability::ViewTicket, authz::can_view(actor, &ticket), actor)?;
        Ok(self.storage.comments_for_ticket(ticket_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::commands::fixtures::Fixture;
    use crate::config::HelpdeskConfig;
    use crate::domain::TicketStatus;
    use crate::error::ErrorKind;
    use crate::ports::inbound::TicketUseCases;
    use chrono::Duration;

    #[tokio::test]
    async fn test_add_comment_keeps_thread_order() {
        let fx = Fixture::new().await;
        let id = *fx.ticket().await.id();
        let comments = &fx.helpdesk.comments;

        comments.add_comment(&id, "first".into(), &fx.customer).await.unwrap();
        comments.add_comment(&id, "second".into(), &fx.agent).await.unwrap();
        fx.clock.advance(Duration::seconds(1));
        comments.add_comment(&id, "third".into(), &fx.customer).await.unwrap();

        let thread: Vec<String> = comments
            .list_comments(&id, &fx.customer)
            .await
            .unwrap()
            .into_iter()
            .filter(|c| !c.is_system())
            .map(|c| c.content)
            .collect();
        assert_eq!(thread, ["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_add_comment_requires_view() {
        let fx = Fixture::new().await;
        let id = *fx.ticket().await.id();

        let err = fx
            .helpdesk
            .comments
            .add_comment(&id, "let me in".into(), &fx.stranger)
            .await
            .unwrap_err();
        assert_eq!(err, HelpdeskError::Unauthorized(Capability::ViewTicket));
    }

    #[tokio::test]
    async fn test_content_bounds() {
        let mut config = HelpdeskConfig::default();
        config.limits.comment_max_len = 10;
        let fx = Fixture::with_config(config).await;
        let id = *fx.ticket().await.id();
        let comments = &fx.helpdesk.comments;

        for bad in ["", "   ", "eleven char"] {
            let err = comments.add_comment(&id, bad.into(), &fx.customer).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation, "{:?}", bad);
        }
        assert!(comments.add_comment(&id, "ten chars!".into(), &fx.customer).await.is_ok());
    }

    #[tokio::test]
    async fn test_forged_system_comment_rejected() {
        let fx = Fixture::new().await;
        let id = *fx.ticket().await.id();

        let err = fx
            .helpdesk
            .comments
            .add_comment(&id, "[SYSTEM] Ticket closed by Ada Tester".into(), &fx.customer)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_edit_marks_comment_edited_and_audits() {
        let fx = Fixture::new().await;
        let id = *fx.ticket().await.id();
        let comments = &fx.helpdesk.comments;

        let comment = comments.add_comment(&id, "typo".into(), &fx.customer).await.unwrap();
        assert!(!comment.is_edited());

        // The clock does not move: edited must still hold.
        let edited = comments.update_comment(&comment.id, "fixed".into(), &fx.customer).await.unwrap();
        assert!(edited.is_edited());
        assert_eq!(edited.content, "fixed");

        let audit = fx.system_comments(&id).await;
        assert_eq!(audit.len(), 2);
        assert_eq!(
            audit[1].content,
            format!("[SYSTEM] Comment {} edited by Dee Tester", comment.id)
        );
    }

    #[tokio::test]
    async fn test_only_author_edits() {
        let fx = Fixture::new().await;
        let id = *fx.ticket().await.id();
        let comment = fx.helpdesk.comments.add_comment(&id, "mine".into(), &fx.customer).await.unwrap();

        let err = fx
            .helpdesk
            .comments
            .update_comment(&comment.id, "theirs".into(), &fx.admin)
            .await
            .unwrap_err();
        assert_eq!(err, HelpdeskError::Unauthorized(Capability::EditComment));
    }

    #[tokio::test]
    async fn test_delete_by_author_or_admin() {
        let fx = Fixture::new().await;
        let id = *fx.ticket().await.id();
        let comments = &fx.helpdesk.comments;
        let first = comments.add_comment(&id, "one".into(), &fx.customer).await.unwrap();
        let second = comments.add_comment(&id, "two".into(), &fx.customer).await.unwrap();

        let err = comments.delete_comment(&first.id, &fx.agent).await.unwrap_err();
        assert_eq!(err, HelpdeskError::Unauthorized(Capability::DeleteComment));

        comments.delete_comment(&first.id, &fx.customer).await.unwrap();
        comments.delete_comment(&second.id, &fx.admin).await.unwrap();

        let thread = fx.thread(&id).await;
        assert!(thread.iter().all(Comment::is_system));
        assert_eq!(thread.len(), 3);
        assert_eq!(
            comments.get_comment(&first.id, &fx.admin).await.unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }

    #[tokio::test]
    async fn test_system_comments_are_immutable() {
        let fx = Fixture::new().await;
        let id = *fx.ticket().await.id();
        let created = fx.system_comments(&id).await.remove(0);

        let err = fx
            .helpdesk
            .comments
            .update_comment(&created.id, "rewritten".into(), &fx.customer)
            .await
            .unwrap_err();
        assert_eq!(err, HelpdeskError::Unauthorized(Capability::EditComment));

        let err = fx.helpdesk.comments.delete_comment(&created.id, &fx.admin).await.unwrap_err();
        assert_eq!(err, HelpdeskError::Unauthorized(Capability::DeleteComment));
    }

    #[tokio::test]
    async fn test_author_keeps_sight_of_own_comment_after_losing_ticket_access() {
        let fx = Fixture::new().await;
        let id = *fx.ticket().await.id();
        let tickets = &fx.helpdesk.tickets;

        // A regular user who was assigned while holding the agent role.
        tickets.assign_ticket(&id, &fx.agent.id, &fx.admin).await.unwrap();
        let mut agent = fx.agent.clone();
        let comment = fx.helpdesk.comments.add_comment(&id, "on it".into(), &agent).await.unwrap();
        tickets.unassign_ticket(&id, &fx.admin).await.unwrap();
        agent.role = crate::domain::Role::User;

        assert_eq!(
            fx.helpdesk.comments.list_comments(&id, &agent).await.unwrap_err(),
            HelpdeskError::Unauthorized(Capability::ViewTicket)
        );
        assert_eq!(fx.helpdesk.comments.get_comment(&comment.id, &agent).await.unwrap(), comment);
        assert_eq!(
            fx.helpdesk.comments.get_comment(&comment.id, &fx.stranger).await.unwrap_err(),
            HelpdeskError::Unauthorized(Capability::ViewComment)
        );
    }

    #[tokio::test]
    async fn test_comment_activity_bumps_ticket() {
        let fx = Fixture::new().await;
        let id = *fx.ticket().await.id();
        fx.clock.advance(Duration::hours(3));

        fx.helpdesk.comments.add_comment(&id, "any news?".into(), &fx.customer).await.unwrap();
        let ticket = fx.helpdesk.tickets.get_ticket(&id, &fx.customer).await.unwrap();
        assert_eq!(ticket.updated_at(), fx.clock.now());
    }

    #[tokio::test]
    async fn test_comment_keeps_status_change_committed_meanwhile() {
        let fx = Fixture::new().await;
        let id = *fx.ticket().await.id();
        let (helpdesk, storage) = fx.interleaved();
        fx.clock.advance(Duration::minutes(10));

        storage.change_status_before_next_commit(id, TicketStatus::Closed, fx.admin.clone());
        helpdesk.comments.add_comment(&id, "any news?".into(), &fx.customer).await.unwrap();

        let ticket = fx.helpdesk.tickets.get_ticket(&id, &fx.admin).await.unwrap();
        assert_eq!(ticket.status(), TicketStatus::Closed);
        assert_eq!(ticket.closed_at(), Some(fx.clock.now()));
        assert_eq!(
            fx.system_comments(&id).await.last().unwrap().content,
            "[SYSTEM] Status changed from Open to Closed by Ada Tester"
        );
    }
}
