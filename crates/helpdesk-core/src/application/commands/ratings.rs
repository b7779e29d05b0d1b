//! Rating application service

use async_trait::async_trait;
use std::sync::Arc;

use super::{audit_entry, authorize, load_ticket, optional_text};
use crate::config::ContentLimits;
use crate::domain::authorization::{self as authz, Capability};
use crate::domain::{Rating, RatingValue, Ticket, TicketEvent, TicketId, User};
use crate::error::{HelpdeskError, HelpdeskResult};
use crate::ports::inbound::RatingUseCases;
use crate::ports::outbound::{Clock, Storage, UnitOfWork};

/// Rating application service
pub struct RatingService {
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
    limits: ContentLimits,
}

impl RatingService {
    pub fn new(storage: Arc<dyn Storage>, clock: Arc<dyn Clock>, limits: ContentLimits) -> Self {
        Self { storage, clock, limits }
    }

    async fn load_rating(&self, ticket_id: &TicketId) -> HelpdeskResult<(Ticket, Rating)> {
        let ticket = load_ticket(&*self.storage, ticket_id).await?;
        let rating = self
            .storage
            .find_rating_for_ticket(ticket_id)
            .await?
            .ok_or_else(|| HelpdeskError::not_found("rating", ticket_id))?;
        Ok((ticket, rating))
    }
}

#[async_trait]
impl RatingUseCases for RatingService {
    /// A ticket carries at most one rating, whoever gave it.
    async fn rate_ticket(
        &self,
        ticket_id: &TicketId,
        value: i64,
        feedback: Option<String>,
        actor: &User,
    ) -> HelpdeskResult<Rating> {
        let ticket = load_ticket(&*self.storage, ticket_id).await?;
        authorize(Capability::ViewTicket, authz::can_view(actor, &ticket), actor)?;
        let value = RatingValue::new(value)?;
        let feedback = optional_text("feedback", feedback, self.limits.feedback_max_len)?;

        if let Some(existing) = self.storage.find_rating_for_ticket(ticket_id).await? {
            let message = if existing.rater_id == actor.id {
                "you have already rated this ticket"
            } else {
                "ticket has already been rated"
            };
            return Err(HelpdeskError::conflict(message));
        }

        let now = self.clock.now();
        let rating = Rating::new(*ticket_id, actor.id, value, feedback, now);
        let entry = audit_entry(&*self.storage, &ticket, actor, &TicketEvent::Rated { value }, now).await?;
        self.storage
            .commit(
                UnitOfWork::new()
                    .save_rating(rating.clone())
                    .touch_ticket(*ticket_id, now)
                    .save_comment(entry),
            )
            .await?;

        tracing::info!(ticket_id = %ticket_id, actor = %actor.id, value = value.get(), "Ticket rated");
        Ok(rating)
    }

    async fn get_rating(&self, ticket_id: &TicketId, actor: &User) -> HelpdeskResult<Rating> {
        let (ticket, rating) = self.load_rating(ticket_id).await?;
        authorize(Capability::ViewRating, authz::can_view_rating(actor, &rating, &ticket), actor)?;
        Ok(rating)
    }

    async fn revise_rating(
        &self,
        ticket_id: &TicketId,
        value: i64,
        feedback: Option<String>,
        actor: &User,
    ) -> HelpdeskResult<Rating> {
        let (ticket, mut rating) = self.load_rating(ticket_id).await?;
        authorize(Capability::EditRating, authz::can_edit_rating(actor, &rating), actor)?;
        let value = RatingValue::new(value)?;
        let feedback = optional_text("feedback", feedback, self.limits.feedback_max_len)?;

        if rating.value == value && rating.feedback == feedback {
            return Ok(rating);
        }

        let event = TicketEvent::RatingRevised { from: rating.value, to: value };
        rating.value = value;
        rating.feedback = feedback;

        let now = self.clock.now();
        let entry = audit_entry(&*self.storage, &ticket, actor, &event, now).await?;
        self.storage
            .commit(
                UnitOfWork::new()
                    .save_rating(rating.clone())
                    .touch_ticket(*ticket_id, now)
                    .save_comment(entry),
            )
            .await?;

        tracing::info!(ticket_id = %ticket_id, actor = %actor.id, value = value.get(), "Rating revised");
        Ok(rating)
    }
}
