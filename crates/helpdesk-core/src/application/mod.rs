//! Application layer

pub mod commands;
pub mod dto;

use std::sync::Arc;

use crate::config::HelpdeskConfig;
use crate::domain::Ticket;
use crate::infrastructure::{InMemoryStorage, SystemClock};
use crate::ports::inbound::{AdminUseCases, AttachmentUseCases, CommentUseCases, RatingUseCases, TicketUseCases};
use crate::ports::outbound::{Clock, Storage};
use commands::{AdminService, AttachmentService, CommentService, RatingService, TicketService};

/// Every use case wired to one storage and clock.
pub struct Helpdesk {
    pub tickets: Arc<dyn TicketUseCases>,
    pub comments: Arc<dyn CommentUseCases>,
    pub ratings: Arc<dyn RatingUseCases>,
    pub attachments: Arc<dyn AttachmentUseCases>,
    pub admin: Arc<dyn AdminUseCases>,
    clock: Arc<dyn Clock>,
    config: HelpdeskConfig,
}

impl Helpdesk {
    pub fn new(storage: Arc<dyn Storage>, clock: Arc<dyn Clock>, config: HelpdeskConfig) -> Self {
        let limits = config.limits.clone();
        let tickets: Arc<dyn TicketUseCases> =
            Arc::new(TicketService::new(storage.clone(), clock.clone(), limits.clone()));

        Self {
            comments: Arc::new(CommentService::new(storage.clone(), clock.clone(), limits.clone())),
            ratings: Arc::new(RatingService::new(storage.clone(), clock.clone(), limits.clone())),
            attachments: Arc::new(AttachmentService::new(storage.clone(), clock.clone(), limits)),
            admin: Arc::new(AdminService::new(storage, clock.clone(), tickets.clone())),
            tickets,
            clock,
            config,
        }
    }

    /// Volatile store and wall clock
    pub fn in_memory(config: HelpdeskConfig) -> Self {
        Self::new(Arc::new(InMemoryStorage::new()), Arc::new(SystemClock), config)
    }

    pub fn config(&self) -> &HelpdeskConfig {
        &self.config
    }

    /// Overdue as of now, under the configured threshold.
    pub fn is_overdue(&self, ticket: &Ticket) -> bool {
        ticket.is_overdue(self.clock.now(), self.config.overdue_after_days)
    }
}
