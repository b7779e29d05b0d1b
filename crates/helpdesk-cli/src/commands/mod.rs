//! CLI Commands

pub mod attachments;
pub mod comments;
pub mod ratings;
pub mod tickets;
pub mod users;

use anyhow::Context;
use std::path::Path;
use std::sync::Arc;

use crate::output::{OutputFormat, TicketView};
use helpdesk_core::{AdminUseCases, Helpdesk, HelpdeskConfig, InMemoryStorage, SystemClock, Ticket, User};

/// Engine opened on the snapshot store, plus who is acting.
pub struct Session {
    pub helpdesk: Helpdesk,
    pub format: OutputFormat,
    actor_email: Option<String>,
}

impl Session {
    pub fn open(
        store: &Path,
        config: HelpdeskConfig,
        actor_email: Option<String>,
        format: OutputFormat,
    ) -> anyhow::Result<Self> {
        let storage = InMemoryStorage::open_snapshot(store)
            .with_context(|| format!("opening store {}", store.display()))?;
        Ok(Self {
            helpdesk: Helpdesk::new(Arc::new(storage), Arc::new(SystemClock), config),
            format,
            actor_email,
        })
    }

    /// The user named by `--as`.
    pub async fn actor(&self) -> anyhow::Result<User> {
        let email = self
            .actor_email
            .as_deref()
            .context("no acting user; pass --as <EMAIL> or set HELPDESK_ACTOR")?;
        self.user(email).await
    }

    pub async fn user(&self, email: &str) -> anyhow::Result<User> {
        Ok(self.helpdesk.admin.find_user_by_email(email).await?)
    }

    pub fn view(&self, ticket: Ticket) -> TicketView {
        TicketView {
            high_priority: ticket.is_high_priority(),
            overdue: self.helpdesk.is_overdue(&ticket),
            ticket,
        }
    }
}
