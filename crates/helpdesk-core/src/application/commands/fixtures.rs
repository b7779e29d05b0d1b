//! Shared setup for service tests

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use parking_lot::Mutex;
use std::sync::Arc;

use crate::application::dto::CreateTicketCommand;
use crate::application::Helpdesk;
use crate::config::HelpdeskConfig;
use crate::domain::{
    Attachment, AttachmentId, Comment, CommentId, Email, Rating, Role, Ticket, TicketId, TicketPriority,
    TicketStatus, User, UserId,
};
use crate::infrastructure::{InMemoryStorage, ManualClock};
use crate::ports::inbound::TicketUseCases;
use crate::ports::outbound::{RepoResult, RepositoryError, Storage, UnitOfWork};

pub(crate) struct Fixture {
    pub helpdesk: Helpdesk,
    pub storage: Arc<InMemoryStorage>,
    pub clock: Arc<ManualClock>,
    pub admin: User,
    pub agent: User,
    pub other_agent: User,
    pub customer: User,
    pub stranger: User,
}

impl Fixture {
    pub async fn new() -> Self {
        Self::with_config(HelpdeskConfig::default()).await
    }

    pub async fn with_config(config: HelpdeskConfig) -> Self {
        let storage = Arc::new(InMemoryStorage::new());
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()));
        let helpdesk = Helpdesk::new(storage.clone(), clock.clone(), config);

        let now = Utc.with_ymd_and_hms(2024, 2, 1, 9, 0, 0).unwrap();
        let person = |first: &str, role: Role| {
            let email = Email::new(format!("{}@example.com", first.to_lowercase())).unwrap();
            User::new(email, first, "Tester", role, now)
        };
        let admin = person("Ada", Role::Admin);
        let agent = person("Bo", Role::SupportAgent);
        let other_agent = person("Cy", Role::SupportAgent);
        let customer = person("Dee", Role::User);
        let stranger = person("Eve", Role::User);

        let unit = [&admin, &agent, &other_agent, &customer, &stranger]
            .into_iter()
            .fold(UnitOfWork::new(), |unit, user| unit.save_user(user.clone()));
        storage.commit(unit).await.unwrap();

        Self {
            helpdesk,
            storage,
            clock,
            admin,
            agent,
            other_agent,
            customer,
            stranger,
        }
    }

    /// A ticket opened by the customer.
    pub async fn ticket(&self) -> Ticket {
        self.helpdesk
            .tickets
            .create_ticket(
                CreateTicketCommand {
                    subject: "Cannot log in".into(),
                    description: "Password reset mail never arrives".into(),
                    priority: TicketPriority::High,
                },
                &self.customer,
            )
            .await
            .unwrap()
    }

    /// A second engine over the same tables whose storage lets another
    /// actor change a ticket's status right before its next commit.
    pub fn interleaved(&self) -> (Helpdesk, Arc<InterleavedStorage>) {
        let other = Helpdesk::new(self.storage.clone(), self.clock.clone(), HelpdeskConfig::default());
        let storage = Arc::new(InterleavedStorage {
            inner: self.storage.clone(),
            other,
            pending: Mutex::new(None),
        });
        let helpdesk = Helpdesk::new(storage.clone(), self.clock.clone(), HelpdeskConfig::default());
        (helpdesk, storage)
    }

    pub async fn thread(&self, id: &TicketId) -> Vec<Comment> {
        self.storage.comments_for_ticket(id).await.unwrap()
    }

    pub async fn system_comments(&self, id: &TicketId) -> Vec<Comment> {
        self.thread(id).await.into_iter().filter(Comment::is_system).collect()
    }
}

/// Storage that commits someone else's status change between a service's
/// reads and its own commit.
pub(crate) struct InterleavedStorage {
    inner: Arc<InMemoryStorage>,
    other: Helpdesk,
    pending: Mutex<Option<(TicketId, TicketStatus, User)>>,
}

impl InterleavedStorage {
    pub fn change_status_before_next_commit(&self, id: TicketId, status: TicketStatus, actor: User) {
        *self.pending.lock() = Some((id, status, actor));
    }
}

#[async_trait]
impl Storage for InterleavedStorage {
    async fn find_user(&self, id: &UserId) -> RepoResult<Option<User>> {
        self.inner.find_user(id).await
    }

    async fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        self.inner.find_user_by_email(email).await
    }

    async fn list_users(&self) -> RepoResult<Vec<User>> {
        self.inner.list_users().await
    }

    async fn find_ticket(&self, id: &TicketId) -> RepoResult<Option<Ticket>> {
        self.inner.find_ticket(id).await
    }

    async fn find_comment(&self, id: &CommentId) -> RepoResult<Option<Comment>> {
        self.inner.find_comment(id).await
    }

    async fn comments_for_ticket(&self, ticket_id: &TicketId) -> RepoResult<Vec<Comment>> {
        self.inner.comments_for_ticket(ticket_id).await
    }

    async fn find_rating_for_ticket(&self, ticket_id: &TicketId) -> RepoResult<Option<Rating>> {
        self.inner.find_rating_for_ticket(ticket_id).await
    }

    async fn find_attachment(&self, id: &AttachmentId) -> RepoResult<Option<Attachment>> {
        self.inner.find_attachment(id).await
    }

    async fn attachments_for_ticket(&self, ticket_id: &TicketId) -> RepoResult<Vec<Attachment>> {
        self.inner.attachments_for_ticket(ticket_id).await
    }

    async fn commit(&self, unit: UnitOfWork) -> RepoResult<()> {
        let pending = self.pending.lock().take();
        if let Some((id, status, actor)) = pending {
            self.other
                .tickets
                .change_status(&id, status, &actor)
                .await
                .map_err(|e| RepositoryError::Storage(e.to_string()))?;
        }
        self.inner.commit(unit).await
    }
}
