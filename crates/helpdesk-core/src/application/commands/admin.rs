//! User administration and bulk operations

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use super::{authorize, load_user};
use crate::application::dto::{BulkOutcome, RegisterUserCommand};
use crate::domain::authorization::{self as authz, Capability};
use crate::domain::{Email, Role, TicketId, TicketStatus, User, UserId};
use crate::error::{HelpdeskError, HelpdeskResult};
use crate::ports::inbound::{AdminUseCases, TicketUseCases};
use crate::ports::outbound::{Clock, RepositoryError, Storage, UnitOfWork};

const NAME_MAX_LEN: usize = 100;

/// Administration service. Bulk ticket operations run through the ticket
/// use cases item by item, so each item gets its own checks and audit entry.
pub struct AdminService {
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
    tickets: Arc<dyn TicketUseCases>,
}

impl AdminService {
    pub fn new(storage: Arc<dyn Storage>, clock: Arc<dyn Clock>, tickets: Arc<dyn TicketUseCases>) -> Self {
        Self { storage, clock, tickets }
    }

    async fn save(&self, user: &User) -> HelpdeskResult<()> {
        self.storage.commit(UnitOfWork::new().save_user(user.clone())).await?;
        Ok(())
    }
}

fn new_user(command: RegisterUserCommand, role: Role, now: DateTime<Utc>) -> HelpdeskResult<User> {
    let email = Email::new(&command.email).map_err(|e| HelpdeskError::validation(e.to_string()))?;
    let name = |field: &str, value: &str| {
        let value = value.trim();
        if value.chars().count() > NAME_MAX_LEN {
            return Err(HelpdeskError::validation(format!(
                "{} must be at most {} characters",
                field, NAME_MAX_LEN
            )));
        }
        Ok(value.to_string())
    };
    let first_name = name("first name", &command.first_name)?;
    let last_name = name("last name", &command.last_name)?;
    Ok(User::new(email, first_name, last_name, role, now))
}

fn log_failures<Id: std::fmt::Display>(operation: &str, outcome: &BulkOutcome<Id>) {
    for failure in &outcome.failed {
        tracing::warn!(id = %failure.id, "{} failed: {}", operation, failure.reason);
    }
    tracing::info!(
        succeeded = outcome.succeeded.len(),
        failed = outcome.failed.len(),
        "{} finished",
        operation
    );
}

#[async_trait]
impl AdminUseCases for AdminService {
    /// The emptiness check is part of the commit, so concurrent bootstraps
    /// yield a single administrator.
    async fn bootstrap_admin(&self, command: RegisterUserCommand) -> HelpdeskResult<User> {
        let admin = new_user(command, Role::Admin, self.clock.now())?;
        self.storage
            .commit(UnitOfWork::new().require_no_users().save_user(admin.clone()))
            .await
            .map_err(|err| match err {
                RepositoryError::Conflict(_) => {
                    HelpdeskError::conflict("users already exist; ask an administrator for an account")
                }
                other => other.into(),
            })?;
        tracing::info!(user_id = %admin.id, email = %admin.email, "Bootstrap administrator created");
        Ok(admin)
    }

    async fn register_user(&self, command: RegisterUserCommand, actor: &User) -> HelpdeskResult<User> {
        authorize(Capability::ManageUsers, authz::can_manage_users(actor), actor)?;
        let role = command.role;
        let user = new_user(command, role, self.clock.now())?;

        self.save(&user).await?;
        tracing::info!(user_id = %user.id, email = %user.email, role = %user.role, actor = %actor.id, "User registered");
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> HelpdeskResult<User> {
        let email = Email::new(email).map_err(|e| HelpdeskError::validation(e.to_string()))?;
        self.storage
            .find_user_by_email(email.as_str())
            .await?
            .ok_or_else(|| HelpdeskError::not_found("user", &email))
    }

    async fn list_users(&self, actor: &User) -> HelpdeskResult<Vec<User>> {
        authorize(Capability::ListUsers, authz::can_list_users(actor), actor)?;
        Ok(self.storage.list_users().await?)
    }

    async fn change_role(&self, user_id: &UserId, role: Role, actor: &User) -> HelpdeskResult<User> {
        authorize(Capability::ManageUsers, authz::can_manage_users(actor), actor)?;
        let mut user = load_user(&*self.storage, user_id).await?;
        if user.id == actor.id && !role.is_admin() {
            return Err(HelpdeskError::validation("administrators cannot demote themselves"));
        }
        if user.role == role {
            return Ok(user);
        }

        let previous = user.role;
        user.role = role;
        self.save(&user).await?;
        tracing::info!(user_id = %user_id, from = %previous, to = %role, actor = %actor.id, "Role changed");
        Ok(user)
    }

    async fn set_active(&self, user_id: &UserId, active: bool, actor: &User) -> HelpdeskResult<User> {
        authorize(Capability::ManageUsers, authz::can_manage_users(actor), actor)?;
        let mut user = load_user(&*self.storage, user_id).await?;
        if user.id == actor.id && !active {
            return Err(HelpdeskError::validation("administrators cannot deactivate themselves"));
        }
        if user.active == active {
            return Ok(user);
        }

        user.active = active;
        self.save(&user).await?;
        tracing::info!(user_id = %user_id, active, actor = %actor.id, "User activation changed");
        Ok(user)
    }

    async fn bulk_change_status(
        &self,
        ids: &[TicketId],
        status: TicketStatus,
        actor: &User,
    ) -> HelpdeskResult<BulkOutcome<TicketId>> {
        let mut outcome = BulkOutcome::default();
        for id in ids {
            let result = self.tickets.change_status(id, status, actor).await.map(|_| ());
            outcome.record(*id, result);
        }
        log_failures("Bulk status change", &outcome);
        Ok(outcome)
    }

    async fn bulk_delete_tickets(&self, ids: &[TicketId], actor: &User) -> HelpdeskResult<BulkOutcome<TicketId>> {
        authorize(Capability::DeleteTicket, authz::can_delete(actor), actor)?;
        let mut outcome = BulkOutcome::default();
        for id in ids {
            outcome.record(*id, self.tickets.delete_ticket(id, actor).await);
        }
        log_failures("Bulk ticket delete", &outcome);
        Ok(outcome)
    }

    async fn bulk_change_role(&self, ids: &[UserId], role: Role, actor: &User) -> HelpdeskResult<BulkOutcome<UserId>> {
        authorize(Capability::ManageUsers, authz::can_manage_users(actor), actor)?;
        let mut outcome = BulkOutcome::default();
        for id in ids {
            outcome.record(*id, self.change_role(id, role, actor).await.map(|_| ()));
        }
        log_failures("Bulk role change", &outcome);
        Ok(outcome)
    }

    async fn bulk_set_active(&self, ids: &[UserId], active: bool, actor: &User) -> HelpdeskResult<BulkOutcome<UserId>> {
        authorize(Capability::ManageUsers, authz::can_manage_users(actor), actor)?;
        let mut outcome = BulkOutcome::default();
        for id in ids {
            outcome.record(*id, self.set_active(id, active, actor).await.map(|_| ()));
        }
        log_failures("Bulk activation change", &outcome);
        Ok(outcome)
    }
}
