//! Users commands

use colored::Colorize;

use super::Session;
use crate::UserCommands;
use helpdesk_core::{AdminUseCases, RegisterUserCommand, Role};

pub async fn init(session: &Session, email: String, first_name: String, last_name: String) -> anyhow::Result<()> {
    let admin = session
        .helpdesk
        .admin
        .bootstrap_admin(RegisterUserCommand {
            email,
            first_name,
            last_name,
            role: Role::Admin,
        })
        .await?;
    eprintln!("{} administrator {}", "Created".green().bold(), admin.email);
    session.format.print(&admin)
}

pub async fn handle(action: UserCommands, session: &Session) -> anyhow::Result<()> {
    let admin = &session.helpdesk.admin;
    let actor = session.actor().await?;

    match action {
        UserCommands::Add { email, first_name, last_name, role } => {
            let user = admin
                .register_user(RegisterUserCommand { email, first_name, last_name, role }, &actor)
                .await?;
            session.format.print(&user)?;
        }
        UserCommands::List => {
            session.format.print_all(&admin.list_users(&actor).await?)?;
        }
        UserCommands::Role { role, ids } => match ids.as_slice() {
            [id] => session.format.print(&admin.change_role(id, role, &actor).await?)?,
            _ => session.format.print_outcome(&admin.bulk_change_role(&ids, role, &actor).await?)?,
        },
        UserCommands::Activate { ids } => set_active(session, &ids, true, &actor).await?,
        UserCommands::Deactivate { ids } => set_active(session, &ids, false, &actor).await?,
    }
    Ok(())
}

async fn set_active(
    session: &Session,
    ids: &[helpdesk_core::UserId],
    active: bool,
    actor: &helpdesk_core::User,
) -> anyhow::Result<()> {
    let admin = &session.helpdesk.admin;
    match ids {
        [id] => session.format.print(&admin.set_active(id, active, actor).await?),
        _ => session.format.print_outcome(&admin.bulk_set_active(ids, active, actor).await?),
    }
}
