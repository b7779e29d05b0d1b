//! Tickets commands

use colored::Colorize;

use super::Session;
use crate::TicketCommands;
use helpdesk_core::{AdminUseCases, CreateTicketCommand, TicketUseCases, UpdateTicketCommand};

pub async fn handle(action: TicketCommands, session: &Session) -> anyhow::Result<()> {
    let tickets = &session.helpdesk.tickets;
    let actor = session.actor().await?;

    match action {
        TicketCommands::Create { subject, description, priority } => {
            let ticket = tickets
                .create_ticket(CreateTicketCommand { subject, description, priority }, &actor)
                .await?;
            session.format.print(&session.view(ticket))?;
        }
        TicketCommands::Show { id } => {
            let ticket = tickets.get_ticket(&id, &actor).await?;
            session.format.print(&session.view(ticket))?;
        }
        TicketCommands::Update { id, subject, description, priority, status, assignee } => {
            let assignee_id = match assignee {
                Some(email) => Some(session.user(&email).await?.id),
                None => None,
            };
            let command = UpdateTicketCommand { subject, description, priority, status, assignee_id };
            if command.is_empty() {
                anyhow::bail!("nothing to update; pass at least one field");
            }
            let ticket = tickets.update_ticket(&id, command, &actor).await?;
            session.format.print(&session.view(ticket))?;
        }
        TicketCommands::Assign { id, agent } => {
            let agent = session.user(&agent).await?;
            let ticket = tickets.assign_ticket(&id, &agent.id, &actor).await?;
            session.format.print(&session.view(ticket))?;
        }
        TicketCommands::Unassign { id } => {
            let ticket = tickets.unassign_ticket(&id, &actor).await?;
            session.format.print(&session.view(ticket))?;
        }
        TicketCommands::Status { id, status } => {
            let ticket = tickets.change_status(&id, status, &actor).await?;
            session.format.print(&session.view(ticket))?;
        }
        TicketCommands::Delete { id } => {
            tickets.delete_ticket(&id, &actor).await?;
            eprintln!("{} ticket {}", "Deleted".green().bold(), id);
        }
        TicketCommands::BulkStatus { status, ids } => {
            let outcome = session.helpdesk.admin.bulk_change_status(&ids, status, &actor).await?;
            session.format.print_outcome(&outcome)?;
        }
        TicketCommands::BulkDelete { ids } => {
            let outcome = session.helpdesk.admin.bulk_delete_tickets(&ids, &actor).await?;
            session.format.print_outcome(&outcome)?;
        }
    }
    Ok(())
}
