//! Comments commands

use colored::Colorize;

use super::Session;
use crate::CommentCommands;
use helpdesk_core::CommentUseCases;

pub async fn handle(action: CommentCommands, session: &Session) -> anyhow::Result<()> {
    let comments = &session.helpdesk.comments;
    let actor = session.actor().await?;

    match action {
        CommentCommands::Add { ticket, content } => {
            session.format.print(&comments.add_comment(&ticket, content, &actor).await?)?;
        }
        CommentCommands::List { ticket } => {
            session.format.print_all(&comments.list_comments(&ticket, &actor).await?)?;
        }
        CommentCommands::Edit { id, content } => {
            session.format.print(&comments.update_comment(&id, content, &actor).await?)?;
        }
        CommentCommands::Delete { id } => {
            comments.delete_comment(&id, &actor).await?;
            eprintln!("{} comment {}", "Deleted".green().bold(), id);
        }
    }
    Ok(())
}
