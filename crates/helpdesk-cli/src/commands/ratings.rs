//! Ratings commands

use super::Session;
use crate::RatingCommands;
use helpdesk_core::RatingUseCases;

pub async fn handle(action: RatingCommands, session: &Session) -> anyhow::Result<()> {
    let ratings = &session.helpdesk.ratings;
    let actor = session.actor().await?;

    let rating = match action {
        RatingCommands::Add { ticket, value, feedback } => ratings.rate_ticket(&ticket, value, feedback, &actor).await?,
        RatingCommands::Show { ticket } => ratings.get_rating(&ticket, &actor).await?,
        RatingCommands::Revise { ticket, value, feedback } => {
            ratings.revise_rating(&ticket, value, feedback, &actor).await?
        }
    };
    session.format.print(&rating)
}
