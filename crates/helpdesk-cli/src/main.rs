//! Helpdesk CLI
//!
//! Command-line front-end for the helpdesk engine, backed by a JSON
//! snapshot store.
//!
//! # Usage
//!
//! ```bash
//! helpdesk init --email admin@example.com --first-name Ada --last-name Admin
//! helpdesk --as admin@example.com users add --email bo@example.com --role support-agent
//! helpdesk --as dee@example.com tickets create --subject "VPN down" --description "..."
//! helpdesk --as bo@example.com tickets status <ID> resolved
//! helpdesk --as admin@example.com tickets bulk-delete <ID> <ID> --format json
//! ```

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use helpdesk_core::{AttachmentId, CommentId, Role, TicketId, TicketPriority, TicketStatus, UserId};

mod commands;
mod config;
mod output;

#[derive(Parser)]
#[command(name = "helpdesk")]
#[command(version)]
#[command(about = "Helpdesk Command Line Interface", long_about = None)]
struct Cli {
    /// Snapshot file holding all helpdesk data
    #[arg(long, env = "HELPDESK_STORE")]
    store: Option<PathBuf>,

    /// Engine configuration (TOML)
    #[arg(long, env = "HELPDESK_CONFIG")]
    config: Option<PathBuf>,

    /// Email of the acting user
    #[arg(long = "as", env = "HELPDESK_ACTOR")]
    actor: Option<String>,

    /// Output format
    #[arg(long, short, default_value = "table")]
    format: output::OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the first administrator in an empty store
    Init {
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        first_name: String,
        #[arg(long, default_value = "")]
        last_name: String,
    },
    /// Manage users
    Users {
        #[command(subcommand)]
        action: UserCommands,
    },
    /// Manage tickets
    Tickets {
        #[command(subcommand)]
        action: TicketCommands,
    },
    /// Manage ticket comments
    Comments {
        #[command(subcommand)]
        action: CommentCommands,
    },
    /// Manage satisfaction ratings
    Ratings {
        #[command(subcommand)]
        action: RatingCommands,
    },
    /// Manage ticket attachments
    Attachments {
        #[command(subcommand)]
        action: AttachmentCommands,
    },
}

#[derive(Subcommand)]
enum UserCommands {
    /// Register a user
    Add {
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        first_name: String,
        #[arg(long, default_value = "")]
        last_name: String,
        #[arg(long, default_value = "user")]
        role: Role,
    },
    /// List all users
    List,
    /// Change the role of one or more users
    Role {
        role: Role,
        #[arg(required = true)]
        ids: Vec<UserId>,
    },
    /// Reactivate one or more users
    Activate {
        #[arg(required = true)]
        ids: Vec<UserId>,
    },
    /// Deactivate one or more users
    Deactivate {
        #[arg(required = true)]
        ids: Vec<UserId>,
    },
}

#[derive(Subcommand)]
enum TicketCommands {
    /// Open a ticket
    Create {
        #[arg(long)]
        subject: String,
        #[arg(long)]
        description: String,
        #[arg(long, default_value = "medium")]
        priority: TicketPriority,
    },
    /// Show ticket details
    Show { id: TicketId },
    /// Change several fields at once
    Update {
        id: TicketId,
        #[arg(long)]
        subject: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        priority: Option<TicketPriority>,
        #[arg(long)]
        status: Option<TicketStatus>,
        /// Email of the new assignee
        #[arg(long)]
        assignee: Option<String>,
    },
    /// Assign a ticket to an agent
    Assign {
        id: TicketId,
        /// Email of the agent
        agent: String,
    },
    /// Remove the assignee
    Unassign { id: TicketId },
    /// Move a ticket to another status
    Status { id: TicketId, status: TicketStatus },
    /// Delete a ticket with its comments, attachments and rating
    Delete { id: TicketId },
    /// Move several tickets to one status
    BulkStatus {
        #[arg(long)]
        status: TicketStatus,
        #[arg(required = true)]
        ids: Vec<TicketId>,
    },
    /// Delete several tickets
    BulkDelete {
        #[arg(required = true)]
        ids: Vec<TicketId>,
    },
}

#[derive(Subcommand)]
enum CommentCommands {
    /// Comment on a ticket
    Add { ticket: TicketId, content: String },
    /// Show a ticket's thread
    List { ticket: TicketId },
    /// Edit your comment
    Edit { id: CommentId, content: String },
    /// Delete a comment
    Delete { id: CommentId },
}

#[derive(Subcommand)]
enum RatingCommands {
    /// Rate a ticket from 1 to 5
    Add {
        ticket: TicketId,
        value: i64,
        #[arg(long)]
        feedback: Option<String>,
    },
    /// Show a ticket's rating
    Show { ticket: TicketId },
    /// Change your rating
    Revise {
        ticket: TicketId,
        value: i64,
        #[arg(long)]
        feedback: Option<String>,
    },
}

#[derive(Subcommand)]
enum AttachmentCommands {
    /// Register a local file as an attachment
    Add {
        ticket: TicketId,
        file: PathBuf,
        /// MIME type; guessed from the extension when absent
        #[arg(long)]
        mime: Option<String>,
    },
    /// Show where an attachment's file lives
    Get { id: AttachmentId },
    /// List a ticket's attachments
    List { ticket: TicketId },
    /// Remove an attachment
    Remove { id: AttachmentId },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = config::load(cli.config.as_deref())?;
    let store = match cli.store {
        Some(path) => path,
        None => config::default_store_path()?,
    };
    let session = commands::Session::open(&store, config, cli.actor, cli.format)?;

    match cli.command {
        Commands::Init { email, first_name, last_name } => {
            commands::users::init(&session, email, first_name, last_name).await
        }
        Commands::Users { action } => commands::users::handle(action, &session).await,
        Commands::Tickets { action } => commands::tickets::handle(action, &session).await,
        Commands::Comments { action } => commands::comments::handle(action, &session).await,
        Commands::Ratings { action } => commands::ratings::handle(action, &session).await,
        Commands::Attachments { action } => commands::attachments::handle(action, &session).await,
    }
}
