use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

use ticketdesk::commands::{
    CreateOptions, ListOptions, OutputOptions, cmd_board, cmd_comment, cmd_config_get,
    cmd_config_set, cmd_config_show, cmd_create, cmd_ls, cmd_show, cmd_stats, cmd_transition,
    demo_enabled, report_error,
};
use ticketdesk::types::{TicketPriority, TicketStatus, VALID_PRIORITIES, VALID_STATUSES};

#[derive(Parser)]
#[command(name = "desk")]
#[command(about = "Support ticket desk with a Kanban board")]
#[command(version)]
struct Cli {
    /// Use the in-memory demo data instead of the REST API
    #[arg(long, global = true)]
    demo: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show tickets as a kanban board
    #[command(visible_alias = "b")]
    Board {
        /// Only show tickets with this status
        #[arg(short, long, value_parser = parse_status)]
        status: Option<TicketStatus>,

        /// Case-insensitive search over title, description and requester
        #[arg(short = 'q', long)]
        search: Option<String>,
    },

    /// List tickets, newest first
    Ls {
        /// Only show tickets with this status
        #[arg(short, long, value_parser = parse_status)]
        status: Option<TicketStatus>,

        /// Case-insensitive search over title, description and requester
        #[arg(short = 'q', long)]
        search: Option<String>,
    },

    /// Display a ticket with its comments
    #[command(visible_alias = "s")]
    Show {
        /// Ticket ID
        id: u64,
    },

    /// Create a new ticket
    #[command(visible_alias = "c")]
    Create {
        /// Ticket title
        title: String,

        /// Description of the problem
        #[arg(short, long)]
        description: String,

        /// Name of the person reporting the problem
        #[arg(short, long)]
        requester: String,

        /// Priority: low, medium, high (default: medium)
        #[arg(short, long, default_value = "medium", value_parser = parse_priority)]
        priority: TicketPriority,

        /// Contact email of the requester
        #[arg(short, long)]
        email: Option<String>,
    },

    /// Move a ticket to a new status
    #[command(visible_alias = "move")]
    Transition {
        /// Ticket ID
        id: u64,

        /// Target status: new, in_progress, resolved, closed
        #[arg(value_parser = parse_status)]
        status: TicketStatus,

        /// Comment recorded with the status change
        #[arg(short = 'm', long)]
        comment: Option<String>,
    },

    /// Add a comment to a ticket
    Comment {
        /// Ticket ID
        id: u64,

        /// Comment text
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,

        /// Comment author (default: configured author)
        #[arg(short, long)]
        author: Option<String>,
    },

    /// Show ticket counts by status and priority
    Stats,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Get a configuration value
    Get {
        /// Key: backend, api_url, author, comment_refreshes_updated_at
        key: String,
    },
    /// Set a configuration value
    Set {
        /// Key: backend, api_url, author, comment_refreshes_updated_at
        key: String,
        /// New value
        value: String,
    },
}

fn parse_status(s: &str) -> Result<TicketStatus, String> {
    s.parse()
        .map_err(|_| format!("Invalid status. Must be one of: {}", VALID_STATUSES.join(", ")))
}

fn parse_priority(s: &str) -> Result<TicketPriority, String> {
    s.parse().map_err(|_| {
        format!(
            "Invalid priority. Must be one of: {}",
            VALID_PRIORITIES.join(", ")
        )
    })
}

/// Install the stderr log subscriber, filtered by `DESK_LOG` (default: warn)
fn init_tracing() {
    let filter = EnvFilter::try_from_env("DESK_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    let output = OutputOptions {
        json: cli.json,
        demo: cli.demo,
    };

    let result = match cli.command {
        Commands::Board { status, search } => {
            cmd_board(ListOptions { status, search }, output).await
        }
        Commands::Ls { status, search } => cmd_ls(ListOptions { status, search }, output).await,
        Commands::Show { id } => cmd_show(id, output).await,
        Commands::Create {
            title,
            description,
            requester,
            priority,
            email,
        } => {
            cmd_create(
                CreateOptions {
                    title,
                    description,
                    requester,
                    priority,
                    email,
                },
                output,
            )
            .await
        }
        Commands::Transition {
            id,
            status,
            comment,
        } => cmd_transition(id, status, comment, output).await,
        Commands::Comment { id, text, author } => {
            cmd_comment(id, &text.join(" "), author.as_deref(), output).await
        }
        Commands::Stats => cmd_stats(output).await,
        Commands::Config { action } => match action {
            ConfigAction::Show => cmd_config_show(output),
            ConfigAction::Get { key } => cmd_config_get(&key, output),
            ConfigAction::Set { key, value } => cmd_config_set(&key, &value, output),
        },
    };

    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            report_error(&e, demo_enabled(output));
            ExitCode::FAILURE
        }
    }
}
