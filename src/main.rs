mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use classgrid::config::Config;
use commands::timetable::AddParams;
use commands::Session;

#[derive(Parser)]
#[command(
    name = "classgrid",
    version,
    about = "Weekly class timetable scheduler for the academic portal",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (TOML); defaults to CLASSGRID_* environment variables
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long, global = true)]
    log_format: Option<String>,

    /// Use a seeded in-memory backend instead of the portal
    #[arg(long, global = true)]
    offline: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the weekly grid
    Show {
        /// Only show this class
        #[arg(long)]
        class: Option<u64>,
    },

    /// Add a class period
    Add {
        /// Class id
        #[arg(long)]
        class: u64,

        /// Weekday (0-6, Monday=0, or a name)
        #[arg(long, default_value = "0")]
        day: String,

        /// Start time (HH:MM)
        #[arg(long, default_value = "09:00")]
        start: String,

        /// End time (HH:MM), defaults to start + 45 minutes
        #[arg(long)]
        end: Option<String>,

        /// Subject id
        #[arg(long)]
        subject: Option<u64>,

        /// Teacher id
        #[arg(long)]
        teacher: Option<u64>,
    },

    /// Delete a class period
    Delete {
        /// Slot id
        id: u64,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Move a period to another day, or to a lesson bin with --at
    Move {
        /// Slot id
        id: u64,

        /// Target weekday
        #[arg(long)]
        day: String,

        /// Target bin start (HH:MM); keeps the period's duration
        #[arg(long)]
        at: Option<String>,
    },

    /// List teacher assignments
    Assignments {
        /// Only this teacher
        #[arg(long)]
        teacher: Option<u64>,
    },

    /// Assign a teacher to subject/class pairs
    Assign {
        /// Teacher id
        #[arg(long)]
        teacher: Option<u64>,

        /// SUBJECT_ID:CLASS_ID, repeatable
        #[arg(long = "pair")]
        pairs: Vec<String>,
    },

    /// Remove a teacher assignment
    Unassign {
        /// Assignment id
        id: u64,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// List the grid's drop targets
    Cells {
        /// Print stable cell keys (weekday-HH:MM)
        #[arg(long)]
        keys: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };
    config.validate()?;

    // Initialize tracing/logging
    let log_format = cli
        .log_format
        .clone()
        .unwrap_or_else(|| config.logging.format.clone());
    setup_tracing(&log_format, &config.logging.level, cli.verbose)?;

    tracing::debug!(offline = cli.offline, "classgrid starting");

    if let Commands::Cells { keys } = cli.command {
        return commands::cells(keys);
    }

    let session = Session::open(&config, cli.offline)?;

    match cli.command {
        Commands::Show { class } => {
            tracing::info!(class = ?class, "Starting show command");
            commands::show(&session, class).await?;
        }

        Commands::Add {
            class,
            day,
            start,
            end,
            subject,
            teacher,
        } => {
            tracing::info!(class, day = %day, start = %start, "Starting add command");
            let params = AddParams {
                class,
                day,
                start,
                end,
                subject,
                teacher,
            };
            commands::add(&session, params).await?;
        }

        Commands::Delete { id, yes } => {
            tracing::info!(id, "Starting delete command");
            commands::delete(&session, id, yes).await?;
        }

        Commands::Move { id, day, at } => {
            tracing::info!(id, day = %day, at = ?at, "Starting move command");
            commands::move_slot(&session, id, day, at).await?;
        }

        Commands::Assignments { teacher } => {
            commands::list_assignments(&session, teacher).await?;
        }

        Commands::Assign { teacher, pairs } => {
            tracing::info!(teacher = ?teacher, pairs = pairs.len(), "Starting assign command");
            commands::assign(&session, teacher, &pairs).await?;
        }

        Commands::Unassign { id, yes } => {
            tracing::info!(id, "Starting unassign command");
            commands::unassign(&session, id, yes).await?;
        }

        Commands::Cells { .. } => {}
    }

    Ok(())
}

fn setup_tracing(format: &str, level: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("classgrid=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_new(format!("classgrid={level},warn"))
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("classgrid=info,warn"))
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    Ok(())
}
