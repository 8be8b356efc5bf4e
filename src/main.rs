use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::Context;

#[derive(Parser)]
#[command(
    name = "campusreg",
    version,
    about = "Registration session administration for the college portal",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json); defaults to the configured format
    #[arg(long, global = true)]
    log_format: Option<String>,

    /// Config file (TOML); environment variables are used otherwise
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Bearer token (defaults to CAMPUSREG_TOKEN)
    #[arg(long, global = true)]
    token: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and print a token for later commands
    Login {
        #[arg(short, long)]
        email: String,

        /// Password (defaults to CAMPUSREG_PASSWORD)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// List registration sessions
    Sessions,

    /// Check a session draft file without sending it
    ValidateSession {
        /// Draft file (TOML or JSON)
        file: PathBuf,
    },

    /// Open a registration session from a draft file
    OpenSession {
        /// Draft file (TOML or JSON)
        file: PathBuf,

        /// Publish the default notice when the draft has none
        #[arg(long, default_value = "false")]
        with_notice: bool,
    },

    /// Replace a session's fields from a draft file
    EditSession {
        /// Session record id
        id: String,

        /// Draft file (TOML or JSON)
        file: PathBuf,
    },

    /// Toggle a session between active and inactive
    ToggleSession {
        /// Session record id
        id: String,
    },

    /// Delete a session (its registrations are orphaned)
    DeleteSession {
        /// Session id
        session: String,

        /// Delete even if registrations exist
        #[arg(long, default_value = "false")]
        force: bool,
    },

    /// List registrations
    Registrations {
        #[arg(short, long)]
        session: Option<String>,

        #[arg(long)]
        semester: Option<u8>,

        /// pending, library_pending, payment_pending, completed
        #[arg(long)]
        status: Option<String>,

        #[arg(long)]
        search: Option<String>,
    },

    /// List students who may still register for a session
    Eligible {
        /// Session id
        session: String,
    },

    /// Apply a status action to a registration
    Transition {
        /// Session id
        session: String,

        /// Registration id
        registration: String,

        /// submit, clear-library, mark-fee-paid, approve
        action: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let ctx = Context::new(cli.config, cli.token)?;

    let logging = &ctx.config.logging;
    let format = cli.log_format.as_deref().unwrap_or(&logging.format);
    setup_tracing(&logging.filter_directive(cli.verbose), format)?;

    match cli.command {
        Commands::Login { email, password } => {
            tracing::info!(email = %email, "Starting login command");
            commands::login(&ctx, email, password).await?;
        }

        Commands::Sessions => {
            commands::list_sessions(&ctx).await?;
        }

        Commands::ValidateSession { file } => {
            tracing::info!(file = %file.display(), "Starting validate-session command");
            commands::validate_session(&file)?;
        }

        Commands::OpenSession { file, with_notice } => {
            tracing::info!(
                file = %file.display(),
                with_notice = %with_notice,
                "Starting open-session command"
            );
            commands::open_session(&ctx, &file, with_notice).await?;
        }

        Commands::EditSession { id, file } => {
            tracing::info!(id = %id, file = %file.display(), "Starting edit-session command");
            commands::edit_session(&ctx, &id, &file).await?;
        }

        Commands::ToggleSession { id } => {
            commands::toggle_session(&ctx, &id).await?;
        }

        Commands::DeleteSession { session, force } => {
            tracing::info!(session = %session, force = %force, "Starting delete-session command");
            commands::delete_session(&ctx, &session, force).await?;
        }

        Commands::Registrations {
            session,
            semester,
            status,
            search,
        } => {
            commands::list_registrations(&ctx, session, semester, status, search).await?;
        }

        Commands::Eligible { session } => {
            tracing::info!(session = %session, "Starting eligible command");
            commands::eligible(&ctx, &session).await?;
        }

        Commands::Transition {
            session,
            registration,
            action,
        } => {
            tracing::info!(
                session = %session,
                registration = %registration,
                action = %action,
                "Starting transition command"
            );
            commands::transition(&ctx, &session, &registration, &action).await?;
        }
    }

    Ok(())
}

fn setup_tracing(directive: &str, format: &str) -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_new(directive)
        .with_context(|| format!("Invalid log filter: {directive}"))?;

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}
