mod auth_cmd;
mod context;
mod dashboard_cmd;
mod notifications_cmd;
mod tasks_cmd;
mod terminal_output;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use taskflow_core::ClientError;
use tracing::error;

use context::AppContext;
use dashboard_cmd::DashboardArgs;
use notifications_cmd::NotificationCommands;
use tasks_cmd::TaskCommands;

#[derive(Parser)]
#[command(name = "taskflow")]
#[command(about = "Task management from the terminal")]
#[command(version)]
struct Cli {
    /// Config file (default: ~/.taskflow/config.yaml or $TASKFLOW_CONFIG_DIR/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Session scope; separate scopes keep separate logins
    #[arg(long, global = true)]
    scope: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and keep the session for this scope
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
    /// Forget the session for this scope
    Logout,
    /// Show the logged-in user and role
    Whoami {
        /// Also show the record as the dashboard service sees it
        #[arg(long)]
        backend: bool,
    },
    /// Check that the backend is up
    Health,
    /// Load a dashboard metric for your role
    Dashboard(DashboardArgs),
    /// Manage notifications
    #[command(subcommand)]
    Notifications(NotificationCommands),
    /// Manage tasks and the trash
    #[command(subcommand)]
    Tasks(TaskCommands),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %format!("{e:#}"), "Command failed");
            terminal_output::note_error(&format!("{e:#}"));
            if e.downcast_ref::<ClientError>().is_some_and(ClientError::is_transient) {
                terminal_output::note_info("The backend may be down; `taskflow health` checks it");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut ctx = AppContext::load(cli.config, cli.scope).await?;

    match cli.command {
        Commands::Login { email, password } => auth_cmd::login(&mut ctx, &email, &password).await,
        Commands::Logout => auth_cmd::logout(&mut ctx),
        Commands::Whoami { backend } => auth_cmd::whoami(&mut ctx, backend).await,
        Commands::Health => auth_cmd::health(&ctx).await,
        Commands::Dashboard(args) => dashboard_cmd::run(&ctx, args).await,
        Commands::Notifications(cmd) => notifications_cmd::run(&ctx, cmd).await,
        Commands::Tasks(cmd) => tasks_cmd::run(&ctx, cmd).await,
    }
}
