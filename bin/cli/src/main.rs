mod commands;
mod config;
mod console;
mod render;

use clap::{Parser, Subcommand};
use client_balance_api::Notifier;
use commands::{AccountsCommand, App, CliError, NewUserArgs, UsersCommand};
use config::CliConfig;
use console::{ConsoleNavigator, ConsoleNotifier, hint};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "client-balance", version, about = "Client balance CLI")]
struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(long, global = true, env = "CLIENT_BALANCE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and store the session credential
    Login {
        #[arg(long)]
        email: String,

        #[arg(long, env = "CLIENT_BALANCE_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create a user and sign in as it
    Register(NewUserArgs),

    /// End the session
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Your balance accounts
    Accounts {
        #[command(subcommand)]
        cmd: AccountsCommand,
    },

    /// User administration (admins only)
    Users {
        #[command(subcommand)]
        cmd: UsersCommand,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let navigator = Arc::new(ConsoleNavigator::default());

    let result = tokio::select! {
        result = run(cli, navigator.clone()) => result,
        _ = tokio::signal::ctrl_c() => Err(CliError::Failed("interrupted".to_string())),
    };

    let code = match result {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    };
    if let Some(route) = navigator.last_route() {
        eprintln!("-> {}", hint(route));
    }
    code
}

async fn run(cli: Cli, navigator: Arc<ConsoleNavigator>) -> Result<String, CliError> {
    let config =
        CliConfig::load(cli.config.as_deref()).map_err(|e| CliError::Setup(e.to_string()))?;
    tracing::debug!(
        base_url = %config.api.base_url,
        locale = %config.locale,
        "loaded configuration"
    );

    let notifier: Arc<dyn Notifier> = Arc::new(ConsoleNotifier);
    let app = App::connect(&config, navigator, notifier)?;
    app.initialize().await;

    match cli.cmd {
        Command::Login { email, password } => app.login(&email, &password).await,
        Command::Register(args) => app.register(args).await,
        Command::Logout => app.logout().await,
        Command::Whoami => app.whoami(),
        Command::Accounts { cmd } => app.accounts(cmd).await,
        Command::Users { cmd } => app.users(cmd).await,
    }
}
