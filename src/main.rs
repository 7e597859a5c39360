mod tui;

use std::fs::OpenOptions;
use std::sync::Mutex;

use anyhow::Context;
use brello::config::ClientConfig;
use brello::infrastructure::{AuthClient, HttpRemoteStore};
use brello::BrelloError;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "brello", version, about = "Kanban boards in the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Subcommand)]
enum Commands {
    /// Create an account; a confirmation link is mailed to `email`.
    Signup {
        email: String,
        #[arg(long, env = "BRELLO_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Confirm an email address with the token from the confirmation link.
    Confirm { token: String },
    /// Log in and browse boards.
    Board {
        #[arg(long, env = "BRELLO_EMAIL")]
        email: String,
        #[arg(long, env = "BRELLO_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    let config = ClientConfig::from_env()?;
    init_logging(&config)?;

    let auth = AuthClient::new(&config)?;
    match cli.command {
        Commands::Signup { email, password } => {
            let account = auth.signup(&email, &password).await?;
            println!("Account {} created for {}. Check your inbox for the confirmation link.", account.id, account.email);
        }
        Commands::Confirm { token } => {
            let message = auth.confirm_email(&token).await?;
            println!("{message}");
        }
        Commands::Board { email, password } => {
            let session = match auth.login(&email, &password).await {
                Ok(session) => session,
                Err(BrelloError::EmailNotConfirmed) => {
                    anyhow::bail!("{email} is not confirmed yet; run `brello confirm <token>` with the token from the confirmation mail")
                }
                Err(err) => return Err(err.into()),
            };
            let store = HttpRemoteStore::new(&config, session)?;
            tui::run(store).await?;
        }
    }
    Ok(())
}

/// The board browser owns the terminal, so log lines go to a file.
fn init_logging(config: &ClientConfig) -> anyhow::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)
        .with_context(|| format!("cannot open log file {}", config.log_file.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
