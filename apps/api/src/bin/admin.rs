//! Terminal view of submitted applications.

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use aggiequant_api::dashboard::render::{render_detail, render_table};
use aggiequant_api::dashboard::{AdminClient, AdminSession, LoginError};

#[derive(Debug, Parser)]
#[command(name = "aggiequant-admin", version, about = "Browse submitted member applications")]
struct Cli {
    /// Base URL of the API server
    #[arg(long, env = "ADMIN_API_URL", default_value = "http://localhost:8080")]
    base_url: String,

    /// Admin secret sent as a bearer token
    #[arg(long, env = "ADMIN_SECRET", hide_env_values = true)]
    secret: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List all applications, newest first
    List,
    /// Show the written responses of one application
    Show {
        /// Application id
        id: i32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut session = AdminSession::new(AdminClient::new(&cli.base_url)?);

    let login = session.login(&cli.secret).await;
    match login {
        Ok(()) if session.is_logged_in() => {}
        Ok(()) => bail!("Admin secret must not be blank"),
        Err(LoginError::InvalidSecret) => bail!("Invalid admin secret"),
        Err(LoginError::Unavailable(cause)) => {
            bail!("Could not load applications: {cause}")
        }
        Err(LoginError::NotLoggedIn) => bail!("Not logged in"),
    }

    match cli.command {
        Command::List => print!("{}", render_table(session.applications())),
        Command::Show { id } => {
            let Some(detail) = session.detail(id) else {
                bail!("No application with id {id}");
            };
            print!("{}", render_detail(&detail));
        }
    }

    Ok(())
}
