use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use http::Method;
use tracing::info;

use auditdesk::api::ApiClient;
use auditdesk::config::{config_schema, load_config};
use auditdesk::models::OutboundRequest;
use auditdesk::navigation::SessionNavigator;
use auditdesk::startup::build_client;
use auditdesk::utils::logger::init_logging;

/// Command-line access to the audit dashboard API.
#[derive(Debug, Parser)]
#[command(name = "auditdesk", version, about)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(long, global = true, env = "AUDITDESK_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Send one authenticated request and print the response body.
    Request {
        /// HTTP method, e.g. GET or POST.
        method: String,
        /// Path relative to the configured base URL.
        path: String,
        /// JSON request body.
        #[arg(long)]
        body: Option<String>,
    },
    /// Sign in and store the access token.
    SignIn {
        #[arg(long)]
        username: String,
        #[arg(long, env = "AUDITDESK_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored access token.
    SignOut,
    /// Print the configuration JSON schema.
    Schema,
}

// -- Commands

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    if let Command::Schema = cli.command {
        println!("{}", config_schema()?);
        return Ok(());
    }

    let config = load_config(cli.config.as_deref())?;
    init_logging(&config.logging)?;

    let client = build_client(&config, Arc::new(SessionNavigator::default()))?;

    let outcome = execute(&client, cli.command).await;
    // A session failure schedules a sign-in redirect; let it fire before exit.
    client.flush_navigation().await;
    outcome
}

async fn execute(client: &ApiClient, command: Command) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Request { method, path, body } => {
            let method = Method::from_bytes(method.to_uppercase().as_bytes())?;
            let mut request = OutboundRequest::new(method, path);
            if let Some(body) = body {
                request = request.with_json(serde_json::from_str(&body)?);
            }
            let response = client.execute(request).await?;
            println!("{}", response.text());
        }
        Command::SignIn { username, password } => {
            client.sign_in(&username, &password).await?;
            info!("Signed in as {}", username);
        }
        Command::SignOut => client.sign_out(),
        Command::Schema => {}
    }
    Ok(())
}

// -- Entrypoint

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
