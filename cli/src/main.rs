//! EventFlow command-line client.
//!
//! Exercises the SDK end to end: sign in, inspect the account, refresh the
//! token pair, and feed events into the REST ingestion endpoint. Tokens are
//! stored under the platform data directory so sessions survive between
//! invocations.

mod settings;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use client::{AuthOutcome, ClientOptions, Navigate, SessionManager, TrackClient, TrackEvent};
use store::{FileTokenStore, TokenStore};
use telemetry::Telemetry;
use tracing::info;

use crate::settings::Settings;

#[derive(Parser)]
#[command(name = "eventflow", about = "EventFlow dashboard client", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and store the returned token pair.
    Login { email: String, password: String },
    /// Create an account and sign in as it.
    Register {
        email: String,
        password: String,
        #[arg(long)]
        name: Option<String>,
    },
    /// Clear the stored session.
    Logout,
    /// Show the signed-in account.
    Me,
    /// Exchange the stored refresh token for a new pair.
    Refresh,
    /// Send an event through the REST ingestion endpoint.
    Track {
        event_name: String,
        #[arg(long, default_value = "custom")]
        event_type: String,
        /// JSON object of event properties.
        #[arg(long)]
        properties: Option<String>,
        #[arg(long)]
        url: Option<String>,
        /// Defaults to the signed-in account's API key.
        #[arg(long)]
        api_key: Option<String>,
    },
}

/// Navigator that tells the operator to sign in again.
struct StderrNavigator;

impl Navigate for StderrNavigator {
    fn to_login(&self) {
        eprintln!("session ended; run `eventflow login` to sign in again");
    }
}

fn token_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("eventflow")
}

#[tokio::main]
async fn main() {
    telemetry::init_tracing();

    let cli = Cli::parse();
    let settings = Settings::new().unwrap_or_default();

    let telemetry = Telemetry::start(settings.telemetry_config());
    let tokens: Arc<dyn TokenStore> = Arc::new(FileTokenStore::new(token_dir()));
    let options = settings.client_options();
    let manager = SessionManager::new(
        &options,
        tokens,
        Arc::new(StderrNavigator),
        telemetry.clone(),
    );

    let result = run(cli.command, &manager, &options, &telemetry).await;

    // Flush buffered spans before the process ends
    telemetry.shutdown().await;

    if let Err(error) = result {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

async fn run(
    command: Command,
    manager: &SessionManager,
    options: &ClientOptions,
    telemetry: &Telemetry,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Login { email, password } => match manager.login(&email, &password).await? {
            AuthOutcome::Granted(user) => {
                println!("signed in as {}", user.display_name());
            }
            AuthOutcome::Denied(message) => return Err(message.into()),
        },
        Command::Register {
            email,
            password,
            name,
        } => match manager.register(&email, &password, name.as_deref()).await? {
            AuthOutcome::Granted(user) => {
                println!("registered {}", user.email);
            }
            AuthOutcome::Denied(message) => return Err(message.into()),
        },
        Command::Logout => {
            manager.logout();
            println!("signed out");
        }
        Command::Me => {
            manager.initialize().await;
            match manager.current_user() {
                Some(user) => println!("{}", serde_json::to_string_pretty(&user)?),
                None => return Err("not signed in".into()),
            }
        }
        Command::Refresh => {
            if manager.refresh_token().await {
                println!("token pair refreshed");
            } else {
                return Err("refresh failed; signed out".into());
            }
        }
        Command::Track {
            event_name,
            event_type,
            properties,
            url,
            api_key,
        } => {
            let api_key = match api_key {
                Some(key) => key,
                None => {
                    manager.initialize().await;
                    manager
                        .current_user()
                        .map(|user| user.api_key)
                        .ok_or("no --api-key given and not signed in")?
                }
            };

            let mut event = TrackEvent::new(event_name).with_event_type(event_type);
            if let Some(raw) = properties {
                event = event.with_properties(serde_json::from_str(&raw)?);
            }
            if let Some(url) = url {
                event = event.with_url(url);
            }

            let ack = TrackClient::new(options, api_key, telemetry.clone())
                .track(&event)
                .await?;
            info!(event_id = %ack.event_id, "event accepted");
            println!("event {} accepted", ack.event_id);
        }
    }
    Ok(())
}
