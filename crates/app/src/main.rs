//! RingCentral operator CLI.
//!
//! Reads credentials from `RINGCENTRAL_*` environment variables (and an
//! optional TOML file), caches tokens on disk and runs one API operation.

mod cli;

use std::sync::Arc;

use clap::Parser;
use ringcentral_application::{Dispatcher, RingCentralClient};
use ringcentral_infrastructure::{ConfigLoader, FileTokenStore, ReqwestTransport, SystemClock};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut loader = ConfigLoader::new();
    if let Some(path) = &cli.config {
        loader = loader.with_file(path);
    }
    let settings = loader.load_settings()?;
    let config = settings.to_config()?;

    let token_file = cli.token_file.clone().unwrap_or_else(|| settings.token_file());
    tracing::debug!(path = %token_file.display(), "using token file");

    let store = Arc::new(FileTokenStore::new(token_file));
    let transport = Arc::new(ReqwestTransport::new()?);
    let client = RingCentralClient::new(Dispatcher::new(config, store, transport))
        .with_clock(Arc::new(SystemClock::new()));

    run(&client, cli.command).await
}

async fn run(
    client: &RingCentralClient,
    command: Command,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Extensions => print_json(&client.get_extensions().await?)?,
        Command::SendSms { from, to, text } => {
            let message = ringcentral_domain::SmsMessage::new(from, to, text);
            print_json(&client.send_message(&message).await?)?;
        }
        Command::RecordingWebhook { address } => {
            print_json(&client.create_recording_webhook(&address).await?)?;
        }
        Command::AnsweredWebhook { address } => {
            print_json(&client.create_answered_webhook(&address).await?)?;
        }
        Command::RenewWebhooks { within } => {
            for id in client.renew_expiring_webhooks(within).await? {
                println!("{id}");
            }
        }
        Command::ListWebhooks => print_json(&client.list_webhooks().await?)?,
    }
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
