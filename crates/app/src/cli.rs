//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ringcentral_domain::webhook::DEFAULT_RENEWAL_WINDOW;

/// RingCentral operator tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// TOML file with credentials; `RINGCENTRAL_*` variables override it
    #[arg(short, long, env = "RINGCENTRAL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Token cache file
    #[arg(long)]
    pub token_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// List account extensions
    Extensions,

    /// Send an SMS from one of the account's numbers
    SendSms {
        /// Sender phone number
        #[arg(long)]
        from: String,
        /// Recipient phone number
        #[arg(long)]
        to: String,
        /// Message text
        #[arg(long)]
        text: String,
    },

    /// Subscribe a URL to finished calls that have recordings
    RecordingWebhook {
        /// Public URL receiving notifications
        #[arg(long)]
        address: String,
    },

    /// Subscribe a URL to answered outbound calls
    AnsweredWebhook {
        /// Public URL receiving notifications
        #[arg(long)]
        address: String,
    },

    /// Renew subscriptions expiring soon
    RenewWebhooks {
        /// Renew anything expiring within this many seconds
        #[arg(long, default_value_t = DEFAULT_RENEWAL_WINDOW)]
        within: u64,
    },

    /// List webhook subscriptions
    ListWebhooks,
}
