//! smslog - command line access to the SMS archive
//!
//! Commands:
//! - `ingest`: store one message locally, with duplicate suppression
//! - `list`, `conversations`, `stats`: read the record log
//! - `push`: forward one message to the configured remote server
//! - `paths`: show where config, data and logs live
//!
//! Uses XDG Base Directory specification for file locations:
//! - Record log: $XDG_DATA_HOME/smslog/messages.txt
//! - Fingerprint index: $XDG_DATA_HOME/smslog/message_hashes.txt
//! - Config: $XDG_CONFIG_HOME/smslog/config.toml

mod message_format;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use smslog_core::forward::SyncForwarder;
use smslog_core::ingest::IngestForm;
use smslog_core::{
    logging, Config, ConversationGrouper, FileLogStore, IngestOutcome, IngestPipeline,
    IngestResponse, LogReader, LogStats, MessageEvent, MessageView,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "smslog")]
#[command(about = "Personal SMS archive")]
#[command(version)]
struct Cli {
    /// Verbose output (write logs to the state directory)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Directory holding the record log and fingerprint index
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Store one message in the local archive
    Ingest(EventArgs),

    /// List stored messages in log order
    List {
        /// Print `[{"sender","timestamp","message"}]` JSON
        #[arg(long)]
        json: bool,
    },

    /// List conversations, most recently active first
    Conversations {
        /// Print full conversations as JSON
        #[arg(long)]
        json: bool,

        /// Characters of the latest message to preview
        #[arg(long, default_value = "50")]
        preview: usize,
    },

    /// Show message counts by direction
    Stats {
        #[arg(long)]
        json: bool,
    },

    /// Forward one message to `forward.server_url`
    Push {
        #[command(flatten)]
        event: EventArgs,

        /// Server URL, overriding `forward.server_url`
        #[arg(long)]
        url: Option<String>,
    },

    /// Show config, data and log paths
    Paths,
}

/// Fields of one message, in either the current or the legacy shape.
#[derive(Args)]
struct EventArgs {
    /// Phone number or sender id
    #[arg(long, conflicts_with = "sender")]
    address: Option<String>,

    /// Legacy form of --address; implies --type received
    #[arg(long)]
    sender: Option<String>,

    /// Message text
    #[arg(long)]
    body: String,

    /// Epoch milliseconds (default: now)
    #[arg(long)]
    timestamp: Option<i64>,

    /// `sent` or `received`
    #[arg(long = "type")]
    kind: Option<String>,
}

impl EventArgs {
    fn into_event(self) -> smslog_core::Result<MessageEvent> {
        let timestamp = self
            .timestamp
            .unwrap_or_else(|| chrono::Utc::now().timestamp_millis());

        IngestForm {
            address: self.address,
            sender: self.sender,
            body: Some(self.body),
            timestamp: Some(timestamp.to_string()),
            kind: self.kind,
        }
        .into_event()
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    Config::ensure_xdg_env();

    let mut config = Config::load().context("failed to load configuration")?;
    if let Some(dir) = cli.data_dir {
        config.storage.data_dir = Some(dir);
    }

    let _log_guard = if cli.verbose {
        Some(logging::init(&config.logging).context("failed to initialize logging")?)
    } else {
        None
    };
    tracing::debug!(
        log = %config.storage.log_path().display(),
        "smslog starting"
    );

    match cli.command {
        Command::Ingest(event) => cmd_ingest(&config, event),
        Command::List { json } => cmd_list(&config, json),
        Command::Conversations { json, preview } => cmd_conversations(&config, json, preview),
        Command::Stats { json } => cmd_stats(&config, json),
        Command::Push { event, url } => cmd_push(&config, event, url),
        Command::Paths => cmd_paths(&config),
    }
}

fn open_store(config: &Config) -> Arc<FileLogStore> {
    Arc::new(FileLogStore::from_config(&config.storage))
}

fn cmd_ingest(config: &Config, args: EventArgs) -> Result<()> {
    let event = args.into_event()?;
    let offset = config.storage.display_offset()?;
    let pipeline = IngestPipeline::new(open_store(config), offset);

    match pipeline.ingest(&event)? {
        IngestOutcome::Appended { record } => {
            println!("Stored: {}", message_format::record_row(&record));
        }
        IngestOutcome::Duplicate { fingerprint } => {
            println!("Duplicate: already stored (hash {})", fingerprint);
        }
    }
    Ok(())
}

fn cmd_list(config: &Config, json: bool) -> Result<()> {
    let reader = LogReader::new(open_store(config));
    let records = reader.records().context("failed to read record log")?;

    if json {
        let views: Vec<MessageView> = records.iter().map(MessageView::from).collect();
        println!("{}", serde_json::to_string_pretty(&views)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No messages stored yet.");
        return Ok(());
    }
    for record in &records {
        println!("{}", message_format::record_row(record));
    }
    Ok(())
}

fn cmd_conversations(config: &Config, json: bool, preview_chars: usize) -> Result<()> {
    let reader = LogReader::new(open_store(config));
    let records = reader.records().context("failed to read record log")?;
    let conversations = ConversationGrouper::new().group(records);

    if json {
        println!("{}", serde_json::to_string_pretty(&conversations)?);
        return Ok(());
    }

    if conversations.is_empty() {
        println!("No conversations yet.");
        return Ok(());
    }
    for conversation in &conversations {
        println!(
            "{}",
            message_format::conversation_row(conversation, preview_chars)
        );
    }
    Ok(())
}

fn cmd_stats(config: &Config, json: bool) -> Result<()> {
    let reader = LogReader::new(open_store(config));
    let stats = LogStats::collect(reader.read_all()?).context("failed to read record log")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("{}", message_format::stats_block(&stats));
    }
    Ok(())
}

fn cmd_push(config: &Config, args: EventArgs, url: Option<String>) -> Result<()> {
    let mut forward = config.forward.clone();
    if let Some(url) = url {
        forward.server_url = Some(url);
    }
    if !forward.is_ready() {
        bail!("no server configured: set forward.server_url in config.toml or pass --url");
    }

    let event = args.into_event()?;
    let forwarder = SyncForwarder::new(&forward).context("failed to create forwarder")?;

    match forwarder.push(&event)? {
        IngestResponse::Success => println!("Pushed to {}", forwarder.url()),
        IngestResponse::Duplicate { hash, .. } => {
            println!("Already on server (hash {})", hash)
        }
        IngestResponse::Error { message } => bail!("server rejected message: {}", message),
    }
    Ok(())
}

fn cmd_paths(config: &Config) -> Result<()> {
    println!("Config:            {}", Config::config_path().display());
    println!("Record log:        {}", config.storage.log_path().display());
    println!("Fingerprint index: {}", config.storage.index_path().display());
    println!("Logs:              {}", logging::log_file_path().display());
    Ok(())
}
