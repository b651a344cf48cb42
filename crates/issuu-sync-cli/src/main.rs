mod commands;
mod config;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use issuu_sync::{DocumentSync, FileBinding};
use issuu_sync_http::IssuuClient;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "issuu-sync")]
#[command(about = "Upload, list and delete documents on Issuu")]
struct Cli {
    /// Path to the issuu.yml credentials file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    storage: StorageArgs,

    #[command(subcommand)]
    command: Command,
}

/// Where stored attachments live on disk.
#[derive(Args)]
struct StorageArgs {
    /// Storage layout of the attachments (AttachmentFu, Paperclip)
    #[arg(long, global = true, default_value = "AttachmentFu")]
    strategy: String,
    /// Public storage directory
    #[arg(long, global = true, default_value = "public")]
    root: PathBuf,
    /// Table (AttachmentFu) or attachment name (Paperclip)
    #[arg(long, global = true, default_value = "documents")]
    collection: String,
}

#[derive(Subcommand)]
enum Command {
    /// Upload a stored file as a new document
    Upload {
        /// Stored file name
        filename: String,
        /// Id of the record owning the file
        #[arg(long)]
        id: u64,
        /// Remote document name (3-50 chars of a-z, 0-9, _ . -)
        #[arg(long)]
        name: Option<String>,
        /// Document title
        #[arg(long)]
        title: Option<String>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// List documents on the account
    List {
        /// Print the listing as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a document by its remote name
    Delete {
        /// Remote document name
        name: String,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_sync(
    config_flag: Option<PathBuf>,
    storage: StorageArgs,
) -> Result<DocumentSync<IssuuClient>> {
    let path = config::resolve_config_path(config_flag)
        .context("could not determine config directory; pass --config")?;
    let binding = FileBinding::bind(&storage.strategy, storage.root, &storage.collection)?;

    tracing::debug!(path = %path.display(), "loading config");
    DocumentSync::load(IssuuClient::new(), &path, binding)
        .with_context(|| format!("failed to load config from {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let sync = build_sync(cli.config, cli.storage)?;

    match cli.command {
        Command::Upload {
            filename,
            id,
            name,
            title,
            json,
        } => {
            let request = commands::upload::UploadRequest {
                id,
                filename,
                name,
                title,
            };
            commands::upload::run(&sync, request, json).await
        }
        Command::List { json } => commands::list::run(&sync, json).await,
        Command::Delete { name } => commands::delete::run(&sync, &name).await,
    }
}
