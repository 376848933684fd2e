///
/// This module implements the CLI interface for sharepoint-drive: command
/// parsing, client construction and user-visible output.
///
/// All path handling, folder resolution and error classification live in the
/// [`sharepoint-drive-core`] crate. This module is CLI glue only.
///
/// ## How To Use
/// - For command-line users: run the `sharepoint-drive` binary with `--help`.
/// - For programmatic/integration use: call [`run`] with a constructed [`Cli`].
///
/// [`sharepoint-drive-core`]: ../../sharepoint-drive-core/
use crate::auth::StaticTokenProvider;
use crate::graph::GraphClient;
use crate::load_config::load_config;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sharepoint_drive_core::library::DocumentLibrary;
use std::path::PathBuf;
use std::sync::Arc;

/// CLI for sharepoint-drive: folders, files and share links in a SharePoint document library.
#[derive(Parser)]
#[clap(
    name = "sharepoint-drive",
    version,
    about = "Create folders, upload and download files, and share links in a SharePoint document library"
)]
pub struct Cli {
    /// Path to the YAML config file
    #[clap(long)]
    pub config: PathBuf,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the id of the item at a path, if there is one
    Find {
        /// Slash-delimited path inside the library
        path: String,
    },
    /// Create every missing folder along a path
    Mkdir {
        /// Slash-delimited folder path, e.g. folders/path/xxx
        path: String,
    },
    /// Upload a local file, creating its folder path first
    Upload {
        /// Local file to upload
        file: PathBuf,
        /// Destination folder inside the library (library root when omitted)
        #[clap(long, default_value = "")]
        folder: String,
        /// Remote file name (defaults to the local file name)
        #[clap(long)]
        name: Option<String>,
    },
    /// Download a file from the library
    Download {
        /// Slash-delimited path of the remote file
        path: String,
        /// Where to write the content
        #[clap(long, short)]
        output: PathBuf,
    },
    /// Create a view link to a file or folder
    Link {
        /// Slash-delimited path of the remote item
        path: String,
        /// Only users who already have access can open the link
        #[clap(long)]
        private: bool,
    },
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    // Emit a top-level 'trace_initialised' event at the very start
    tracing::info!("trace_initialised");

    let config = load_config(&cli.config)?;
    let tokens = Arc::new(StaticTokenProvider::new(config.access_token));
    let resolver = config.drive.resolver;
    let client = GraphClient::connect(&config.drive.sharepoint, tokens)
        .await
        .context("Failed to connect to the document library")?
        .with_folder_conflict(resolver.conflict_behavior);
    let library = DocumentLibrary::new(client, resolver);

    match cli.command {
        Commands::Find { path } => {
            tracing::info!(command = "find", %path, "Looking up item");
            match library.find_item(&path).await? {
                Some(item) => println!("{item}"),
                None => println!("Not found: {path}"),
            }
            Ok(())
        }
        Commands::Mkdir { path } => {
            tracing::info!(command = "mkdir", %path, "Ensuring folder path");
            let report = library.create_folders(&path).await?;
            println!(
                "Folder path ready: {} created, {} already present.",
                report.created.len(),
                report.existing.len()
            );
            Ok(())
        }
        Commands::Upload { file, folder, name } => {
            let name = match name {
                Some(name) => name,
                None => file
                    .file_name()
                    .and_then(|n| n.to_str())
                    .map(str::to_string)
                    .with_context(|| format!("Cannot derive a file name from {:?}", file))?,
            };
            let content = std::fs::read(&file)
                .with_context(|| format!("Failed to read local file {:?}", file))?;
            tracing::info!(command = "upload", %folder, %name, size = content.len(), "Uploading file");
            let item = library.upload(&folder, &name, content).await?;
            println!("Uploaded {name} ({item})");
            Ok(())
        }
        Commands::Download { path, output } => {
            tracing::info!(command = "download", %path, "Downloading file");
            let bytes = library.download(&path).await?;
            std::fs::write(&output, &bytes)
                .with_context(|| format!("Failed to write {:?}", output))?;
            println!("Downloaded {} bytes to {}", bytes.len(), output.display());
            Ok(())
        }
        Commands::Link { path, private } => {
            tracing::info!(command = "link", %path, private, "Creating share link");
            let url = if private {
                library.create_private_url(&path).await?
            } else {
                library.create_public_url(&path).await?
            };
            println!("{url}");
            Ok(())
        }
    }
}
