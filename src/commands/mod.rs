//! CLI command definitions and dispatch.

pub mod file;
pub mod maintenance;
pub mod migrate;
pub mod worker;

use clap::{Parser, Subcommand};

use dbox_core::config::AppConfig;
use dbox_core::error::AppError;
use dbox_core::types::{FileId, FolderId};

use crate::bootstrap::AppContext;
use crate::output::OutputFormat;

/// DBox: cloud file storage backend
#[derive(Debug, Parser)]
#[command(name = "dbox", version, about, long_about = None)]
pub struct Cli {
    /// Path to the base configuration file
    #[arg(short, long, default_value = "config/default.toml", env = "DBOX_CONFIG")]
    pub config: String,

    /// Environment overlay loaded from the config directory
    #[arg(short, long, default_value = "development", env = "DBOX_ENV")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Upload local files
    Upload(file::UploadArgs),
    /// Show a file record
    Info(file::IdArgs),
    /// Print a file's name
    Name(file::IdArgs),
    /// Rename a file
    Rename(file::RenameArgs),
    /// Move a file to the trash
    Trash(file::IdArgs),
    /// Restore a file from the trash
    Restore(file::IdArgs),
    /// Delete a file and its blob permanently
    Delete(file::DeleteArgs),
    /// Move a file to another folder
    Move(file::FolderArgs),
    /// Copy a file into a folder
    Copy(file::FolderArgs),
    /// Download a blob by storage name
    Download(file::DownloadArgs),
    /// Run database migrations
    Migrate,
    /// Run one orphan sweep now
    Sweep,
    /// List pending orphan ledger entries
    Orphans(maintenance::OrphansArgs),
    /// Run the scheduled worker until interrupted
    Worker,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: AppConfig) -> Result<(), AppError> {
        if let Commands::Migrate = &self.command {
            return migrate::execute(&config).await;
        }

        let ctx = AppContext::build(config).await?;
        let format = self.format;

        match &self.command {
            Commands::Upload(args) => file::upload(&ctx, args, format).await,
            Commands::Info(args) => file::info(&ctx, args, format).await,
            Commands::Name(args) => file::name(&ctx, args).await,
            Commands::Rename(args) => file::rename(&ctx, args, format).await,
            Commands::Trash(args) => file::trash(&ctx, args, format).await,
            Commands::Restore(args) => file::restore(&ctx, args, format).await,
            Commands::Delete(args) => file::delete(&ctx, args).await,
            Commands::Move(args) => file::move_file(&ctx, args, format).await,
            Commands::Copy(args) => file::copy(&ctx, args, format).await,
            Commands::Download(args) => file::download(&ctx, args).await,
            Commands::Sweep => maintenance::sweep(&ctx, format).await,
            Commands::Orphans(args) => maintenance::orphans(&ctx, args, format).await,
            Commands::Worker => worker::execute(&ctx).await,
            Commands::Migrate => Ok(()),
        }
    }
}

/// Helper: parse a file identifier argument
pub fn parse_file_id(raw: &str) -> Result<FileId, AppError> {
    raw.parse()
        .map_err(|e| AppError::validation(format!("Invalid file ID '{}': {}", raw, e)))
}

/// Helper: parse an optional folder identifier argument
pub fn parse_folder_id(raw: Option<&str>) -> Result<Option<FolderId>, AppError> {
    raw.map(|r| {
        r.parse()
            .map_err(|e| AppError::validation(format!("Invalid folder ID '{}': {}", r, e)))
    })
    .transpose()
}
