//! File lifecycle commands.

use std::path::PathBuf;

use clap::Args;
use tokio_util::io::ReaderStream;

use dbox_core::error::{AppError, ErrorKind};
use dbox_service::UploadItem;

use super::{parse_file_id, parse_folder_id};
use crate::bootstrap::AppContext;
use crate::output::{self, OutputFormat};

/// Arguments for the upload command
#[derive(Debug, Args)]
pub struct UploadArgs {
    /// Local files to upload
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Target folder ID (root when omitted)
    #[arg(long)]
    pub folder: Option<String>,

    /// MIME type recorded for every file
    #[arg(long)]
    pub content_type: Option<String>,
}

/// A command that takes only a file ID
#[derive(Debug, Args)]
pub struct IdArgs {
    /// File ID
    pub id: String,
}

/// Arguments for the rename command
#[derive(Debug, Args)]
pub struct RenameArgs {
    /// File ID
    pub id: String,
    /// New file name
    pub name: String,
}

/// Arguments for the delete command
#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// File ID
    pub id: String,
    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for move and copy
#[derive(Debug, Args)]
pub struct FolderArgs {
    /// File ID
    pub id: String,
    /// Target folder ID (root when omitted)
    #[arg(long)]
    pub folder: Option<String>,
}

/// Arguments for the download command
#[derive(Debug, Args)]
pub struct DownloadArgs {
    /// Storage name of the blob
    pub storage_name: String,
    /// Write to this path instead of the storage name
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Upload files from disk
pub async fn upload(ctx: &AppContext, args: &UploadArgs, format: OutputFormat) -> Result<(), AppError> {
    let folder = parse_folder_id(args.folder.as_deref())?;

    let mut items = Vec::with_capacity(args.paths.len());
    for path in &args.paths {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| AppError::validation(format!("Not a file path: {}", path.display())))?
            .to_string();

        let file = tokio::fs::File::open(path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Validation,
                format!("Cannot open {}", path.display()),
                e,
            )
        })?;
        let size_bytes = file
            .metadata()
            .await
            .map(|m| m.len())
            .map_err(|e| AppError::with_source(ErrorKind::Internal, "Failed to stat file", e))?;

        items.push(UploadItem {
            name,
            content_type: args.content_type.clone(),
            size_bytes,
            stream: Box::pin(ReaderStream::new(file)),
        });
    }

    let results = ctx.coordinator.upload(folder, items).await?;

    let mut failed = 0;
    for (path, result) in args.paths.iter().zip(&results) {
        match result {
            Ok(file) => {
                output::print_success(&format!(
                    "Uploaded '{}' (id: {}, {} bytes)",
                    file.name, file.id, file.size_bytes
                ));
                if format == OutputFormat::Json {
                    output::print_file(file, format);
                }
            }
            Err(e) => {
                failed += 1;
                output::print_warning(&format!("{}: {}", path.display(), e));
            }
        }
    }

    if failed > 0 {
        return Err(AppError::new(
            ErrorKind::Internal,
            format!("{} of {} uploads failed", failed, results.len()),
        ));
    }
    Ok(())
}

/// Show a file record
pub async fn info(ctx: &AppContext, args: &IdArgs, format: OutputFormat) -> Result<(), AppError> {
    let file = ctx.coordinator.get_file_by_id(parse_file_id(&args.id)?).await?;
    output::print_file(&file, format);
    Ok(())
}

/// Print a file's name
pub async fn name(ctx: &AppContext, args: &IdArgs) -> Result<(), AppError> {
    let name = ctx.coordinator.get_file_name(parse_file_id(&args.id)?).await?;
    println!("{}", name);
    Ok(())
}

/// Rename a file
pub async fn rename(ctx: &AppContext, args: &RenameArgs, format: OutputFormat) -> Result<(), AppError> {
    let file = ctx
        .coordinator
        .rename(parse_file_id(&args.id)?, &args.name)
        .await?;
    output::print_success(&format!("Renamed to '{}'", file.name));
    output::print_file(&file, format);
    Ok(())
}

/// Move a file to the trash
pub async fn trash(ctx: &AppContext, args: &IdArgs, format: OutputFormat) -> Result<(), AppError> {
    let file = ctx.coordinator.trash(parse_file_id(&args.id)?).await?;
    output::print_success(&format!("'{}' moved to trash", file.name));
    output::print_file(&file, format);
    Ok(())
}

/// Restore a file from the trash
pub async fn restore(ctx: &AppContext, args: &IdArgs, format: OutputFormat) -> Result<(), AppError> {
    let file = ctx.coordinator.restore(parse_file_id(&args.id)?).await?;
    output::print_success(&format!("'{}' restored", file.name));
    output::print_file(&file, format);
    Ok(())
}

/// Permanently delete a file
pub async fn delete(ctx: &AppContext, args: &DeleteArgs) -> Result<(), AppError> {
    let id = parse_file_id(&args.id)?;
    let file = ctx.coordinator.get_file_by_id(id).await?;

    if !args.yes {
        let confirm = dialoguer::Confirm::new()
            .with_prompt(format!(
                "Permanently delete '{}' and its stored blob? This cannot be undone.",
                file.name
            ))
            .default(false)
            .interact()
            .map_err(|e| AppError::internal(format!("Prompt failed: {}", e)))?;

        if !confirm {
            println!("Aborted.");
            return Ok(());
        }
    }

    ctx.coordinator.delete_permanently(id).await?;
    output::print_success(&format!("'{}' permanently deleted", file.name));
    Ok(())
}

/// Move a file to another folder
pub async fn move_file(ctx: &AppContext, args: &FolderArgs, format: OutputFormat) -> Result<(), AppError> {
    let file = ctx
        .coordinator
        .move_file(parse_file_id(&args.id)?, parse_folder_id(args.folder.as_deref())?)
        .await?;
    output::print_file(&file, format);
    Ok(())
}

/// Copy a file into a folder
pub async fn copy(ctx: &AppContext, args: &FolderArgs, format: OutputFormat) -> Result<(), AppError> {
    let file = ctx
        .coordinator
        .copy(parse_file_id(&args.id)?, parse_folder_id(args.folder.as_deref())?)
        .await?;
    output::print_success(&format!("Copied as '{}' (id: {})", file.name, file.id));
    output::print_file(&file, format);
    Ok(())
}

/// Download a blob to disk
pub async fn download(ctx: &AppContext, args: &DownloadArgs) -> Result<(), AppError> {
    let data = ctx.coordinator.download(&args.storage_name).await?;
    let target = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&args.storage_name));

    tokio::fs::write(&target, &data).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Internal,
            format!("Failed to write {}", target.display()),
            e,
        )
    })?;

    output::print_success(&format!("Wrote {} bytes to {}", data.len(), target.display()));
    Ok(())
}
