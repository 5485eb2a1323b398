//! Orphan ledger commands.

use clap::Args;

use dbox_core::error::AppError;
use dbox_database::store::OrphanStore;

use crate::bootstrap::AppContext;
use crate::output::{self, OrphanRow, OutputFormat};

/// Arguments for the orphans command
#[derive(Debug, Args)]
pub struct OrphansArgs {
    /// Maximum entries to show
    #[arg(short, long, default_value_t = 50)]
    pub limit: u32,
}

/// Run one orphan sweep and report what it did
pub async fn sweep(ctx: &AppContext, format: OutputFormat) -> Result<(), AppError> {
    let report = ctx.coordinator.sweep_orphans().await?;

    match format {
        OutputFormat::Json => output::print_item(&report, format),
        OutputFormat::Table => {
            println!("Orphan sweep:");
            output::print_kv("Examined", &report.examined.to_string());
            output::print_kv("Reclaimed", &report.reclaimed.to_string());
            output::print_kv("Still referenced", &report.retained.to_string());
            output::print_kv("Failed", &report.failed.to_string());
        }
    }
    Ok(())
}

/// List the oldest ledger entries
pub async fn orphans(ctx: &AppContext, args: &OrphansArgs, format: OutputFormat) -> Result<(), AppError> {
    let entries = ctx.db.repositories().orphans.list_oldest(args.limit).await?;
    let rows: Vec<OrphanRow> = entries.iter().map(OrphanRow::from).collect();
    output::print_list(&rows, format);
    Ok(())
}
