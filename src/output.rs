//! Table and JSON output formatting for CLI commands.

use serde::Serialize;
use tabled::{Table, Tabled};

use dbox_entity::{File, OrphanBlob};

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
}

/// Table row for a file record
#[derive(Debug, Serialize, Tabled)]
pub struct FileRow {
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Folder")]
    pub folder: String,
    #[tabled(rename = "Type")]
    pub content_type: String,
    #[tabled(rename = "Size")]
    pub size_bytes: i64,
    #[tabled(rename = "State")]
    pub state: String,
    #[tabled(rename = "Locator")]
    pub locator: String,
}

impl From<&File> for FileRow {
    fn from(file: &File) -> Self {
        Self {
            id: file.id.to_string(),
            name: file.name.clone(),
            folder: file
                .folder_id
                .map(|f| f.to_string())
                .unwrap_or_else(|| "/".to_string()),
            content_type: file.content_type.clone(),
            size_bytes: file.size_bytes,
            state: match file.state.deleted_at() {
                Some(at) => format!("trashed {}", at.format("%Y-%m-%d %H:%M")),
                None => "active".to_string(),
            },
            locator: file.locator.clone(),
        }
    }
}

/// Table row for an orphan ledger entry
#[derive(Debug, Serialize, Tabled)]
pub struct OrphanRow {
    #[tabled(rename = "Key")]
    pub storage_key: String,
    #[tabled(rename = "Reason")]
    pub reason: String,
    #[tabled(rename = "Attempts")]
    pub attempts: i32,
    #[tabled(rename = "Recorded")]
    pub recorded_at: String,
}

impl From<&OrphanBlob> for OrphanRow {
    fn from(entry: &OrphanBlob) -> Self {
        Self {
            storage_key: entry.storage_key.clone(),
            reason: entry.reason.clone(),
            attempts: entry.attempts,
            recorded_at: entry.recorded_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

/// Print a list of items in the selected format
pub fn print_list<T: Serialize + Tabled>(items: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if items.is_empty() {
                println!("No results found.");
            } else {
                println!("{}", Table::new(items));
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(items).unwrap_or_else(|_| "[]".to_string());
            println!("{}", json);
        }
    }
}

/// Print one file record in the selected format
pub fn print_file(file: &File, format: OutputFormat) {
    match format {
        OutputFormat::Table => println!("{}", Table::new([FileRow::from(file)])),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(file).unwrap_or_else(|_| "{}".to_string());
            println!("{}", json);
        }
    }
}

/// Print a serializable value in the selected format
pub fn print_item<T: Serialize + std::fmt::Debug>(item: &T, format: OutputFormat) {
    match format {
        OutputFormat::Table => println!("{:#?}", item),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(item).unwrap_or_else(|_| "{}".to_string());
            println!("{}", json);
        }
    }
}

/// Print a success message
pub fn print_success(msg: &str) {
    println!("✓ {}", msg);
}

/// Print a warning message
pub fn print_warning(msg: &str) {
    println!("⚠ {}", msg);
}

/// Print an error message
pub fn print_error(msg: &str) {
    eprintln!("✗ {}", msg);
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:<24} {}", format!("{}:", key), value);
}
