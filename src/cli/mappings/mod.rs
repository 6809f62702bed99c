//! Mappings command - list, bulk save and bulk delete field label mappings

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Subcommand;

use crate::domain::mapping::FieldLabelMapping;
use crate::infrastructure::http::HttpTransport;
use crate::infrastructure::services::MerchantMappingService;

use super::print_json;

#[derive(Subcommand, Clone)]
pub enum MappingsCommand {
    /// Print every mapping grouped by field
    List,

    /// Bulk save groups read from a JSON file
    Save {
        /// JSON array of `{"field", "mappings": [...]}` groups
        file: PathBuf,
    },

    /// Delete all mappings of the given fields
    DeleteFields {
        #[arg(required = true)]
        fields: Vec<String>,
    },
}

pub async fn run(command: MappingsCommand) -> anyhow::Result<()> {
    let services = super::bootstrap()?;
    execute(&services.mappings, command).await
}

async fn execute<T: HttpTransport>(
    service: &MerchantMappingService<T>,
    command: MappingsCommand,
) -> anyhow::Result<()> {
    match command {
        MappingsCommand::List => print_json(&service.load_all_mappings().await?),
        MappingsCommand::Save { file } => {
            let groups = read_groups(&file).await?;
            print_json(&service.bulk_save_mappings(&groups).await?)
        }
        MappingsCommand::DeleteFields { fields } => {
            print_json(&service.bulk_delete_by_fields(fields).await?)
        }
    }
}

async fn read_groups(path: &Path) -> anyhow::Result<Vec<FieldLabelMapping>> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    serde_json::from_str(&raw)
        .with_context(|| format!("Invalid mapping groups in {}", path.display()))
}
