//! Merchants command - list, bulk delete and import merchants

use std::collections::HashMap;
use std::num::NonZeroU32;
use std::path::PathBuf;

use clap::Subcommand;

use crate::domain::merchant::Merchant;
use crate::infrastructure::http::HttpTransport;
use crate::infrastructure::services::{ImportFile, MerchantService, Page};

use super::print_json;

#[derive(Subcommand, Clone)]
pub enum MerchantsCommand {
    /// List merchants, all pages unless `--page` is given
    List {
        /// 1-based page number
        #[arg(long)]
        page: Option<NonZeroU32>,

        /// Free-text search
        #[arg(long, short)]
        search: Option<String>,
    },

    /// Delete merchants by id
    Delete {
        #[arg(required = true)]
        ids: Vec<u64>,
    },

    /// Import merchants from a spreadsheet or CSV file
    Import {
        file: PathBuf,

        /// Column header to merchant field, e.g. `--map "Shop Name=title"`
        #[arg(long = "map", value_parser = parse_header_mapping)]
        mappings: Vec<(String, String)>,
    },
}

pub async fn run(command: MerchantsCommand) -> anyhow::Result<()> {
    let services = super::bootstrap()?;
    execute(&services.merchants, command).await
}

async fn execute<T: HttpTransport>(
    service: &MerchantService<T>,
    command: MerchantsCommand,
) -> anyhow::Result<()> {
    match command {
        MerchantsCommand::List { page, search } => {
            let page = page.map_or(Page::All, Page::Number);
            let params: HashMap<String, String> =
                search.into_iter().map(|s| ("s".to_string(), s)).collect();

            let merchants = service.get_all(&Merchant::default(), &params, page).await?;
            print_json(&merchants)
        }
        MerchantsCommand::Delete { ids } => print_json(&service.bulk_delete(&ids).await?),
        MerchantsCommand::Import { file, mappings } => {
            let file = ImportFile::from_path(&file).await?;
            let header_mapping: HashMap<String, String> = mappings.into_iter().collect();

            print_json(&service.import_from_file(file, &header_mapping).await?)
        }
    }
}

fn parse_header_mapping(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((header, field)) if !header.trim().is_empty() && !field.trim().is_empty() => {
            Ok((header.trim().to_string(), field.trim().to_string()))
        }
        _ => Err(format!("expected HEADER=FIELD, got '{}'", raw)),
    }
}
