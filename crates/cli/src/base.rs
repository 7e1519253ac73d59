//! `taxaudit base` — manage the reference base.

use std::path::PathBuf;

use clap::Subcommand;
use serde_json::json;

use taxaudit_io::reference;

use crate::{CliError, Context};

#[derive(Subcommand)]
pub enum BaseCommands {
    /// Merge a reference spreadsheet into the store and save it
    #[command(after_help = "\
Examples:
  taxaudit base import base.xlsx
  taxaudit base import base.ods --sheet Produtos")]
    Import {
        /// Spreadsheet (xlsx/xls/xlsb/ods) or CSV with description, tax code and tax rate columns
        file: PathBuf,

        /// Worksheet name (default: first sheet)
        #[arg(long)]
        sheet: Option<String>,
    },

    /// List reference entries
    #[command(after_help = "\
Examples:
  taxaudit base list
  taxaudit base list --search arroz
  taxaudit base list --search 1006 --json")]
    List {
        /// Case-insensitive substring over description and tax fields
        #[arg(long)]
        search: Option<String>,

        /// Output JSON to stdout
        #[arg(long)]
        json: bool,
    },
}

pub fn cmd_base(ctx: &Context, cmd: BaseCommands) -> Result<(), CliError> {
    match cmd {
        BaseCommands::Import { file, sheet } => cmd_base_import(ctx, file, sheet),
        BaseCommands::List { search, json } => cmd_base_list(ctx, search, json),
    }
}

fn cmd_base_import(ctx: &Context, file: PathBuf, sheet: Option<String>) -> Result<(), CliError> {
    let outcome = ctx.load_store();
    if let Some(e) = outcome.read_error() {
        return Err(CliError::from(e.clone())
            .with_hint("fix or move the existing reference store; it was not modified"));
    }
    let mut store = outcome.store;
    let counts = reference::import_reference(&mut store, &file, sheet.as_deref())?;

    reference::save(&store, &ctx.store_path).map_err(|e| {
        CliError::from(e).with_hint("the previous reference store was left unchanged")
    })?;

    eprintln!(
        "imported {}: {} added, {} updated ({} total, saved to {})",
        file.display(),
        counts.added,
        counts.updated,
        store.len(),
        ctx.store_path.display()
    );
    Ok(())
}

fn cmd_base_list(ctx: &Context, search: Option<String>, json_output: bool) -> Result<(), CliError> {
    let store = ctx.load_store().store;
    let entries = store.search(search.as_deref().unwrap_or(""));

    if json_output {
        let items: Vec<serde_json::Value> = entries
            .iter()
            .map(|(description, record)| {
                json!({
                    "description": description,
                    "tax_code": record.tax_code,
                    "tax_rate": record.tax_rate,
                    "tax_regime": record.tax_regime,
                    "special_code": record.special_code,
                })
            })
            .collect();
        let out = serde_json::to_string_pretty(&items)
            .map_err(|e| CliError::args(format!("cannot serialize entries: {e}")))?;
        println!("{}", out);
        return Ok(());
    }

    let width = entries
        .iter()
        .map(|(d, _)| d.chars().count())
        .max()
        .unwrap_or(0)
        .max("DESCRIPTION".len());

    println!(
        "{:<width$}  {:<10}  {:<8}  {:<10}  {}",
        "DESCRIPTION", "TAX CODE", "RATE", "REGIME", "SPECIAL",
    );
    for (description, record) in &entries {
        println!(
            "{:<width$}  {:<10}  {:<8}  {:<10}  {}",
            description, record.tax_code, record.tax_rate, record.tax_regime, record.special_code,
        );
    }
    eprintln!("{} of {} entries", entries.len(), store.len());
    Ok(())
}
