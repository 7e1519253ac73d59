//! `taxaudit audit` — reconcile a spreadsheet against the reference base.

use std::path::PathBuf;

use clap::Args;

use taxaudit_io::{reference, report, xlsx};
use taxaudit_recon::{run, ReconResult};

use crate::exit_codes::EXIT_UNMATCHED;
use crate::{CliError, Context};

#[derive(Args)]
pub struct AuditArgs {
    /// Spreadsheet (xlsx/xls/xlsb/ods) or CSV to audit
    pub file: PathBuf,

    /// Worksheet name (default: first sheet)
    #[arg(long)]
    pub sheet: Option<String>,

    /// Write the annotated report as xlsx (changed cells highlighted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Write the annotated report as CSV
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Print the full result as JSON to stdout
    #[arg(long)]
    pub json: bool,

    /// Exit with code 6 if any row with a description found no match
    #[arg(long)]
    pub strict: bool,
}

pub fn cmd_audit(ctx: &Context, args: AuditArgs) -> Result<(), CliError> {
    if let (Some(a), Some(b)) = (&args.output, &args.csv) {
        if a == b {
            return Err(CliError::args("--output and --csv point to the same file"));
        }
    }

    let rows = reference::read_audit_rows(&args.file, args.sheet.as_deref())?;

    let outcome = ctx.load_store();
    if outcome.store.is_empty() {
        log::warn!("no references loaded; every row will be reported unmatched");
    }

    let result = run(&rows, &outcome.store, &ctx.settings.policy);

    if args.output.is_some() || args.csv.is_some() {
        let table = report::build_report(&result.rows);
        if let Some(path) = &args.output {
            let exported = xlsx::export_report(&table, path)?;
            eprintln!("wrote {} ({})", path.display(), exported.summary());
        }
        if let Some(path) = &args.csv {
            taxaudit_io::csv::export_report(&table, path)?;
            eprintln!("wrote {}", path.display());
        }
    }

    if args.json {
        let out = serde_json::to_string_pretty(&result)
            .map_err(|e| CliError::args(format!("cannot serialize result: {e}")))?;
        println!("{}", out);
    }

    print_summary(&args, &result);

    let unmatched = result.summary.unmatched;
    if args.strict && unmatched > 0 {
        return Err(CliError {
            code: EXIT_UNMATCHED,
            message: format!(
                "{} row{} without a reference match",
                unmatched,
                if unmatched == 1 { "" } else { "s" }
            ),
            hint: Some("import the missing items with `taxaudit base import`".to_string()),
        });
    }

    Ok(())
}

fn print_summary(args: &AuditArgs, result: &ReconResult) {
    let s = &result.summary;
    eprintln!(
        "audited {}: {} rows against {} references",
        args.file.display(),
        s.total_rows,
        result.meta.store_size
    );
    eprintln!(
        "  matched:   {} (exact {}, keyword/code {}, fuzzy {})",
        s.matched(),
        s.matched_exact,
        s.matched_keyword,
        s.matched_fuzzy
    );
    eprintln!("  unmatched: {}", s.unmatched);
    if s.skipped > 0 {
        eprintln!("  skipped:   {} (no description)", s.skipped);
    }
    let f = &s.changed_by_field;
    eprintln!(
        "  changed:   {} cells (code {}, rate {}, regime {}, special {})",
        s.cells_changed, f.tax_code, f.tax_rate, f.tax_regime, f.special_code
    );
}
