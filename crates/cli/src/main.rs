// taxaudit CLI - reconcile tax line-item spreadsheets against a curated reference base

mod audit;
mod base;
mod exit_codes;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use env_logger::Env;

use taxaudit_config::Settings;
use taxaudit_io::{reference, IoError, LoadOutcome, LoadSource};

use exit_codes::{io_exit_code, EXIT_CONFIG, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "taxaudit")]
#[command(about = "Propagate approved tax classifications onto spreadsheet line items")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Reference store file (overrides the settings file)
    #[arg(long, global = true, env = "TAXAUDIT_STORE")]
    store: Option<PathBuf>,

    /// Spreadsheet imported when the reference store is missing or empty
    #[arg(long, global = true, env = "TAXAUDIT_SEED")]
    seed: Option<PathBuf>,

    /// Settings file (default: platform config dir)
    #[arg(long, global = true, env = "TAXAUDIT_CONFIG")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the reference base
    #[command(subcommand)]
    Base(base::BaseCommands),

    /// Reconcile a spreadsheet against the reference base
    #[command(after_help = "\
Examples:
  taxaudit audit notas.xlsx -o notas.audit.xlsx
  taxaudit audit notas.csv --csv out.csv --strict
  taxaudit audit notas.xlsx --sheet Itens --json > result.json")]
    Audit(audit::AuditArgs),

    /// Inspect settings
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the effective settings as TOML
    Show,
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  taxaudit-recon ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("TARGET"),
    )
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = Context::resolve(&cli).and_then(|ctx| match cli.command {
        Commands::Base(cmd) => base::cmd_base(&ctx, cmd),
        Commands::Audit(args) => audit::cmd_audit(&ctx, args),
        Commands::Config(ConfigCommands::Show) => cmd_config_show(&ctx),
    });

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self { code: EXIT_CONFIG, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<IoError> for CliError {
    fn from(err: IoError) -> Self {
        let hint = match &err {
            IoError::MissingColumn { .. } => {
                Some("required columns are description, tax code (NCM) and tax rate (aliq. ICMS)".to_string())
            }
            IoError::SheetNotFound(_) => Some("omit --sheet to use the first worksheet".to_string()),
            _ => None,
        };
        Self { code: io_exit_code(&err), message: err.to_string(), hint }
    }
}

/// Settings with command-line overrides applied.
pub struct Context {
    pub settings: Settings,
    pub config_path: PathBuf,
    pub store_path: PathBuf,
    pub seed: Option<PathBuf>,
}

impl Context {
    fn resolve(cli: &Cli) -> Result<Self, CliError> {
        let settings = match &cli.config {
            Some(path) => Settings::load_from(path),
            None => Settings::load(),
        }
        .map_err(|e| CliError::config(e).with_hint("fix or remove the settings file, or pass --config"))?;
        let config_path = cli.config.clone().unwrap_or_else(Settings::config_path);

        let store_path = cli.store.clone().unwrap_or_else(|| settings.store_path());
        let seed = cli.seed.clone().or_else(|| settings.seed.clone());

        Ok(Self { settings, config_path, store_path, seed })
    }

    /// Load the reference store, seeding it when needed.
    pub fn load_store(&self) -> LoadOutcome {
        let outcome = reference::load(&self.store_path, self.seed.as_deref());
        match outcome.source {
            LoadSource::Persisted => {}
            LoadSource::Seeded => eprintln!(
                "seeded reference store with {} entries ({})",
                outcome.store.len(),
                self.store_path.display()
            ),
            LoadSource::Empty => eprintln!("reference store is empty ({})", self.store_path.display()),
        }
        if outcome.has_warnings() {
            eprintln!(
                "warning: {} problem{} while loading the reference store (see log above)",
                outcome.warnings.len(),
                if outcome.warnings.len() == 1 { "" } else { "s" }
            );
        }
        outcome
    }
}

// ============================================================================
// config show
// ============================================================================

fn cmd_config_show(ctx: &Context) -> Result<(), CliError> {
    let mut effective = ctx.settings.clone();
    effective.store = Some(ctx.store_path.clone());
    effective.seed = ctx.seed.clone();

    let text = effective.to_toml().map_err(CliError::config)?;
    println!("# {}", ctx.config_path.display());
    print!("{}", text);
    Ok(())
}
