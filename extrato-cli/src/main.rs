use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use extrato_core::{CardDirectory, TransactionStore};
use extrato_finance::{KeywordClassifier, SqliteStore};
use extrato_ingest::{ManualEntry, StatementInput, StatementParser};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod output;
mod state;

use output::OutputFormat;

#[derive(Parser, Debug)]
#[command(
    name = "extrato",
    version,
    about = "Turn bank statement text into categorized movements"
)]
struct Cli {
    /// Config file (default: ~/.extrato/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging (EXTRATO_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse extracted statement text; each file is one page
    Parse {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Skip detection and use `institution:mode`, e.g. `mercado_pago:mp_bill`
        #[arg(long)]
        mode_key: Option<String>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,

        /// Insert the parsed movements into the database as one batch
        #[arg(long)]
        commit: bool,

        /// Year for "DD/MM" invoice dates (default: current year)
        #[arg(long)]
        year: Option<i32>,
    },

    /// Print the detected institution and mode
    Detect {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Enter a single movement by hand
    Manual {
        /// Date as DD-MM-YYYY
        #[arg(long)]
        date: String,

        /// Amount as printed, e.g. "r$ -45,90"
        #[arg(long, allow_hyphen_values = true)]
        value: String,

        /// Registry institution key (default: mercado_pago)
        #[arg(long)]
        institution: Option<String>,

        #[arg(long)]
        transaction_id: Option<String>,

        #[arg(long)]
        counterparty: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// PIX, DEBIT, CREDIT or REVENUE
        #[arg(long)]
        method: Option<String>,

        #[arg(long)]
        card_id: Option<i64>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,

        #[arg(long)]
        commit: bool,
    },

    /// Card directory used to resolve card ids on invoices
    Cards {
        #[command(subcommand)]
        command: CardsCommand,
    },

    /// Write the default config file
    InitConfig,
}

#[derive(Subcommand, Debug)]
enum CardsCommand {
    /// Register a full card number
    Add {
        id: i64,

        #[arg(long)]
        label: Option<String>,
    },

    /// List registered cards in lookup order
    List,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli.config.as_deref();

    match cli.command {
        Command::Parse {
            files,
            mode_key,
            output,
            commit,
            year,
        } => {
            let cfg = config::load_config(config_path)?;
            let pages = read_pages(&files)?;
            let db_path = cfg.database_path()?;
            let mut store = open_store(&db_path, commit)?;

            let txns = {
                let classifier = KeywordClassifier::new();
                let mut parser = StatementParser::new(&cfg.registry, &classifier);
                if let Some(y) = year {
                    parser = parser.with_current_year(y);
                }
                if let Some(key) = &mode_key {
                    let (institution, mode) = split_mode_key(key)?;
                    parser = parser.with_format(institution, mode)?;
                }
                if let Some(s) = &store {
                    parser = parser.with_card_directory(s);
                }
                parser
                    .parse(StatementInput::Pages(pages))
                    .with_context(|| format!("parsing {}", describe(&files)))?
            };

            output::write_transactions(std::io::stdout().lock(), &txns, output)?;
            if commit {
                commit_batch(store.as_mut(), &txns, &db_path)?;
            }
        }

        Command::Detect { files } => {
            let cfg = config::load_config(config_path)?;
            let pages = read_pages(&files)?;
            let classifier = KeywordClassifier::new();
            let parser = StatementParser::new(&cfg.registry, &classifier);
            let d = parser
                .detect(&pages)
                .with_context(|| format!("detecting {}", describe(&files)))?;
            println!("{} ({}) mode {}", d.display_name, d.institution_key, d.mode_key);
        }

        Command::Manual {
            date,
            value,
            institution,
            transaction_id,
            counterparty,
            description,
            method,
            card_id,
            output,
            commit,
        } => {
            let cfg = config::load_config(config_path)?;
            let entry = ManualEntry {
                institution_key: institution,
                transaction_id,
                date,
                value,
                counterparty,
                description,
                method,
                card_id,
            };
            let classifier = KeywordClassifier::new();
            let txns = StatementParser::new(&cfg.registry, &classifier)
                .parse(StatementInput::Manual(entry))
                .context("manual entry")?;

            output::write_transactions(std::io::stdout().lock(), &txns, output)?;
            if commit {
                let db_path = cfg.database_path()?;
                let mut store = open_store(&db_path, true)?;
                commit_batch(store.as_mut(), &txns, &db_path)?;
            }
        }

        Command::Cards { command } => {
            let cfg = config::load_config(config_path)?;
            let db_path = cfg.database_path()?;
            let store = SqliteStore::open(&db_path).with_context(|| format!("open {}", db_path.display()))?;
            match command {
                CardsCommand::Add { id, label } => {
                    store.add_card(id, label.as_deref())?;
                    println!("Added card {id}");
                }
                CardsCommand::List => {
                    for id in store.list_cards()? {
                        println!("{id}");
                    }
                }
            }
        }

        Command::InitConfig => config::init_config(config_path)?,
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env("EXTRATO_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_pages(files: &[PathBuf]) -> Result<Vec<String>> {
    files
        .iter()
        .map(|p| std::fs::read_to_string(p).with_context(|| format!("read {}", p.display())))
        .collect()
}

fn describe(files: &[PathBuf]) -> String {
    files
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn split_mode_key(key: &str) -> Result<(&str, &str)> {
    match key.split_once(':') {
        Some((institution, mode)) if !institution.is_empty() && !mode.is_empty() => Ok((institution, mode)),
        _ => bail!("--mode-key must look like institution:mode, got '{key}'"),
    }
}

/// The database doubles as the card directory, so an existing file is opened
/// read-only even without `--commit`.
fn open_store(db_path: &Path, commit: bool) -> Result<Option<SqliteStore>> {
    let store = if commit {
        SqliteStore::open(db_path)
    } else if db_path.exists() {
        SqliteStore::open_read_only(db_path)
    } else {
        return Ok(None);
    };
    let store = store.with_context(|| format!("open {}", db_path.display()))?;
    Ok(Some(store))
}

fn commit_batch(store: Option<&mut SqliteStore>, txns: &[extrato_core::Transaction], db_path: &Path) -> Result<()> {
    let Some(store) = store else {
        bail!("no database at {}", db_path.display());
    };
    let rows = store
        .insert(txns)
        .with_context(|| format!("insert into {}", db_path.display()))?;
    info!(rows, db = %db_path.display(), "batch committed");
    println!("Inserted {rows} movements into {}", db_path.display());
    Ok(())
}
