use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::{json, Value};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

use refdata::providers::RepositoryProvider;
use refdata::storage::JsonFileRepository;
use refdata::{Config, ReferenceDataOrchestrator};
use refdata_core::filter::get_with_filter;
use refdata_core::reference::{sort_items, ReferenceDataItem, SortOrder, ValidityContext};

/// refdata - Query reference data from a seed file
#[derive(Parser, Debug)]
#[command(name = "refdata")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Seed file holding the reference data
    #[arg(long, short, default_value = "refdata.json", env = "REFDATA_SEED_PATH")]
    seed: PathBuf,

    /// Evaluate item validity on this date (YYYY-MM-DD) instead of today
    #[arg(long, global = true)]
    as_of: Option<NaiveDate>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the registered reference data types
    Types,
    /// List the items of one type
    List {
        /// Type name (case-insensitive)
        name: String,

        /// Only these codes (comma separated)
        #[arg(long, value_delimiter = ',')]
        codes: Vec<String>,

        /// Wildcard on the item text (`*`, `?`, `[...]`)
        #[arg(long)]
        text: Option<String>,

        /// Include inactive items
        #[arg(long)]
        include_inactive: bool,

        #[arg(long, value_enum, default_value_t = Sort::SortOrder)]
        sort: Sort,
    },
    /// Show one item by code
    Get {
        /// Type name (case-insensitive)
        name: String,
        code: String,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Sort {
    SortOrder,
    Id,
    Code,
    Text,
}

impl From<Sort> for SortOrder {
    fn from(sort: Sort) -> Self {
        match sort {
            Sort::SortOrder => SortOrder::SortOrder,
            Sort::Id => SortOrder::Id,
            Sort::Code => SortOrder::Code,
            Sort::Text => SortOrder::Text,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays valid JSON.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "refdata=info".into()),
        )
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env();
    let repository = JsonFileRepository::open(&cli.seed)
        .await
        .with_context(|| format!("failed to load seed file {}", cli.seed.display()))?;
    let orchestrator = orchestrator_for(&config, repository)?;

    let mut ctx = ValidityContext::new();
    if let Some(date) = cli.as_of {
        ctx.set_date(date);
    }

    let output = run(&orchestrator, cli.command, &ctx).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn orchestrator_for(
    config: &Config,
    repository: JsonFileRepository,
) -> Result<ReferenceDataOrchestrator> {
    let types = repository.types().to_vec();
    let orchestrator = ReferenceDataOrchestrator::from_config(config);
    orchestrator.register(Arc::new(RepositoryProvider::new(repository, types)))?;
    Ok(orchestrator)
}

async fn run(
    orchestrator: &ReferenceDataOrchestrator,
    command: Command,
    ctx: &ValidityContext,
) -> Result<Value> {
    match command {
        Command::Types => Ok(orchestrator
            .registered_types()
            .iter()
            .map(|ty| {
                json!({
                    "type": ty.full_name(),
                    "name": ty.name(),
                    "idKind": ty.id_kind(),
                })
            })
            .collect()),
        Command::List {
            name,
            codes,
            text,
            include_inactive,
            sort,
        } => {
            let collection = orchestrator.get_by_name_required(&name).await?;
            let view = collection.view(ctx);
            let mut items = get_with_filter(
                &view,
                Some(codes.as_slice()),
                text.as_deref(),
                include_inactive,
            )?;
            sort_items(&mut items, sort.into());
            let items: Vec<&ReferenceDataItem> = items.iter().map(Arc::as_ref).collect();
            Ok(serde_json::to_value(items)?)
        }
        Command::Get { name, code } => {
            let collection = orchestrator.get_by_name_required(&name).await?;
            let item = collection.get_by_code(&code)?;
            let valid = collection.view(ctx).is_valid(item);
            Ok(json!({ "item": item.as_ref(), "valid": valid }))
        }
    }
}
