use savings_parser::{
    record::sort_by_start_date, report::dump_records, ParserRegistry, Record, RecordQuery,
    RecordStream, ValidationRules,
};

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{stderr, stdout};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;

/// Lists cost-savings records from a delimited file and flags the faulty ones.
#[derive(Parser, Debug)]
#[command(name = "savings-parser", version)]
struct Args {
    /// Full path to the input file
    #[arg(short, long)]
    file: PathBuf,

    /// Only list records of this project; 0 lists every record
    #[arg(short, long, default_value_t = 0)]
    project: i32,

    /// Sort records by start date, oldest first
    #[arg(short, long)]
    sort_by_start_date: bool,

    /// Comma-separated complexities accepted by validation
    #[arg(long, env = "SAVINGS_ALLOWED_COMPLEXITIES")]
    allowed_complexities: Option<String>,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }

    fn rules(&self) -> Result<ValidationRules> {
        match &self.allowed_complexities {
            Some(list) => list.parse().context("Invalid --allowed-complexities"),
            None => Ok(ValidationRules::default()),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_level());
    validate_input_file(&args.file);

    let rules = Arc::new(args.rules()?);
    process_records(&args, rules).await
}

fn init_tracing(level: &str) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("savings_parser={}", level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

fn validate_input_file(path: &Path) {
    if !path.is_file() {
        eprintln!(
            "Error: File '{}' does not exist. Please specify a valid file path.",
            path.display()
        );
        std::process::exit(1);
    }
}

async fn process_records(args: &Args, rules: Arc<ValidationRules>) -> Result<()> {
    let registry = ParserRegistry::new(rules);
    let query = RecordQuery::new(registry.resolve(&args.file));

    let records = match args.project {
        0 => query.all(),
        project => query.by_project(project),
    }
    .with_context(|| format!("Failed to read {}", args.file.display()))?;

    // Output follows the file's own column order.
    let headers = records.headers().to_vec();

    // Rendering runs in its own task and only starts writing once the stream is drained,
    // since sorting needs every record.
    let (tx, mut rx) = mpsc::channel::<Record>(100);
    let sort = args.sort_by_start_date;

    let report = tokio::spawn(async move {
        let mut buffered = Vec::new();
        while let Some(record) = rx.recv().await {
            buffered.push(record);
        }

        if sort {
            sort_by_start_date(&mut buffered);
        }

        dump_records(&buffered, &headers, stdout(), stderr())
    });

    for record in records {
        tx.send(record).await.context("Report task stopped early")?;
    }
    drop(tx);

    let summary = report.await.context("Report task panicked")??;
    info!(
        records = summary.total(),
        faulty = summary.faulty,
        "Finished {}",
        args.file.display()
    );

    Ok(())
}
