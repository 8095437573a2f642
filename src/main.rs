use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use sawlog_core::config::Config;
use sawlog_core::{Extractor, InvalidUtf8};
use sawlog_load::{JsonlSink, LoadOutcome, LoadPlan, RecordSink, SqlScriptSink};
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sawlog", about = "Panel-saw log extractor and loader")]
struct Cli {
    /// Log at debug level (RUST_LOG takes precedence).
    #[arg(long, global = true)]
    debug: bool,
    /// Config file to use instead of ~/.config/sawlog/config.toml.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the cut records of log files as JSON lines.
    Extract {
        /// Replace invalid UTF-8 with U+FFFD instead of dropping it.
        #[arg(long)]
        replace_invalid: bool,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Load every file in the inbox and move it to the processed directory.
    Load {
        #[arg(long)]
        inbox: Option<PathBuf>,
        #[arg(long)]
        processed: Option<PathBuf>,
        #[command(flatten)]
        target: Target,
    },
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct Target {
    /// Append rows to a JSON-lines table file.
    #[arg(long)]
    jsonl: Option<PathBuf>,
    /// Append INSERT statements to a SQL script.
    #[arg(long)]
    sql: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "using built-in config defaults");
            Config::defaults()
        }),
    };

    match cli.command {
        Command::Extract {
            replace_invalid,
            files,
        } => extract(&config, replace_invalid, &files),
        Command::Load {
            inbox,
            processed,
            target,
        } => load(&config, inbox, processed, target).await,
    }
}

fn extract(config: &Config, replace_invalid: bool, files: &[PathBuf]) -> anyhow::Result<()> {
    let extractor = if replace_invalid {
        Extractor::new(InvalidUtf8::Replace)
    } else {
        config.input.extractor()
    };

    let stdout = std::io::stdout();
    let mut out = std::io::BufWriter::new(stdout.lock());
    for path in files {
        let extraction = extractor.extract_file(path)?;
        tracing::info!(file = %path.display(), summary = %extraction.summary, "extracted");
        for record in &extraction.records {
            serde_json::to_writer(&mut out, record)?;
            out.write_all(b"\n")?;
        }
    }
    out.flush()?;
    Ok(())
}

async fn load(
    config: &Config,
    inbox: Option<PathBuf>,
    processed: Option<PathBuf>,
    target: Target,
) -> anyhow::Result<()> {
    let mut plan = LoadPlan::from(&config.input);
    if let Some(inbox) = inbox {
        plan.inbox = inbox;
    }
    if let Some(processed) = processed {
        plan.processed = processed;
    }

    let mut sink: Box<dyn RecordSink> = match (target.jsonl, target.sql) {
        (Some(path), _) => Box::new(JsonlSink::open(&path)?),
        (None, Some(path)) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("opening {}", path.display()))?;
            Box::new(SqlScriptSink::new(
                std::io::BufWriter::new(file),
                config.output.table.clone(),
                config.output.insert_batch_size,
            )?)
        }
        (None, None) => anyhow::bail!("one of --jsonl or --sql is required"),
    };

    let report = sawlog_load::run_inbox(&plan, sink.as_mut()).await?;
    match report.outcome {
        LoadOutcome::EmptyInbox => tracing::info!("inbox is empty, nothing to load"),
        LoadOutcome::NoRecords => tracing::info!(
            summary = %report.total(),
            "log files held no valid records; left in inbox"
        ),
        LoadOutcome::Loaded => tracing::info!(
            rows = report.rows_inserted,
            files = report.files.len(),
            summary = %report.total(),
            "load complete"
        ),
    }
    Ok(())
}
