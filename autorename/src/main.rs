use anyhow::{Context, Result};
use autorename_core::config::DEFAULT_CONFIG_FILE;
use autorename_core::{AutoRenamer, RenameConfig, RunOptions, RunOutcome, TerminalPrompt};
use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;

mod formatter;

#[derive(Parser)]
#[command(name = "autorename")]
#[command(about = "Rename equipment files from a SharePoint renumbering workbook", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the configuration file (JSON or TOML)
    #[arg(short, long, value_name = "CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Machine number to search sheets for (asked when omitted)
    #[arg(long, value_name = "NR")]
    machine: Option<String>,

    /// Invoice number to search sheets for (asked when omitted)
    #[arg(long, value_name = "NR")]
    invoice: Option<String>,

    /// Exact sheet name, skips the search
    #[arg(long, value_name = "NAME", conflicts_with_all = ["machine", "invoice"])]
    sheet: Option<String>,

    /// Working directory holding the equipment directories (asked when omitted)
    #[arg(short = 'd', long = "dir", value_name = "DIR")]
    work_dir: Option<PathBuf>,

    /// Equipment order, e.g. "102" (asked when omitted)
    #[arg(long, value_name = "ORDER")]
    order: Option<String>,

    /// Show what would be renamed without making changes
    #[arg(long)]
    dry_run: bool,

    /// Keep the downloaded workbook after the run
    #[arg(long)]
    keep_temp: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "human")]
    format: OutputFormat,

    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON output
    Json,
}

fn setup_logging(verbosity: u8) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let level = match verbosity {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let config = RenameConfig::from_file(&cli.config)
        .with_context(|| format!("Failed to load config from {}", cli.config.display()))?;

    let renamer = AutoRenamer::new(config).context("Failed to set up the workbook source")?;

    let options = RunOptions {
        machine: cli.machine,
        invoice: cli.invoice,
        sheet: cli.sheet,
        work_dir: cli.work_dir,
        order: cli.order,
        dry_run: cli.dry_run,
        keep_temp: cli.keep_temp,
    };

    let mut prompt = TerminalPrompt;
    let outcome = renamer.run(&mut prompt, &options).context("Rename run aborted")?;

    match outcome {
        RunOutcome::Quit => {
            println!("Nothing renamed.");
        }
        RunOutcome::Completed(summary) => match cli.format {
            OutputFormat::Human => formatter::print_human(&summary),
            OutputFormat::Json => formatter::print_json(&summary)?,
        },
    }

    Ok(())
}
