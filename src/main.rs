use std::fs::{self, File};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use simplelog::{ConfigBuilder, WriteLogger};

use deepmock::coordinator::{self, RunOutcome, RunSettings};
use deepmock::core::config::{self, CliOverrides, ResolvedConfig};
use deepmock::generator::{GoScanner, MockgenEmitter};
use deepmock::tui::TerminalOperator;
use deepmock::tui::event::CrosstermEvents;

#[derive(Parser)]
#[command(name = "deepmock", about = "Pick Go interfaces and generate mocks for them")]
struct Args {
    /// Directory to search for interfaces
    #[arg(short = 'S', long = "search", value_name = "DIR")]
    search: Option<PathBuf>,

    /// Root directory for generated mocks
    #[arg(short = 'O', long = "output", value_name = "DIR")]
    output: Option<PathBuf>,

    /// Select every interface found, skipping the checklist
    #[arg(short = 'A', long = "all")]
    all: bool,

    /// Use the default mock path for each interface without asking
    #[arg(short = 'P', long = "skip-path-prompt")]
    skip_path_prompt: bool,

    /// mockgen binary to run
    #[arg(long = "mockgen", value_name = "BIN")]
    mockgen: Option<String>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

impl From<Args> for CliOverrides {
    fn from(args: Args) -> Self {
        Self {
            search_dir: args.search,
            output_dir: args.output,
            accept_all: args.all,
            skip_path_prompt: args.skip_path_prompt,
            mockgen_binary: args.mockgen,
            verbose: args.verbose,
        }
    }
}

/// File logger. The TUI owns the terminal, so nothing is logged to it.
fn init_logging(config: &ResolvedConfig) {
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();

    if let Some(parent) = config.log_file.parent() {
        let _ = fs::create_dir_all(parent);
    }
    if let Ok(log_file) = File::create(&config.log_file) {
        let _ = WriteLogger::init(config.log_level, log_config, log_file);
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    let file_config = config::load_config().context("failed to load configuration")?;
    let resolved = config::resolve(&file_config, &CliOverrides::from(args));
    init_logging(&resolved);

    log::info!(
        "Deepmock starting up (mockgen: {}, accept all: {}, skip path prompt: {})",
        resolved.mockgen_binary,
        resolved.accept_all,
        resolved.skip_path_prompt
    );

    let emitter = Arc::new(MockgenEmitter::new(
        resolved.mockgen_binary.clone(),
        resolved.mockgen_package.clone(),
    ));
    let mut operator = TerminalOperator::new(CrosstermEvents);

    let outcome = coordinator::run(
        &RunSettings::from(&resolved),
        &GoScanner,
        emitter,
        &mut operator,
    )
    .await
    .context("mock generation did not start")?;

    if let RunOutcome::Generated(summary) = &outcome {
        log::info!(
            "Finished: {} of {} succeeded ({:?})",
            summary.progress.succeeded(),
            summary.progress.total,
            summary.phase
        );
    }
    Ok(())
}
