use std::io::Write;
use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use paneweave_runtime::EngineConfig;
use tracing_subscriber::EnvFilter;

use crate::error::Result;
use crate::inspect::{
    DiffArgs, LayoutArgs, ReplayArgs, ValidateArgs, run_diff, run_layout, run_replay,
    run_validate,
};

#[derive(Debug, Parser)]
#[command(
    name = "paneweave-doctor",
    about = "Validate, lay out, diff, and replay paneweave layout documents",
    version
)]
pub struct Cli {
    /// Engine config file (TOML, or JSON by extension).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// More log output on stderr (-v debug, -vv trace). `RUST_LOG` wins
    /// when set and no -v is given.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Load a layout document and check every structural rule.
    Validate(ValidateArgs),

    /// Solve pane and divider rectangles for a document.
    Layout(LayoutArgs),

    /// Compare two documents pane by pane.
    Diff(DiffArgs),

    /// Apply a JSON list of layout commands to a document.
    Replay(ReplayArgs),
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run(cli, &mut out)
}

pub fn run(cli: Cli, out: &mut dyn Write) -> Result<()> {
    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    tracing::debug!(?config, "engine config");

    match cli.command {
        Commands::Validate(args) => run_validate(&args, out),
        Commands::Layout(args) => run_layout(&args, &config, out),
        Commands::Diff(args) => run_diff(&args, out),
        Commands::Replay(args) => run_replay(&args, &config, out),
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
