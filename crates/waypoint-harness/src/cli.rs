#![forbid(unsafe_code)]

use std::io::Write;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use waypoint_tour::TourConfig;

use crate::error::{HarnessError, Result};
use crate::preview::PreviewGrid;
use crate::scenario::Scenario;
use crate::transcript::replay;

#[derive(Debug, Parser)]
#[command(
    name = "waypoint-harness",
    about = "Replay guided-tour scenarios on a virtual page",
    version
)]
pub struct Cli {
    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Replay a scenario file (or the built-in demo when none is given).
    Run(RunArgs),

    /// Replay the built-in schema console tour.
    Demo(OutputArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// One JSON object per action plus a summary line.
    #[default]
    Jsonl,
    /// Character previews of every frame.
    Ascii,
}

#[derive(Debug, Clone, Args)]
pub struct OutputArgs {
    #[arg(long, value_enum, default_value_t = OutputFormat::Jsonl)]
    pub format: OutputFormat,

    /// Tour config file (TOML, or JSON by extension).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Preview width in characters (ascii format).
    #[arg(long, default_value_t = 80)]
    pub cols: u16,

    /// Preview height in characters (ascii format).
    #[arg(long, default_value_t = 24)]
    pub rows: u16,
}

#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// Scenario file (TOML, or JSON by extension).
    #[arg(long)]
    pub scenario: Option<PathBuf>,

    #[command(flatten)]
    pub output: OutputArgs,
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    crate::logging::init(cli.log_json)?;
    let stdout = std::io::stdout();
    run(cli, &mut stdout.lock())
}

pub fn run(cli: Cli, out: &mut impl Write) -> Result<()> {
    match cli.command {
        Commands::Run(args) => {
            let scenario = match &args.scenario {
                Some(path) => Scenario::from_file(path)?,
                None => Scenario::console_demo(),
            };
            replay_to(&scenario, &args.output, out)
        }
        Commands::Demo(output) => replay_to(&Scenario::console_demo(), &output, out),
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<TourConfig> {
    match path {
        Some(path) => TourConfig::from_file(path).map_err(HarnessError::from),
        None => Ok(TourConfig::default()),
    }
}

fn replay_to(scenario: &Scenario, output: &OutputArgs, out: &mut impl Write) -> Result<()> {
    let config = load_config(output.config.as_ref())?;
    let card_height = config.card_height;
    tracing::info!(
        scenario = %scenario.name,
        steps = scenario.steps.len(),
        actions = scenario.actions.len(),
        "replaying scenario"
    );
    let transcript = replay(scenario, config);

    match output.format {
        OutputFormat::Jsonl => out.write_all(transcript.to_jsonl()?.as_bytes())?,
        OutputFormat::Ascii => {
            let grid = PreviewGrid {
                cols: output.cols,
                rows: output.rows,
            };
            out.write_all(transcript.to_ascii(grid, card_height).as_bytes())?;
        }
    }
    out.flush()?;
    Ok(())
}
