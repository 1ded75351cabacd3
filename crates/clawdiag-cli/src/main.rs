mod cmd_diagnose;
mod config;
mod fetch;
mod open;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "diagnose",
    version,
    about = "Health checks and HTML report for OpenClaw agents"
)]
struct Cli {
    /// Agent names to check (e.g. main, ops)
    agents: Vec<String>,
    /// Also check every agent found in `openclaw status --deep`
    #[arg(long)]
    all: bool,
    /// Open the report in the default viewer after writing it
    #[arg(long)]
    open: bool,
    /// Which recent conversation to feature, 1 = newest (clamped to 1..=5)
    #[arg(long, default_value_t = 1)]
    conv: usize,
    /// Print the run as JSON instead of the text summary
    #[arg(long)]
    json: bool,
    /// Report path (defaults to diagnose-report.html next to the executable)
    #[arg(long)]
    out: Option<PathBuf>,
    /// Config file (defaults to <openclaw home>/diagnose.json)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn init_tracing() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let result = cmd_diagnose::execute(&cmd_diagnose::DiagnoseParams {
        agents: &cli.agents,
        all: cli.all,
        open: cli.open,
        conv: cli.conv,
        json: cli.json,
        out: cli.out.as_deref(),
        config: cli.config.as_deref(),
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => match e.downcast_ref::<cmd_diagnose::UsageError>() {
            Some(usage) => {
                eprintln!("{}", Cli::command().render_usage());
                eprintln!("{usage}");
                ExitCode::from(2)
            }
            None => {
                eprintln!("error: {e:#}");
                ExitCode::FAILURE
            }
        },
    }
}
