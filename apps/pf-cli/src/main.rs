use clap::{Parser, Subcommand};
use pf_core::CalcId;
use std::path::{Path, PathBuf};

mod case;
mod error;
mod report;

use case::{build_case, build_engine, load_case};
use error::CliResult;
use report::Report;

#[derive(Parser)]
#[command(name = "pf-cli")]
#[command(about = "ProcFlow CLI - turbo-expander and heat exchanger rating", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate case file syntax and build its feed streams
    Validate {
        /// Path to the case YAML file
        case_path: PathBuf,
    },
    /// Run the equipment described by a case file
    Run {
        /// Path to the case YAML file
        case_path: PathBuf,
    },
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { case_path } => cmd_validate(&case_path),
        Commands::Run { case_path } => cmd_run(&case_path),
    }
}

fn cmd_validate(case_path: &Path) -> CliResult<()> {
    println!("Validating case: {}", case_path.display());
    let case = load_case(case_path)?;
    let engine = build_engine(case.engine);
    build_case(&case, engine.as_ref())?;
    println!("✓ Case '{}' is valid ({})", case.name, engine.name());
    Ok(())
}

fn cmd_run(case_path: &Path) -> CliResult<()> {
    let case = load_case(case_path)?;
    let engine = build_engine(case.engine);
    let mut built = build_case(&case, engine.as_ref())?;

    let id = CalcId::new();
    tracing::info!(case = %case.name, calc_id = %id, "running case");
    built.equipment_mut().run(engine.as_ref(), id)?;

    Report::from_case(&built)?.print();
    Ok(())
}
