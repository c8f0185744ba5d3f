mod config;
mod onerm_cmd;
mod pdf;
mod plates_cmd;
mod program_cmd;
#[cfg(test)]
mod test_util;

use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use program_cmd::{OverrideArgs, ProgramArgs};

#[derive(Parser)]
#[command(
    name = "tbcalc",
    version,
    about = "Tactical Barbell programming sheet generator"
)]
struct Cli {
    /// Config file layered over the user config (overrides TBCALC_CONFIG env var)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a programming sheet from 1RMs
    Program(ProgramArgs),
    /// Round a weight to the plates and show how to load it
    Plates {
        /// Target weight
        weight: f64,
        /// Load on a belt (no bar, not split per side)
        #[arg(long)]
        belt: bool,
        /// Print JSON
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        overrides: OverrideArgs,
    },
    /// Estimate a 1RM from a set (e.g. `240 5` or `240x5`)
    OneRm {
        /// Weight and reps
        #[arg(required = true, num_args = 1..=3)]
        set: Vec<String>,
        /// Read the set as added weight at this bodyweight (pull-ups)
        #[arg(long)]
        bodyweight: Option<f64>,
    },
    /// Write the default config file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Print shell completions
    Completions {
        /// Target shell
        shell: Shell,
    },
}

/// Execute the `tbcalc init` command: write the default config file.
fn cmd_init(force: bool) -> anyhow::Result<()> {
    let path = config::config_path();
    config::write_defaults(&path, force)?;

    println!("Config written to {}", path.display());
    println!("Edit plates, weeks and ramps there; every key is optional.");
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config.as_deref();
    let result = match cli.command {
        Commands::Program(args) => program_cmd::run_program(args, config),
        Commands::Plates {
            weight,
            belt,
            json,
            overrides,
        } => plates_cmd::run_plates(weight, belt, json, overrides.into(), config),
        Commands::OneRm { set, bodyweight } => onerm_cmd::run_one_rm(&set, bodyweight),
        Commands::Init { force } => cmd_init(force),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "tbcalc", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
