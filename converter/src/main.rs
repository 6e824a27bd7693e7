//! fileconverter CLI - watch a directory and convert person CSV files to JSON
//!
//! # Commands
//!
//! ```bash
//! fileconverter run                      # Convert existing files, then watch (default)
//! fileconverter convert in/people.csv    # Convert the given files once and exit
//! ```
//!
//! Directories come from `config.json`, `FILECONVERTER_*` environment
//! variables (a `.env` file is honoured) or the flags below, later sources
//! winning.

use clap::{ArgAction, Parser, Subcommand};
use fileconverter::logging::{init_logging, LogConfig, LogFormat};
use fileconverter::{run_job, watch, Config, JobOutcome};
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use tracing::error;

#[derive(Parser)]
#[command(name = "fileconverter")]
#[command(about = "Convert person CSV files dropped into a directory to JSON", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// JSON config file (default: ./config.json when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Full path to the input directory
    #[arg(long, global = true, env = "FILECONVERTER_INPUT")]
    input: Option<PathBuf>,

    /// Full path to the output directory
    #[arg(long, global = true, env = "FILECONVERTER_OUTPUT")]
    output: Option<PathBuf>,

    /// Full path to the error directory
    #[arg(long, global = true, env = "FILECONVERTER_ERRORS")]
    errors: Option<PathBuf>,

    /// Full path to the completed directory
    #[arg(long, global = true, env = "FILECONVERTER_COMPLETED")]
    completed: Option<PathBuf>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Less log output (-q warn, -qq error)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    quiet: u8,

    /// Log line layout
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Full)]
    log_format: LogFormat,

    /// Disable colored log output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert files already in the input directory, then watch for new ones
    Run,

    /// Convert the given files once and print a JSON summary per file
    Convert {
        /// Input files
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

impl Cli {
    fn log_config(&self) -> LogConfig {
        LogConfig::from_verbosity(self.verbose, self.quiet)
            .with_format(self.log_format)
            .with_ansi(!self.no_color && io::stderr().is_terminal())
    }

    fn overrides(&self) -> Config {
        Config {
            input_path: self.input.clone(),
            output_path: self.output.clone(),
            error_path: self.errors.clone(),
            completed_path: self.completed.clone(),
        }
    }
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(&cli.log_config());

    match run(cli).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> Result<i32, Box<dyn std::error::Error>> {
    let config = Config::load(cli.config.as_deref())?.merge(cli.overrides());
    let dirs = config.validate()?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            watch::run(dirs).await?;
            // In-flight jobs are abandoned; exit without waiting for them.
            Ok(0)
        }
        Commands::Convert { files } => {
            let outcomes = tokio::task::spawn_blocking(move || {
                files
                    .iter()
                    .map(|file| run_job(file, &dirs))
                    .collect::<Vec<_>>()
            })
            .await?;

            let mut failed = false;
            for outcome in outcomes {
                match outcome {
                    JobOutcome::Converted(summary) => {
                        println!("{}", serde_json::to_string(&summary)?);
                    }
                    JobOutcome::Skipped => {}
                    JobOutcome::Failed(_) => failed = true,
                }
            }
            Ok(if failed { 1 } else { 0 })
        }
    }
}
