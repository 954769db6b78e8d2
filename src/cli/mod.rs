//! Command-line interface parsing and handling
//!
//! Parses arguments, installs logging and dispatches to the subcommands.

pub mod ask;
pub mod model_list;
pub mod settings;

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::ask::{run_ask, AskArgs, EXIT_FAILURE};
use crate::cli::model_list::list_models;
use crate::cli::settings::{apply_set, apply_unset, SettingError, SettingRegistry};
use crate::core::config::{path_display, Config};
use crate::core::log::{LogSink, TracingSink};
use crate::utils::logging::FileLogSink;

/// Environment variable holding the `tracing` filter directive.
pub const LOG_FILTER_ENV: &str = "AIREPORTS_LOG";

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("VERGEN_GIT_SHA"),
    ", built ",
    env!("VERGEN_BUILD_DATE"),
    ")"
);

#[derive(Parser)]
#[command(name = "aireports")]
#[command(version = VERSION)]
#[command(about = "Stream report answers from a chat-completion API")]
#[command(
    long_about = "aireports sends a prompt, optional images and spreadsheet data to a \
chat-completion endpoint and prints the answer as it streams in.\n\n\
Configuration:\n\
  Use 'aireports set <key> <value>' to store the endpoint, API key and model.\n\
  'aireports config' prints the current settings.\n\n\
Environment Variables (override the config file):\n\
  AIREPORTS_API_KEY    API key\n\
  AIREPORTS_BASE_URL   API base URL\n\
  AIREPORTS_ENDPOINT   Full chat-completions URL\n\
  AIREPORTS_MODEL      Model id\n\
  AIREPORTS_LOG        Log filter for stderr (default: warn)\n\n\
Press Ctrl+C while an answer is streaming to cancel it."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Append client log lines to the specified file
    #[arg(short = 'l', long, global = true, value_name = "FILE")]
    pub log: Option<PathBuf>,

    /// Use an alternate config file
    #[arg(short = 'c', long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send a prompt and stream the answer to stdout
    Ask(AskArgs),
    /// List available models
    Models {
        /// Include models that are not chat models
        #[arg(long)]
        all: bool,
    },
    /// Set a configuration value
    Set {
        /// Configuration key to set
        key: String,
        /// Value to set (can be multiple words for prompts)
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        value: Vec<String>,
    },
    /// Unset a configuration value
    Unset {
        /// Configuration key to unset
        key: String,
    },
    /// Print the current configuration
    Config,
}

pub fn main() -> ExitCode {
    init_tracing();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("❌ Could not start the async runtime: {err}");
            return ExitCode::from(EXIT_FAILURE);
        }
    };

    match runtime.block_on(async_main(Args::parse())) {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("❌ {err}");
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

async fn async_main(args: Args) -> Result<u8, Box<dyn Error>> {
    let config_path = match args.config {
        Some(path) => path,
        None => Config::get_config_path()?,
    };

    match args.command {
        Commands::Ask(ask) => {
            let log = build_log_sink(args.log.as_ref())?;
            let outcome = run_ask(ask, &config_path, log).await?;
            Ok(outcome.exit_code())
        }
        Commands::Models { all } => {
            list_models(&config_path, all).await?;
            Ok(0)
        }
        Commands::Set { key, value } => {
            let registry = SettingRegistry::new();
            report_setting(apply_set(&registry, &key, &value, &config_path))
        }
        Commands::Unset { key } => {
            let registry = SettingRegistry::new();
            report_setting(apply_unset(&registry, &key, &config_path))
        }
        Commands::Config => {
            println!("Config file: {}", path_display(&config_path));
            Config::load_from_path(&config_path)?.print_all();
            print_prompt_summary(&config_path)?;
            Ok(0)
        }
    }
}

fn build_log_sink(path: Option<&PathBuf>) -> Result<Arc<dyn LogSink>, Box<dyn Error>> {
    let stderr_sink: Arc<dyn LogSink> = Arc::new(TracingSink);
    match path {
        Some(path) => {
            let sink = FileLogSink::create(path).map_err(|err| {
                format!("Could not open log file {}: {err}", path_display(path))
            })?;
            tracing::debug!("Writing request log to {}", path_display(sink.path()));
            Ok(Arc::new(sink.with_inner(stderr_sink)))
        }
        None => Ok(stderr_sink),
    }
}

fn report_setting(result: Result<String, SettingError>) -> Result<u8, Box<dyn Error>> {
    match result {
        Ok(message) => {
            println!("{message}");
            Ok(0)
        }
        Err(err) => {
            err.print();
            Ok(EXIT_FAILURE)
        }
    }
}

fn print_prompt_summary(config_path: &std::path::Path) -> Result<(), Box<dyn Error>> {
    let system = Config::read_system_prompt(config_path)?;
    let user = Config::read_user_prompt(config_path)?;
    println!("  system-prompt: {}", prompt_preview(&system));
    println!("  user-prompt: {}", prompt_preview(&user));
    Ok(())
}

fn prompt_preview(text: &str) -> String {
    let flat = text.trim().replace('\n', " ");
    if flat.is_empty() {
        "(unset)".to_string()
    } else {
        settings::helpers::truncate_with_ellipsis(&flat, 50)
    }
}
