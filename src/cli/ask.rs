//! `aireports ask`: stream one answer to stdout.

use std::error::Error;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Args as ClapArgs;
use tokio_util::sync::CancellationToken;

use crate::core::client::ChatClient;
use crate::core::config::Config;
use crate::core::error::{classify, ClientError};
use crate::core::handle::ResponseEvent;
use crate::core::log::LogSink;
use crate::core::request::RequestInput;
use crate::core::sheet::{DelimitedSheetReader, SheetReader};
use crate::core::table::Table;

pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_CANCELLED: u8 = 130;

#[derive(ClapArgs, Debug, Default)]
pub struct AskArgs {
    /// Prompt text. Defaults to the saved user prompt
    #[arg(trailing_var_arg = true)]
    pub prompt: Vec<String>,

    /// System prompt text. Defaults to the saved system prompt
    #[arg(short = 's', long, conflicts_with = "system_file")]
    pub system: Option<String>,

    /// Read the system prompt from a file
    #[arg(long, value_name = "PATH")]
    pub system_file: Option<PathBuf>,

    /// Attach an image (repeatable)
    #[arg(short = 'i', long = "image", value_name = "PATH")]
    pub images: Vec<PathBuf>,

    /// Attach a spreadsheet file (repeatable)
    #[arg(long = "sheet", value_name = "PATH")]
    pub sheets: Vec<PathBuf>,

    /// Load a spreadsheet up front and attach it as a data table (repeatable)
    #[arg(short = 't', long = "table", value_name = "PATH")]
    pub tables: Vec<PathBuf>,

    /// Model to use instead of the configured one
    #[arg(short = 'm', long)]
    pub model: Option<String>,

    /// Also write the final answer to this file
    #[arg(short = 'o', long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// How the streamed answer ended, for the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AskOutcome {
    Completed,
    Cancelled,
    Failed,
}

impl AskOutcome {
    pub fn exit_code(self) -> u8 {
        match self {
            AskOutcome::Completed => 0,
            AskOutcome::Cancelled => EXIT_CANCELLED,
            AskOutcome::Failed => EXIT_FAILURE,
        }
    }
}

pub async fn run_ask(
    args: AskArgs,
    config_path: &Path,
    log: Arc<dyn LogSink>,
) -> Result<AskOutcome, Box<dyn Error>> {
    let config = Config::load_from_path(config_path)?.with_env_overrides();

    let prompt = match args.prompt.join(" ") {
        prompt if prompt.trim().is_empty() => Config::read_user_prompt(config_path)?,
        prompt => prompt,
    };
    if prompt.trim().is_empty() {
        return Err("No prompt given. Pass one as arguments or save one with \
                    'aireports set user-prompt <text>'"
            .into());
    }
    let system_prompt = resolve_system_prompt(&args, config_path).await?;

    let settings = config.api_settings()?;
    let options = config.client_options(args.model.as_deref())?;
    let sheets: Arc<dyn SheetReader> = Arc::new(DelimitedSheetReader);

    let tables = load_tables(&args.tables, Arc::clone(&sheets), log.as_ref()).await;
    let input = RequestInput::new(prompt, system_prompt)
        .with_images(args.images)
        .with_sheets(args.sheets)
        .with_tables(tables);

    let client = ChatClient::new(&settings, options, log, sheets)?;
    let cancel = CancellationToken::new();
    let interrupt = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        })
    };

    let mut handle = client.start_request(input, cancel);
    let mut outcome = AskOutcome::Completed;
    let mut stdout = io::stdout();
    let mut final_text = None;

    while let Some(event) = handle.next_event().await {
        match event {
            ResponseEvent::Delta(delta) => {
                write!(stdout, "{delta}")?;
                stdout.flush()?;
            }
            ResponseEvent::Error(report) if report.is_cancelled() => {
                outcome = AskOutcome::Cancelled;
                eprintln!("\n⚠️  {}", report.message);
            }
            ResponseEvent::Error(report) if report.is_recoverable() => {
                eprintln!("⚠️  {}", report.message);
            }
            ResponseEvent::Error(report) => {
                outcome = AskOutcome::Failed;
                eprintln!("\n❌ Error: {}", report.message);
            }
            ResponseEvent::Completed(text) => {
                final_text = Some(text);
                break;
            }
        }
    }
    interrupt.abort();

    let text = final_text.unwrap_or_else(|| Arc::from(""));
    if !text.is_empty() && !text.ends_with('\n') {
        writeln!(stdout)?;
    }

    if let Some(path) = args.output {
        tokio::fs::write(&path, text.as_bytes()).await?;
        eprintln!("💾 Saved answer to {}", path.display());
    }

    Ok(outcome)
}

async fn resolve_system_prompt(args: &AskArgs, config_path: &Path) -> Result<String, Box<dyn Error>> {
    if let Some(system) = &args.system {
        return Ok(system.clone());
    }
    if let Some(path) = &args.system_file {
        return tokio::fs::read_to_string(path)
            .await
            .map_err(|err| {
                Box::<dyn Error>::from(format!(
                    "Could not read system prompt {}: {err}",
                    path.display()
                ))
            });
    }
    Ok(Config::read_system_prompt(config_path)?)
}

/// Read `--table` files up front. Unreadable files are logged and skipped.
async fn load_tables(
    paths: &[PathBuf],
    reader: Arc<dyn SheetReader>,
    log: &dyn LogSink,
) -> Vec<Table> {
    let mut tables = Vec::with_capacity(paths.len());
    for path in paths {
        let owned = path.clone();
        let reader = Arc::clone(&reader);
        let result = tokio::task::spawn_blocking(move || reader.read_sheet(&owned)).await;
        match result {
            Ok(Ok(table)) => tables.push(table),
            Ok(Err(err)) => {
                let report = classify(&ClientError::attachment(
                    path.display().to_string(),
                    err.into(),
                ));
                log.error(&report.message, report.detail.as_deref());
                eprintln!("⚠️  {}", report.message);
            }
            Err(err) => {
                log.error(
                    &format!("Reading {} was interrupted", path.display()),
                    Some(&err.to_string()),
                );
            }
        }
    }
    tables
}
