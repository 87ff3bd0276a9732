use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::core::FilterSelection;
use crate::error::FilterParseError;

#[derive(Parser, Debug)]
#[command(name = "tasktrak")]
#[command(author = "TaskTrak Team")]
#[command(version)]
#[command(about = "A terminal viewer for weld-station event logs")]
#[command(long_about = "TaskTrak loads a JSON event log from a welding/spot-station controller, stamps every measurement with the employee and shift clocked in at the time, and shows the result as a filterable table.")]
pub struct Cli {
    /// Event log to open
    #[arg(value_name = "FILE", help = "JSON event log to load at startup")]
    pub file: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "tui", help = "Output format")]
    pub output: OutputFormat,

    /// Column filters for text output
    #[arg(short, long = "filter", value_name = "COLUMN=VALUE", help = "Keep rows whose COLUMN equals VALUE (repeatable)")]
    pub filters: Vec<String>,

    /// Configuration file
    #[arg(long, value_name = "PATH", help = "TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Disable colors in output
    #[arg(long, help = "Disable colored output")]
    pub no_color: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Terminal user interface (default)
    Tui,
    /// Plain text table on stdout
    Text,
}

impl Cli {
    /// Parse `--filter` arguments into a selection
    pub fn filter_selection(&self) -> Result<FilterSelection, FilterParseError> {
        FilterSelection::from_exprs(&self.filters)
    }

    /// Install the tracing subscriber.
    ///
    /// The TUI owns the terminal, so in that mode logs go to the configured
    /// file or nowhere. Text mode logs to stderr.
    pub fn setup_logging(&self, logging: &LoggingConfig) {
        let level = if self.verbose { "debug" } else { "info" };
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false);

        let result = match (self.output, logging.file.as_deref()) {
            (OutputFormat::Tui, Some(path)) => match open_log_file(path) {
                Ok(file) => builder.with_ansi(false).with_writer(Mutex::new(file)).try_init(),
                Err(err) => {
                    eprintln!("Cannot open log file {}: {}", path.display(), err);
                    return;
                }
            },
            (OutputFormat::Tui, None) => return,
            (OutputFormat::Text, _) => builder
                .with_ansi(!self.no_color)
                .with_writer(std::io::stderr)
                .try_init(),
        };

        if let Err(err) = result {
            eprintln!("Failed to initialise logging: {}", err);
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if let Some(file) = &self.file {
            if !file.exists() {
                return Err(format!("File does not exist: {}", file.display()));
            }

            if !file.is_file() {
                return Err(format!("Path is not a file: {}", file.display()));
            }
        }

        if self.output == OutputFormat::Text && self.file.is_none() {
            return Err("Text output needs a FILE to load".to_string());
        }

        if let Err(err) = self.filter_selection() {
            return Err(err.to_string());
        }

        Ok(())
    }
}

fn open_log_file(path: &Path) -> std::io::Result<std::fs::File> {
    OpenOptions::new().create(true).append(true).open(path)
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            file: None,
            output: OutputFormat::Tui,
            filters: Vec::new(),
            config: None,
            verbose: false,
            no_color: false,
        }
    }
}
