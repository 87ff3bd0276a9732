use clap::Parser;
use anyhow::{Context, Result};

use tasktrak_tui::{
    cli::{Cli, OutputFormat},
    config::TaskTrakConfig,
    text::render_table,
    ui::{restore_terminal, setup_terminal, TuiApp},
    AppState, ApplyOutcome,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(err) = cli.validate() {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }

    let config = TaskTrakConfig::load(cli.config.as_deref())?;
    if let Err(err) = config.validate() {
        eprintln!("Error: invalid configuration: {}", err);
        std::process::exit(1);
    }

    cli.setup_logging(&config.logging);
    tracing::info!("Starting TaskTrak");

    match cli.output {
        OutputFormat::Tui => run_tui_mode(&cli, config)?,
        OutputFormat::Text => run_text_mode(&cli, config)?,
    }

    Ok(())
}

fn run_tui_mode(cli: &Cli, config: TaskTrakConfig) -> Result<()> {
    let TaskTrakConfig { schema, ui, .. } = config;
    let mut app = TuiApp::new(AppState::new(schema), ui);

    // A bad startup file is reported in the UI like any other failed load
    if let Some(file) = &cli.file {
        app.open_file(file);
    }

    // Setup terminal
    let mut terminal = setup_terminal()?;

    // Run the application
    let res = app.run(&mut terminal);

    // Restore terminal
    if let Err(err) = restore_terminal(&mut terminal) {
        eprintln!("Failed to restore terminal: {}", err);
    }

    if let Err(err) = res {
        eprintln!("Application error: {}", err);
        std::process::exit(1);
    }

    Ok(())
}

fn run_text_mode(cli: &Cli, config: TaskTrakConfig) -> Result<()> {
    let file = cli.file.as_deref().context("text output needs a FILE")?;
    let selection = cli.filter_selection()?;

    let mut state = AppState::new(config.schema);
    if let Err(err) = state.load_file(file) {
        eprintln!("Error: Failed to process file: {}", err);
        std::process::exit(1);
    }

    if !selection.is_unconstrained() {
        state.set_selections(selection);
        if let ApplyOutcome::NoMatch = state.apply_filters() {
            eprintln!("No rows match the selected filters.");
            return Ok(());
        }
    }

    print!("{}", render_table(state.visible_rows(), !cli.no_color));
    Ok(())
}
