mod analyzer;
mod app;
mod benchmark;
mod cli;
mod config;
mod error;
mod logging;
mod models;
mod nvidia;
mod theme;
mod ui;

use std::io::{self, Read};
use std::path::PathBuf;

use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tracing::info;

use crate::app::{cancel_all, spawn_benchmark, spawn_uuid_check, App, AppEvent};
use crate::cli::{Cli, Commands};
use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::models::{Analysis, Status};

const EXIT_ISSUES: i32 = 3;
const EXIT_MATRIX_NOT_FOUND: i32 = 4;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            e.exit_code()
        }
    };
    std::process::exit(code);
}

async fn run(cli: Cli) -> Result<i32> {
    let config = AppConfig::load(cli.config.as_deref())?;

    let interactive = matches!(cli.command, None | Some(Commands::Tui));
    let _log_guard = logging::init(&config.logging, cli.verbose, cli.quiet, !interactive)?;

    match cli.command {
        None | Some(Commands::Tui) => {
            run_tui(config).await?;
            Ok(0)
        }
        Some(Commands::Run {
            benchmark: override_path,
        }) => {
            let path = override_path.unwrap_or_else(|| config.benchmark.path.clone());
            let report = benchmark::run_and_analyze(&path, &config.thresholds).await?;
            print!("{}", report.output.stdout);
            if !report.output.stderr.trim().is_empty() {
                eprint!("{}", report.output.stderr);
            }
            Ok(print_analysis(&report.analysis))
        }
        Some(Commands::Analyze { input }) => {
            let text = read_input(&input)?;
            let analysis = analyzer::analyze(&text, &config.thresholds);
            Ok(print_analysis(&analysis))
        }
        Some(Commands::Uuids { output }) => {
            let path = output.unwrap_or_else(|| config.uuid.output.clone());
            let collection =
                nvidia::collect_and_persist(&config.uuid.command, &config.uuid.args, &path).await?;
            print!("{}", collection.output.stdout);
            for line in &collection.skipped {
                println!("Skipping line without UUID separator: {line}");
            }
            println!("\nGPU UUIDs saved to {}", path.display());
            Ok(0)
        }
    }
}

/// Prints warnings and the status line, returning the exit code for the status
fn print_analysis(analysis: &Analysis) -> i32 {
    for warning in &analysis.warnings {
        println!("{warning}");
    }
    println!("{}", analysis.status);

    if analysis.all_ok() {
        0
    } else if analysis.status == Status::MatrixNotFound {
        EXIT_MATRIX_NOT_FOUND
    } else {
        EXIT_ISSUES
    }
}

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .map_err(|e| Error::io("<stdin>", e))?;
        Ok(text)
    } else {
        let path = PathBuf::from(input);
        std::fs::read_to_string(&path).map_err(|e| Error::io(path, e))
    }
}

async fn run_tui(config: AppConfig) -> Result<()> {
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
    crossterm::terminal::enable_raw_mode()?;
    crossterm::execute!(
        io::stdout(),
        crossterm::terminal::EnterAlternateScreen,
        crossterm::event::EnableMouseCapture
    )?;

    let result = event_loop(&mut terminal, &config).await;

    crossterm::execute!(
        io::stdout(),
        crossterm::terminal::LeaveAlternateScreen,
        crossterm::event::DisableMouseCapture
    )?;
    crossterm::terminal::disable_raw_mode()?;
    terminal.show_cursor()?;

    result
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    config: &AppConfig,
) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<AppEvent>();
    let mut app = App::new();
    let mut tasks: Vec<tokio::task::JoinHandle<()>> = Vec::new();
    info!("Terminal UI started");

    loop {
        while let Ok(event) = rx.try_recv() {
            app.apply(event);
        }
        tasks.retain(|task| !task.is_finished());

        app.tick();
        terminal.draw(|f| ui::render(f, &app))?;

        if crossterm::event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => break,
                        KeyCode::Char('r') => {
                            if app.begin_benchmark() {
                                tasks.push(spawn_benchmark(tx.clone(), config));
                            }
                        }
                        KeyCode::Char('u') => {
                            if app.begin_uuid_check() {
                                tasks.push(spawn_uuid_check(tx.clone(), config));
                            }
                        }
                        KeyCode::Up => app.scroll_up(1),
                        KeyCode::Down => app.scroll_down(1),
                        KeyCode::PageUp => app.scroll_up(10),
                        KeyCode::PageDown => app.scroll_down(10),
                        KeyCode::Home => app.scroll_to_top(),
                        KeyCode::End => app.scroll_to_bottom(),
                        _ => {}
                    }
                }
            }
        }
    }

    cancel_all(tasks).await;
    Ok(())
}
