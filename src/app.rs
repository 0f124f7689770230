use std::path::PathBuf;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::benchmark::{self, BenchmarkReport};
use crate::config::AppConfig;
use crate::error::Result;
use crate::models::{Status, UuidCollection};
use crate::nvidia;

/// Completion messages sent from background tasks to the UI loop
#[derive(Debug)]
pub enum AppEvent {
    BenchmarkFinished(Result<BenchmarkReport>),
    UuidsFinished(Result<UuidCollection>),
}

/// Main application state
pub struct App {
    pub output: Vec<String>,
    pub status: Status,
    pub benchmark_running: bool,
    pub uuid_running: bool,
    /// First visible output line
    pub scroll: u16,
    pub frame_count: u64,
    pub last_run: Option<DateTime<Utc>>,
    pub last_duration: Option<TimeDelta>,
    /// Shown next to the status until the next trigger or result
    pub notice: Option<String>,
    run_started: Option<DateTime<Utc>>,
}

impl App {
    pub fn new() -> Self {
        App {
            output: Vec::new(),
            status: Status::NotChecked,
            benchmark_running: false,
            uuid_running: false,
            scroll: 0,
            frame_count: 0,
            last_run: None,
            last_duration: None,
            notice: None,
            run_started: None,
        }
    }

    /// Marks a benchmark as in flight. Returns false if one already is.
    pub fn begin_benchmark(&mut self) -> bool {
        if self.benchmark_running {
            warn!("Benchmark already running, ignoring trigger");
            self.notice = Some("Bandwidth test already running, request ignored".to_string());
            return false;
        }
        self.notice = None;
        self.benchmark_running = true;
        self.run_started = Some(Utc::now());
        self.status = Status::Running;
        true
    }

    /// Marks a UUID collection as in flight. Returns false if one already is.
    pub fn begin_uuid_check(&mut self) -> bool {
        if self.uuid_running {
            warn!("UUID collection already running, ignoring trigger");
            self.notice = Some("UUID check already running, request ignored".to_string());
            return false;
        }
        self.notice = None;
        self.uuid_running = true;
        true
    }

    pub fn is_busy(&self) -> bool {
        self.benchmark_running || self.uuid_running
    }

    /// Maps a finished flow onto the output pane and status line.
    pub fn apply(&mut self, event: AppEvent) {
        self.notice = None;
        match event {
            AppEvent::BenchmarkFinished(result) => {
                self.benchmark_running = false;
                let finished = Utc::now();
                self.last_duration = self.run_started.take().map(|start| finished - start);
                self.last_run = Some(finished);

                match result {
                    Ok(report) => {
                        self.set_output(&report.output.stdout);
                        if !report.output.stderr.trim().is_empty() {
                            self.append("");
                            self.append_text(&report.output.stderr);
                        }
                        for warning in &report.analysis.warnings {
                            self.append(&warning.to_string());
                        }
                        self.status = report.analysis.status;
                    }
                    Err(e) => {
                        error!(error = %e, "Benchmark failed");
                        self.set_output(&format!("Error running the test: {e}"));
                        self.status = Status::Failed(e.to_string());
                    }
                }
            }
            AppEvent::UuidsFinished(result) => {
                self.uuid_running = false;
                match result {
                    Ok(collection) => {
                        self.set_output(&collection.output.stdout);
                        for line in &collection.skipped {
                            self.append(&format!("Skipping line without UUID separator: {line}"));
                        }
                        if let Some(path) = &collection.saved_to {
                            self.append("");
                            self.append(&format!("GPU UUIDs saved to {}", path.display()));
                        }
                    }
                    Err(e) => {
                        error!(error = %e, "UUID collection failed");
                        self.set_output(&format!("Error checking UUIDs: {e}"));
                    }
                }
            }
        }
    }

    /// Replaces the output pane contents
    pub fn set_output(&mut self, text: &str) {
        self.output.clear();
        self.scroll = 0;
        self.append_text(text);
    }

    pub fn append(&mut self, line: &str) {
        self.output.push(line.to_string());
    }

    fn append_text(&mut self, text: &str) {
        self.output.extend(text.lines().map(str::to_string));
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_add(lines).min(self.max_scroll());
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll = 0;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll = self.max_scroll();
    }

    fn max_scroll(&self) -> u16 {
        u16::try_from(self.output.len().saturating_sub(1)).unwrap_or(u16::MAX)
    }

    /// Increment frame counter
    pub fn tick(&mut self) {
        self.frame_count += 1;
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs the benchmark on the runtime and reports back over `tx`.
pub fn spawn_benchmark(tx: UnboundedSender<AppEvent>, config: &AppConfig) -> JoinHandle<()> {
    let path = config.benchmark.path.clone();
    let thresholds = config.thresholds;
    tokio::spawn(async move {
        let result = benchmark::run_and_analyze(&path, &thresholds).await;
        if tx.send(AppEvent::BenchmarkFinished(result)).is_err() {
            info!("UI closed before benchmark finished");
        }
    })
}

/// Collects and persists UUIDs on the runtime and reports back over `tx`.
pub fn spawn_uuid_check(tx: UnboundedSender<AppEvent>, config: &AppConfig) -> JoinHandle<()> {
    let command = config.uuid.command.clone();
    let args = config.uuid.args.clone();
    let output: PathBuf = config.uuid.output.clone();
    tokio::spawn(async move {
        let result = nvidia::collect_and_persist(&command, &args, &output).await;
        if tx.send(AppEvent::UuidsFinished(result)).is_err() {
            info!("UI closed before UUID collection finished");
        }
    })
}

/// Aborts tasks still in flight and waits until they are dropped, which
/// kills any child process they were waiting on.
pub async fn cancel_all(tasks: Vec<JoinHandle<()>>) {
    for task in tasks {
        if !task.is_finished() {
            warn!("Cancelling a run still in flight");
        }
        task.abort();
        let _ = task.await;
    }
}
