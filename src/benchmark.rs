use std::path::Path;

use tokio::process::Command;
use tracing::{debug, info};

use crate::config::Thresholds;
use crate::error::{Error, Result};
use crate::models::{Analysis, RawOutput};

/// Benchmark output together with its analysis
#[derive(Clone, Debug)]
pub struct BenchmarkReport {
    pub output: RawOutput,
    pub analysis: Analysis,
}

/// Launches the executable with no arguments and waits for it to exit.
///
/// The exit code is recorded but not interpreted. There is no timeout:
/// a full bandwidth/latency sweep can run for minutes.
pub async fn run_benchmark(executable: &Path) -> Result<RawOutput> {
    capture(executable.as_os_str(), &[]).await
}

/// Runs the benchmark and analyzes its standard output.
pub async fn run_and_analyze(executable: &Path, thresholds: &Thresholds) -> Result<BenchmarkReport> {
    let output = run_benchmark(executable).await?;
    let analysis = crate::analyzer::analyze(&output.stdout, thresholds);
    info!(
        status = ?analysis.status,
        warnings = analysis.warnings.len(),
        "Bandwidth analysis complete"
    );
    Ok(BenchmarkReport { output, analysis })
}

/// Spawns `program` with `args`, capturing stdout and stderr as lossy UTF-8.
pub(crate) async fn capture<S: AsRef<std::ffi::OsStr>>(program: S, args: &[String]) -> Result<RawOutput> {
    let program = program.as_ref();
    let name = program.to_string_lossy().into_owned();
    info!(program = %name, ?args, "Launching process");

    // dropping the future (task aborted on quit) kills the child
    let output = Command::new(program)
        .args(args)
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| Error::launch(name.clone(), e))?;

    let raw = RawOutput {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        exit_code: output.status.code(),
    };

    debug!(
        program = %name,
        exit_code = ?raw.exit_code,
        stdout_bytes = raw.stdout.len(),
        stderr_bytes = raw.stderr.len(),
        "Process finished"
    );

    Ok(raw)
}
