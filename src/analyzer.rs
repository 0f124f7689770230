//! Extraction and threshold checks for the `p2pBandwidthLatencyTest` report.
//!
//! The report is free-form text; the matrix is located with the same
//! best-effort heuristics the tool's users rely on: the first marker line,
//! then every digit-bearing line up to the first blank one.

use tracing::{debug, warn};

use crate::config::Thresholds;
use crate::models::{Analysis, BandwidthMatrix, Status, Warning};

pub const MATRIX_MARKER: &str = "Unidirectional P2P=Disabled Bandwidth Matrix (GB/s)";

/// GPUs with an ordinal below this sit on the x16 links
const HIGH_LINK_GPUS: usize = 3;

/// Collects the matrix rows following the marker.
///
/// Returns `None` when the marker never appears. Rows are trimmed and keep
/// their leading label token.
pub fn extract_matrix(text: &str) -> Option<BandwidthMatrix> {
    let mut found = false;
    let mut rows = Vec::new();

    for line in text.lines() {
        if line.contains(MATRIX_MARKER) {
            found = true;
            continue;
        }
        if !found {
            continue;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            break;
        }
        if trimmed.chars().any(|c| c.is_ascii_digit()) {
            rows.push(trimmed.to_string());
        }
    }

    found.then_some(BandwidthMatrix { rows })
}

/// Checks every parsed cell against the thresholds.
///
/// The boolean is true when no threshold was violated; rows that fail to
/// parse produce a skip warning but do not affect it. Pairs with one GPU
/// below 3 and the other at 3 or above are not checked.
pub fn evaluate(matrix: &BandwidthMatrix, thresholds: &Thresholds) -> (Vec<Warning>, bool) {
    let mut warnings = Vec::new();
    let mut issues_found = false;

    for (i, row) in matrix.rows.iter().enumerate() {
        let values = match parse_row(row) {
            Some(values) => values,
            None => {
                debug!(row = %row, "Skipping unparseable matrix row");
                warnings.push(Warning::UnparseableRow { row: row.clone() });
                continue;
            }
        };

        for (j, value) in values.into_iter().enumerate() {
            let warning = if i == j {
                (value < thresholds.on_chip_min).then_some(Warning::OnChipLow { gpu: i, value })
            } else {
                let both_high = i < HIGH_LINK_GPUS && j < HIGH_LINK_GPUS;
                let both_low = i >= HIGH_LINK_GPUS && j >= HIGH_LINK_GPUS;
                let low = (both_high && value < thresholds.high_link_min)
                    || (both_low && value < thresholds.low_link_min);
                low.then_some(Warning::CrossGpuLow {
                    from: i,
                    to: j,
                    value,
                })
            };

            if let Some(warning) = warning {
                issues_found |= warning.is_violation();
                warnings.push(warning);
            }
        }
    }

    (warnings, !issues_found)
}

/// Runs extraction and evaluation over a full report.
pub fn analyze(text: &str, thresholds: &Thresholds) -> Analysis {
    let matrix = match extract_matrix(text) {
        Some(matrix) if !matrix.is_empty() => matrix,
        _ => {
            warn!("Bandwidth matrix not found in benchmark output");
            return Analysis {
                warnings: Vec::new(),
                status: Status::MatrixNotFound,
            };
        }
    };

    debug!(rows = matrix.len(), "Extracted bandwidth matrix");
    let (warnings, all_ok) = evaluate(&matrix, thresholds);
    let status = if all_ok {
        Status::AllOk
    } else {
        Status::IssuesDetected
    };

    Analysis { warnings, status }
}

/// Drops the row label and parses the remaining tokens; `None` if any token is not a number.
fn parse_row(row: &str) -> Option<Vec<f64>> {
    row.split_whitespace()
        .skip(1)
        .map(|token| token.parse::<f64>().ok())
        .collect()
}
