use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Text captured from one subprocess invocation
#[derive(Clone, Debug, Default)]
pub struct RawOutput {
    pub stdout: String,
    pub stderr: String,
    /// `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
}

/// Trimmed matrix rows found after the P2P=Disabled marker, labels still attached
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BandwidthMatrix {
    pub rows: Vec<String>,
}

impl BandwidthMatrix {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Warning {
    OnChipLow { gpu: usize, value: f64 },
    CrossGpuLow { from: usize, to: usize, value: f64 },
    UnparseableRow { row: String },
}

impl Warning {
    /// Parse skips are informational; only threshold violations count as issues
    pub fn is_violation(&self) -> bool {
        !matches!(self, Warning::UnparseableRow { .. })
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::OnChipLow { gpu, value } => write!(
                f,
                "Warning: GPU {gpu} on-chip bandwidth is low: {} GB/s",
                format_bandwidth(*value)
            ),
            Warning::CrossGpuLow { from, to, value } => write!(
                f,
                "Warning: Low bandwidth between GPU {from} and GPU {to}: {} GB/s",
                format_bandwidth(*value)
            ),
            Warning::UnparseableRow { row } => {
                write!(f, "Skipping line due to invalid data: {row}")
            }
        }
    }
}

/// Shortest round-trip digits with `.0` on whole numbers (890.0, not 890);
/// below 1e-4 or from 1e16 up the exponent is signed and two digits wide
/// (`5e-05`, `1e+16`).
fn format_bandwidth(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    let repr = format!("{value:?}");
    match repr.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => repr,
    }
}

/// Outcome of checking one benchmark report
#[derive(Clone, Debug, PartialEq)]
pub struct Analysis {
    pub warnings: Vec<Warning>,
    pub status: Status,
}

impl Analysis {
    pub fn all_ok(&self) -> bool {
        self.status == Status::AllOk
    }
}

/// Summary shown in the status line
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Status {
    NotChecked,
    Running,
    AllOk,
    IssuesDetected,
    MatrixNotFound,
    Failed(String),
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::NotChecked => f.write_str("GPU Status: Not Checked"),
            Status::Running => f.write_str("Running GPU bandwidth test..."),
            Status::AllOk => {
                f.write_str("All GPUs are operating within expected bandwidth levels.")
            }
            Status::IssuesDetected => {
                f.write_str("Issues detected with GPU bandwidth. Check warnings in output.")
            }
            Status::MatrixNotFound => {
                f.write_str("Failed to find Unidirectional P2P matrix in output.")
            }
            Status::Failed(reason) => write!(f, "GPU test failed: {reason}"),
        }
    }
}

/// One `nvidia-smi -L` entry, serialized as `{"gpu_name": ..., "uuid": ...}`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GpuRecord {
    #[serde(rename = "gpu_name")]
    pub name: String,
    pub uuid: String,
}

/// Result of a UUID collection run
#[derive(Clone, Debug, Default)]
pub struct UuidCollection {
    pub output: RawOutput,
    pub records: Vec<GpuRecord>,
    /// Lines mentioning "UUID" without the "UUID: " separator
    pub skipped: Vec<String>,
    pub saved_to: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warning_text_keeps_decimal_point() {
        let w = Warning::OnChipLow {
            gpu: 0,
            value: 890.0,
        };
        assert_eq!(
            w.to_string(),
            "Warning: GPU 0 on-chip bandwidth is low: 890.0 GB/s"
        );

        let w = Warning::CrossGpuLow {
            from: 1,
            to: 2,
            value: 11.41,
        };
        assert_eq!(
            w.to_string(),
            "Warning: Low bandwidth between GPU 1 and GPU 2: 11.41 GB/s"
        );
    }

    #[test]
    fn extreme_values_use_signed_two_digit_exponent() {
        assert_eq!(format_bandwidth(5e-5), "5e-05");
        assert_eq!(format_bandwidth(1.5e-5), "1.5e-05");
        assert_eq!(format_bandwidth(1e16), "1e+16");
        assert_eq!(format_bandwidth(2.5e123), "2.5e+123");
        assert_eq!(format_bandwidth(0.0001), "0.0001");
        assert_eq!(format_bandwidth(0.0), "0.0");
        assert_eq!(format_bandwidth(f64::NAN), "nan");
        assert_eq!(format_bandwidth(f64::INFINITY), "inf");

        let w = Warning::CrossGpuLow {
            from: 0,
            to: 1,
            value: 5e-5,
        };
        assert_eq!(
            w.to_string(),
            "Warning: Low bandwidth between GPU 0 and GPU 1: 5e-05 GB/s"
        );
    }

    #[test]
    fn skip_warning_is_not_a_violation() {
        let skip = Warning::UnparseableRow {
            row: "1 abc 10.0".into(),
        };
        assert!(!skip.is_violation());
        assert_eq!(skip.to_string(), "Skipping line due to invalid data: 1 abc 10.0");
        assert!(Warning::OnChipLow { gpu: 0, value: 1.0 }.is_violation());
    }

    #[test]
    fn gpu_record_uses_gpu_name_key() {
        let record = GpuRecord {
            name: "GPU 0: A100".into(),
            uuid: "GPU-1234".into(),
        };
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"gpu_name":"GPU 0: A100","uuid":"GPU-1234"}"#);
    }
}
