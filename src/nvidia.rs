use std::fs;
use std::path::Path;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tracing::{info, warn};

use crate::benchmark::capture;
use crate::error::{Error, Result};
use crate::models::{GpuRecord, UuidCollection};

const UUID_SEPARATOR: &str = "UUID: ";

/// Runs the listing command (`nvidia-smi -L` by default) and parses the
/// `<description> UUID: <uuid>` lines out of its standard output.
pub async fn collect_uuids(command: &str, args: &[String]) -> Result<UuidCollection> {
    let output = capture(command, args).await?;
    let (records, skipped) = parse_uuid_listing(&output.stdout);

    info!(gpus = records.len(), skipped = skipped.len(), "Collected GPU UUIDs");

    Ok(UuidCollection {
        output,
        records,
        skipped,
        saved_to: None,
    })
}

/// Splits each line mentioning "UUID" once on `"UUID: "`.
///
/// Both halves are trimmed and otherwise kept as-is, so a closing
/// parenthesis stays on the uuid. Lines that mention "UUID" without the
/// separator are returned in the second list instead of failing the run.
pub fn parse_uuid_listing(text: &str) -> (Vec<GpuRecord>, Vec<String>) {
    let mut records = Vec::new();
    let mut skipped = Vec::new();

    for line in text.lines().filter(|line| line.contains("UUID")) {
        match line.split_once(UUID_SEPARATOR) {
            Some((name, uuid)) => records.push(GpuRecord {
                name: name.trim().to_string(),
                uuid: uuid.trim().to_string(),
            }),
            None => {
                warn!(line = %line, "UUID line without separator, skipping");
                skipped.push(line.to_string());
            }
        }
    }

    (records, skipped)
}

/// Writes the records as a 4-space indented JSON array, replacing any existing file.
pub fn persist(records: &[GpuRecord], path: &Path) -> Result<()> {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    records.serialize(&mut ser)?;

    fs::write(path, buf).map_err(|e| Error::io(path, e))?;
    info!(path = %path.display(), records = records.len(), "GPU UUIDs saved");
    Ok(())
}

/// Collects and persists in one step.
pub async fn collect_and_persist(command: &str, args: &[String], path: &Path) -> Result<UuidCollection> {
    let mut collection = collect_uuids(command, args).await?;
    persist(&collection.records, path)?;
    collection.saved_to = Some(path.to_path_buf());
    Ok(collection)
}
