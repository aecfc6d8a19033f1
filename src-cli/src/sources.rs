//! Input discovery
//!
//! Locates the ODT reports to merge and reads them into memory.

use crate::settings::InputOrder;
use anyhow::{Context, Result};
use doc_merge::SourceDocument;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::SystemTime;

/// Reported when the revision cannot be determined
pub const UNKNOWN_REVISION: &str = "unknown";

/// `.odt` files directly inside `dir`, in the requested order
pub fn discover(dir: &Path, order: InputOrder) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read input directory {}", dir.display()))?;

    let mut found: Vec<(PathBuf, SystemTime)> = Vec::new();
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() || !is_odt(&path) {
            continue;
        }
        let modified = entry
            .metadata()
            .and_then(|m| m.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);
        found.push((path, modified));
    }

    match order {
        InputOrder::Name => found.sort_by(|a, b| a.0.file_name().cmp(&b.0.file_name())),
        InputOrder::Modified => found.sort_by(|a, b| {
            a.1.cmp(&b.1)
                .then_with(|| a.0.file_name().cmp(&b.0.file_name()))
        }),
    }

    tracing::debug!("Found {} documents in {}", found.len(), dir.display());
    Ok(found.into_iter().map(|(path, _)| path).collect())
}

/// Explicit files in the order given, followed by the directory's documents
pub fn collect_inputs(
    files: &[PathBuf],
    input_dir: Option<&Path>,
    order: InputOrder,
) -> Result<Vec<PathBuf>> {
    let mut inputs = files.to_vec();
    if let Some(dir) = input_dir {
        inputs.extend(discover(dir, order)?);
    }
    if inputs.is_empty() {
        anyhow::bail!("No input documents given; pass files or --input-dir");
    }
    Ok(inputs)
}

/// Read every input, identifying each by its path
pub fn load_sources(paths: &[PathBuf]) -> Result<Vec<SourceDocument>> {
    paths
        .iter()
        .map(|path| {
            let bytes = std::fs::read(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Ok(SourceDocument::new(path.display().to_string(), bytes))
        })
        .collect()
}

/// Current commit hash of the repository containing `dir`
pub fn current_revision(dir: &Path) -> String {
    let output = Command::new("git")
        .args(["rev-parse", "HEAD"])
        .current_dir(dir)
        .output();

    match output {
        Ok(output) if output.status.success() => {
            let revision = String::from_utf8_lossy(&output.stdout).trim().to_string();
            if revision.is_empty() {
                UNKNOWN_REVISION.to_string()
            } else {
                revision
            }
        }
        Ok(output) => {
            tracing::debug!(
                "git rev-parse failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
            UNKNOWN_REVISION.to_string()
        }
        Err(e) => {
            tracing::debug!("Could not run git: {}", e);
            UNKNOWN_REVISION.to_string()
        }
    }
}

fn is_odt(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("odt"))
}
